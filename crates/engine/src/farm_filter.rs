//! Farm filter pipeline and farm ordering.

use std::cmp::Ordering;

use crate::{
    Farm,
    util::{collate, fold},
};

/// Farm list filter. Blank fields match every farm.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FarmFilter {
    /// Case-insensitive substring of the farm name or the village.
    pub search: String,
    /// Crop category name from the crop catalogue.
    pub crop_category: String,
    pub season: String,
}

impl FarmFilter {
    pub fn matches(&self, farm: &Farm) -> bool {
        let search = fold(self.search.trim());
        let matches_search = search.is_empty()
            || fold(&farm.name).contains(&search)
            || fold(&farm.village).contains(&search);

        let crop_category = self.crop_category.trim();
        let matches_category =
            crop_category.is_empty() || farm.crop_category() == Some(crop_category);

        let season = self.season.trim();
        let matches_season = season.is_empty() || farm.season == season;

        matches_search && matches_category && matches_season
    }

    pub fn apply(&self, farms: &[Farm]) -> Vec<Farm> {
        farms
            .iter()
            .filter(|farm| self.matches(farm))
            .cloned()
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FarmSortBy {
    #[default]
    FarmName,
    CreatedAt,
    Area,
}

impl FarmSortBy {
    /// Unknown keys fall back to `FarmName`.
    pub fn from_key(key: &str) -> Self {
        match key.trim() {
            "createdAt" | "created_at" => Self::CreatedAt,
            "totalArea" | "total_area" | "area" => Self::Area,
            _ => Self::FarmName,
        }
    }
}

/// Stable ascending sort; farms without an area come first.
pub fn sort_farms(farms: &mut [Farm], sort_by: FarmSortBy) {
    match sort_by {
        FarmSortBy::FarmName => farms.sort_by(|a, b| collate(&a.name, &b.name)),
        FarmSortBy::CreatedAt => farms.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        FarmSortBy::Area => farms.sort_by(|a, b| {
            a.area
                .partial_cmp(&b.area)
                .unwrap_or(Ordering::Equal)
        }),
    }
}
