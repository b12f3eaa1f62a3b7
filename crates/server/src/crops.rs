//! Crop catalogue endpoint

use api_types::crops::{CropCategory, CropsResponse};
use axum::Json;
use engine::{CROP_CATEGORIES, SEASONS};

pub async fn list() -> Json<CropsResponse> {
    Json(CropsResponse {
        categories: CROP_CATEGORIES
            .iter()
            .map(|(name, crops)| CropCategory {
                name: name.to_string(),
                crops: crops.iter().map(ToString::to_string).collect(),
            })
            .collect(),
        seasons: SEASONS.iter().map(ToString::to_string).collect(),
    })
}
