//! The module contains `Farm` and its document schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine, crops,
    documents::{self, Document, NumberField, Timestamp},
    util::normalize_required_name,
};

/// A land unit owned by one user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub id: String,
    pub name: String,
    pub village: String,
    pub crop_type: String,
    pub season: String,
    /// Total area, in the unit the user entered it (acres by convention).
    pub area: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Farm {
    /// Crop category of this farm's crop type, if catalogued.
    pub fn crop_category(&self) -> Option<&'static str> {
        crops::category_of(&self.crop_type)
    }
}

/// Fields required to create a farm.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewFarm {
    pub name: String,
    pub village: String,
    pub crop_type: String,
    pub season: String,
    pub area: Option<f64>,
}

/// Partial farm update; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FarmUpdate {
    pub name: Option<String>,
    pub village: Option<String>,
    pub crop_type: Option<String>,
    pub season: Option<String>,
    /// `Some(None)` clears the area.
    pub area: Option<Option<f64>>,
}

/// Stored shape of a farm document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FarmDocument {
    pub(crate) farm_name: String,
    #[serde(default)]
    pub(crate) village: String,
    #[serde(default)]
    pub(crate) crop_type: String,
    #[serde(default)]
    pub(crate) season: String,
    #[serde(default, alias = "area", skip_serializing_if = "Option::is_none")]
    pub(crate) total_area: Option<NumberField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) created_at: Option<Timestamp>,
}

impl FarmDocument {
    pub(crate) fn new(input: &NewFarm, created_at: DateTime<Utc>) -> ResultEngine<Self> {
        Ok(Self {
            farm_name: normalize_required_name(&input.name, "farm")?,
            village: input.village.trim().to_string(),
            crop_type: input.crop_type.trim().to_string(),
            season: input.season.trim().to_string(),
            total_area: validate_area(input.area)?.map(NumberField::Number),
            created_at: Some(Timestamp::Rfc3339(created_at)),
        })
    }

    pub(crate) fn from_farm(farm: &Farm) -> Self {
        Self {
            farm_name: farm.name.clone(),
            village: farm.village.clone(),
            crop_type: farm.crop_type.clone(),
            season: farm.season.clone(),
            total_area: farm.area.map(NumberField::Number),
            created_at: Some(Timestamp::Rfc3339(farm.created_at)),
        }
    }
}

pub(crate) fn validate_area(area: Option<f64>) -> ResultEngine<Option<f64>> {
    match area {
        Some(value) if !value.is_finite() || value < 0.0 => Err(EngineError::InvalidValue(
            "area must be a finite number >= 0".to_string(),
        )),
        other => Ok(other),
    }
}

impl TryFrom<Document> for Farm {
    type Error = EngineError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        let stored: FarmDocument = documents::decode(&document)?;

        let name = stored.farm_name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::InvalidRecord(format!(
                "farm {} has an empty name",
                document.id
            )));
        }

        let area = match stored.total_area {
            None => None,
            Some(field) => {
                let value = field.to_f64().filter(|v| v.is_finite() && *v >= 0.0);
                if value.is_none() {
                    return Err(EngineError::InvalidRecord(format!(
                        "farm {} has an invalid area",
                        document.id
                    )));
                }
                value
            }
        };

        let created_at = stored
            .created_at
            .and_then(Timestamp::to_utc)
            .unwrap_or(document.created_at);

        Ok(Self {
            id: document.id,
            name,
            village: stored.village,
            crop_type: stored.crop_type,
            season: stored.season,
            area,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document(data: serde_json::Value) -> Document {
        Document {
            id: "f1".to_string(),
            data: data.as_object().cloned().unwrap_or_default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn decodes_full_document() {
        let farm = Farm::try_from(document(json!({
            "farmName": "North Field",
            "village": "Rampur",
            "cropType": "Wheat",
            "season": "Rabi",
            "totalArea": "2.5",
            "createdAt": "2024-01-10T08:00:00Z",
        })))
        .unwrap();

        assert_eq!(farm.name, "North Field");
        assert_eq!(farm.area, Some(2.5));
        assert_eq!(farm.crop_category(), Some("Cereals"));
        assert_eq!(farm.created_at.to_rfc3339(), "2024-01-10T08:00:00+00:00");
    }

    #[test]
    fn missing_optional_fields_default() {
        let doc = document(json!({ "farmName": "Plot 7" }));
        let row_created = doc.created_at;
        let farm = Farm::try_from(doc).unwrap();

        assert_eq!(farm.village, "");
        assert_eq!(farm.area, None);
        assert_eq!(farm.created_at, row_created);
    }

    #[test]
    fn rejects_missing_name() {
        assert!(matches!(
            Farm::try_from(document(json!({ "village": "Rampur" }))),
            Err(EngineError::InvalidRecord(_))
        ));
        assert!(matches!(
            Farm::try_from(document(json!({ "farmName": "  " }))),
            Err(EngineError::InvalidRecord(_))
        ));
    }

    #[test]
    fn area_is_stored_as_total_area() {
        let farm = Farm::try_from(document(json!({ "farmName": "A", "area": 4 }))).unwrap();
        assert_eq!(farm.area, Some(4.0));

        let stored = serde_json::to_value(FarmDocument::from_farm(&farm)).unwrap();
        assert_eq!(stored["totalArea"], json!(4.0));
        assert!(stored.get("area").is_none());
    }

    #[test]
    fn rejects_negative_area() {
        assert!(Farm::try_from(document(json!({ "farmName": "A", "totalArea": -1 }))).is_err());
        assert!(validate_area(Some(f64::NAN)).is_err());
        assert_eq!(validate_area(Some(3.0)).unwrap(), Some(3.0));
    }
}
