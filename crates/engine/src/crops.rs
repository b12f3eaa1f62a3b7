//! Static crop catalogue: which crop types belong to which crop category,
//! and the growing seasons a farm can be recorded under.

use crate::util::fold;

/// Crop categories and their crop types.
pub const CROP_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Cereals",
        &["Wheat", "Rice", "Maize", "Barley", "Millet", "Sorghum"],
    ),
    (
        "Pulses",
        &["Chickpea", "Lentil", "Pigeon Pea", "Green Gram", "Black Gram"],
    ),
    (
        "Oilseeds",
        &["Groundnut", "Mustard", "Soybean", "Sunflower", "Sesame"],
    ),
    (
        "Cash Crops",
        &["Cotton", "Sugarcane", "Jute", "Tobacco"],
    ),
    (
        "Vegetables",
        &["Tomato", "Potato", "Onion", "Brinjal", "Cabbage", "Cauliflower"],
    ),
    (
        "Fruits",
        &["Mango", "Banana", "Grapes", "Pomegranate", "Papaya"],
    ),
    (
        "Spices",
        &["Turmeric", "Chilli", "Ginger", "Garlic", "Cardamom"],
    ),
];

pub const SEASONS: &[&str] = &["Kharif", "Rabi", "Zaid", "Perennial"];

/// Returns the crop category a crop type belongs to, if it is catalogued.
///
/// Crop types are matched case-insensitively.
pub fn category_of(crop_type: &str) -> Option<&'static str> {
    let key = fold(crop_type.trim());
    CROP_CATEGORIES
        .iter()
        .find(|(_, crops)| crops.iter().any(|crop| fold(crop) == key))
        .map(|(category, _)| *category)
}
