use crate::domain::model::{Answer, FeatureVector, PropertyInput};

/// `"Yes"` -> 1, anything else (including a missing answer) -> 0.
pub fn yes_no_to_flag(answer: &Answer) -> f64 {
    if answer.is_yes() {
        1.0
    } else {
        0.0
    }
}

/// Encodes a property into the model's fixed column order.
///
/// Numeric fields pass through unchanged; range checks belong to whoever
/// collected the input.
pub fn encode(input: &PropertyInput) -> FeatureVector {
    FeatureVector([
        input.area,
        f64::from(input.bedrooms),
        f64::from(input.bathrooms),
        f64::from(input.stories),
        yes_no_to_flag(&input.mainroad),
        yes_no_to_flag(&input.guestroom),
        yes_no_to_flag(&input.basement),
        yes_no_to_flag(&input.hotwaterheating),
        yes_no_to_flag(&input.airconditioning),
        f64::from(input.parking),
        yes_no_to_flag(&input.prefarea),
    ])
}
