//! Required-field checks run before a tour is accepted.

use super::models::TourDefinition;
use crate::validation::{FieldErrors, ValidationResult};

/// Validate a tour definition, reporting every missing field.
///
/// ## Rules
/// - `title`, `tour_summary` non-empty
/// - `price`: a base price of 0 counts as not provided
/// - `nights`: a night count has been confirmed
/// - `tour_image`: at least one tour image
/// - `first_day`, `last_day`: arrival and departure text
/// - `day_{i}`: text for every middle day
/// - `nightsOptions`: the confirmed bucket holds at least one option
///
/// Prices are not range-checked and validity dates are not ordered.
pub fn validate_tour(tour: &TourDefinition) -> ValidationResult {
    let mut errors = FieldErrors::new();

    errors.require("title", &tour.title, "Tour title is required.");
    if tour.base_price == 0 {
        errors.add("price", "Price is required.");
    }
    if tour.confirmed_nights.is_none() {
        errors.add("nights", "Number of nights is required.");
    }
    errors.require("tour_summary", &tour.summary, "Tour summary is required.");
    if tour.tour_images.is_empty() {
        errors.add("tour_image", "At least one tour image is required.");
    }

    errors.require(
        "first_day",
        &tour.itinerary.first_day.activity,
        "Arrival day itinerary is required.",
    );
    errors.require(
        "last_day",
        &tour.itinerary.last_day.activity,
        "Departure day itinerary is required.",
    );
    for middle in &tour.itinerary.middle_days {
        if middle.segment.activity.is_empty() {
            let key = middle.day.field_key();
            let message = format!("Itinerary for {} is required.", key);
            errors.add(key, message);
        }
    }

    if tour.confirmed_nights.is_some()
        && tour.confirmed_bucket().map_or(true, |b| b.options.is_empty())
    {
        errors.add("nightsOptions", "Please add at least one nights option.");
    }

    ValidationResult::from_errors(errors)
}
