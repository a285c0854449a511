//! Itinerary shaping for the tour authoring flow.

use tracing::debug;

use super::models::{DayIndex, DaySegment, MiddleDay, NightCount, NightOption, TourDefinition};
use crate::validation::ValidationError;

/// Highest middle day assumed when a tour has none yet.
///
/// Day 1 is the arrival day, so generated middle days start at 2 and a
/// one-night tour gets no middle day at all.
const MIDDLE_DAY_FLOOR: u32 = 1;

/// Confirm the tour's night count and grow the itinerary to match.
///
/// Middle days after the current highest index are appended up to
/// `requested`, each with a `"Day {i} Title"` placeholder. Existing days are
/// never changed, removed or renumbered, so confirming a smaller count keeps
/// the itinerary as is. An empty option bucket for `requested` is created if
/// missing.
pub fn confirm_nights(
    mut tour: TourDefinition,
    requested: i64,
) -> Result<TourDefinition, ValidationError> {
    let nights = u32::try_from(requested)
        .ok()
        .and_then(NightCount::new)
        .ok_or_else(|| {
            ValidationError::single("nights", "Please enter a valid number of nights.")
        })?;

    let current_max = tour
        .itinerary
        .max_middle_day()
        .map(|d| d.0)
        .unwrap_or(MIDDLE_DAY_FLOOR);

    if nights.get() > current_max {
        for i in (current_max + 1)..=nights.get() {
            let day = DayIndex(i);
            tour.itinerary.middle_days.push(MiddleDay {
                day,
                segment: DaySegment::placeholder(day),
            });
        }
        debug!(
            tour_id = %tour.id,
            from = current_max,
            to = nights.get(),
            "Extended itinerary middle days"
        );
    }

    tour.nights.ensure(nights);
    tour.confirmed_nights = Some(nights);
    Ok(tour)
}

/// Append an option to the confirmed night count's bucket.
pub fn add_night_option(
    mut tour: TourDefinition,
    option: NightOption,
) -> Result<TourDefinition, ValidationError> {
    let nights = tour.confirmed_nights.ok_or_else(|| {
        ValidationError::single("nights", "Please confirm the number of nights first.")
    })?;
    if option.label.is_empty() {
        return Err(ValidationError::single(
            "option",
            "Please fill in all fields for the nights option.",
        ));
    }

    tour.nights.ensure(nights).options.push(option);
    Ok(tour)
}

/// Remove the option at `index` from the bucket for `nights`.
///
/// Unknown buckets or indices leave the tour unchanged.
pub fn remove_night_option(mut tour: TourDefinition, nights: NightCount, index: usize) -> TourDefinition {
    if let Some(bucket) = tour.nights.get_mut(nights) {
        if index < bucket.options.len() {
            bucket.options.remove(index);
        }
    }
    tour
}
