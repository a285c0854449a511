//! Tour catalog, pricing and itinerary authoring.
//!
//! Everything here is pure: handlers in `crate::routes` load tours and rate
//! tables, then call into these functions.

pub mod calculators;
pub mod currency;
pub mod itinerary;
pub mod models;
pub mod requests;
pub mod responses;
pub mod selection;
pub mod validation;

// Re-export commonly used items
pub use calculators::{compute_total, listing_quote, resolve_selection, PriceQuote};
pub use currency::{format_display, to_base, to_display, RateTable};
pub use itinerary::{add_night_option, confirm_nights, remove_night_option};
pub use models::{
    DayIndex, DaySegment, MealCategoryId, MealPricing, NightBucket, NightCount, NightOption,
    Selection, TourDefinition, BASE_CURRENCY,
};
pub use selection::{default_selection, SelectionState};
pub use validation::validate_tour;
