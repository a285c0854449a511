//! Core tour pricing functions.
//!
//! Pure functions for pricing math - no database access, no currency
//! conversion. All amounts are in the base currency.

use serde::Serialize;

use super::models::{NightCount, Selection, TourDefinition};
use super::selection::default_selection;

/// Price of a tour for one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub final_price: i64,
    /// Pre-discount price. Only worth showing when [`PriceQuote::has_discount`].
    pub final_old_price: i64,
    pub nights_count: u32,
}

impl PriceQuote {
    /// True when the old price should be shown struck through.
    ///
    /// The old price is not guaranteed to be above the final price.
    pub fn has_discount(&self) -> bool {
        self.final_old_price > self.final_price
    }

    pub fn days_count(&self) -> u32 {
        self.nights_count.saturating_add(1)
    }
}

/// Compute the total and pre-discount total for a selection.
///
/// ```text
/// final     = base_price     + option.add_price     + meal.add     * nights * persons
/// final_old = old_base_price + option.old_add_price + meal.old_add * nights * persons
/// ```
///
/// Unset or unresolvable picks contribute 0. Totals saturate at the `i64`
/// bounds instead of overflowing. The meal surcharge accrues per
/// night and per person; the nights count comes from the selected key even
/// when no option under that key is selected.
///
/// # Examples
/// ```
/// use holidaylife_web::tours::{compute_total, Selection, TourDefinition};
///
/// let tour = TourDefinition { base_price: 1000, old_base_price: 1200, ..Default::default() };
/// let quote = compute_total(&tour, &Selection::default());
/// assert_eq!((quote.final_price, quote.final_old_price), (1000, 1200));
/// ```
pub fn compute_total(tour: &TourDefinition, selection: &Selection) -> PriceQuote {
    let nights_count = selection.nights_count();

    let option = match (&selection.nights_key, &selection.option_label) {
        (Some(key), Some(label)) => tour.nights.by_key(key).and_then(|b| b.option(label)),
        _ => None,
    };
    let (nights_add, nights_old_add) = option
        .map(|o| (o.add_price, o.old_add_price))
        .unwrap_or((0, 0));

    let meal = selection
        .meal_category
        .and_then(|id| tour.meal_categories.offered_pricing(id));
    let accrual = i64::from(nights_count).saturating_mul(i64::from(tour.person_count));
    let (meal_add, meal_old_add) = meal
        .map(|m| {
            (
                m.add_price_per_night_per_person.saturating_mul(accrual),
                m.old_add_price_per_night_per_person.saturating_mul(accrual),
            )
        })
        .unwrap_or((0, 0));

    PriceQuote {
        final_price: tour.base_price.saturating_add(nights_add).saturating_add(meal_add),
        final_old_price: tour
            .old_base_price
            .saturating_add(nights_old_add)
            .saturating_add(meal_old_add),
        nights_count,
    }
}

/// The picks of `selection` that count toward [`compute_total`] on `tour`.
///
/// The nights key is kept (normalized) when it names a positive count, since
/// meals accrue over it even without a bucket. The option is kept only when it
/// resolves in that bucket and the meal only when it is offered. Pricing the
/// result gives the same quote as pricing `selection`.
pub fn resolve_selection(tour: &TourDefinition, selection: &Selection) -> Selection {
    let nights_key = selection
        .nights_key
        .as_deref()
        .and_then(|k| k.parse::<NightCount>().ok())
        .map(|n| n.to_string());

    let option_label = match (&selection.nights_key, &selection.option_label) {
        (Some(key), Some(label)) => tour
            .nights
            .by_key(key)
            .and_then(|b| b.option(label))
            .map(|o| o.label.clone()),
        _ => None,
    };

    let meal_category = selection
        .meal_category
        .filter(|id| tour.meal_categories.offered_pricing(*id).is_some());

    Selection {
        nights_key,
        option_label,
        meal_category,
    }
}

/// Quote shown on listing cards: the price of the default selection.
pub fn listing_quote(tour: &TourDefinition) -> PriceQuote {
    compute_total(tour, &default_selection(tour))
}
