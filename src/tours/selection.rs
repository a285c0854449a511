//! Initial picks for a freshly loaded tour, and the per-viewer selection state.

use std::sync::Arc;

use super::calculators::{compute_total, PriceQuote};
use super::models::{MealCategoryId, Selection, TourDefinition};

/// Default selection for a tour.
///
/// - nights: first bucket in insertion order
/// - option: first option in that bucket
/// - meal: lowest offered category id
pub fn default_selection(tour: &TourDefinition) -> Selection {
    let bucket = tour.nights.first();

    Selection {
        nights_key: bucket.map(|b| b.nights.to_string()),
        option_label: bucket
            .and_then(|b| b.options.first())
            .map(|o| o.label.clone()),
        meal_category: tour.meal_categories.offered().next().map(|(id, _)| id),
    }
}

/// Selection bound to one loaded tour.
///
/// Defaults are computed once per tour reference: [`SelectionState::sync`] is
/// a no-op for the same `Arc`, and re-defaults when a different one arrives
/// (a reload, even with identical content).
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    tour: Option<Arc<TourDefinition>>,
    selection: Selection,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `tour`. Returns true when the defaults were recomputed.
    pub fn sync(&mut self, tour: &Arc<TourDefinition>) -> bool {
        if let Some(current) = &self.tour {
            if Arc::ptr_eq(current, tour) {
                return false;
            }
        }
        self.selection = default_selection(tour);
        self.tour = Some(Arc::clone(tour));
        true
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tour(&self) -> Option<&Arc<TourDefinition>> {
        self.tour.as_ref()
    }

    /// Pick a night count. The option resets to the first one of that bucket.
    pub fn select_nights(&mut self, nights_key: &str) {
        let first_option = self
            .tour
            .as_ref()
            .and_then(|t| t.nights.by_key(nights_key))
            .and_then(|b| b.options.first())
            .map(|o| o.label.clone());

        self.selection = Selection {
            nights_key: Some(nights_key.to_string()),
            option_label: first_option,
            ..self.selection.clone()
        };
    }

    pub fn select_option(&mut self, label: &str) {
        self.selection = Selection {
            option_label: Some(label.to_string()),
            ..self.selection.clone()
        };
    }

    /// Pick a meal plan. Categories the tour does not offer are rejected and
    /// leave the selection unchanged.
    pub fn select_meal(&mut self, id: MealCategoryId) -> bool {
        let offered = self
            .tour
            .as_ref()
            .map(|t| t.meal_categories.offered_pricing(id).is_some())
            .unwrap_or(false);
        if offered {
            self.selection = Selection {
                meal_category: Some(id),
                ..self.selection.clone()
            };
        }
        offered
    }

    /// Quote for the current selection, `None` before a tour is bound.
    pub fn quote(&self) -> Option<PriceQuote> {
        self.tour
            .as_ref()
            .map(|t| compute_total(t, &self.selection))
    }
}
