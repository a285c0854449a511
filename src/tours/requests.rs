//! Request DTOs for tour API endpoints.

use serde::Deserialize;

use crate::validation::ValidationError;

use super::models::{MealCategoryId, NightCount, NightOption, Selection, TourDefinition};

/// `?currency=EUR`
#[derive(Debug, Default, Deserialize)]
pub struct CurrencyQuery {
    #[serde(default)]
    pub currency: Option<String>,
}

/// Explicit selection for a quote.
///
/// `meal` is kept raw so an unknown id behaves like no meal selected.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteQuery {
    #[serde(default)]
    pub nights: Option<String>,
    #[serde(default)]
    pub option: Option<String>,
    #[serde(default)]
    pub meal: Option<u8>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl QuoteQuery {
    pub fn is_empty(&self) -> bool {
        self.nights.is_none() && self.option.is_none() && self.meal.is_none()
    }

    pub fn selection(&self) -> Selection {
        Selection {
            nights_key: self.nights.clone(),
            option_label: self.option.clone(),
            meal_category: self.meal.and_then(|m| MealCategoryId::try_from(m).ok()),
        }
    }
}

/// Longest stay a draft may confirm. Each night adds an itinerary day.
pub const MAX_DRAFT_NIGHTS: i64 = 365;

/// Confirm a night count on a tour draft.
#[derive(Debug, Deserialize)]
pub struct ConfirmNightsRequest {
    pub tour: TourDefinition,
    pub nights: i64,
}

impl ConfirmNightsRequest {
    /// Requested nights, rejected above [`MAX_DRAFT_NIGHTS`].
    ///
    /// Non-positive counts pass through to `confirm_nights`, which reports them.
    pub fn bounded_nights(&self) -> Result<i64, ValidationError> {
        if self.nights > MAX_DRAFT_NIGHTS {
            return Err(ValidationError::single(
                "nights",
                format!("Number of nights cannot exceed {}.", MAX_DRAFT_NIGHTS),
            ));
        }
        Ok(self.nights)
    }
}

/// Append an option to the draft's confirmed night bucket.
#[derive(Debug, Deserialize)]
pub struct AddNightOptionRequest {
    pub tour: TourDefinition,
    pub option: NightOption,
}

/// Drop one option from a draft's night bucket.
#[derive(Debug, Deserialize)]
pub struct RemoveNightOptionRequest {
    pub tour: TourDefinition,
    pub nights: NightCount,
    pub index: usize,
}

/// Images to upload, base64 encoded.
#[derive(Debug, Deserialize)]
pub struct UploadImagesRequest {
    pub images: Vec<String>,
}
