//! Tour inquiries.
//!
//! An [`InquiryRecord`] freezes what the customer saw when they asked: the
//! selection and the price in their display currency. It is never recomputed
//! from the live tour. Staff answers are appended as [`InquiryReply`] entries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tours::currency::{round_display, to_base, to_display, RateTable};
use crate::tours::{compute_total, resolve_selection, MealCategoryId, Selection, TourDefinition};
use crate::validation::{FieldErrors, ValidationError};

/// Inquiry form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub travel_date: Option<NaiveDate>,
    pub traveller_count: Option<u32>,
    pub message: String,
    pub tour_id: Option<Uuid>,
    pub selected_nights_key: Option<String>,
    pub selected_option: Option<String>,
    pub selected_meal_category: Option<MealCategoryId>,
    pub currency: Option<String>,
}

impl NewInquiry {
    pub fn selection(&self) -> Selection {
        Selection {
            nights_key: self.selected_nights_key.clone(),
            option_label: self.selected_option.clone(),
            meal_category: self.selected_meal_category,
        }
    }
}

/// Check the contact fields of an inquiry.
pub fn validate_inquiry(inquiry: &NewInquiry) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.require("name", &inquiry.name, "Name is required.");
    errors.require("email", &inquiry.email, "Email is required.");
    errors.require("phone_number", &inquiry.phone_number, "Phone number is required.");
    if inquiry.travel_date.is_none() {
        errors.add("travel_date", "Travel date is required.");
    }
    if inquiry.traveller_count.unwrap_or(0) == 0 {
        errors.add("traveller_count", "Traveller count is required.");
    }
    errors.into_result()
}

/// Reply form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewReply {
    pub subject: String,
    pub message: String,
}

pub fn validate_reply(reply: &NewReply) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.require("subject", &reply.subject, "Subject is required.");
    errors.require("message", &reply.message, "Reply message is required.");
    errors.into_result()
}

/// A reply sent to an inquiry. Replies are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryReply {
    pub subject: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

impl InquiryReply {
    pub fn new(reply: NewReply, sent_at: DateTime<Utc>) -> Self {
        Self {
            subject: reply.subject,
            message: reply.message,
            sent_at,
        }
    }
}

/// Immutable snapshot of an inquiry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InquiryRecord {
    id: Uuid,
    name: String,
    email: String,
    phone_number: String,
    travel_date: NaiveDate,
    traveller_count: u32,
    message: String,
    tour_id: Option<Uuid>,
    selected_nights_key: Option<String>,
    selected_option: Option<String>,
    selected_meal_category: Option<MealCategoryId>,
    #[serde(with = "rust_decimal::serde::str_option")]
    final_price: Option<Decimal>,
    currency: String,
    submitted_at: DateTime<Utc>,
    replies: Vec<InquiryReply>,
}

/// Stored columns of an inquiry, used to rebuild a record.
#[derive(Debug, Clone)]
pub struct InquiryParts {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub travel_date: NaiveDate,
    pub traveller_count: u32,
    pub message: String,
    pub tour_id: Option<Uuid>,
    pub selected_nights_key: Option<String>,
    pub selected_option: Option<String>,
    pub selected_meal_category: Option<MealCategoryId>,
    pub final_price: Option<Decimal>,
    pub currency: String,
    pub submitted_at: DateTime<Utc>,
}

impl InquiryRecord {
    /// Freeze a submission.
    ///
    /// With a tour, the price of the submitted selection is computed now and
    /// converted into the submitted currency (base currency when unset), and
    /// picks that did not count toward it are dropped from the snapshot.
    /// Without a tour, no price is captured and the picks are kept as sent.
    pub fn capture(
        inquiry: NewInquiry,
        tour: Option<&TourDefinition>,
        rates: &RateTable,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        validate_inquiry(&inquiry)?;
        let (Some(travel_date), Some(traveller_count)) =
            (inquiry.travel_date, inquiry.traveller_count)
        else {
            return Err(ValidationError::single("travel_date", "Travel date is required."));
        };

        let currency = inquiry
            .currency
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| rates.base.clone());
        // With a tour, only the picks that priced are frozen.
        let selection = match tour {
            Some(t) => resolve_selection(t, &inquiry.selection()),
            None => inquiry.selection(),
        };
        let final_price = tour.map(|t| {
            let quote = compute_total(t, &selection);
            round_display(to_display(Decimal::from(quote.final_price), rates, &currency), 2)
        });
        // Price stays in the base currency when no rate was available.
        let currency = if final_price.is_some() && rates.rate(&currency).is_none() {
            rates.base.clone()
        } else {
            currency
        };

        Ok(Self::from_parts(
            InquiryParts {
                id: Uuid::new_v4(),
                name: inquiry.name,
                email: inquiry.email,
                phone_number: inquiry.phone_number,
                travel_date,
                traveller_count,
                message: inquiry.message,
                tour_id: tour.map(|t| t.id).or(inquiry.tour_id),
                selected_nights_key: selection.nights_key,
                selected_option: selection.option_label,
                selected_meal_category: selection.meal_category,
                final_price,
                currency,
                submitted_at,
            },
            Vec::new(),
        ))
    }

    pub fn from_parts(parts: InquiryParts, replies: Vec<InquiryReply>) -> Self {
        Self {
            id: parts.id,
            name: parts.name,
            email: parts.email,
            phone_number: parts.phone_number,
            travel_date: parts.travel_date,
            traveller_count: parts.traveller_count,
            message: parts.message,
            tour_id: parts.tour_id,
            selected_nights_key: parts.selected_nights_key,
            selected_option: parts.selected_option,
            selected_meal_category: parts.selected_meal_category,
            final_price: parts.final_price,
            currency: parts.currency,
            submitted_at: parts.submitted_at,
            replies,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn travel_date(&self) -> NaiveDate {
        self.travel_date
    }

    pub fn traveller_count(&self) -> u32 {
        self.traveller_count
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tour_id(&self) -> Option<Uuid> {
        self.tour_id
    }

    pub fn selection(&self) -> Selection {
        Selection {
            nights_key: self.selected_nights_key.clone(),
            option_label: self.selected_option.clone(),
            meal_category: self.selected_meal_category,
        }
    }

    pub fn final_price(&self) -> Option<Decimal> {
        self.final_price
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn replies(&self) -> &[InquiryReply] {
        &self.replies
    }

    pub fn latest_reply(&self) -> Option<&InquiryReply> {
        self.replies.last()
    }

    /// Append a reply. The captured selection and price are untouched.
    pub fn append_reply(&mut self, reply: InquiryReply) {
        self.replies.push(reply);
    }

    /// Captured price converted back to the base currency for staff.
    pub fn price_in_base(&self, rates: &RateTable) -> Option<Decimal> {
        self.final_price
            .map(|p| round_display(to_base(p, rates, &self.currency), 2))
    }
}

/// Inquiry as listed in the admin panel.
#[derive(Debug, Clone, Serialize)]
pub struct InquiryAdminView {
    #[serde(flatten)]
    pub record: InquiryRecord,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub final_price_base: Option<Decimal>,
    pub base_currency: String,
}

impl InquiryAdminView {
    pub fn new(record: InquiryRecord, rates: &RateTable) -> Self {
        Self {
            final_price_base: record.price_in_base(rates),
            base_currency: rates.base.clone(),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tours::models::{MealPricing, NightBucket, NightCount, NightOption};
    use rust_decimal_macros::dec;

    fn submission() -> NewInquiry {
        NewInquiry {
            name: "Aisha".to_string(),
            email: "aisha@example.com".to_string(),
            phone_number: "+960 777 0000".to_string(),
            travel_date: NaiveDate::from_ymd_opt(2025, 12, 20),
            traveller_count: Some(2),
            message: "Honeymoon".to_string(),
            selected_nights_key: Some("3".to_string()),
            selected_option: Some("Standard".to_string()),
            selected_meal_category: Some(MealCategoryId::HalfBoard),
            currency: Some("EUR".to_string()),
            ..Default::default()
        }
    }

    fn tour() -> TourDefinition {
        let mut tour = TourDefinition {
            base_price: 1000,
            old_base_price: 1000,
            person_count: 2,
            ..Default::default()
        };
        tour.nights = vec![NightBucket {
            nights: NightCount::new(3).unwrap(),
            options: vec![NightOption {
                label: "Standard".to_string(),
                add_price: 100,
                old_add_price: 150,
            }],
        }]
        .into_iter()
        .collect();
        tour.meal_categories
            .set(MealCategoryId::HalfBoard, MealPricing::offered(20, 30));
        tour
    }

    fn rates() -> RateTable {
        RateTable::default().with_rate("EUR", dec!(0.5))
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_validate_inquiry_reports_all_missing_fields() {
        let err = validate_inquiry(&NewInquiry::default()).unwrap_err();
        for field in ["name", "email", "phone_number", "travel_date", "traveller_count"] {
            assert!(err.fields().contains(field), "missing {}", field);
        }
        // message is optional
        assert!(!err.fields().contains("message"));
    }

    #[test]
    fn test_zero_travellers_is_missing() {
        let inquiry = NewInquiry {
            traveller_count: Some(0),
            ..submission()
        };
        let err = validate_inquiry(&inquiry).unwrap_err();
        assert!(err.fields().contains("traveller_count"));
    }

    #[test]
    fn test_capture_freezes_price_in_display_currency() {
        let tour = tour();
        let record = InquiryRecord::capture(submission(), Some(&tour), &rates(), now()).unwrap();

        // 1220 USD at 0.5
        assert_eq!(record.final_price(), Some(dec!(610)));
        assert_eq!(record.currency(), "EUR");
        assert_eq!(record.tour_id(), Some(tour.id));
        assert_eq!(record.selection().option_label.as_deref(), Some("Standard"));
    }

    #[test]
    fn test_capture_drops_picks_that_did_not_price() {
        let inquiry = NewInquiry {
            selected_option: Some("Penthouse".to_string()),
            selected_meal_category: Some(MealCategoryId::AllInclusive),
            ..submission()
        };
        let record = InquiryRecord::capture(inquiry, Some(&tour()), &RateTable::default(), now()).unwrap();

        // 1000 base only: no option resolved, meal not offered.
        assert_eq!(record.final_price(), Some(dec!(1000)));
        let frozen = record.selection();
        assert_eq!(frozen.nights_key.as_deref(), Some("3"));
        assert!(frozen.option_label.is_none());
        assert!(frozen.meal_category.is_none());
    }

    #[test]
    fn test_capture_without_tour_keeps_picks_as_sent() {
        let record = InquiryRecord::capture(submission(), None, &rates(), now()).unwrap();
        assert_eq!(record.selection().option_label.as_deref(), Some("Standard"));
        assert_eq!(record.selection().meal_category, Some(MealCategoryId::HalfBoard));
    }

    #[test]
    fn test_capture_is_not_affected_by_later_tour_changes() {
        let mut tour = tour();
        let record = InquiryRecord::capture(submission(), Some(&tour), &rates(), now()).unwrap();

        tour.base_price = 5000;
        assert_eq!(record.final_price(), Some(dec!(610)));
    }

    #[test]
    fn test_capture_without_rate_keeps_base_currency() {
        let record =
            InquiryRecord::capture(submission(), Some(&tour()), &RateTable::default(), now())
                .unwrap();
        assert_eq!(record.final_price(), Some(dec!(1220)));
        assert_eq!(record.currency(), "USD");
    }

    #[test]
    fn test_capture_without_tour_has_no_price() {
        let record = InquiryRecord::capture(submission(), None, &rates(), now()).unwrap();
        assert!(record.final_price().is_none());
        assert_eq!(record.currency(), "EUR");
    }

    #[test]
    fn test_capture_rejects_invalid_submission() {
        let inquiry = NewInquiry {
            email: String::new(),
            ..submission()
        };
        assert!(InquiryRecord::capture(inquiry, Some(&tour()), &rates(), now()).is_err());
    }

    #[test]
    fn test_replies_append_without_touching_snapshot() {
        let mut record = InquiryRecord::capture(submission(), Some(&tour()), &rates(), now()).unwrap();
        let before = record.selection();

        let first = NewReply {
            subject: "Re: Honeymoon".to_string(),
            message: "Dates confirmed".to_string(),
        };
        let second = NewReply {
            subject: "Re: Honeymoon".to_string(),
            message: "Invoice attached".to_string(),
        };
        record.append_reply(InquiryReply::new(first, now()));
        record.append_reply(InquiryReply::new(second, now()));

        assert_eq!(record.replies().len(), 2);
        assert_eq!(record.latest_reply().unwrap().message, "Invoice attached");
        assert_eq!(record.selection(), before);
        assert_eq!(record.final_price(), Some(dec!(610)));
    }

    #[test]
    fn test_validate_reply() {
        assert!(validate_reply(&NewReply::default()).is_err());
        let ok = NewReply {
            subject: "Hi".to_string(),
            message: "Thanks".to_string(),
        };
        assert!(validate_reply(&ok).is_ok());
    }

    #[test]
    fn test_price_in_base_for_admin() {
        let record = InquiryRecord::capture(submission(), Some(&tour()), &rates(), now()).unwrap();
        assert_eq!(record.price_in_base(&rates()), Some(dec!(1220)));
        // Rates unavailable at review time: shown as captured.
        assert_eq!(record.price_in_base(&RateTable::default()), Some(dec!(610)));

        let view = InquiryAdminView::new(record, &rates());
        let json = serde_json::to_value(&view).unwrap();
        let base: Decimal = json["final_price_base"].as_str().unwrap().parse().unwrap();
        assert_eq!(base, dec!(1220));
        assert_eq!(json["currency"], "EUR");
    }
}
