//! Response DTOs for tour API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::PriceQuote;
use super::currency::{format_display, round_display, to_display, RateTable};
use super::models::{Selection, TourDefinition};

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
    /// Grouped label, e.g. `1,234.50`
    pub formatted: String,
}

impl MoneyResponse {
    /// Present a base-currency amount in `currency`.
    pub fn display(amount_base: i64, rates: &RateTable, currency: &str) -> Self {
        let converted = to_display(Decimal::from(amount_base), rates, currency);
        // Without a rate the amount is still in the base currency.
        let currency = if rates.rate(currency).is_some() {
            currency
        } else {
            rates.base.as_str()
        };
        Self {
            amount: round_display(converted, 2),
            currency: currency.to_string(),
            formatted: format_display(amount_base, rates, currency),
        }
    }
}

/// Quote in base and display currency.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub base: PriceQuote,
    pub final_price: MoneyResponse,
    /// Present only when the old price is above the final price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_old_price: Option<MoneyResponse>,
    pub nights_count: u32,
    pub days_count: u32,
}

impl QuoteResponse {
    pub fn new(quote: PriceQuote, rates: &RateTable, currency: &str) -> Self {
        Self {
            base: quote,
            final_price: MoneyResponse::display(quote.final_price, rates, currency),
            final_old_price: quote
                .has_discount()
                .then(|| MoneyResponse::display(quote.final_old_price, rates, currency)),
            nights_count: quote.nights_count,
            days_count: quote.days_count(),
        }
    }
}

/// Listing card for one tour.
#[derive(Debug, Clone, Serialize)]
pub struct TourSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub country: String,
    pub cover_image: Option<String>,
    pub available_meal_plans: usize,
    pub bookable: bool,
    pub quote: QuoteResponse,
}

/// Tour page payload.
#[derive(Debug, Clone, Serialize)]
pub struct TourDetailResponse {
    pub tour: TourDefinition,
    pub selection: Selection,
    pub available_meal_plans: usize,
    pub bookable: bool,
    pub quote: QuoteResponse,
}

/// Outcome of one uploaded image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageUploadResponse {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_display_falls_back_to_base_currency() {
        let money = MoneyResponse::display(1220, &RateTable::default(), "EUR");
        assert_eq!(money.amount, dec!(1220));
        assert_eq!(money.currency, "USD");
        assert_eq!(money.formatted, "1,220");
    }

    #[test]
    fn test_money_display_converts() {
        let rates = RateTable::default().with_rate("EUR", dec!(0.9));
        let money = MoneyResponse::display(1220, &rates, "EUR");
        assert_eq!(money.amount, dec!(1098.00));
        assert_eq!(money.currency, "EUR");
        assert_eq!(money.formatted, "1,098.00");
    }

    #[test]
    fn test_quote_response_hides_old_price_without_discount() {
        let quote = PriceQuote {
            final_price: 1000,
            final_old_price: 900,
            nights_count: 3,
        };
        let response = QuoteResponse::new(quote, &RateTable::default(), "USD");
        assert!(response.final_old_price.is_none());
        assert_eq!(response.days_count, 4);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("final_old_price").is_none());
        assert_eq!(json["final_price"]["amount"], "1000");
    }

    #[test]
    fn test_quote_response_shows_old_price_with_discount() {
        let quote = PriceQuote {
            final_price: 1000,
            final_old_price: 1300,
            nights_count: 2,
        };
        let response = QuoteResponse::new(quote, &RateTable::default(), "USD");
        assert_eq!(response.final_old_price.unwrap().amount, dec!(1300));
    }
}
