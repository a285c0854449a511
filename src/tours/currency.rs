//! Display-currency conversion.
//!
//! Amounts are converted for presentation only; comparisons always use the
//! base-currency integers. Rate tables come from outside (see `crate::rates`)
//! and a missing rate means "show the base amount unchanged".

use rust_decimal::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

use super::models::BASE_CURRENCY;

/// Multipliers from the base currency to other currency codes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, Decimal>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::empty(BASE_CURRENCY)
    }
}

impl RateTable {
    pub fn empty(base: &str) -> Self {
        Self {
            base: base.to_string(),
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: &str, rate: Decimal) -> Self {
        self.rates.insert(currency.to_string(), rate);
        self
    }

    /// Usable multiplier for `currency`. Zero rates are treated as missing.
    pub fn rate(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied().filter(|r| !r.is_zero())
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Convert a base amount into `target`. Identity when the rate is missing.
pub fn to_display(amount: Decimal, rates: &RateTable, target: &str) -> Decimal {
    match rates.rate(target) {
        Some(rate) => amount
            .checked_mul(rate)
            .unwrap_or_else(|| saturated(amount.is_sign_negative())),
        None => amount,
    }
}

/// Convert an amount in `source` back to the base currency.
/// Identity when `source` is the base currency or the rate is missing.
pub fn to_base(amount: Decimal, rates: &RateTable, source: &str) -> Decimal {
    if source == rates.base {
        return amount;
    }
    match rates.rate(source) {
        Some(rate) => amount
            .checked_div(rate)
            .unwrap_or_else(|| saturated(amount.is_sign_negative())),
        None => amount,
    }
}

/// Bound hit by a conversion that left the `Decimal` range. Rates are positive.
fn saturated(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Round half away from zero, as price labels are shown.
pub fn round_display(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Price label for a base amount in `currency`.
///
/// With a rate: two decimals and thousands separators (`1,234.50`).
/// Without: the base amount as a grouped integer (`1,220`).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use holidaylife_web::tours::{format_display, RateTable};
///
/// let rates = RateTable::default().with_rate("EUR", dec!(0.5));
/// assert_eq!(format_display(1220, &rates, "EUR"), "610.00");
/// assert_eq!(format_display(1220, &rates, "GBP"), "1,220");
/// ```
pub fn format_display(amount_base: i64, rates: &RateTable, currency: &str) -> String {
    match rates.rate(currency) {
        Some(_) => {
            let converted = round_display(to_display(Decimal::from(amount_base), rates, currency), 2);
            group_thousands(&format!("{:.2}", converted))
        }
        None => group_thousands(&amount_base.to_string()),
    }
}

/// Insert `,` every three digits of the integer part.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rates() -> RateTable {
        RateTable::default()
            .with_rate("EUR", dec!(0.92))
            .with_rate("MVR", dec!(15.42))
            .with_rate("XXX", dec!(0))
    }

    // ==================== to_display tests ====================

    #[test]
    fn test_to_display_missing_rate_is_identity() {
        assert_eq!(to_display(dec!(100), &RateTable::default(), "EUR"), dec!(100));
    }

    #[test]
    fn test_to_display_multiplies() {
        assert_eq!(to_display(dec!(100), &rates(), "EUR"), dec!(92.00));
        assert_eq!(to_display(dec!(1220), &rates(), "MVR"), dec!(18812.40));
    }

    // ==================== to_base tests ====================

    #[test]
    fn test_to_base_divides() {
        assert_eq!(to_base(dec!(92), &rates(), "EUR"), dec!(100));
    }

    #[test]
    fn test_to_base_identity_cases() {
        assert_eq!(to_base(dec!(92), &rates(), "USD"), dec!(92));
        assert_eq!(to_base(dec!(92), &rates(), "JPY"), dec!(92));
        // Zero rate must not divide.
        assert_eq!(to_base(dec!(92), &rates(), "XXX"), dec!(92));
    }

    #[test]
    fn test_to_base_identity_for_base_even_with_rate() {
        let rates = RateTable::default().with_rate("USD", dec!(1.5));
        assert_eq!(to_base(dec!(30), &rates, "USD"), dec!(30));
    }

    // ==================== formatting tests ====================

    #[test]
    fn test_round_display_half_away_from_zero() {
        assert_eq!(round_display(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round_display(dec!(-2.345), 2), dec!(-2.35));
        assert_eq!(round_display(dec!(2.344), 2), dec!(2.34));
    }

    #[test]
    fn test_format_display_with_rate() {
        assert_eq!(format_display(1220, &rates(), "MVR"), "18,812.40");
        assert_eq!(format_display(1, &rates(), "EUR"), "0.92");
    }

    #[test]
    fn test_format_display_without_rate() {
        assert_eq!(format_display(1234567, &RateTable::default(), "EUR"), "1,234,567");
        assert_eq!(format_display(999, &RateTable::default(), "EUR"), "999");
        assert_eq!(format_display(-1500, &RateTable::default(), "EUR"), "-1,500");
    }

    #[test]
    fn test_conversions_saturate_instead_of_panicking() {
        let rates = RateTable::default()
            .with_rate("BIG", Decimal::MAX)
            .with_rate("TINY", dec!(0.0000000000000000000000000001));

        assert_eq!(to_display(Decimal::from(i64::MAX), &rates, "BIG"), Decimal::MAX);
        assert_eq!(to_display(Decimal::from(i64::MIN), &rates, "BIG"), Decimal::MIN);
        assert_eq!(to_base(Decimal::from(i64::MAX), &rates, "TINY"), Decimal::MAX);
        assert!(!format_display(i64::MAX, &rates, "BIG").is_empty());
    }

    #[test]
    fn test_format_extreme_base_amounts() {
        let rates = RateTable::default();
        assert_eq!(format_display(i64::MAX, &rates, "USD"), "9,223,372,036,854,775,807");
        assert_eq!(format_display(i64::MIN, &rates, "USD"), "-9,223,372,036,854,775,808");
    }
}
