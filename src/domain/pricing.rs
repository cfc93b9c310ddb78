use crate::config::{PricingConfig, UrgencyMultipliers};
use crate::domain::order::Urgency;
use crate::error::{LifecycleError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount in whole units of the configured currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Creates an amount of `value` whole currency units.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the amount in whole currency units.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// The pricing rule table as exposed for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRules {
    pub base_price_per_page: u64,
    pub urgency_multiplier: UrgencyMultipliers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInfo {
    pub rules: PricingRules,
    pub currency: String,
}

/// Computes order prices from page count and urgency.
///
/// Pure: no clock, no I/O. Prices are `pages * base * multiplier` rounded
/// half-up to a whole currency unit.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    /// Creates a new `PricingEngine` for the given tariff.
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// Prices `pages` pages at `urgency`.
    ///
    /// # Arguments
    ///
    /// * `pages` - Page count, already validated as at least 1.
    /// * `urgency` - Selects the multiplier applied to the base price.
    pub fn price(&self, pages: u32, urgency: Urgency) -> Result<Amount> {
        let multiplier = self.config.urgency_multiplier.get(urgency);
        let out_of_range =
            || LifecycleError::Validation(format!("price for {pages} {urgency} pages is out of range"));
        let raw = Decimal::from(pages)
            .checked_mul(Decimal::from(self.config.base_price_per_page))
            .and_then(|subtotal| subtotal.checked_mul(multiplier))
            .ok_or_else(out_of_range)?;
        raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .map(Amount)
            .ok_or_else(out_of_range)
    }

    pub fn pricing_info(&self) -> PricingInfo {
        PricingInfo {
            rules: PricingRules {
                base_price_per_page: self.config.base_price_per_page,
                urgency_multiplier: self.config.urgency_multiplier.clone(),
            },
            currency: self.config.currency.clone(),
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_per_urgency() {
        let engine = PricingEngine::default();
        assert_eq!(engine.price(10, Urgency::Normal).unwrap(), Amount(500));
        assert_eq!(engine.price(10, Urgency::Urgent).unwrap(), Amount(650));
        assert_eq!(engine.price(10, Urgency::Express).unwrap(), Amount(800));
    }

    #[test]
    fn test_price_rounds_half_up() {
        let engine = PricingEngine::new(PricingConfig {
            base_price_per_page: 5,
            urgency_multiplier: UrgencyMultipliers {
                normal: dec!(1),
                urgent: dec!(1.3),
                express: dec!(1.1),
            },
            currency: "CNY".to_string(),
        });
        // 1 * 5 * 1.3 = 6.5 -> 7
        assert_eq!(engine.price(1, Urgency::Urgent).unwrap(), Amount(7));
        // 1 * 5 * 1.1 = 5.5 -> 6
        assert_eq!(engine.price(1, Urgency::Express).unwrap(), Amount(6));
        // 3 * 5 * 1.3 = 19.5 -> 20
        assert_eq!(engine.price(3, Urgency::Urgent).unwrap(), Amount(20));
    }

    #[test]
    fn test_pricing_info_is_stable() {
        let engine = PricingEngine::default();
        let first = serde_json::to_vec(&engine.pricing_info()).unwrap();
        let second = serde_json::to_vec(&engine.pricing_info()).unwrap();
        assert_eq!(first, second);

        let info = engine.pricing_info();
        assert_eq!(info.rules.base_price_per_page, 50);
        assert_eq!(info.currency, "CNY");
    }

    #[test]
    fn test_pricing_info_shape() {
        let value = serde_json::to_value(PricingEngine::default().pricing_info()).unwrap();
        assert_eq!(value["rules"]["basePricePerPage"], 50);
        assert_eq!(value["rules"]["urgencyMultiplier"]["normal"], 1.0);
        assert_eq!(value["rules"]["urgencyMultiplier"]["urgent"], 1.3);
        assert_eq!(value["rules"]["urgencyMultiplier"]["express"], 1.6);
        assert_eq!(value["currency"], "CNY");
    }
}
