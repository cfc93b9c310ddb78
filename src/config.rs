//! Engine configuration.
//!
//! Defaults reproduce the production tariff: 50 per page, CNY, with
//! multipliers of 1.0 / 1.3 / 1.6 for normal / urgent / express work.

use crate::domain::order::Urgency;
use crate::error::{LifecycleError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Price multiplier applied per urgency level. Serialised as JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyMultipliers {
    #[serde(with = "rust_decimal::serde::float")]
    pub normal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub urgent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub express: Decimal,
}

impl UrgencyMultipliers {
    pub fn get(&self, urgency: Urgency) -> Decimal {
        match urgency {
            Urgency::Normal => self.normal,
            Urgency::Urgent => self.urgent,
            Urgency::Express => self.express,
        }
    }
}

impl Default for UrgencyMultipliers {
    fn default() -> Self {
        Self {
            normal: dec!(1),
            urgent: dec!(1.3),
            express: dec!(1.6),
        }
    }
}

/// The tariff in force for newly created orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingConfig {
    pub base_price_per_page: u64,
    pub urgency_multiplier: UrgencyMultipliers,
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_price_per_page: 50,
            urgency_multiplier: UrgencyMultipliers::default(),
            currency: "CNY".to_string(),
        }
    }
}

impl PricingConfig {
    /// Loads a tariff from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_price_per_page == 0 {
            return Err(LifecycleError::Validation(
                "basePricePerPage must be positive".to_string(),
            ));
        }
        let m = &self.urgency_multiplier;
        if [m.normal, m.urgent, m.express]
            .iter()
            .any(|value| value.is_sign_negative())
        {
            return Err(LifecycleError::Validation(
                "urgency multipliers must not be negative".to_string(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "currency must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// How an urgency value outside {normal, urgent, express} is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrgencyPolicy {
    /// Price it as `normal`.
    #[default]
    Lenient,
    /// Reject it with [`LifecycleError::InvalidUrgency`].
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub pricing: PricingConfig,
    pub urgency_policy: UrgencyPolicy,
    /// Recompute `amount` when an edit changes pages or urgency.
    /// Off by default: the amount quoted at creation stays frozen.
    pub reprice_on_edit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pricing() {
        let config = PricingConfig::default();
        assert_eq!(config.base_price_per_page, 50);
        assert_eq!(config.currency, "CNY");
        assert_eq!(config.urgency_multiplier.get(Urgency::Urgent), dec!(1.3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PricingConfig::from_json_str(r#"{"basePricePerPage": 80}"#).unwrap();
        assert_eq!(config.base_price_per_page, 80);
        assert_eq!(config.currency, "CNY");
        assert_eq!(config.urgency_multiplier, UrgencyMultipliers::default());
    }

    #[test]
    fn test_json_multipliers_accept_numbers() {
        let json = r#"{"urgencyMultiplier": {"normal": 1, "urgent": 1.5, "express": 2}, "currency": "USD"}"#;
        let config = PricingConfig::from_json_str(json).unwrap();
        assert_eq!(config.urgency_multiplier.get(Urgency::Urgent), dec!(1.5));
        assert_eq!(config.currency, "USD");
    }

    #[test]
    fn test_invalid_pricing_rejected() {
        assert!(matches!(
            PricingConfig::from_json_str(r#"{"basePricePerPage": 0}"#),
            Err(LifecycleError::Validation(_))
        ));
        assert!(matches!(
            PricingConfig::from_json_str(r#"{"currency": " "}"#),
            Err(LifecycleError::Validation(_))
        ));
        assert!(matches!(
            PricingConfig::from_json_str("not json"),
            Err(LifecycleError::Json(_))
        ));
    }
}
