use super::ids::{OrderId, next_timestamp};
use super::pricing::Amount;
use crate::config::UrgencyPolicy;
use crate::error::{LifecycleError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
    Express,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Urgent => "urgent",
            Self::Express => "express",
        }
    }

    /// Resolves a raw urgency value. Absent means `normal`; an unknown value
    /// is either coerced to `normal` or rejected depending on `policy`.
    pub fn resolve(raw: Option<&str>, policy: UrgencyPolicy) -> Result<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::Normal);
        };
        match (raw.parse::<Self>(), policy) {
            (Ok(urgency), _) => Ok(urgency),
            (Err(_), UrgencyPolicy::Lenient) => {
                tracing::warn!(urgency = raw, "unknown urgency, pricing as normal");
                Ok(Self::Normal)
            }
            (Err(err), UrgencyPolicy::Strict) => Err(err),
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(Self::Normal),
            "urgent" => Ok(Self::Urgent),
            "express" => Ok(Self::Express),
            other => Err(LifecycleError::InvalidUrgency(other.to_string())),
        }
    }
}

/// Lifecycle of an order.
///
/// ```text
/// pending_payment -> paid -> submitted -> completed
///                     |          |
///                     +----------+-----> refunded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    PendingPayment,
    Paid,
    Submitted,
    Completed,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::PendingPayment,
        Self::Paid,
        Self::Submitted,
        Self::Completed,
        Self::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::Paid => "paid",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Refunded => "refunded",
        }
    }

    /// Statuses reachable in one step from `self`.
    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        match self {
            Self::PendingPayment => &[Self::Paid],
            Self::Paid => &[Self::Submitted, Self::Refunded],
            Self::Submitted => &[Self::Completed, Self::Refunded],
            Self::Completed | Self::Refunded => &[],
        }
    }

    /// Whether `next` is a legal single step from `self`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| LifecycleError::InvalidStatus(s.to_string()))
    }
}

/// Validates a page count supplied as JSON: a positive integer, or a string
/// holding one.
pub fn parse_pages(value: &Value) -> Result<u32> {
    let pages = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match pages.and_then(|p| u32::try_from(p).ok()) {
        Some(p) if p >= 1 => Ok(p),
        _ => Err(LifecycleError::InvalidPages(value.to_string())),
    }
}

/// Input for creating an order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub title: String,
    pub topic: String,
    pub pages: u32,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
}

impl NewOrder {
    /// Creates a request with the required fields; urgency and requirements
    /// default to absent.
    pub fn new(title: impl Into<String>, topic: impl Into<String>, pages: u32) -> Self {
        Self {
            title: title.into(),
            topic: topic.into(),
            pages,
            ..Default::default()
        }
    }

    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }

    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements = Some(requirements.into());
        self
    }
}

/// A partial edit of an order. Absent fields are left untouched.
///
/// `pages`, `urgency` and `status` arrive unvalidated and are checked by the
/// engine before anything is written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub title: Option<String>,
    pub topic: Option<String>,
    pub pages: Option<Value>,
    pub urgency: Option<String>,
    pub requirements: Option<String>,
    pub status: Option<String>,
}

impl OrderPatch {
    /// True when the patch touches any attribute that is frozen after payment.
    pub fn edits_attributes(&self) -> bool {
        self.title.is_some()
            || self.topic.is_some()
            || self.pages.is_some()
            || self.urgency.is_some()
            || self.requirements.is_some()
    }
}

/// An order for a piece of written work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub title: String,
    pub topic: String,
    pub pages: u32,
    pub urgency: Urgency,
    pub requirements: String,
    pub amount: Amount,
    pub currency: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates an order in `pending_payment` with a fresh id.
    pub fn new(
        title: String,
        topic: String,
        pages: u32,
        urgency: Urgency,
        requirements: String,
        amount: Amount,
        currency: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            title,
            topic,
            pages,
            urgency,
            requirements,
            amount,
            currency,
            status: OrderStatus::PendingPayment,
            delivery_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attributes can only change while the order is awaiting payment.
    pub fn is_editable(&self) -> bool {
        self.status == OrderStatus::PendingPayment
    }

    pub fn touch(&mut self) {
        self.updated_at = next_timestamp(self.updated_at);
    }

    /// Moves to `next` if the transition table allows it.
    pub fn transition(&mut self, next: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(LifecycleError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    /// `paid -> submitted`, recording where the work was delivered.
    pub fn submit(&mut self, delivery_url: String) -> Result<()> {
        self.transition(OrderStatus::Submitted)?;
        self.delivery_url = Some(delivery_url);
        Ok(())
    }

    /// Forces the order to `paid` after a successful payment, bypassing the
    /// transition table. Returns the status it replaced.
    pub fn mark_paid(&mut self) -> OrderStatus {
        let previous = self.status;
        self.status = OrderStatus::Paid;
        self.touch();
        previous
    }
}
