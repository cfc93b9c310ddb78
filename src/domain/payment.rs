use super::ids::{OrderId, PaymentId, next_timestamp};
use super::order::Order;
use super::pricing::Amount;
use crate::error::{LifecycleError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Settlement channel of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Mock,
    Stripe,
    Alipay,
    Wechat,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Stripe => "stripe",
            Self::Alipay => "alipay",
            Self::Wechat => "wechat",
        }
    }

    /// Mock payments are confirmed by the client; every real provider
    /// reports success asynchronously through its webhook.
    pub fn confirms_via_webhook(&self) -> bool {
        !matches!(self, Self::Mock)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "mock" => Ok(Self::Mock),
            "stripe" => Ok(Self::Stripe),
            "alipay" => Ok(Self::Alipay),
            "wechat" => Ok(Self::Wechat),
            other => Err(LifecycleError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// One-way: `pending -> succeeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Succeeded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attempt to settle an order. Amount and currency are copied from the
/// order when the payment is created and never follow later changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub provider: Provider,
    pub amount: Amount,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a pending payment for `order`.
    ///
    /// Amount and currency are copied from the order at this moment and never
    /// follow later changes to it.
    pub fn for_order(order: &Order, provider: Provider) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            order_id: order.id,
            provider,
            amount: order.amount,
            currency: order.currency.clone(),
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the payment as succeeded.
    ///
    /// Returns `AlreadyConfirmed` if it already was, leaving it untouched.
    pub fn succeed(&mut self) -> Result<()> {
        if self.status == PaymentStatus::Succeeded {
            return Err(LifecycleError::AlreadyConfirmed(self.id));
        }
        self.status = PaymentStatus::Succeeded;
        self.updated_at = next_timestamp(self.updated_at);
        Ok(())
    }
}

/// What the client has to do next to settle a freshly created payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    Confirm(PaymentId),
    AwaitWebhook(Provider),
}

impl NextAction {
    pub fn for_payment(payment: &Payment) -> Self {
        if payment.provider.confirms_via_webhook() {
            Self::AwaitWebhook(payment.provider)
        } else {
            Self::Confirm(payment.id)
        }
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirm(id) => write!(f, "POST /api/payments/{id}/confirm"),
            Self::AwaitWebhook(provider) => write!(f, "POST /api/webhooks/{provider}"),
        }
    }
}

impl Serialize for NextAction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A newly created payment together with the hint for settling it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub payment: Payment,
    pub next_action: NextAction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Urgency;

    fn order() -> Order {
        Order::new(
            "T".to_string(),
            "X".to_string(),
            2,
            Urgency::Normal,
            String::new(),
            Amount::new(100),
            "CNY".to_string(),
        )
    }

    #[test]
    fn test_payment_snapshots_order() {
        let order = order();
        let payment = Payment::for_order(&order, Provider::Stripe);
        assert_eq!(payment.order_id, order.id);
        assert_eq!(payment.amount, Amount::new(100));
        assert_eq!(payment.currency, "CNY");
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_succeed_is_one_way() {
        let mut payment = Payment::for_order(&order(), Provider::Mock);
        payment.succeed().unwrap();
        let after_first = payment.clone();
        assert!(matches!(
            payment.succeed(),
            Err(LifecycleError::AlreadyConfirmed(id)) if id == payment.id
        ));
        assert_eq!(payment, after_first);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("wechat".parse::<Provider>().unwrap(), Provider::Wechat);
        assert!(matches!(
            "paypal".parse::<Provider>(),
            Err(LifecycleError::UnsupportedProvider(p)) if p == "paypal"
        ));
    }

    #[test]
    fn test_next_action_hint() {
        let order = order();
        let mock = Payment::for_order(&order, Provider::Mock);
        assert_eq!(
            NextAction::for_payment(&mock).to_string(),
            format!("POST /api/payments/{}/confirm", mock.id)
        );
        let alipay = Payment::for_order(&order, Provider::Alipay);
        assert_eq!(
            NextAction::for_payment(&alipay).to_string(),
            "POST /api/webhooks/alipay"
        );
    }
}
