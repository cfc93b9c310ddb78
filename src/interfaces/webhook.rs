//! Provider-facing adapter.
//!
//! Every provider reports a successful charge in its own body shape and
//! expects its own acknowledgement. This adapter extracts the payment id,
//! funnels it into [`LifecycleEngine::confirm_payment`] and renders the reply.
//! The engine itself never looks at provider payloads.

use crate::application::engine::LifecycleEngine;
use crate::domain::ids::PaymentId;
use crate::domain::payment::Provider;
use crate::error::{LifecycleError, Result};
use serde_json::{Value, json};
use tracing::info;

pub struct ProviderGateway<'a> {
    engine: &'a LifecycleEngine,
}

impl<'a> ProviderGateway<'a> {
    pub fn new(engine: &'a LifecycleEngine) -> Self {
        Self { engine }
    }

    /// Client-side confirmation used by mock payments.
    ///
    /// Unlike webhooks, a repeated confirmation is reported as
    /// `AlreadyConfirmed`.
    pub async fn confirm(&self, payment_id: PaymentId) -> Result<Value> {
        let payment = self.engine.confirm_payment(payment_id).await?;
        Ok(json!({ "message": "Payment confirmed", "payment": payment }))
    }

    /// Handles a provider webhook body and returns the acknowledgement the
    /// provider expects.
    ///
    /// Redeliveries for a payment that already succeeded are acknowledged
    /// again without side effects, otherwise the provider would keep retrying.
    pub async fn handle_webhook(&self, provider: Provider, body: &Value) -> Result<Value> {
        if !provider.confirms_via_webhook() {
            return Err(LifecycleError::Validation(format!(
                "{provider} payments are confirmed directly, not by webhook"
            )));
        }
        let payment_id = extract_payment_id(body)?;
        match self.engine.confirm_payment(payment_id).await {
            Ok(_) => {}
            Err(LifecycleError::AlreadyConfirmed(id)) => {
                info!(payment_id = %id, %provider, "duplicate webhook acknowledged");
            }
            Err(err) => return Err(err),
        }
        Ok(acknowledgement(provider))
    }
}

fn extract_payment_id(body: &Value) -> Result<PaymentId> {
    let raw = body
        .get("paymentId")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| LifecycleError::Validation("paymentId is required".to_string()))?;
    raw.parse()
        .map_err(|_| LifecycleError::Validation(format!("paymentId {raw:?} is malformed")))
}

fn acknowledgement(provider: Provider) -> Value {
    match provider {
        Provider::Stripe => json!({ "received": true }),
        Provider::Alipay => json!({ "status": "success" }),
        Provider::Wechat => json!({ "status": "SUCCESS" }),
        Provider::Mock => json!({ "message": "Payment confirmed" }),
    }
}
