use crate::config::{EngineConfig, UrgencyPolicy};
use crate::domain::ids::{OrderId, PaymentId};
use crate::domain::order::{NewOrder, Order, OrderPatch, OrderStatus, Urgency, parse_pages};
use crate::domain::payment::{NextAction, Payment, PaymentIntent, Provider};
use crate::domain::ports::{OrderStoreBox, PaymentStoreBox};
use crate::domain::pricing::{PricingEngine, PricingInfo};
use crate::error::{LifecycleError, Result};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Coordinates the order and payment lifecycles.
///
/// `LifecycleEngine` owns both stores and is the only component that writes
/// to them. Mutations hold the gate exclusively for their whole
/// read-modify-write sequence and the public readers share it, so a reader
/// never sees a payment marked `succeeded` while its order is still waiting
/// for payment.
pub struct LifecycleEngine {
    orders: OrderStoreBox,
    payments: PaymentStoreBox,
    pricing: PricingEngine,
    urgency_policy: UrgencyPolicy,
    reprice_on_edit: bool,
    gate: RwLock<()>,
}

impl LifecycleEngine {
    /// Creates an engine with the default tariff and policies.
    pub fn new(orders: OrderStoreBox, payments: PaymentStoreBox) -> Self {
        Self::with_config(orders, payments, EngineConfig::default())
    }

    /// Creates an engine backed by the given stores.
    ///
    /// # Arguments
    ///
    /// * `orders` - Store holding order records.
    /// * `payments` - Store holding payment records.
    /// * `config` - Tariff and edit/urgency policies.
    pub fn with_config(orders: OrderStoreBox, payments: PaymentStoreBox, config: EngineConfig) -> Self {
        Self {
            orders,
            payments,
            pricing: PricingEngine::new(config.pricing),
            urgency_policy: config.urgency_policy,
            reprice_on_edit: config.reprice_on_edit,
            gate: RwLock::new(()),
        }
    }

    /// Returns the tariff new orders are priced with.
    pub fn pricing_info(&self) -> PricingInfo {
        self.pricing.pricing_info()
    }

    /// Creates an order in `pending_payment`, priced with the current tariff.
    pub async fn create_order(&self, new: NewOrder) -> Result<Order> {
        require_text("title", &new.title)?;
        require_text("topic", &new.topic)?;
        if new.pages == 0 {
            return Err(LifecycleError::InvalidPages(new.pages.to_string()));
        }
        let urgency = Urgency::resolve(new.urgency.as_deref(), self.urgency_policy)?;
        let amount = self.pricing.price(new.pages, urgency)?;
        let _gate = self.gate.write().await;

        let order = Order::new(
            new.title,
            new.topic,
            new.pages,
            urgency,
            new.requirements.unwrap_or_default(),
            amount,
            self.pricing.currency().to_string(),
        );
        self.orders.store(order.clone()).await?;

        info!(order_id = %order.id, pages = order.pages, %urgency, %amount, "order created");
        Ok(order)
    }

    /// Fetches a single order.
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        let _gate = self.gate.read().await;
        self.fetch_order(id).await
    }

    /// Returns every order in creation order.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let _gate = self.gate.read().await;
        self.orders.get_all().await
    }

    /// Applies a partial edit.
    ///
    /// Every field is validated before anything is written, so a failed edit
    /// leaves the order exactly as it was.
    pub async fn edit_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order> {
        let _gate = self.gate.write().await;
        let mut order = self.fetch_order(id).await?;

        let target = patch
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()?;
        if patch.edits_attributes() && !order.is_editable() {
            return Err(LifecycleError::NotEditable {
                id,
                status: order.status,
            });
        }
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        if let Some(topic) = &patch.topic {
            require_text("topic", topic)?;
        }
        let pages = patch.pages.as_ref().map(parse_pages).transpose()?;
        // A blank urgency never resets the order to normal.
        let urgency = match patch.urgency.as_deref() {
            None => None,
            Some(raw) if raw.trim().is_empty() => match self.urgency_policy {
                UrgencyPolicy::Strict => return Err(LifecycleError::InvalidUrgency(raw.to_string())),
                UrgencyPolicy::Lenient => None,
            },
            Some(raw) => Some(Urgency::resolve(Some(raw), self.urgency_policy)?),
        };
        if let Some(target) = target
            && !order.status.can_transition_to(target)
        {
            return Err(LifecycleError::IllegalTransition {
                from: order.status,
                to: target,
            });
        }
        let repriced = if self.reprice_on_edit && (pages.is_some() || urgency.is_some()) {
            Some(self.pricing.price(
                pages.unwrap_or(order.pages),
                urgency.unwrap_or(order.urgency),
            )?)
        } else {
            None
        };

        if let Some(title) = patch.title {
            order.title = title;
        }
        if let Some(topic) = patch.topic {
            order.topic = topic;
        }
        if let Some(requirements) = patch.requirements {
            order.requirements = requirements;
        }
        if let Some(pages) = pages {
            order.pages = pages;
        }
        if let Some(urgency) = urgency {
            order.urgency = urgency;
        }
        if let Some(amount) = repriced {
            order.amount = amount;
        }
        match target {
            Some(target) => order.transition(target)?,
            None => order.touch(),
        }
        self.orders.store(order.clone()).await?;

        debug!(order_id = %id, status = %order.status, "order edited");
        Ok(order)
    }

    /// Moves an order to `target` if the transition table allows it.
    /// Never touches payments.
    pub async fn transition_order(&self, id: OrderId, target: OrderStatus) -> Result<Order> {
        let _gate = self.gate.write().await;
        let mut order = self.fetch_order(id).await?;
        let from = order.status;
        order.transition(target)?;
        self.orders.store(order.clone()).await?;

        info!(order_id = %id, %from, to = %target, "order transitioned");
        Ok(order)
    }

    /// `paid -> submitted`, storing the delivery URL (empty when absent).
    pub async fn submit_order(&self, id: OrderId, delivery_url: Option<String>) -> Result<Order> {
        let _gate = self.gate.write().await;
        let mut order = self.fetch_order(id).await?;
        order.submit(delivery_url.unwrap_or_default())?;
        self.orders.store(order.clone()).await?;

        info!(order_id = %id, "order submitted");
        Ok(order)
    }

    /// `submitted -> completed`.
    pub async fn complete_order(&self, id: OrderId) -> Result<Order> {
        self.transition_order(id, OrderStatus::Completed).await
    }

    /// `paid | submitted -> refunded`.
    pub async fn refund_order(&self, id: OrderId) -> Result<Order> {
        self.transition_order(id, OrderStatus::Refunded).await
    }

    /// Opens a payment for an order awaiting payment. `provider` defaults to
    /// `mock`.
    pub async fn create_payment(&self, order_id: OrderId, provider: Option<&str>) -> Result<PaymentIntent> {
        let _gate = self.gate.write().await;
        let order = self.fetch_order(order_id).await?;
        if order.status != OrderStatus::PendingPayment {
            return Err(LifecycleError::OrderNotPayable {
                id: order_id,
                status: order.status,
            });
        }
        let provider = provider
            .map(str::parse::<Provider>)
            .transpose()?
            .unwrap_or_default();

        let payment = Payment::for_order(&order, provider);
        self.payments.store(payment.clone()).await?;

        info!(payment_id = %payment.id, %order_id, %provider, amount = %payment.amount, "payment created");
        Ok(PaymentIntent {
            next_action: NextAction::for_payment(&payment),
            payment,
        })
    }

    /// Fetches a single payment.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        let _gate = self.gate.read().await;
        self.fetch_payment(id).await
    }

    /// Returns every payment in creation order.
    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        let _gate = self.gate.read().await;
        self.payments.get_all().await
    }

    /// Marks a payment as succeeded and moves its order to `paid`.
    ///
    /// Both writes happen while the gate is held exclusively, so readers
    /// observe either the state before or after the cascade. If the order
    /// write fails the payment is restored and neither record changes.
    /// A payment that already succeeded yields `AlreadyConfirmed` and nothing
    /// is written.
    pub async fn confirm_payment(&self, id: PaymentId) -> Result<Payment> {
        let _gate = self.gate.write().await;
        let original = self.fetch_payment(id).await?;
        let mut payment = original.clone();
        payment.succeed()?;

        let mut order = self.fetch_order(payment.order_id).await?;
        let previous = order.mark_paid();
        if previous != OrderStatus::PendingPayment {
            warn!(order_id = %order.id, payment_id = %id, %previous, "payment succeeded for an order that was not awaiting payment");
        }

        self.payments.store(payment.clone()).await?;
        if let Err(err) = self.orders.store(order).await {
            if let Err(rollback) = self.payments.store(original).await {
                error!(payment_id = %id, error = %rollback, "failed to restore payment after order write failure");
            }
            return Err(err);
        }

        info!(payment_id = %id, order_id = %payment.order_id, "payment confirmed");
        Ok(payment)
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or(LifecycleError::OrderNotFound(id))
    }

    async fn fetch_payment(&self, id: PaymentId) -> Result<Payment> {
        self.payments
            .get(id)
            .await?
            .ok_or(LifecycleError::PaymentNotFound(id))
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LifecycleError::Validation(format!("{field} is required")));
    }
    Ok(())
}
