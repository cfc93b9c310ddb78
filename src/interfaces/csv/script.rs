use super::command_reader::{Command, CommandType};
use super::report_writer::{OrderRow, PaymentRow};
use crate::application::engine::LifecycleEngine;
use crate::domain::ids::{OrderId, PaymentId};
use crate::domain::order::{NewOrder, OrderPatch, OrderStatus, parse_pages};
use crate::domain::payment::Provider;
use crate::error::{LifecycleError, Result};
use crate::interfaces::webhook::ProviderGateway;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Replays lifecycle commands against a [`LifecycleEngine`].
///
/// Keeps the mapping between script names and the identifiers the engine
/// generates so later lines, and the final report, can refer to them.
pub struct ScriptRunner {
    engine: LifecycleEngine,
    orders: HashMap<String, OrderId>,
    payments: HashMap<String, PaymentId>,
}

impl ScriptRunner {
    pub fn new(engine: LifecycleEngine) -> Self {
        Self {
            engine,
            orders: HashMap::new(),
            payments: HashMap::new(),
        }
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub async fn apply(&mut self, command: Command) -> Result<()> {
        match command.command {
            CommandType::CreateOrder => {
                let label = self.fresh_label(command.label.as_deref(), true)?;
                let pages = command
                    .pages
                    .ok_or_else(|| LifecycleError::Validation("pages is required".to_string()))?;
                let new = NewOrder {
                    title: command.title.unwrap_or_default(),
                    topic: command.topic.unwrap_or_default(),
                    pages: parse_pages(&Value::String(pages))?,
                    urgency: command.urgency,
                    requirements: command.requirements,
                };
                let order = self.engine.create_order(new).await?;
                self.orders.insert(label, order.id);
            }
            CommandType::EditOrder => {
                let id = self.order_id(command.target.as_deref())?;
                let patch = OrderPatch {
                    title: command.title,
                    topic: command.topic,
                    pages: command.pages.map(Value::String),
                    urgency: command.urgency,
                    requirements: command.requirements,
                    status: command.status,
                };
                self.engine.edit_order(id, patch).await?;
            }
            CommandType::Pay => {
                let label = self.fresh_label(command.label.as_deref(), false)?;
                let order_id = self.order_id(command.target.as_deref())?;
                let intent = self
                    .engine
                    .create_payment(order_id, command.provider.as_deref())
                    .await?;
                self.payments.insert(label, intent.payment.id);
            }
            CommandType::Confirm => {
                let id = self.payment_id(command.target.as_deref())?;
                ProviderGateway::new(&self.engine).confirm(id).await?;
            }
            CommandType::Webhook => {
                let id = self.payment_id(command.target.as_deref())?;
                let provider: Provider = command
                    .provider
                    .as_deref()
                    .ok_or_else(|| LifecycleError::Validation("provider is required".to_string()))?
                    .parse()?;
                let body = json!({ "paymentId": id.to_string() });
                ProviderGateway::new(&self.engine)
                    .handle_webhook(provider, &body)
                    .await?;
            }
            CommandType::Transition => {
                let id = self.order_id(command.target.as_deref())?;
                let status: OrderStatus = command
                    .status
                    .as_deref()
                    .ok_or_else(|| LifecycleError::Validation("status is required".to_string()))?
                    .parse()?;
                self.engine.transition_order(id, status).await?;
            }
            CommandType::Submit => {
                let id = self.order_id(command.target.as_deref())?;
                self.engine.submit_order(id, command.delivery_url).await?;
            }
            CommandType::Complete => {
                let id = self.order_id(command.target.as_deref())?;
                self.engine.complete_order(id).await?;
            }
            CommandType::Refund => {
                let id = self.order_id(command.target.as_deref())?;
                self.engine.refund_order(id).await?;
            }
        }
        Ok(())
    }

    /// Final state of every order, in creation order.
    pub async fn order_rows(&self) -> Result<Vec<OrderRow>> {
        let names = invert(&self.orders);
        let orders = self.engine.list_orders().await?;
        Ok(orders
            .into_iter()
            .map(|order| OrderRow {
                order: names
                    .get(&order.id)
                    .cloned()
                    .unwrap_or_else(|| order.id.to_string()),
                title: order.title,
                pages: order.pages,
                urgency: order.urgency,
                amount: order.amount,
                currency: order.currency,
                status: order.status,
                delivery_url: order.delivery_url,
            })
            .collect())
    }

    /// Final state of every payment, in creation order.
    pub async fn payment_rows(&self) -> Result<Vec<PaymentRow>> {
        let order_names = invert(&self.orders);
        let payment_names = invert(&self.payments);
        let payments = self.engine.list_payments().await?;
        Ok(payments
            .into_iter()
            .map(|payment| PaymentRow {
                payment: payment_names
                    .get(&payment.id)
                    .cloned()
                    .unwrap_or_else(|| payment.id.to_string()),
                order: order_names
                    .get(&payment.order_id)
                    .cloned()
                    .unwrap_or_else(|| payment.order_id.to_string()),
                provider: payment.provider,
                amount: payment.amount,
                currency: payment.currency,
                status: payment.status,
            })
            .collect())
    }

    fn fresh_label(&self, label: Option<&str>, order: bool) -> Result<String> {
        let label = label
            .filter(|l| !l.is_empty())
            .ok_or_else(|| LifecycleError::Validation("ref is required".to_string()))?;
        let taken = if order {
            self.orders.contains_key(label)
        } else {
            self.payments.contains_key(label)
        };
        if taken {
            return Err(LifecycleError::Validation(format!("ref {label} is already used")));
        }
        Ok(label.to_string())
    }

    fn order_id(&self, target: Option<&str>) -> Result<OrderId> {
        let target = target.unwrap_or_default();
        self.orders
            .get(target)
            .copied()
            .ok_or_else(|| LifecycleError::Validation(format!("unknown order ref {target:?}")))
    }

    fn payment_id(&self, target: Option<&str>) -> Result<PaymentId> {
        let target = target.unwrap_or_default();
        self.payments
            .get(target)
            .copied()
            .ok_or_else(|| LifecycleError::Validation(format!("unknown payment ref {target:?}")))
    }
}

fn invert<K: Clone, V: Copy + Eq + std::hash::Hash>(map: &HashMap<K, V>) -> HashMap<V, K> {
    map.iter().map(|(k, v)| (*v, k.clone())).collect()
}
