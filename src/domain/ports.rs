use super::ids::{OrderId, PaymentId};
use super::order::Order;
use super::payment::Payment;
use crate::error::Result;
use async_trait::async_trait;

/// Keyed storage for orders. `store` inserts or replaces.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;
    /// All orders in creation order.
    async fn get_all(&self) -> Result<Vec<Order>>;
}

/// Keyed storage for payments. `store` inserts or replaces.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: PaymentId) -> Result<Option<Payment>>;
    /// All payments in creation order.
    async fn get_all(&self) -> Result<Vec<Payment>>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;

pub type OrderStoreFactory = Box<dyn Fn() -> OrderStoreBox + Send + Sync>;
pub type PaymentStoreFactory = Box<dyn Fn() -> PaymentStoreBox + Send + Sync>;
