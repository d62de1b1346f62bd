use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::OrderError;
use crate::types::order::{Order, OrderId, OrderUpdate};

// Type alias for shared OrderStore state
pub type SharedOrderStore = Arc<RwLock<OrderStore>>;

/// Process-lifetime order collection. Orders are never removed; `sequence`
/// keeps insertion order for listing while `orders` gives keyed lookup.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: HashMap<OrderId, Order>,
    sequence: Vec<OrderId>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedOrderStore {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn insert(&mut self, order: Order) -> Result<&Order, OrderError> {
        if self.orders.contains_key(&order.order_id) {
            return Err(OrderError::DuplicateOrderId(order.order_id));
        }
        let id = order.order_id.clone();
        self.sequence.push(id.clone());
        Ok(self.orders.entry(id).or_insert(order))
    }

    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// All orders, oldest first.
    pub fn list(&self) -> Vec<Order> {
        self.sequence
            .iter()
            .filter_map(|id| self.orders.get(id))
            .cloned()
            .collect()
    }

    pub fn update(
        &mut self,
        order_id: &str,
        update: OrderUpdate,
        recompute_total: bool,
    ) -> Result<&Order, OrderError> {
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        order.apply(update, recompute_total)?;
        Ok(order)
    }

    /// Soft delete: the order stays in the store with status `cancelled`.
    pub fn cancel(&mut self, order_id: &str) -> Result<&Order, OrderError> {
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        order.cancel();
        Ok(order)
    }
}
