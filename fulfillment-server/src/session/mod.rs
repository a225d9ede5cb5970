//! Session order store
//!
//! In-progress orders live only in memory, keyed by the conversation
//! session id. Every store operation is atomic, but nothing versions an
//! order across calls: two request sequences on one session interleave and
//! the last writer wins.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;

/// One line of an in-progress order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    /// Spelling used when the item was first added
    pub name: String,
    pub quantity: u32,
}

/// Food item name → quantity, insertion ordered, names compared ignoring case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InProgressOrder {
    items: Vec<OrderItem>,
}

impl InProgressOrder {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.items
            .iter()
            .position(|item| item.name.eq_ignore_ascii_case(name))
    }

    /// Insert or overwrite the quantity of an item
    pub fn set(&mut self, name: &str, quantity: u32) {
        match self.position(name) {
            Some(idx) => self.items[idx].quantity = quantity,
            None => self.items.push(OrderItem {
                name: name.trim().to_string(),
                quantity,
            }),
        }
    }

    /// Apply every entry of `other`; later quantities overwrite earlier ones
    pub fn merge(&mut self, other: InProgressOrder) {
        for item in other.items {
            self.set(&item.name, item.quantity);
        }
    }

    /// Remove an item, returning it if present
    pub fn remove(&mut self, name: &str) -> Option<OrderItem> {
        self.position(name).map(|idx| self.items.remove(idx))
    }

    pub fn quantity(&self, name: &str) -> Option<u32> {
        self.position(name).map(|idx| self.items[idx].quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter()
    }

    /// `"2 Pizza, 1 Samosa"`
    pub fn summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} {}", item.quantity, item.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for InProgressOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl<S: AsRef<str>> FromIterator<(S, u32)> for InProgressOrder {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut order = InProgressOrder::new();
        for (name, quantity) in iter {
            order.set(name.as_ref(), quantity);
        }
        order
    }
}

/// Partition produced by [`SessionStore::remove_items`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Requested names that were in the order (stored spelling)
    pub removed: Vec<String>,
    /// Requested names that were not in the order (as requested)
    pub missing: Vec<String>,
    /// What is left; `None` when the order became empty and was deleted
    pub remaining: Option<InProgressOrder>,
}

/// Session id → in-progress order
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Option<InProgressOrder>;

    async fn put(&self, session_id: &str, order: InProgressOrder);

    /// Remove a session, returning whether it existed
    async fn delete(&self, session_id: &str) -> bool;

    /// Merge items into the session order, creating it if absent
    async fn merge(&self, session_id: &str, items: InProgressOrder) -> InProgressOrder;

    /// Remove named items; `None` when the session has no order
    async fn remove_items(&self, session_id: &str, names: &[String]) -> Option<Removal>;

    /// Remove and return the session order
    async fn take(&self, session_id: &str) -> Option<InProgressOrder>;

    async fn len(&self) -> usize;
}

/// Process-local store behind one mutex
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    orders: Mutex<HashMap<String, InProgressOrder>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<InProgressOrder> {
        self.orders.lock().get(session_id).cloned()
    }

    async fn put(&self, session_id: &str, order: InProgressOrder) {
        self.orders.lock().insert(session_id.to_string(), order);
    }

    async fn delete(&self, session_id: &str) -> bool {
        self.orders.lock().remove(session_id).is_some()
    }

    async fn merge(&self, session_id: &str, items: InProgressOrder) -> InProgressOrder {
        let mut orders = self.orders.lock();
        let order = orders.entry(session_id.to_string()).or_default();
        order.merge(items);
        order.clone()
    }

    async fn remove_items(&self, session_id: &str, names: &[String]) -> Option<Removal> {
        let mut orders = self.orders.lock();
        let order = orders.get_mut(session_id)?;

        let mut removed = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            match order.remove(name) {
                Some(item) => removed.push(item.name),
                None => missing.push(name.clone()),
            }
        }

        let remaining = if order.is_empty() {
            orders.remove(session_id);
            None
        } else {
            Some(order.clone())
        };

        Some(Removal {
            removed,
            missing,
            remaining,
        })
    }

    async fn take(&self, session_id: &str) -> Option<InProgressOrder> {
        self.orders.lock().remove(session_id)
    }

    async fn len(&self) -> usize {
        self.orders.lock().len()
    }
}
