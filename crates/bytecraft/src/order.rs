//! Processing order of schema fields.
//!
//! Fields are processed by ascending [OrderKey]: `First`, then explicit
//! positions in ascending order, then fields without a hint, then `Last`.
//! Equal keys keep declaration order.

use std::cmp::Ordering;

/// Processing-order hint attached to a [crate::field::SchemaEntry].
///
/// Positions are arbitrary numbers, so `At(0.5)` sorts between `At(0.0)` and
/// `At(1.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    First,
    Last,
    At(f64),
}

impl From<f64> for Order {
    fn from(value: f64) -> Self {
        Order::At(value)
    }
}

impl From<i64> for Order {
    fn from(value: i64) -> Self {
        Order::At(value as f64)
    }
}

impl From<i32> for Order {
    fn from(value: i32) -> Self {
        Order::At(value.into())
    }
}

/// Sort key derived from an optional [Order].
///
/// Variants rank in declaration order; positions compare with
/// [f64::total_cmp].
#[derive(Debug, Clone, Copy)]
pub enum OrderKey {
    First,
    At(f64),
    Unspecified,
    Last,
}

impl OrderKey {
    fn rank(&self) -> u8 {
        match self {
            OrderKey::First => 0,
            OrderKey::At(_) => 1,
            OrderKey::Unspecified => 2,
            OrderKey::Last => 3,
        }
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (OrderKey::At(a), OrderKey::At(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OrderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderKey {}

impl From<Option<Order>> for OrderKey {
    fn from(value: Option<Order>) -> Self {
        match value {
            Some(Order::First) => OrderKey::First,
            // -0.0 + 0.0 is 0.0, so both zeros share a key.
            Some(Order::At(n)) => OrderKey::At(n + 0.0),
            None => OrderKey::Unspecified,
            Some(Order::Last) => OrderKey::Last,
        }
    }
}

/// Stable-sorts `items` by the order key `hint` extracts from each.
pub fn resolve<T>(mut items: Vec<T>, hint: impl Fn(&T) -> Option<Order>) -> Vec<T> {
    // sort_by_key is stable: equal keys stay in declaration order.
    items.sort_by_key(|item| OrderKey::from(hint(item)));
    items
}
