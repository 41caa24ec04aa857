//! Player resource accounting.
//!
//! Strategies never touch a global stockpile. They credit whatever
//! [`ResourceSink`] the caller injects, which is a [`ResourcePool`] in the
//! simulation and can be a recording stub in tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tile::ResourceKind;

/// Receiver of gathered resources (`creditResource`).
pub trait ResourceSink {
    /// Add `amount` of `kind` to the player's stockpile.
    fn credit(&mut self, kind: ResourceKind, amount: u32);
}

/// Per-player stockpile keyed by resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourcePool {
    stock: BTreeMap<ResourceKind, u64>,
}

impl ResourcePool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount currently held of `kind`.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> u64 {
        self.stock.get(&kind).copied().unwrap_or(0)
    }

    /// Every kind with its amount, zeros included, in display order.
    #[must_use]
    pub fn totals(&self) -> Vec<(ResourceKind, u64)> {
        ResourceKind::ALL.iter().map(|&k| (k, self.get(k))).collect()
    }
}

impl ResourceSink for ResourcePool {
    fn credit(&mut self, kind: ResourceKind, amount: u32) {
        *self.stock.entry(kind).or_default() += u64::from(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_accumulates() {
        let mut pool = ResourcePool::new();
        pool.credit(ResourceKind::Wood, 10);
        pool.credit(ResourceKind::Wood, 10);
        pool.credit(ResourceKind::Rock, 3);

        assert_eq!(pool.get(ResourceKind::Wood), 20);
        assert_eq!(pool.get(ResourceKind::Rock), 3);
        assert_eq!(pool.get(ResourceKind::Meat), 0);
    }

    #[test]
    fn test_totals_in_display_order() {
        let mut pool = ResourcePool::new();
        pool.credit(ResourceKind::Meat, 1);
        assert_eq!(
            pool.totals(),
            vec![
                (ResourceKind::Wood, 0),
                (ResourceKind::Rock, 0),
                (ResourceKind::Meat, 1)
            ]
        );
    }
}
