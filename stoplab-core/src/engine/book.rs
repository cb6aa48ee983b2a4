//! Stop-order book — registry, lifecycle transitions, and audit trail.
//!
//! The book is the central store for all stop orders. It manages:
//! - Order storage and lookup (pending + resolved)
//! - State transitions (Pending* to exactly one terminal status)
//! - The per-(party, market) active-order cap
//! - Audit trail for every state transition
//!
//! The book does NOT decide when orders trigger or how siblings resolve.
//! That is the job of the trigger evaluator, lifecycle manager, and OCO
//! coordinator. The book tracks state only.

use crate::domain::{
    MarketId, PartyId, StopOrder, StopOrderAuditEntry, StopOrderId, StopOrderStatus,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Maximum active (`Pending`/`PendingOCO`) stop orders per (party, market).
pub const MAX_ACTIVE_PER_MARKET: usize = 4;

/// Errors from stop-order book operations.
#[derive(Debug, Error)]
pub enum StopOrderBookError {
    #[error("stop order {0} not found")]
    NotFound(StopOrderId),

    #[error("stop order {0} is not pending (status: {1})")]
    InvalidState(StopOrderId, StopOrderStatus),
}

/// The stop-order book: stores all stop orders and records their lifecycle.
#[derive(Debug)]
pub struct StopOrderBook {
    /// All pending/resolved stop orders keyed by id.
    orders: HashMap<StopOrderId, StopOrder>,

    /// Ids in submission order; evaluation passes follow this order.
    insertion: Vec<StopOrderId>,

    /// Complete audit trail of every state transition.
    audit_trail: Vec<StopOrderAuditEntry>,

    next_seq: u64,
}

impl StopOrderBook {
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
            insertion: Vec::new(),
            audit_trail: Vec::new(),
            next_seq: 0,
        }
    }

    // ── Public API ─────────────────────────────────────────────────────

    /// Next submission sequence number. The engine stamps it on the order
    /// before insertion.
    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Insert a newly submitted stop order. It must be pending.
    pub fn insert(&mut self, order: StopOrder) {
        debug_assert!(order.is_pending(), "inserted stop order must be pending");
        self.insertion.push(order.id.clone());
        self.orders.insert(order.id.clone(), order);
    }

    pub fn get(&self, id: &StopOrderId) -> Option<&StopOrder> {
        self.orders.get(id)
    }

    pub fn get_mut(&mut self, id: &StopOrderId) -> Option<&mut StopOrder> {
        self.orders.get_mut(id)
    }

    /// Count of active (pending) stop orders for one party in one market.
    pub fn active_count(&self, party: &PartyId, market: &MarketId) -> usize {
        self.orders
            .values()
            .filter(|o| {
                o.is_pending() && o.submission.party == *party && o.submission.market == *market
            })
            .count()
    }

    /// Pending stop orders for a market, in submission order.
    pub fn pending_for_market(&self, market: &MarketId) -> Vec<StopOrderId> {
        self.insertion
            .iter()
            .filter(|id| {
                self.orders
                    .get(id)
                    .is_some_and(|o| o.is_pending() && o.submission.market == *market)
            })
            .cloned()
            .collect()
    }

    /// All stop orders for a party, optionally filtered by market, in
    /// submission order.
    pub fn stop_orders(&self, party: &PartyId, market: Option<&MarketId>) -> Vec<&StopOrder> {
        self.insertion
            .iter()
            .filter_map(|id| self.orders.get(id))
            .filter(|o| {
                o.submission.party == *party
                    && market.map_or(true, |m| o.submission.market == *m)
            })
            .collect()
    }

    /// Apply a terminal transition to a pending stop order.
    ///
    /// Records the audit entry, bumps `updated_at`, and stores the reason.
    /// Returns `InvalidState` if the order already resolved; the existing
    /// status is left untouched (first resolution wins).
    pub fn transition(
        &mut self,
        id: &StopOrderId,
        to: StopOrderStatus,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), StopOrderBookError> {
        let order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| StopOrderBookError::NotFound(id.clone()))?;

        if !order.is_pending() {
            return Err(StopOrderBookError::InvalidState(id.clone(), order.status));
        }
        debug_assert!(to.is_terminal(), "transition target must be terminal");
        debug_assert!(
            order.sibling.is_none() || to == to.as_oco(),
            "OCO-linked orders take OCO-suffixed statuses"
        );

        let from = order.status;
        let reason = reason.into();
        order.status = to;
        order.updated_at = at;
        order.reason = Some(reason.clone());

        self.audit_trail.push(StopOrderAuditEntry {
            order_id: id.clone(),
            at,
            from_status: from,
            to_status: to,
            reason,
        });
        Ok(())
    }

    /// Get the full audit trail.
    pub fn audit_trail(&self) -> &[StopOrderAuditEntry] {
        &self.audit_trail
    }

    /// Whether any stop order for any party is still pending.
    pub fn has_pending(&self) -> bool {
        self.orders.values().any(|o| o.is_pending())
    }

    /// Total number of stop orders ever inserted.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Default for StopOrderBook {
    fn default() -> Self {
        Self::new()
    }
}
