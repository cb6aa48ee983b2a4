//! Stop-order engine — submission, per-tick evaluation passes, and queries.
//!
//! The engine owns the stop-order book and drives one evaluation pass per
//! mark-price tick per market:
//!
//! 1. Snapshot: the tick's mark price is the only price any order in the
//!    pass sees.
//! 2. Decide: every pending order for the market is evaluated against the
//!    snapshot (trailing references ratchet first; trigger takes precedence
//!    over expiry).
//! 3. Apply: decided orders resolve in submission order. Resolving an OCO
//!    leg stops its sibling in the same pass, unless the sibling carries its
//!    own decision (simultaneous resolution keeps both natural statuses).
//!
//! The pass is a synchronous sweep; the engine takes `&mut self`, so no two
//! passes for the same book can interleave.

pub mod book;
pub mod lifecycle;
pub mod oco;
pub mod trigger;

pub use book::{StopOrderBook, StopOrderBookError, MAX_ACTIVE_PER_MARKET};
pub use lifecycle::Resolution;

use crate::domain::{
    ExpiryStrategy, Market, MarketId, PartyId, StopOrder, StopOrderAuditEntry, StopOrderId,
    StopOrderStatus, StopOrderSubmission, Trigger, ValidationError,
};
use crate::ports::{ExecutionVenue, PositionSource};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// One mark-price update for a market: the external event that drives an
/// evaluation pass. The block time doubles as the expiry clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub time: DateTime<Utc>,
    pub mark_price: f64,
}

impl Tick {
    pub fn new(time: DateTime<Utc>, mark_price: f64) -> Self {
        Self { time, mark_price }
    }
}

/// Synchronous submission failures. No `StopOrder` instance exists after any
/// of these.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown market {0}")]
    UnknownMarket(MarketId),

    #[error("limit of {max} active stop orders per market reached for party {party}")]
    LimitExceeded {
        party: PartyId,
        market: MarketId,
        max: usize,
    },

    #[error("OCO legs must target the same market")]
    OcoMarketMismatch,

    #[error("OCO legs must be submitted by the same party")]
    OcoPartyMismatch,
}

// What the decide phase concluded for one pending order.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Decision {
    /// Trigger fired, or expiry reached under `ExpiryStrategy::Submit`.
    Fire,
    /// Expiry reached under `ExpiryStrategy::Cancel`.
    Expire,
}

/// The stop-order engine.
///
/// Collaborators (venue, position service) are passed per call rather than
/// stored, keeping the engine pure state and the active-order sets explicit.
#[derive(Debug)]
pub struct StopOrderEngine {
    markets: HashMap<MarketId, Market>,
    /// Last mark price seen per market; used for immediate-trigger warnings
    /// and trailing reference seeding at submission.
    marks: HashMap<MarketId, f64>,
    book: StopOrderBook,
}

impl StopOrderEngine {
    pub fn new() -> Self {
        Self {
            markets: HashMap::new(),
            marks: HashMap::new(),
            book: StopOrderBook::new(),
        }
    }

    /// Register a market. Submissions for unregistered markets fail.
    pub fn add_market(&mut self, market: Market) {
        self.markets.insert(market.id.clone(), market);
    }

    pub fn market(&self, id: &MarketId) -> Option<&Market> {
        self.markets.get(id)
    }

    /// Last mark price seen for a market, if any tick has arrived.
    pub fn mark_price(&self, market: &MarketId) -> Option<f64> {
        self.marks.get(market).copied()
    }

    // ── Submission ─────────────────────────────────────────────────────

    /// Submit a standalone stop order.
    pub fn submit(
        &mut self,
        submission: StopOrderSubmission,
        now: DateTime<Utc>,
    ) -> Result<StopOrderId, SubmitError> {
        let market = self
            .markets
            .get(&submission.market)
            .ok_or_else(|| SubmitError::UnknownMarket(submission.market.clone()))?;
        submission.validate(market)?;
        self.check_capacity(&submission.party, &submission.market, 1)?;

        let seq = self.book.next_seq();
        let id = StopOrderId::derive(&submission.party, &submission.market, seq);
        let order = self.build_order(submission, seq, id.clone(), None, now);
        self.book.insert(order);
        Ok(id)
    }

    /// Submit an OCO pair. Validation applies per leg; both legs must share
    /// the market and party, and both must fit under the active-order cap.
    pub fn submit_oco(
        &mut self,
        a: StopOrderSubmission,
        b: StopOrderSubmission,
        now: DateTime<Utc>,
    ) -> Result<(StopOrderId, StopOrderId), SubmitError> {
        if a.market != b.market {
            return Err(SubmitError::OcoMarketMismatch);
        }
        if a.party != b.party {
            return Err(SubmitError::OcoPartyMismatch);
        }
        let market = self
            .markets
            .get(&a.market)
            .ok_or_else(|| SubmitError::UnknownMarket(a.market.clone()))?;
        a.validate(market)?;
        b.validate(market)?;
        self.check_capacity(&a.party, &a.market, 2)?;

        let seq_a = self.book.next_seq();
        let seq_b = self.book.next_seq();
        let id_a = StopOrderId::derive(&a.party, &a.market, seq_a);
        let id_b = StopOrderId::derive(&b.party, &b.market, seq_b);

        let order_a = self.build_order(a, seq_a, id_a.clone(), Some(id_b.clone()), now);
        let order_b = self.build_order(b, seq_b, id_b.clone(), Some(id_a.clone()), now);
        self.book.insert(order_a);
        self.book.insert(order_b);
        Ok((id_a, id_b))
    }

    // ── Cancellation ───────────────────────────────────────────────────

    /// Trader-initiated cancel. Only pending orders may be cancelled; an
    /// OCO-linked cancel stops the sibling in the same operation.
    pub fn cancel(
        &mut self,
        id: &StopOrderId,
        now: DateTime<Utc>,
    ) -> Result<(), StopOrderBookError> {
        let order = self
            .book
            .get(id)
            .ok_or_else(|| StopOrderBookError::NotFound(id.clone()))?;
        if !order.is_pending() {
            return Err(StopOrderBookError::InvalidState(id.clone(), order.status));
        }
        let to = order.natural(StopOrderStatus::Cancelled);
        self.book.transition(id, to, "Cancelled by trader", now)?;
        oco::stop_sibling(&mut self.book, id, now);
        Ok(())
    }

    // ── Evaluation pass ────────────────────────────────────────────────

    /// Run one evaluation pass for a market against a new mark-price tick.
    ///
    /// Returns the ids of stop orders that left pending during this pass,
    /// in resolution order (forced `StoppedOCO` siblings included).
    pub fn on_tick(
        &mut self,
        market_id: &MarketId,
        tick: &Tick,
        venue: &mut dyn ExecutionVenue,
        positions: &dyn PositionSource,
    ) -> Vec<StopOrderId> {
        self.marks.insert(market_id.clone(), tick.mark_price);
        let mark = tick.mark_price;

        // Decide: one consistent snapshot for every order in the pass.
        let pending = self.book.pending_for_market(market_id);
        let mut decisions: Vec<(StopOrderId, Decision)> = Vec::new();
        let mut decided: HashSet<StopOrderId> = HashSet::new();
        for id in &pending {
            let order = match self.book.get_mut(id) {
                Some(o) => o,
                None => continue,
            };
            trigger::update_trail_reference(order, mark);

            let decision = if trigger::is_triggered(order, mark) {
                // Trigger takes precedence over expiry in the same pass.
                Some(Decision::Fire)
            } else if order.submission.expiry.map_or(false, |e| tick.time >= e) {
                match order.submission.expiry_strategy {
                    ExpiryStrategy::Submit => Some(Decision::Fire),
                    ExpiryStrategy::Cancel => Some(Decision::Expire),
                }
            } else {
                None
            };

            if let Some(d) = decision {
                decided.insert(id.clone());
                decisions.push((id.clone(), d));
            }
        }

        // Apply: natural resolutions in submission order. Siblings without a
        // decision of their own are stopped in the same pass.
        let mut resolved = Vec::new();
        for (id, decision) in decisions {
            let order = match self.book.get(&id) {
                Some(o) => o,
                None => continue,
            };
            if !order.is_pending() {
                continue;
            }

            let (to, reason, resulting_order_id) = match decision {
                Decision::Fire => match lifecycle::fire(order, venue, positions) {
                    Resolution::Triggered { order_id } => (
                        order.natural(StopOrderStatus::Triggered),
                        "Triggered".to_string(),
                        Some(order_id),
                    ),
                    Resolution::Rejected { reason } => {
                        (order.natural(StopOrderStatus::Rejected), reason, None)
                    }
                },
                Decision::Expire => (
                    order.natural(StopOrderStatus::Expired),
                    "Expired".to_string(),
                    None,
                ),
            };

            if self.book.transition(&id, to, reason, tick.time).is_ok() {
                if let Some(order_id) = resulting_order_id {
                    if let Some(o) = self.book.get_mut(&id) {
                        o.resulting_order_id = Some(order_id);
                    }
                }
                resolved.push(id.clone());
                if let Some(stopped) = self.stop_undecided_sibling(&id, &decided, tick.time) {
                    resolved.push(stopped);
                }
            }
        }
        resolved
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn get(&self, id: &StopOrderId) -> Option<&StopOrder> {
        self.book.get(id)
    }

    /// Read-only snapshot of a party's stop orders, optionally scoped to one
    /// market, in submission order.
    pub fn stop_orders(&self, party: &PartyId, market: Option<&MarketId>) -> Vec<&StopOrder> {
        self.book.stop_orders(party, market)
    }

    pub fn active_count(&self, party: &PartyId, market: &MarketId) -> usize {
        self.book.active_count(party, market)
    }

    pub fn audit_trail(&self) -> &[StopOrderAuditEntry] {
        self.book.audit_trail()
    }

    pub fn has_pending(&self) -> bool {
        self.book.has_pending()
    }

    // ── Internal helpers ───────────────────────────────────────────────

    fn check_capacity(
        &self,
        party: &PartyId,
        market: &MarketId,
        legs: usize,
    ) -> Result<(), SubmitError> {
        let active = self.book.active_count(party, market);
        if active + legs > MAX_ACTIVE_PER_MARKET {
            return Err(SubmitError::LimitExceeded {
                party: party.clone(),
                market: market.clone(),
                max: MAX_ACTIVE_PER_MARKET,
            });
        }
        Ok(())
    }

    fn build_order(
        &self,
        submission: StopOrderSubmission,
        seq: u64,
        id: StopOrderId,
        sibling: Option<StopOrderId>,
        now: DateTime<Utc>,
    ) -> StopOrder {
        let mark = self.marks.get(&submission.market).copied();
        let immediate_trigger =
            mark.map_or(false, |m| trigger::triggers_immediately(&submission.trigger, m));
        let trail_reference = match (&submission.trigger, mark) {
            (Trigger::TrailingPercent { .. }, Some(m)) => Some(m),
            _ => None,
        };
        let status = if sibling.is_some() {
            StopOrderStatus::PendingOco
        } else {
            StopOrderStatus::Pending
        };

        StopOrder {
            id,
            submission,
            status,
            reason: None,
            created_at: now,
            updated_at: now,
            resulting_order_id: None,
            sibling,
            immediate_trigger,
            trail_reference,
            seq,
        }
    }

    /// Stop the sibling of a just-resolved leg, unless the sibling resolved
    /// (or will resolve) on its own in this pass. Returns the stopped id.
    fn stop_undecided_sibling(
        &mut self,
        id: &StopOrderId,
        decided: &HashSet<StopOrderId>,
        at: DateTime<Utc>,
    ) -> Option<StopOrderId> {
        let sibling = self.book.get(id).and_then(|o| o.sibling.clone())?;
        if decided.contains(&sibling) {
            return None;
        }
        let was_pending = self.book.get(&sibling).map_or(false, |s| s.is_pending());
        oco::stop_sibling(&mut self.book, id, at);
        if was_pending {
            Some(sibling)
        } else {
            None
        }
    }
}

impl Default for StopOrderEngine {
    fn default() -> Self {
        Self::new()
    }
}
