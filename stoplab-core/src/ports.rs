//! Collaborator seams. The engine consumes these; it implements none of them.
//!
//! The order book / trading engine, the position service, and the mark price
//! feed all live outside this crate. Ticks arrive as plain values
//! ([`crate::engine::Tick`]); the venue and position service are traits so
//! test harnesses can script them.

use crate::domain::{MarketId, OrderId, OrderKind, PartyId, Position, Side, TimeInForce};
use thiserror::Error;

/// An order synthesized from a triggered stop order, handed to the venue.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSubmission {
    pub party: PartyId,
    pub market: MarketId,
    pub side: Side,
    pub size: f64,
    pub kind: OrderKind,
    pub time_in_force: TimeInForce,
}

/// Immediate rejection from the venue (margin, self-match, price band).
/// The downstream order keeps its own status; the stop order only records
/// the reason.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct VenueRejection {
    pub reason: String,
}

impl VenueRejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The order book / trading engine: accepts synthesized orders and returns
/// an order id or an immediate rejection.
pub trait ExecutionVenue {
    fn submit(&mut self, order: &OrderSubmission) -> Result<OrderId, VenueRejection>;
}

/// Supplies the current open position per party per market, for reduce-only
/// capping at trigger time.
pub trait PositionSource {
    fn position(&self, party: &PartyId, market: &MarketId) -> Position;
}
