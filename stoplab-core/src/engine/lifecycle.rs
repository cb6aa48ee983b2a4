//! Lifecycle manager — what happens to a stop order once it fires.
//!
//! Firing synthesizes the underlying order (market or limit, per the
//! submission), caps its size by the trader's opposing open position
//! (reduce-only, checked at trigger time, not submission time), and submits
//! it to the venue. The outcome decides the stop order's terminal status:
//! the venue accepting yields `Triggered`, the venue rejecting or the
//! reduce-only cap hitting zero yields `Rejected`. The rejection reason is
//! recorded on the stop order; the downstream order carries its own status.

use crate::domain::{OrderId, StopOrder};
use crate::ports::{ExecutionVenue, OrderSubmission, PositionSource};

/// Outcome of firing a stop order.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The venue accepted the synthesized order.
    Triggered { order_id: OrderId },
    /// Reduce-only exhausted or the venue rejected the order.
    Rejected { reason: String },
}

/// Fire a stop order: reduce-only capping, then venue submission.
pub fn fire(
    order: &StopOrder,
    venue: &mut dyn ExecutionVenue,
    positions: &dyn PositionSource,
) -> Resolution {
    let sub = &order.submission;
    let position = positions.position(&sub.party, &sub.market);
    let capacity = position.reduce_capacity(sub.side);

    if capacity <= 0.0 {
        return Resolution::Rejected {
            reason: "Rejected: Reduce-only position exhausted".to_string(),
        };
    }

    // The opposing position may have shrunk since submission; submit only
    // what still reduces it.
    let size = sub.size.min(capacity);
    let synthesized = OrderSubmission {
        party: sub.party.clone(),
        market: sub.market.clone(),
        side: sub.side,
        size,
        kind: sub.order,
        time_in_force: sub.time_in_force,
    };

    match venue.submit(&synthesized) {
        Ok(order_id) => Resolution::Triggered { order_id },
        Err(rejection) => Resolution::Rejected {
            reason: format!("Rejected: {}", rejection.reason),
        },
    }
}
