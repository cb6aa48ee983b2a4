//! OCO pair coordination — one sibling resolving terminates the other.
//!
//! When a leg leaves `PendingOCO` for any natural reason (trigger, rejection,
//! cancellation, expiry), the still-pending sibling is forced to `StoppedOCO`
//! in the same operation. A sibling that already resolved keeps its status:
//! first resolution wins, no status is downgraded. Simultaneous resolution
//! (both legs deciding against the same mark snapshot) is handled by the
//! sweep, which skips the forced stop for legs with their own decision.

use super::book::StopOrderBook;
use crate::domain::{StopOrderId, StopOrderStatus};
use chrono::{DateTime, Utc};

/// Reason recorded when a sibling is stopped by its pair resolving first.
pub const STOPPED_BY_SIBLING: &str = "OCO sibling resolved";

/// Force the sibling of a just-resolved leg into `StoppedOCO`.
///
/// No-op when the resolved leg has no sibling or the sibling already holds a
/// terminal status.
pub fn stop_sibling(book: &mut StopOrderBook, resolved: &StopOrderId, at: DateTime<Utc>) {
    let sibling_id = match book.get(resolved).and_then(|o| o.sibling.clone()) {
        Some(id) => id,
        None => return,
    };

    let still_pending = book.get(&sibling_id).map_or(false, |s| s.is_pending());
    if !still_pending {
        // Already resolved (e.g. concurrently cancelled). Leave it untouched.
        return;
    }

    // The sibling is pending, so this transition cannot fail; the book
    // rechecks anyway and first resolution wins on a race.
    let _ = book.transition(&sibling_id, StopOrderStatus::StoppedOco, STOPPED_BY_SIBLING, at);
}
