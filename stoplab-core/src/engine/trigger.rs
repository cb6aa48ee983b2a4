//! Trigger evaluation — does the current mark price fire a stop order?
//!
//! Price triggers compare the mark against a fixed threshold. Trailing
//! triggers compare it against a reference that ratchets with the best mark
//! seen since submission:
//! for `FallsBelow`: trigger = highest_mark_since_submission * (1 - offset).
//! for `RisesAbove`: trigger = lowest_mark_since_submission * (1 + offset).

use crate::domain::{StopOrder, Trigger, TriggerDirection};

/// Check a fixed price trigger against the mark.
///
/// `RisesAbove` fires at mark >= trigger; `FallsBelow` at mark <= trigger.
pub fn price_triggered(direction: TriggerDirection, trigger_price: f64, mark: f64) -> bool {
    match direction {
        TriggerDirection::RisesAbove => mark >= trigger_price,
        TriggerDirection::FallsBelow => mark <= trigger_price,
    }
}

/// Would this trigger fire against the given mark at submission time?
///
/// Used only to set the immediate-trigger warning; the actual transition
/// happens on the next evaluation pass. Trailing triggers never fire
/// immediately: their reference starts at the submission mark and the offset
/// is strictly positive.
pub fn triggers_immediately(trigger: &Trigger, mark: f64) -> bool {
    match trigger {
        Trigger::Price { direction, price } => price_triggered(*direction, *price, mark),
        Trigger::TrailingPercent { .. } => false,
    }
}

/// Ratchet a trailing order's reference price toward the best mark seen.
/// No-op for fixed price triggers.
pub fn update_trail_reference(order: &mut StopOrder, mark: f64) {
    let direction = match order.submission.trigger {
        Trigger::TrailingPercent { direction, .. } => direction,
        Trigger::Price { .. } => return,
    };
    let reference = order.trail_reference.get_or_insert(mark);
    match direction {
        // Trailing sell protection: track the high-water mark.
        TriggerDirection::FallsBelow => *reference = reference.max(mark),
        // Trailing buy protection: track the low-water mark.
        TriggerDirection::RisesAbove => *reference = reference.min(mark),
    }
}

/// Evaluate a pending stop order against the mark-price snapshot.
///
/// Callers must have applied [`update_trail_reference`] for this tick first.
pub fn is_triggered(order: &StopOrder, mark: f64) -> bool {
    match &order.submission.trigger {
        Trigger::Price { direction, price } => price_triggered(*direction, *price, mark),
        Trigger::TrailingPercent { direction, offset } => {
            let reference = match order.trail_reference {
                Some(r) => r,
                None => return false,
            };
            match direction {
                TriggerDirection::FallsBelow => mark <= reference * (1.0 - offset),
                TriggerDirection::RisesAbove => mark >= reference * (1.0 + offset),
            }
        }
    }
}
