use super::submission::Side;
use serde::{Deserialize, Serialize};

/// A party's open position in one market, as reported by the position
/// service. `open_volume` is signed: positive long, negative short.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub open_volume: f64,
}

impl Position {
    pub fn flat() -> Self {
        Self { open_volume: 0.0 }
    }

    /// How much a stop order of the given side may trade under the
    /// reduce-only constraint: a sell reduces a long, a buy reduces a short.
    pub fn reduce_capacity(&self, order_side: Side) -> f64 {
        match order_side {
            Side::Sell => self.open_volume.max(0.0),
            Side::Buy => (-self.open_volume).max(0.0),
        }
    }
}
