//! Static position fixtures.
//!
//! Scenarios declare open positions up front (the original flow trades a
//! party into a position before submitting stops); the engine reads them
//! through the `PositionSource` seam at trigger time. Mutable so scenarios
//! can shrink a position between ticks and exercise reduce-only capping.

use std::collections::HashMap;
use stoplab_core::domain::{MarketId, PartyId, Position};
use stoplab_core::ports::PositionSource;

#[derive(Debug, Clone, Default)]
pub struct StaticPositions {
    open: HashMap<(PartyId, MarketId), f64>,
}

impl StaticPositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a party's signed open volume (positive long, negative short).
    pub fn set(&mut self, party: PartyId, market: MarketId, open_volume: f64) {
        self.open.insert((party, market), open_volume);
    }
}

impl PositionSource for StaticPositions {
    fn position(&self, party: &PartyId, market: &MarketId) -> Position {
        let open_volume = self
            .open
            .get(&(party.clone(), market.clone()))
            .copied()
            .unwrap_or(0.0);
        Position { open_volume }
    }
}
