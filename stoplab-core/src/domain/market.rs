use super::ids::MarketId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest price increment any market accepts. Limit and trigger prices
/// below this are rejected at submission.
pub const MIN_TICK: f64 = 0.00001;

/// Market metadata needed to validate and render prices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Market {
    pub id: MarketId,
    /// Instrument code shown in the stop-order table (e.g. "BTC:DAI_2023Futr").
    pub code: String,
    /// Decimal places used when rendering prices ("103.00" for 2).
    pub price_decimals: u32,
    /// Smallest accepted price increment.
    pub min_tick: f64,
}

impl Market {
    pub fn new(id: MarketId, code: impl Into<String>, price_decimals: u32) -> Self {
        Self {
            id,
            code: code.into(),
            price_decimals,
            min_tick: MIN_TICK,
        }
    }

    /// Validate that a price is positive and at or above the minimum tick.
    pub fn validate_price(&self, price: f64) -> Result<f64, MarketError> {
        if !price.is_finite() || price < self.min_tick {
            return Err(MarketError::PriceBelowMinimum {
                price,
                min_tick: self.min_tick,
            });
        }
        Ok(price)
    }

    /// Render a price with the market's decimal places ("103.00").
    pub fn render_price(&self, price: f64) -> String {
        format!("{:.*}", self.price_decimals as usize, price)
    }
}

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("price {price} is below the minimum tick {min_tick}")]
    PriceBelowMinimum { price: f64, min_tick: f64 },
}
