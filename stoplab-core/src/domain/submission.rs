//! Stop-order submissions: what a trader asks for, before any lifecycle state.

use super::ids::{MarketId, PartyId};
use super::market::Market;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Sign applied to sizes in the stop-order table ("+3" buys, "-3" sells).
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }

    /// The side of an open position this order would reduce.
    pub fn reduces(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Whether the trigger fires on the mark price rising above or falling
/// below its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerDirection {
    RisesAbove,
    FallsBelow,
}

/// Trigger condition for a stop order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Trigger {
    /// Fires when the mark price crosses a fixed threshold.
    Price {
        direction: TriggerDirection,
        price: f64,
    },
    /// Fires when the mark price retreats `offset` (a fraction, e.g. 0.05)
    /// from the best mark seen since submission. `FallsBelow` trails the
    /// high-water mark; `RisesAbove` trails the low-water mark.
    TrailingPercent {
        direction: TriggerDirection,
        offset: f64,
    },
}

impl Trigger {
    pub fn direction(&self) -> TriggerDirection {
        match self {
            Trigger::Price { direction, .. } => *direction,
            Trigger::TrailingPercent { direction, .. } => *direction,
        }
    }

    /// Table rendering: "Mark > 103.00" / "Mark < 102.00" for price triggers,
    /// "Mark +5.0%" / "Mark -5.0%" for trailing triggers.
    pub fn render(&self, market: &Market) -> String {
        match self {
            Trigger::Price { direction, price } => {
                let cmp = match direction {
                    TriggerDirection::RisesAbove => ">",
                    TriggerDirection::FallsBelow => "<",
                };
                format!("Mark {} {}", cmp, market.render_price(*price))
            }
            Trigger::TrailingPercent { direction, offset } => {
                let sign = match direction {
                    TriggerDirection::RisesAbove => "+",
                    TriggerDirection::FallsBelow => "-",
                };
                format!("Mark {}{:.1}%", sign, offset * 100.0)
            }
        }
    }
}

/// The kind of order synthesized when the stop triggers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Limit { price: f64 },
}

impl OrderKind {
    /// Table rendering of the kind column.
    pub fn label(&self) -> &'static str {
        match self {
            OrderKind::Market => "Market",
            OrderKind::Limit { .. } => "Limit",
        }
    }

    /// Table rendering of the price column ("-" for market orders).
    pub fn render_price(&self, market: &Market) -> String {
        match self {
            OrderKind::Market => "-".to_string(),
            OrderKind::Limit { price } => market.render_price(*price),
        }
    }
}

/// Time in force of the synthesized order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    Gtc,
    Ioc,
    Fok,
}

impl TimeInForce {
    pub fn label(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

/// What happens when `expiry` elapses before the trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStrategy {
    /// Fire the underlying order at the expiry moment (may still end
    /// Triggered or Rejected).
    Submit,
    /// Drop the stop order: transitions to Expired.
    Cancel,
}

/// A stop-order submission. Validated before a `StopOrder` instance exists;
/// invalid submissions never enter the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopOrderSubmission {
    pub party: PartyId,
    pub market: MarketId,
    pub side: Side,
    pub size: f64,
    pub trigger: Trigger,
    pub order: OrderKind,
    pub time_in_force: TimeInForce,
    pub expiry: Option<DateTime<Utc>>,
    pub expiry_strategy: ExpiryStrategy,
}

impl StopOrderSubmission {
    /// Validate the submission against its market.
    ///
    /// Checks: positive size, trigger price at or above the minimum tick,
    /// trailing offset within (0, 1), limit price present and at or above
    /// the minimum tick for limit orders.
    pub fn validate(&self, market: &Market) -> Result<(), ValidationError> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(ValidationError::NonPositiveSize { size: self.size });
        }

        match &self.trigger {
            Trigger::Price { price, .. } => {
                market
                    .validate_price(*price)
                    .map_err(|_| ValidationError::InvalidTriggerPrice {
                        price: *price,
                        min_tick: market.min_tick,
                    })?;
            }
            Trigger::TrailingPercent { offset, .. } => {
                if !offset.is_finite() || *offset <= 0.0 || *offset >= 1.0 {
                    return Err(ValidationError::InvalidTrailingOffset { offset: *offset });
                }
            }
        }

        if let OrderKind::Limit { price } = self.order {
            market
                .validate_price(price)
                .map_err(|_| ValidationError::InvalidLimitPrice {
                    price,
                    min_tick: market.min_tick,
                })?;
        }

        Ok(())
    }
}

/// Malformed submission. Raised synchronously at submit time; the order
/// never becomes a `StopOrder`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("size must be positive, got {size}")]
    NonPositiveSize { size: f64 },

    #[error("trigger price {price} must be at least {min_tick}")]
    InvalidTriggerPrice { price: f64, min_tick: f64 },

    #[error("trailing offset {offset} must be within (0, 1)")]
    InvalidTrailingOffset { offset: f64 },

    #[error("limit price {price} must be at least {min_tick}")]
    InvalidLimitPrice { price: f64, min_tick: f64 },
}
