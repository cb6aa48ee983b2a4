//! Domain types for the stop-order engine.

pub mod ids;
pub mod market;
pub mod position;
pub mod stop_order;
pub mod submission;

pub use ids::{MarketId, OrderId, PartyId, StopOrderId};
pub use market::{Market, MarketError, MIN_TICK};
pub use position::Position;
pub use stop_order::{StopOrder, StopOrderAuditEntry, StopOrderStatus};
pub use submission::{
    ExpiryStrategy, OrderKind, Side, StopOrderSubmission, TimeInForce, Trigger, TriggerDirection,
    ValidationError,
};
