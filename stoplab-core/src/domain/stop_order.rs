//! Runtime stop orders: lifecycle status, audit trail entries.

use super::ids::{OrderId, StopOrderId};
use super::submission::StopOrderSubmission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a stop order.
///
/// Plain variants apply to standalone orders; `*Oco` variants to OCO-linked
/// ones. `StoppedOco` is only ever applied by the pair coordinator to the
/// sibling of an order that resolved first; it is never a natural outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopOrderStatus {
    Pending,
    #[serde(rename = "PendingOCO")]
    PendingOco,
    Triggered,
    #[serde(rename = "TriggeredOCO")]
    TriggeredOco,
    Rejected,
    #[serde(rename = "RejectedOCO")]
    RejectedOco,
    Cancelled,
    #[serde(rename = "CancelledOCO")]
    CancelledOco,
    Expired,
    #[serde(rename = "ExpiredOCO")]
    ExpiredOco,
    #[serde(rename = "StoppedOCO")]
    StoppedOco,
}

impl StopOrderStatus {
    /// Still waiting for a trigger, cancel, or expiry.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending | Self::PendingOco)
    }

    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// The OCO-suffixed form of this status. `StoppedOco` has no plain form.
    pub fn as_oco(self) -> Self {
        match self {
            Self::Pending => Self::PendingOco,
            Self::Triggered => Self::TriggeredOco,
            Self::Rejected => Self::RejectedOco,
            Self::Cancelled => Self::CancelledOco,
            Self::Expired => Self::ExpiredOco,
            other => other,
        }
    }

    /// Name rendered in the stop-order table ("PendingOCO", "StoppedOCO", ...).
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::PendingOco => "PendingOCO",
            Self::Triggered => "Triggered",
            Self::TriggeredOco => "TriggeredOCO",
            Self::Rejected => "Rejected",
            Self::RejectedOco => "RejectedOCO",
            Self::Cancelled => "Cancelled",
            Self::CancelledOco => "CancelledOCO",
            Self::Expired => "Expired",
            Self::ExpiredOco => "ExpiredOCO",
            Self::StoppedOco => "StoppedOCO",
        }
    }
}

impl fmt::Display for StopOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// A stop order tracked by the engine: the trader's submission plus
/// lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopOrder {
    pub id: StopOrderId,
    pub submission: StopOrderSubmission,
    pub status: StopOrderStatus,
    /// Human-readable reason for `Rejected*`/`Cancelled*` terminal states,
    /// distinct from the coarse status (e.g. "Rejected: Margin check failed").
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Changes on every status transition.
    pub updated_at: DateTime<Utc>,
    /// Id of the order placed into the book, set once triggered.
    pub resulting_order_id: Option<OrderId>,
    /// OCO partner (mutual back-reference; pairs never chain).
    pub sibling: Option<StopOrderId>,
    /// Set at submission when the trigger condition was already satisfied by
    /// the current mark price. The order still only fires on the next
    /// evaluation pass.
    pub immediate_trigger: bool,
    /// Best mark price seen since submission, for trailing triggers.
    pub trail_reference: Option<f64>,
    /// Submission sequence within the book; evaluation passes visit pending
    /// orders in this order.
    pub seq: u64,
}

impl StopOrder {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    pub fn is_oco(&self) -> bool {
        self.sibling.is_some()
    }

    /// Natural terminal status for this order: OCO-suffixed when linked.
    pub fn natural(&self, status: StopOrderStatus) -> StopOrderStatus {
        if self.is_oco() {
            status.as_oco()
        } else {
            status
        }
    }
}

/// Audit trail entry for a stop-order status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopOrderAuditEntry {
    pub order_id: StopOrderId,
    pub at: DateTime<Utc>,
    pub from_status: StopOrderStatus,
    pub to_status: StopOrderStatus,
    pub reason: String,
}
