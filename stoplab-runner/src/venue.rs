//! Simulated execution venue.
//!
//! Accepts synthesized orders, assigns sequential ids, and records every
//! submission so scenarios can assert on what became market-visible. Can be
//! scripted to reject, either unconditionally or per party, to exercise the
//! `Rejected*` paths (margin, self-match, price band).

use stoplab_core::domain::{OrderId, PartyId};
use stoplab_core::ports::{ExecutionVenue, OrderSubmission, VenueRejection};

/// A venue rejection rule: which party is affected and why.
#[derive(Debug, Clone)]
struct RejectRule {
    party: Option<PartyId>,
    reason: String,
}

/// In-memory venue for scenarios and tests.
#[derive(Debug, Default)]
pub struct SimVenue {
    accepted: Vec<(OrderId, OrderSubmission)>,
    rejected: Vec<OrderSubmission>,
    rules: Vec<RejectRule>,
    next_id: u64,
}

impl SimVenue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every submission with the given reason.
    pub fn reject_all(&mut self, reason: impl Into<String>) {
        self.rules.push(RejectRule {
            party: None,
            reason: reason.into(),
        });
    }

    /// Reject submissions from one party with the given reason.
    pub fn reject_party(&mut self, party: PartyId, reason: impl Into<String>) {
        self.rules.push(RejectRule {
            party: Some(party),
            reason: reason.into(),
        });
    }

    /// Orders the venue accepted, in arrival order.
    pub fn accepted(&self) -> &[(OrderId, OrderSubmission)] {
        &self.accepted
    }

    /// Orders the venue rejected, in arrival order.
    pub fn rejected(&self) -> &[OrderSubmission] {
        &self.rejected
    }
}

impl ExecutionVenue for SimVenue {
    fn submit(&mut self, order: &OrderSubmission) -> Result<OrderId, VenueRejection> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.party.as_ref().map_or(true, |p| *p == order.party));
        if let Some(rule) = rule {
            self.rejected.push(order.clone());
            return Err(VenueRejection::new(rule.reason.clone()));
        }

        self.next_id += 1;
        let id = OrderId::new(format!("V-{:06}", self.next_id));
        self.accepted.push((id.clone(), order.clone()));
        Ok(id)
    }
}
