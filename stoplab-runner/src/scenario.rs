//! Scenario definitions and the scenario runner.
//!
//! A scenario is a TOML file describing one market: initial mark price, open
//! positions, stop-order submissions (single or OCO-paired), and timed steps
//! (mark-price ticks and cancels). `run_scenario` drives a fresh engine
//! through it and produces the final stop-order table plus the audit trail.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use stoplab_core::domain::{
    ExpiryStrategy, Market, MarketId, OrderKind, PartyId, Side, StopOrderId, StopOrderSubmission,
    TimeInForce, Trigger, TriggerDirection,
};
use stoplab_core::engine::{StopOrderBookError, StopOrderEngine, SubmitError, Tick};

use crate::positions::StaticPositions;
use crate::report::{row_for, ScenarioReport};
use crate::venue::SimVenue;

// ── Scenario model (TOML) ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub initial_mark: f64,
    pub market: MarketSpec,
    #[serde(default)]
    pub positions: Vec<PositionSpec>,
    #[serde(default)]
    pub venue: VenueSpec,
    #[serde(default)]
    pub submissions: Vec<SubmissionSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketSpec {
    pub id: String,
    pub code: String,
    #[serde(default = "default_decimals")]
    pub price_decimals: u32,
}

fn default_decimals() -> u32 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionSpec {
    pub party: String,
    pub open_volume: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueSpec {
    /// Reject every synthesized order with this reason (margin, self-match,
    /// price band scripting).
    pub reject_reason: Option<String>,
}

/// One stop-order leg: everything except the submitting party.
#[derive(Debug, Clone, Deserialize)]
pub struct LegSpec {
    pub side: SideSpec,
    pub size: f64,
    pub trigger_direction: DirectionSpec,
    pub trigger_price: Option<f64>,
    pub trailing_offset: Option<f64>,
    #[serde(default)]
    pub order_type: OrderTypeSpec,
    pub limit_price: Option<f64>,
    #[serde(default)]
    pub time_in_force: TifSpec,
    pub expires_in_secs: Option<i64>,
    #[serde(default)]
    pub expiry_strategy: ExpiryStrategySpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSpec {
    pub party: String,
    #[serde(flatten)]
    pub leg: LegSpec,
    /// Optional OCO sibling, submitted by the same party.
    pub oco: Option<LegSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideSpec {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionSpec {
    RisesAbove,
    FallsBelow,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderTypeSpec {
    #[default]
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TifSpec {
    Gtc,
    Ioc,
    #[default]
    Fok,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStrategySpec {
    Submit,
    #[default]
    Cancel,
}

/// One timed step: a mark-price tick, a cancel, or both (tick first).
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Seconds after `start_time`.
    pub at: i64,
    pub mark: Option<f64>,
    /// 1-based index into the submitted stop orders, OCO legs counted
    /// separately in submission order.
    pub cancel: Option<usize>,
}

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("submission {index}: either trigger_price or trailing_offset is required")]
    MissingTrigger { index: usize },

    #[error("submission {index}: limit_price is required for limit orders")]
    MissingLimitPrice { index: usize },

    #[error("submission rejected: {0}")]
    Submit(#[from] SubmitError),

    #[error("cancel failed: {0}")]
    Cancel(#[from] StopOrderBookError),

    #[error("step cancels stop order {index}, but only {count} were submitted")]
    UnknownCancelTarget { index: usize, count: usize },
}

// ── Conversion ───────────────────────────────────────────────────────

impl LegSpec {
    fn to_submission(
        &self,
        party: &PartyId,
        market: &MarketId,
        start: DateTime<Utc>,
        index: usize,
    ) -> Result<StopOrderSubmission, ScenarioError> {
        let direction = match self.trigger_direction {
            DirectionSpec::RisesAbove => TriggerDirection::RisesAbove,
            DirectionSpec::FallsBelow => TriggerDirection::FallsBelow,
        };
        let trigger = match (self.trigger_price, self.trailing_offset) {
            (_, Some(offset)) => Trigger::TrailingPercent { direction, offset },
            (Some(price), None) => Trigger::Price { direction, price },
            (None, None) => return Err(ScenarioError::MissingTrigger { index }),
        };

        let order = match self.order_type {
            OrderTypeSpec::Market => OrderKind::Market,
            OrderTypeSpec::Limit => {
                let price = self
                    .limit_price
                    .ok_or(ScenarioError::MissingLimitPrice { index })?;
                OrderKind::Limit { price }
            }
        };

        Ok(StopOrderSubmission {
            party: party.clone(),
            market: market.clone(),
            side: match self.side {
                SideSpec::Buy => Side::Buy,
                SideSpec::Sell => Side::Sell,
            },
            size: self.size,
            trigger,
            order,
            time_in_force: match self.time_in_force {
                TifSpec::Gtc => TimeInForce::Gtc,
                TifSpec::Ioc => TimeInForce::Ioc,
                TifSpec::Fok => TimeInForce::Fok,
            },
            expiry: self.expires_in_secs.map(|s| start + Duration::seconds(s)),
            expiry_strategy: match self.expiry_strategy {
                ExpiryStrategySpec::Submit => ExpiryStrategy::Submit,
                ExpiryStrategySpec::Cancel => ExpiryStrategy::Cancel,
            },
        })
    }
}

// ── Runner ───────────────────────────────────────────────────────────

/// Final state of a scenario run: the table, the audit trail, and the
/// engine/venue for deeper assertions.
#[derive(Debug)]
pub struct ScenarioRun {
    pub engine: StopOrderEngine,
    pub venue: SimVenue,
    /// Stop-order ids in submission order, OCO legs flattened.
    pub order_ids: Vec<StopOrderId>,
    pub report: ScenarioReport,
}

/// Load a scenario from a TOML file.
pub fn load_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

/// Drive a fresh engine through a scenario.
pub fn run_scenario(scenario: &Scenario) -> Result<ScenarioRun, ScenarioError> {
    let market = Market::new(
        MarketId::new(scenario.market.id.clone()),
        scenario.market.code.clone(),
        scenario.market.price_decimals,
    );
    let market_id = market.id.clone();

    let mut engine = StopOrderEngine::new();
    engine.add_market(market.clone());

    let mut venue = SimVenue::new();
    if let Some(reason) = &scenario.venue.reject_reason {
        venue.reject_all(reason.clone());
    }

    let mut positions = StaticPositions::new();
    for p in &scenario.positions {
        positions.set(PartyId::new(p.party.clone()), market_id.clone(), p.open_volume);
    }

    let start = scenario.start_time;
    // Seed the mark so immediate-trigger warnings evaluate at submission.
    engine.on_tick(
        &market_id,
        &Tick::new(start, scenario.initial_mark),
        &mut venue,
        &positions,
    );

    let mut order_ids = Vec::new();
    for (index, spec) in scenario.submissions.iter().enumerate() {
        let party = PartyId::new(spec.party.clone());
        let main = spec.leg.to_submission(&party, &market_id, start, index)?;
        match &spec.oco {
            Some(leg) => {
                let second = leg.to_submission(&party, &market_id, start, index)?;
                let (a, b) = engine.submit_oco(main, second, start)?;
                order_ids.push(a);
                order_ids.push(b);
            }
            None => order_ids.push(engine.submit(main, start)?),
        }
    }

    for step in &scenario.steps {
        let at = start + Duration::seconds(step.at);
        if let Some(mark) = step.mark {
            engine.on_tick(&market_id, &Tick::new(at, mark), &mut venue, &positions);
        }
        if let Some(n) = step.cancel {
            let id = n
                .checked_sub(1)
                .and_then(|i| order_ids.get(i))
                .ok_or(ScenarioError::UnknownCancelTarget {
                    index: n,
                    count: order_ids.len(),
                })?;
            engine.cancel(id, at)?;
        }
    }

    let rows = order_ids
        .iter()
        .filter_map(|id| engine.get(id))
        .map(|o| row_for(o, &market))
        .collect();
    let report = ScenarioReport {
        name: scenario.name.clone().unwrap_or_default(),
        rows,
        audit: engine.audit_trail().to_vec(),
    };

    Ok(ScenarioRun {
        engine,
        venue,
        order_ids,
        report,
    })
}
