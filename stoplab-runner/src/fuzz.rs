//! Fuzz sweeps — randomized scenarios asserting engine invariants.
//!
//! Each market gets its own engine, a seeded random-walk mark price, and a
//! random stream of submissions and cancels. After every tick the sweep
//! checks:
//! - no (party, market) exceeds the active-order cap
//! - terminal statuses never change once applied
//! - OCO pairs never end a pass half-resolved, and never with both legs
//!   `StoppedOCO`
//!
//! Markets run in parallel (one rayon task per market); each market's sweep
//! stays strictly sequential.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashMap;

use stoplab_core::domain::{
    ExpiryStrategy, Market, MarketId, OrderKind, PartyId, Side, StopOrderId, StopOrderStatus,
    StopOrderSubmission, TimeInForce, Trigger, TriggerDirection,
};
use stoplab_core::engine::{StopOrderEngine, Tick, MAX_ACTIVE_PER_MARKET};

use crate::feed::ScriptedFeed;
use crate::positions::StaticPositions;
use crate::venue::SimVenue;

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FuzzConfig {
    pub master_seed: u64,
    pub markets: usize,
    pub parties: usize,
    pub ticks: usize,
    pub start_mark: f64,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            master_seed: 42,
            markets: 4,
            parties: 3,
            ticks: 500,
            start_mark: 100.0,
        }
    }
}

// ── Summaries ────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MarketFuzzSummary {
    pub market: MarketId,
    pub submissions: usize,
    pub oco_pairs: usize,
    pub cancel_attempts: usize,
    pub resolved: usize,
    pub violations: Vec<String>,
}

#[derive(Debug)]
pub struct FuzzSummary {
    pub markets: Vec<MarketFuzzSummary>,
}

impl FuzzSummary {
    pub fn is_clean(&self) -> bool {
        self.markets.iter().all(|m| m.violations.is_empty())
    }

    pub fn violations(&self) -> Vec<&str> {
        self.markets
            .iter()
            .flat_map(|m| m.violations.iter().map(String::as_str))
            .collect()
    }

    pub fn total_submissions(&self) -> usize {
        self.markets.iter().map(|m| m.submissions).sum()
    }

    pub fn total_resolved(&self) -> usize {
        self.markets.iter().map(|m| m.resolved).sum()
    }
}

// ── Sweep ────────────────────────────────────────────────────────────

/// Run the fuzz sweep across all configured markets in parallel.
pub fn run_fuzz(config: &FuzzConfig) -> FuzzSummary {
    let markets = (0..config.markets)
        .into_par_iter()
        .map(|index| fuzz_market(config, index))
        .collect();
    FuzzSummary { markets }
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap()
}

fn fuzz_market(config: &FuzzConfig, index: usize) -> MarketFuzzSummary {
    let mut rng = StdRng::seed_from_u64(config.master_seed.wrapping_add(index as u64));
    let market_id = MarketId::new(format!("mkt-fuzz-{index}"));
    let market = Market::new(market_id.clone(), format!("FUZZ{index}:USD"), 2);

    let mut engine = StopOrderEngine::new();
    engine.add_market(market);

    let mut venue = SimVenue::new();
    let mut positions = StaticPositions::new();
    let parties: Vec<PartyId> = (0..config.parties)
        .map(|p| PartyId::new(format!("party-{p}")))
        .collect();
    for party in &parties {
        // Some parties flat on purpose: their triggers exercise the
        // reduce-only rejection path.
        let open_volume = rng.gen_range(-5.0..5.0_f64).round();
        positions.set(party.clone(), market_id.clone(), open_volume);
    }
    if rng.gen_bool(0.2) {
        venue.reject_party(parties[0].clone(), "Margin check failed");
    }

    let mut summary = MarketFuzzSummary {
        market: market_id.clone(),
        submissions: 0,
        oco_pairs: 0,
        cancel_attempts: 0,
        resolved: 0,
        violations: Vec::new(),
    };

    let mut feed = random_walk_feed(&mut rng, config);
    let mut known: Vec<StopOrderId> = Vec::new();
    let mut pairs: Vec<(StopOrderId, StopOrderId)> = Vec::new();
    let mut terminal: HashMap<StopOrderId, StopOrderStatus> = HashMap::new();

    let mut tick_index = 0;
    while let Some(tick) = feed.next_tick() {
        let now = tick.time;
        let mark = tick.mark_price;

        if rng.gen_bool(0.3) {
            let submission = random_submission(&mut rng, &parties, &market_id, mark);
            if engine.submit(submission, now).is_ok() {
                summary.submissions += 1;
                refresh_known(&engine, &parties, &market_id, &mut known);
            }
        }
        if rng.gen_bool(0.15) {
            let a = random_submission(&mut rng, &parties, &market_id, mark);
            let mut b = random_submission(&mut rng, &parties, &market_id, mark);
            b.party = a.party.clone();
            if let Ok((id_a, id_b)) = engine.submit_oco(a, b, now) {
                summary.submissions += 2;
                summary.oco_pairs += 1;
                pairs.push((id_a, id_b));
                refresh_known(&engine, &parties, &market_id, &mut known);
            }
        }
        if rng.gen_bool(0.1) && !known.is_empty() {
            let target = known[rng.gen_range(0..known.len())].clone();
            summary.cancel_attempts += 1;
            // Cancelling an already-resolved order is a legal no-op error.
            let _ = engine.cancel(&target, now);
        }

        let resolved = engine.on_tick(&market_id, &tick, &mut venue, &positions);
        summary.resolved += resolved.len();

        check_invariants(
            &engine,
            &parties,
            &market_id,
            &known,
            &pairs,
            &mut terminal,
            tick_index,
            &mut summary.violations,
        );
        tick_index += 1;
    }

    summary
}

/// Pre-generate the market's random-walk price path, floored away from zero.
fn random_walk_feed(rng: &mut StdRng, config: &FuzzConfig) -> ScriptedFeed {
    let mut mark = config.start_mark;
    let ticks = (0..config.ticks)
        .map(|i| {
            mark = (mark * (1.0 + rng.gen_range(-0.02..0.02_f64))).max(1.0);
            Tick::new(start_time() + Duration::seconds(i as i64), mark)
        })
        .collect();
    ScriptedFeed::new(ticks)
}

fn random_submission(
    rng: &mut StdRng,
    parties: &[PartyId],
    market: &MarketId,
    mark: f64,
) -> StopOrderSubmission {
    let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
    let direction = if rng.gen_bool(0.5) {
        TriggerDirection::RisesAbove
    } else {
        TriggerDirection::FallsBelow
    };
    // Triggers scattered around the current mark so some fire quickly, some
    // never do.
    let trigger_price = (mark * rng.gen_range(0.85..1.15_f64)).max(0.01);
    let order = if rng.gen_bool(0.5) {
        OrderKind::Market
    } else {
        OrderKind::Limit {
            price: (mark * rng.gen_range(0.9..1.1_f64)).max(0.01),
        }
    };

    StopOrderSubmission {
        party: parties[rng.gen_range(0..parties.len())].clone(),
        market: market.clone(),
        side,
        size: rng.gen_range(1..4) as f64,
        trigger: Trigger::Price {
            direction,
            price: trigger_price,
        },
        order,
        time_in_force: TimeInForce::Fok,
        expiry: None,
        expiry_strategy: ExpiryStrategy::Cancel,
    }
}

fn refresh_known(
    engine: &StopOrderEngine,
    parties: &[PartyId],
    market: &MarketId,
    known: &mut Vec<StopOrderId>,
) {
    known.clear();
    for party in parties {
        for order in engine.stop_orders(party, Some(market)) {
            known.push(order.id.clone());
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn check_invariants(
    engine: &StopOrderEngine,
    parties: &[PartyId],
    market: &MarketId,
    known: &[StopOrderId],
    pairs: &[(StopOrderId, StopOrderId)],
    terminal: &mut HashMap<StopOrderId, StopOrderStatus>,
    tick_index: usize,
    violations: &mut Vec<String>,
) {
    for party in parties {
        let active = engine.active_count(party, market);
        if active > MAX_ACTIVE_PER_MARKET {
            violations.push(format!(
                "tick {tick_index}: {party} holds {active} active stop orders"
            ));
        }
    }

    for id in known {
        let Some(order) = engine.get(id) else { continue };
        match terminal.get(id) {
            Some(frozen) if *frozen != order.status => {
                violations.push(format!(
                    "tick {tick_index}: order {id} changed terminal status {frozen} -> {}",
                    order.status
                ));
            }
            None if order.status.is_terminal() => {
                terminal.insert(id.clone(), order.status);
            }
            _ => {}
        }
    }

    for (a, b) in pairs {
        let (Some(order_a), Some(order_b)) = (engine.get(a), engine.get(b)) else {
            continue;
        };
        if order_a.is_pending() != order_b.is_pending() {
            violations.push(format!(
                "tick {tick_index}: OCO pair half-resolved ({} / {})",
                order_a.status, order_b.status
            ));
        }
        if order_a.status == StopOrderStatus::StoppedOco
            && order_b.status == StopOrderStatus::StoppedOco
        {
            violations.push(format!("tick {tick_index}: both OCO legs stopped"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fuzz_sweep_is_clean() {
        let config = FuzzConfig {
            ticks: 200,
            ..FuzzConfig::default()
        };
        let summary = run_fuzz(&config);
        assert!(
            summary.is_clean(),
            "violations: {:?}",
            summary.violations()
        );
        assert!(summary.total_submissions() > 0);
    }

    #[test]
    fn fuzz_is_deterministic_per_seed() {
        let config = FuzzConfig {
            ticks: 100,
            markets: 2,
            ..FuzzConfig::default()
        };
        let a = run_fuzz(&config);
        let b = run_fuzz(&config);
        assert_eq!(a.total_submissions(), b.total_submissions());
        assert_eq!(a.total_resolved(), b.total_resolved());
    }
}
