//! Engine acceptance tests — submission, triggering, OCO pairing, expiry,
//! reduce-only capping, and the active-order cap.

use chrono::{DateTime, Duration, TimeZone, Utc};
use stoplab_core::domain::{
    ExpiryStrategy, Market, MarketId, OrderId, OrderKind, PartyId, Position, Side,
    StopOrderStatus, StopOrderSubmission, TimeInForce, Trigger, TriggerDirection,
};
use stoplab_core::engine::{StopOrderBookError, StopOrderEngine, SubmitError, Tick};
use stoplab_core::ports::{ExecutionVenue, OrderSubmission, PositionSource, VenueRejection};
use std::collections::HashMap;

// ── Test doubles ─────────────────────────────────────────────────────

/// Venue that records every synthesized order and can be told to reject.
#[derive(Default)]
struct TestVenue {
    received: Vec<OrderSubmission>,
    reject_with: Option<String>,
    next_id: u64,
}

impl TestVenue {
    fn rejecting(reason: &str) -> Self {
        Self {
            reject_with: Some(reason.to_string()),
            ..Self::default()
        }
    }
}

impl ExecutionVenue for TestVenue {
    fn submit(&mut self, order: &OrderSubmission) -> Result<OrderId, VenueRejection> {
        self.received.push(order.clone());
        if let Some(reason) = &self.reject_with {
            return Err(VenueRejection::new(reason.clone()));
        }
        self.next_id += 1;
        Ok(OrderId::new(format!("ord-{}", self.next_id)))
    }
}

#[derive(Default)]
struct TestPositions {
    open: HashMap<(PartyId, MarketId), f64>,
}

impl TestPositions {
    fn with(party: &str, market: &str, open_volume: f64) -> Self {
        let mut positions = Self::default();
        positions.set(party, market, open_volume);
        positions
    }

    fn set(&mut self, party: &str, market: &str, open_volume: f64) {
        self.open
            .insert((PartyId::new(party), MarketId::new(market)), open_volume);
    }
}

impl PositionSource for TestPositions {
    fn position(&self, party: &PartyId, market: &MarketId) -> Position {
        let open_volume = self
            .open
            .get(&(party.clone(), market.clone()))
            .copied()
            .unwrap_or(0.0);
        Position { open_volume }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap()
}

fn mkt() -> MarketId {
    MarketId::new("mkt-btc-dai")
}

fn engine() -> StopOrderEngine {
    let mut engine = StopOrderEngine::new();
    engine.add_market(Market::new(mkt(), "BTC:DAI_2023Futr", 2));
    engine
}

/// Engine that has already seen one tick at `mark`.
fn engine_at(mark: f64) -> StopOrderEngine {
    let mut engine = engine();
    let mut venue = TestVenue::default();
    let positions = TestPositions::default();
    engine.on_tick(&mkt(), &Tick::new(t0(), mark), &mut venue, &positions);
    engine
}

fn price_stop(side: Side, direction: TriggerDirection, trigger: f64) -> StopOrderSubmission {
    StopOrderSubmission {
        party: PartyId::new("trader-1"),
        market: mkt(),
        side,
        size: 1.0,
        trigger: Trigger::Price {
            direction,
            price: trigger,
        },
        order: OrderKind::Market,
        time_in_force: TimeInForce::Fok,
        expiry: None,
        expiry_strategy: ExpiryStrategy::Cancel,
    }
}

fn tick(offset_secs: i64, mark: f64) -> Tick {
    Tick::new(t0() + Duration::seconds(offset_secs), mark)
}

// ── Single order lifecycle ───────────────────────────────────────────

#[test]
fn sell_limit_stop_triggers_on_falling_mark() {
    let mut engine = engine_at(105.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", 5.0);

    let mut submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    submission.order = OrderKind::Limit { price: 99.0 };
    let id = engine.submit(submission, t0()).unwrap();

    // Before any price move: Pending, nothing at the venue.
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Pending);
    assert!(!engine.get(&id).unwrap().immediate_trigger);

    // Mark holds above the trigger: still pending.
    engine.on_tick(&mkt(), &tick(1, 104.0), &mut venue, &positions);
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Pending);
    assert!(venue.received.is_empty());

    // Mark drops through the trigger: triggered, order hits the venue.
    let resolved = engine.on_tick(&mkt(), &tick(2, 101.0), &mut venue, &positions);
    assert_eq!(resolved, vec![id.clone()]);

    let order = engine.get(&id).unwrap();
    assert_eq!(order.status, StopOrderStatus::Triggered);
    assert!(order.resulting_order_id.is_some());
    assert_eq!(order.updated_at, t0() + Duration::seconds(2));

    let sent = &venue.received[0];
    assert_eq!(sent.side, Side::Sell);
    assert_eq!(sent.kind, OrderKind::Limit { price: 99.0 });
    assert_eq!(sent.size, 1.0);
    assert_eq!(sent.time_in_force, TimeInForce::Fok);
}

#[test]
fn triggered_exactly_at_threshold() {
    let mut engine = engine_at(105.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", 5.0);

    let id = engine
        .submit(price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0), t0())
        .unwrap();
    engine.on_tick(&mkt(), &tick(1, 102.0), &mut venue, &positions);
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Triggered);
}

#[test]
fn immediate_trigger_warns_then_fires_next_pass() {
    // Mark already above the trigger at submission.
    let mut engine = engine_at(110.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", -5.0);

    let id = engine
        .submit(price_stop(Side::Buy, TriggerDirection::RisesAbove, 103.0), t0())
        .unwrap();

    // Warned, but not auto-triggered at submission.
    let order = engine.get(&id).unwrap();
    assert!(order.immediate_trigger);
    assert_eq!(order.status, StopOrderStatus::Pending);
    assert!(venue.received.is_empty());

    // Fires on the very next pass.
    engine.on_tick(&mkt(), &tick(1, 110.0), &mut venue, &positions);
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Triggered);
}

#[test]
fn no_immediate_warning_before_first_tick() {
    let mut engine = engine();
    let id = engine
        .submit(price_stop(Side::Buy, TriggerDirection::RisesAbove, 103.0), t0())
        .unwrap();
    assert!(!engine.get(&id).unwrap().immediate_trigger);
}

// ── Rejection paths ──────────────────────────────────────────────────

#[test]
fn venue_rejection_marks_stop_order_rejected_with_reason() {
    let mut engine = engine_at(105.0);
    let mut venue = TestVenue::rejecting("Margin check failed");
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", 5.0);

    let id = engine
        .submit(price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0), t0())
        .unwrap();
    engine.on_tick(&mkt(), &tick(1, 101.0), &mut venue, &positions);

    let order = engine.get(&id).unwrap();
    assert_eq!(order.status, StopOrderStatus::Rejected);
    assert_eq!(order.reason.as_deref(), Some("Rejected: Margin check failed"));
    assert!(order.resulting_order_id.is_none());
}

#[test]
fn reduce_only_caps_submitted_size() {
    let mut engine = engine_at(105.0);
    let mut venue = TestVenue::default();
    // Long position shrank to 2 before the size-3 stop fired.
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", 2.0);

    let mut submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    submission.size = 3.0;
    let id = engine.submit(submission, t0()).unwrap();

    engine.on_tick(&mkt(), &tick(1, 101.0), &mut venue, &positions);
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Triggered);
    assert_eq!(venue.received[0].size, 2.0);
}

#[test]
fn reduce_only_exhausted_rejects_without_reaching_venue() {
    let mut engine = engine_at(105.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::default(); // flat

    let id = engine
        .submit(price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0), t0())
        .unwrap();
    engine.on_tick(&mkt(), &tick(1, 101.0), &mut venue, &positions);

    let order = engine.get(&id).unwrap();
    assert_eq!(order.status, StopOrderStatus::Rejected);
    assert_eq!(
        order.reason.as_deref(),
        Some("Rejected: Reduce-only position exhausted")
    );
    assert!(venue.received.is_empty());
}

// ── Cancellation ─────────────────────────────────────────────────────

#[test]
fn cancel_pending_order() {
    let mut engine = engine_at(105.0);
    let id = engine
        .submit(price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0), t0())
        .unwrap();

    engine.cancel(&id, t0() + Duration::seconds(5)).unwrap();
    let order = engine.get(&id).unwrap();
    assert_eq!(order.status, StopOrderStatus::Cancelled);
    assert_eq!(order.reason.as_deref(), Some("Cancelled by trader"));
}

#[test]
fn cancel_triggered_order_is_invalid_state() {
    let mut engine = engine_at(105.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", 5.0);

    let id = engine
        .submit(price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0), t0())
        .unwrap();
    engine.on_tick(&mkt(), &tick(1, 101.0), &mut venue, &positions);

    let err = engine.cancel(&id, t0() + Duration::seconds(2)).unwrap_err();
    assert!(matches!(err, StopOrderBookError::InvalidState(_, _)));
    // First resolution wins.
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Triggered);
}

#[test]
fn double_cancel_is_invalid_state() {
    let mut engine = engine_at(105.0);
    let id = engine
        .submit(price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0), t0())
        .unwrap();
    engine.cancel(&id, t0()).unwrap();
    let err = engine.cancel(&id, t0()).unwrap_err();
    assert!(matches!(err, StopOrderBookError::InvalidState(_, _)));
}

// ── Active-order cap ─────────────────────────────────────────────────

#[test]
fn fifth_active_stop_order_is_rejected_outright() {
    let mut engine = engine_at(105.0);
    for i in 0..4 {
        let submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 90.0 - i as f64);
        engine.submit(submission, t0()).unwrap();
    }

    let err = engine
        .submit(price_stop(Side::Sell, TriggerDirection::FallsBelow, 80.0), t0())
        .unwrap_err();
    assert!(matches!(err, SubmitError::LimitExceeded { max: 4, .. }));

    // No fifth StopOrder exists.
    let party = PartyId::new("trader-1");
    assert_eq!(engine.stop_orders(&party, Some(&mkt())).len(), 4);
}

#[test]
fn cap_frees_up_when_an_order_resolves() {
    let mut engine = engine_at(105.0);
    let ids: Vec<_> = (0..4)
        .map(|i| {
            engine
                .submit(
                    price_stop(Side::Sell, TriggerDirection::FallsBelow, 90.0 - i as f64),
                    t0(),
                )
                .unwrap()
        })
        .collect();

    engine.cancel(&ids[0], t0()).unwrap();
    assert!(engine
        .submit(price_stop(Side::Sell, TriggerDirection::FallsBelow, 80.0), t0())
        .is_ok());
}

#[test]
fn cap_counts_are_scoped_per_market() {
    let mut engine = engine_at(105.0);
    let other = MarketId::new("mkt-eth-dai");
    engine.add_market(Market::new(other.clone(), "ETH:DAI_2023Futr", 2));

    for i in 0..4 {
        engine
            .submit(
                price_stop(Side::Sell, TriggerDirection::FallsBelow, 90.0 - i as f64),
                t0(),
            )
            .unwrap();
    }

    let mut submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 80.0);
    submission.market = other;
    assert!(engine.submit(submission, t0()).is_ok());
}

#[test]
fn oco_pair_needs_room_for_both_legs() {
    let mut engine = engine_at(105.0);
    for i in 0..3 {
        engine
            .submit(
                price_stop(Side::Sell, TriggerDirection::FallsBelow, 90.0 - i as f64),
                t0(),
            )
            .unwrap();
    }

    let a = price_stop(Side::Buy, TriggerDirection::RisesAbove, 120.0);
    let b = price_stop(Side::Sell, TriggerDirection::FallsBelow, 80.0);
    let err = engine.submit_oco(a, b, t0()).unwrap_err();
    assert!(matches!(err, SubmitError::LimitExceeded { .. }));
}

// ── OCO pairs ────────────────────────────────────────────────────────

#[test]
fn oco_pair_pending_until_price_moves() {
    let mut engine = engine_at(101.0);
    let a = price_stop(Side::Buy, TriggerDirection::RisesAbove, 103.0);
    let b = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    let (id_a, id_b) = engine.submit_oco(a, b, t0()).unwrap();

    let order_a = engine.get(&id_a).unwrap();
    let order_b = engine.get(&id_b).unwrap();
    assert_eq!(order_a.status, StopOrderStatus::PendingOco);
    assert_eq!(order_b.status, StopOrderStatus::PendingOco);
    assert_eq!(order_a.sibling.as_ref(), Some(&id_b));
    assert_eq!(order_b.sibling.as_ref(), Some(&id_a));
}

#[test]
fn oco_trigger_stops_the_sibling() {
    let mut engine = engine_at(101.0);
    let mut venue = TestVenue::default();
    let mut positions = TestPositions::default();
    positions.set("trader-1", "mkt-btc-dai", -3.0); // short; buy leg reduces it

    let mut a = price_stop(Side::Buy, TriggerDirection::RisesAbove, 103.0);
    a.size = 3.0;
    let mut b = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    b.size = 3.0;
    let (id_a, id_b) = engine.submit_oco(a, b, t0()).unwrap();

    // Price rises to leg A's trigger first.
    let resolved = engine.on_tick(&mkt(), &tick(1, 103.0), &mut venue, &positions);
    assert_eq!(resolved, vec![id_a.clone(), id_b.clone()]);

    assert_eq!(engine.get(&id_a).unwrap().status, StopOrderStatus::TriggeredOco);
    assert_eq!(engine.get(&id_b).unwrap().status, StopOrderStatus::StoppedOco);
    assert_eq!(
        engine.get(&id_b).unwrap().reason.as_deref(),
        Some("OCO sibling resolved")
    );
    // Only leg A reached the venue.
    assert_eq!(venue.received.len(), 1);
    assert_eq!(venue.received[0].side, Side::Buy);
}

#[test]
fn oco_rejection_stops_the_sibling() {
    // No position at all: the triggering leg is rejected by the reduce-only
    // check, and the sibling is stopped rather than evaluated.
    let mut engine = engine_at(110.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::default();

    let a = price_stop(Side::Buy, TriggerDirection::RisesAbove, 103.0);
    let b = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    let (id_a, id_b) = engine.submit_oco(a, b, t0()).unwrap();
    assert!(engine.get(&id_a).unwrap().immediate_trigger);

    engine.on_tick(&mkt(), &tick(1, 110.0), &mut venue, &positions);
    assert_eq!(engine.get(&id_a).unwrap().status, StopOrderStatus::RejectedOco);
    assert_eq!(engine.get(&id_b).unwrap().status, StopOrderStatus::StoppedOco);
}

#[test]
fn oco_cancel_stops_the_sibling() {
    let mut engine = engine_at(101.0);
    let a = price_stop(Side::Buy, TriggerDirection::RisesAbove, 120.0);
    let b = price_stop(Side::Sell, TriggerDirection::FallsBelow, 99.0);
    let (id_a, id_b) = engine.submit_oco(a, b, t0()).unwrap();

    engine.cancel(&id_a, t0() + Duration::seconds(5)).unwrap();
    assert_eq!(engine.get(&id_a).unwrap().status, StopOrderStatus::CancelledOco);
    assert_eq!(engine.get(&id_b).unwrap().status, StopOrderStatus::StoppedOco);
}

#[test]
fn oco_simultaneous_resolution_keeps_both_natural_statuses() {
    // Both triggers satisfied by the same mark snapshot.
    let mut engine = engine_at(100.0);
    let mut venue = TestVenue::default();
    let mut positions = TestPositions::default();
    positions.set("trader-1", "mkt-btc-dai", -2.0);

    let a = price_stop(Side::Buy, TriggerDirection::RisesAbove, 103.0);
    let b = price_stop(Side::Buy, TriggerDirection::RisesAbove, 105.0);
    let (id_a, id_b) = engine.submit_oco(a, b, t0()).unwrap();

    engine.on_tick(&mkt(), &tick(1, 110.0), &mut venue, &positions);
    assert_eq!(engine.get(&id_a).unwrap().status, StopOrderStatus::TriggeredOco);
    assert_eq!(engine.get(&id_b).unwrap().status, StopOrderStatus::TriggeredOco);
    assert_eq!(venue.received.len(), 2);
}

#[test]
fn oco_legs_must_share_market_and_party() {
    let mut engine = engine_at(101.0);
    let other = MarketId::new("mkt-eth-dai");
    engine.add_market(Market::new(other.clone(), "ETH:DAI_2023Futr", 2));

    let a = price_stop(Side::Buy, TriggerDirection::RisesAbove, 103.0);
    let mut b = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    b.market = other;
    assert!(matches!(
        engine.submit_oco(a, b, t0()),
        Err(SubmitError::OcoMarketMismatch)
    ));

    let a = price_stop(Side::Buy, TriggerDirection::RisesAbove, 103.0);
    let mut b = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    b.party = PartyId::new("trader-2");
    assert!(matches!(
        engine.submit_oco(a, b, t0()),
        Err(SubmitError::OcoPartyMismatch)
    ));
}

// ── Expiry ───────────────────────────────────────────────────────────

#[test]
fn expiry_cancel_strategy_expires_at_the_expiry_tick() {
    let mut engine = engine_at(105.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", 5.0);

    let expiry = t0() + Duration::days(1);
    let mut submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 90.0);
    submission.expiry = Some(expiry);
    submission.expiry_strategy = ExpiryStrategy::Cancel;
    let id = engine.submit(submission, t0()).unwrap();

    // One second before expiry: still pending.
    engine.on_tick(
        &mkt(),
        &Tick::new(expiry - Duration::seconds(1), 105.0),
        &mut venue,
        &positions,
    );
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Pending);

    // At the expiry timestamp: expired, nothing reaches the venue.
    engine.on_tick(&mkt(), &Tick::new(expiry, 105.0), &mut venue, &positions);
    let order = engine.get(&id).unwrap();
    assert_eq!(order.status, StopOrderStatus::Expired);
    assert_eq!(order.updated_at, expiry);
    assert!(venue.received.is_empty());
}

#[test]
fn expiry_submit_strategy_fires_at_expiry() {
    let mut engine = engine_at(105.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", 5.0);

    let expiry = t0() + Duration::hours(2);
    let mut submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 90.0);
    submission.expiry = Some(expiry);
    submission.expiry_strategy = ExpiryStrategy::Submit;
    let id = engine.submit(submission, t0()).unwrap();

    engine.on_tick(&mkt(), &Tick::new(expiry, 105.0), &mut venue, &positions);
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Triggered);
    assert_eq!(venue.received.len(), 1);
}

#[test]
fn trigger_takes_precedence_over_expiry_in_the_same_pass() {
    let mut engine = engine_at(105.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", 5.0);

    let expiry = t0() + Duration::hours(1);
    let mut submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    submission.expiry = Some(expiry);
    submission.expiry_strategy = ExpiryStrategy::Cancel;
    let id = engine.submit(submission, t0()).unwrap();

    // The tick both satisfies the trigger and reaches the expiry.
    engine.on_tick(&mkt(), &Tick::new(expiry, 101.0), &mut venue, &positions);
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Triggered);
}

// ── Trailing triggers ────────────────────────────────────────────────

#[test]
fn trailing_stop_fires_after_retreat_from_high_water_mark() {
    let mut engine = engine_at(100.0);
    let mut venue = TestVenue::default();
    let positions = TestPositions::with("trader-1", "mkt-btc-dai", 5.0);

    let mut submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 0.0);
    submission.trigger = Trigger::TrailingPercent {
        direction: TriggerDirection::FallsBelow,
        offset: 0.05,
    };
    let id = engine.submit(submission, t0()).unwrap();
    // Reference seeded from the submission-time mark.
    assert_eq!(engine.get(&id).unwrap().trail_reference, Some(100.0));

    // Rally ratchets the reference to 110.
    engine.on_tick(&mkt(), &tick(1, 110.0), &mut venue, &positions);
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Pending);
    assert_eq!(engine.get(&id).unwrap().trail_reference, Some(110.0));

    // 4% retreat: not enough.
    engine.on_tick(&mkt(), &tick(2, 105.6), &mut venue, &positions);
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Pending);

    // 5% retreat from the high-water mark: fires.
    engine.on_tick(&mkt(), &tick(3, 104.5), &mut venue, &positions);
    assert_eq!(engine.get(&id).unwrap().status, StopOrderStatus::Triggered);
}

// ── Audit trail ──────────────────────────────────────────────────────

#[test]
fn audit_trail_shows_exactly_one_transition_per_order() {
    let mut engine = engine_at(101.0);
    let mut venue = TestVenue::default();
    let mut positions = TestPositions::default();
    positions.set("trader-1", "mkt-btc-dai", -3.0);

    let a = price_stop(Side::Buy, TriggerDirection::RisesAbove, 103.0);
    let b = price_stop(Side::Sell, TriggerDirection::FallsBelow, 99.0);
    let (id_a, id_b) = engine.submit_oco(a, b, t0()).unwrap();

    engine.on_tick(&mkt(), &tick(1, 103.0), &mut venue, &positions);
    engine.on_tick(&mkt(), &tick(2, 98.0), &mut venue, &positions);

    let trail = engine.audit_trail();
    assert_eq!(trail.len(), 2);
    assert_eq!(
        trail.iter().filter(|e| e.order_id == id_a).count(),
        1,
        "one transition for the triggered leg"
    );
    assert_eq!(
        trail.iter().filter(|e| e.order_id == id_b).count(),
        1,
        "one transition for the stopped leg"
    );
    assert_eq!(trail[0].to_status, StopOrderStatus::TriggeredOco);
    assert_eq!(trail[1].to_status, StopOrderStatus::StoppedOco);
}

// ── Validation and market registration ───────────────────────────────

#[test]
fn unknown_market_is_rejected() {
    let mut engine = engine();
    let mut submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    submission.market = MarketId::new("mkt-nowhere");
    assert!(matches!(
        engine.submit(submission, t0()),
        Err(SubmitError::UnknownMarket(_))
    ));
}

#[test]
fn invalid_submission_never_becomes_a_stop_order() {
    let mut engine = engine_at(105.0);
    let mut submission = price_stop(Side::Sell, TriggerDirection::FallsBelow, 102.0);
    submission.size = 0.0;
    assert!(matches!(
        engine.submit(submission, t0()),
        Err(SubmitError::Validation(_))
    ));
    assert!(engine
        .stop_orders(&PartyId::new("trader-1"), None)
        .is_empty());
}
