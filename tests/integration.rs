// Integration tests (native) for the `storm-spell` crate.
// These tests avoid wasm-specific functionality and exercise pure Rust logic so
// they can run under `cargo test` on the host. They walk whole duels the way
// the browser glue would, minus the real timers: hits land in the order the
// timeouts would fire.

use storm_spell::battle::session::{
    AttackKind, BattleSession, FADING_DAMAGE, FULL_HEALTH, Phase, health_percent, plan_attack,
};
use storm_spell::bolt::Point;

fn anchors() -> (Point, Point) {
    (Point::new(140.0, 280.0), Point::new(820.0, 280.0))
}

#[test]
fn single_strike_leaves_seventy_five_and_one_live_strike() {
    let mut session = BattleSession::new(101);
    let (player, rival) = anchors();
    let plan = plan_attack(AttackKind::Strike);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].delay_ms, 0.0);
    session.land_player_hit(player, rival, plan[0].damage);

    assert_eq!(session.rival_health, 75.0);
    assert_eq!(health_percent(session.rival_health), "75%");
    // at least the primary strike is live; branches may ride along
    assert!(!session.fx.bolts.is_empty());
    assert_eq!(session.fx.bolts[0].depth, 0);
}

#[test]
fn volley_lands_three_hits_at_140ms_spacing_for_twenty_damage() {
    let mut session = BattleSession::new(202);
    let (player, rival) = anchors();
    let plan = plan_attack(AttackKind::Volley);
    let delays: Vec<f64> = plan.iter().map(|h| h.delay_ms).collect();
    assert_eq!(delays, vec![0.0, 140.0, 280.0]);

    for hit in &plan {
        session.land_player_hit(player, rival, hit.damage);
    }
    assert!((session.rival_health - 80.0).abs() < 1e-9);
}

#[test]
fn repeated_frames_drain_the_strike_collection() {
    let mut session = BattleSession::new(303);
    let (player, rival) = anchors();
    session.land_player_hit(player, rival, 10.0);
    assert!(!session.fx.bolts.is_empty());
    for _ in 0..13 {
        session.fx.advance_frame();
    }
    assert!(session.fx.bolts.is_empty());
    assert_eq!(session.fx.flash, 0.0);
    assert_eq!(session.fx.shake, 0.0);
}

#[test]
fn damage_never_underflows_or_resurrects() {
    let mut session = BattleSession::new(404);
    let (player, rival) = anchors();
    for _ in 0..10 {
        session.land_player_hit(player, rival, 15.0);
    }
    assert_eq!(session.rival_health, 0.0);
    assert_eq!(session.phase, Phase::Won);
    assert_eq!(session.player_health, FULL_HEALTH);
}

#[test]
fn exhausting_every_reserve_forces_the_fading_arc() {
    let mut session = BattleSession::new(505);
    // ember: 3 uses, gale: 4 uses, frost: 2 uses -> nine draining counters
    for _ in 0..9 {
        let plan = session.resolve_counter().expect("duel still live");
        assert!(plan.reserve.is_some());
    }
    assert!(session.reserves.iter().all(|r| r.exhausted()));

    let fallback = session.resolve_counter().expect("duel still live");
    assert!(fallback.reserve.is_none());
    assert_eq!(fallback.damage, FADING_DAMAGE);
}

#[test]
fn full_duel_round_trip() {
    let mut session = BattleSession::new(606);
    let (player, rival) = anchors();

    // player opens with a twin attack
    for hit in plan_attack(AttackKind::Twin) {
        session.land_player_hit(player, rival, hit.damage);
    }
    assert_eq!(session.rival_health, 80.0);

    // rival answers from a reserve
    let counter = session.resolve_counter().expect("rival still standing");
    session.land_counter_hit(rival, player, &counter);
    assert!((FULL_HEALTH - session.player_health - counter.damage).abs() < 1e-9);
    assert_eq!(session.phase, Phase::Playing);

    // once the duel is decided, a late counter is a no-op
    session.land_player_hit(player, rival, 1000.0);
    assert_eq!(session.phase, Phase::Won);
    let health_after_win = session.player_health;
    if let Some(plan) = session.resolve_counter() {
        session.land_counter_hit(rival, player, &plan);
    }
    assert_eq!(session.player_health, health_after_win);
}
