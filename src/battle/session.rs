//! Duel session state: health, casting reserves, transient strike effects.
//!
//! Everything here is plain Rust so native `cargo test` can drive whole
//! duels; the browser module in `battle` owns the timers and the canvas and
//! calls in at the scheduled moments.

use crate::bolt::{self, Bolt, Color, Lcg, Point};

pub const FULL_HEALTH: f64 = 100.0;
/// Spacing between the staggered hits of a multi-hit attack.
pub const HIT_SPACING_MS: f64 = 140.0;
/// Pause between a player attack and the rival's answer.
pub const COUNTER_DELAY_MS: f64 = 900.0;
/// Short beat between picking the counter and its bolt landing.
pub const COUNTER_BOLT_DELAY_MS: f64 = 50.0;
/// Damage of the rival's fallback arc once every reserve is spent.
pub const FADING_DAMAGE: f64 = 3.0;

const ATTACK_FLASH: f64 = 0.2;
const ATTACK_SHAKE: f64 = 8.0;
const COUNTER_FLASH: f64 = 0.25;
const COUNTER_SHAKE: f64 = 12.0;
const FLASH_DECAY: f64 = 0.05;
const SHAKE_DECAY: f64 = 1.0;

pub const PLAYER_BOLT_COLOR: Color = Color { r: 120, g: 200, b: 255 };
const FADING_COLOR: Color = Color { r: 150, g: 150, b: 160 };

/// Player attack categories, mapped from answered prompts by the quiz.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackKind {
    /// One heavy hit.
    Strike,
    /// Two medium hits.
    Twin,
    /// Three quick hits.
    Volley,
}

impl AttackKind {
    pub fn hits(self) -> u32 {
        match self {
            AttackKind::Strike => 1,
            AttackKind::Twin => 2,
            AttackKind::Volley => 3,
        }
    }

    pub fn damage_per_hit(self) -> f64 {
        match self {
            AttackKind::Strike => 25.0,
            AttackKind::Twin => 10.0,
            AttackKind::Volley => 20.0 / 3.0,
        }
    }
}

/// One scheduled hit of an attack, relative to the moment it was launched.
pub struct HitPlan {
    pub delay_ms: f64,
    pub damage: f64,
}

pub fn plan_attack(kind: AttackKind) -> Vec<HitPlan> {
    (0..kind.hits())
        .map(|i| HitPlan {
            delay_ms: i as f64 * HIT_SPACING_MS,
            damage: kind.damage_per_hit(),
        })
        .collect()
}

/// A depletable counter-attack reserve. Exhausted reserves are skipped when
/// the rival picks its answer; the pick is uniform over the open ones
/// regardless of remaining charge.
pub struct Reserve {
    pub name: &'static str,
    pub charge: f64,
    pub cost: f64,
    pub damage: f64,
    pub color: Color,
}

impl Reserve {
    pub fn exhausted(&self) -> bool {
        self.charge <= 0.0
    }
}

fn starting_reserves() -> [Reserve; 3] {
    [
        Reserve { name: "ember", charge: 30.0, cost: 10.0, damage: 12.0, color: Color { r: 255, g: 140, b: 80 } },
        Reserve { name: "gale", charge: 28.0, cost: 7.0, damage: 8.0, color: Color { r: 140, g: 230, b: 160 } },
        Reserve { name: "frost", charge: 24.0, cost: 12.0, damage: 15.0, color: Color { r: 170, g: 220, b: 255 } },
    ]
}

/// Resolved rival counter, handed to the glue so the bolt can land after
/// [`COUNTER_BOLT_DELAY_MS`]. `reserve` is `None` on the fallback arc.
#[derive(Clone, Copy, Debug)]
pub struct CounterPlan {
    pub damage: f64,
    pub color: Color,
    pub reserve: Option<&'static str>,
}

/// Live strike collection plus full-screen flash and shake intensities.
/// All three decay toward zero once per rendered frame.
pub struct EffectState {
    /// Insertion order = z-order, oldest first.
    pub bolts: Vec<Bolt>,
    pub flash: f64,
    pub shake: f64,
}

impl EffectState {
    fn new() -> Self {
        Self { bolts: Vec::new(), flash: 0.0, shake: 0.0 }
    }

    /// Apply one frame of decay and drop fully faded bolts.
    pub fn advance_frame(&mut self) {
        if self.flash > 0.0 {
            self.flash = (self.flash - FLASH_DECAY).max(0.0);
        }
        if self.shake > 0.0 {
            self.shake = (self.shake - SHAKE_DECAY).max(0.0);
        }
        for bolt in &mut self.bolts {
            bolt.fade();
        }
        self.bolts.retain(|b| !b.faded());
    }

    /// Fresh random translation for this frame, in `[-shake/2, +shake/2]`
    /// per axis.
    pub fn shake_offset(&self, rng: &mut Lcg) -> (f64, f64) {
        if self.shake <= 0.0 {
            return (0.0, 0.0);
        }
        (
            (rng.next_f64() - 0.5) * self.shake,
            (rng.next_f64() - 0.5) * self.shake,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

/// One duel. Health pools only ever go down; the first pool to hit zero
/// fixes the outcome and every later damage event is a no-op.
pub struct BattleSession {
    pub player_health: f64,
    pub rival_health: f64,
    pub reserves: [Reserve; 3],
    pub phase: Phase,
    pub fx: EffectState,
    pub rng: Lcg,
}

impl BattleSession {
    pub fn new(seed: u64) -> Self {
        Self {
            player_health: FULL_HEALTH,
            rival_health: FULL_HEALTH,
            reserves: starting_reserves(),
            phase: Phase::Playing,
            fx: EffectState::new(),
            rng: Lcg::new(seed),
        }
    }

    pub fn active(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Land one hit of a player attack: strike bolts from `from` to `to`,
    /// screen kick, and rival damage.
    pub fn land_player_hit(&mut self, from: Point, to: Point, damage: f64) {
        if !self.active() {
            return;
        }
        let burst = bolt::spawn(from, to, PLAYER_BOLT_COLOR, &mut self.rng);
        self.fx.bolts.extend(burst);
        self.fx.flash = ATTACK_FLASH;
        self.fx.shake = ATTACK_SHAKE;
        self.rival_health = (self.rival_health - damage).max(0.0);
        if self.rival_health <= 0.0 {
            self.phase = Phase::Won;
        }
    }

    /// Pick the rival's counter: drain one open reserve, or fall back to
    /// the weak fading arc once every reserve is spent. Returns `None` when
    /// the duel is already decided.
    pub fn resolve_counter(&mut self) -> Option<CounterPlan> {
        if !self.active() || self.rival_health <= 0.0 {
            return None;
        }
        let open: Vec<usize> = self
            .reserves
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.exhausted())
            .map(|(i, _)| i)
            .collect();
        if open.is_empty() {
            return Some(CounterPlan {
                damage: FADING_DAMAGE,
                color: FADING_COLOR,
                reserve: None,
            });
        }
        let pick = open[(self.rng.next_f64() * open.len() as f64) as usize % open.len()];
        let reserve = &mut self.reserves[pick];
        reserve.charge = (reserve.charge - reserve.cost).max(0.0);
        Some(CounterPlan {
            damage: reserve.damage,
            color: reserve.color,
            reserve: Some(reserve.name),
        })
    }

    /// Land the rival's counter bolt and damage the player.
    pub fn land_counter_hit(&mut self, from: Point, to: Point, plan: &CounterPlan) {
        if !self.active() {
            return;
        }
        let burst = bolt::spawn(from, to, plan.color, &mut self.rng);
        self.fx.bolts.extend(burst);
        self.fx.flash = COUNTER_FLASH;
        self.fx.shake = COUNTER_SHAKE;
        self.player_health = (self.player_health - plan.damage).max(0.0);
        if self.player_health <= 0.0 {
            self.phase = Phase::Lost;
        }
    }
}

/// Width of a health pool's bar fill, e.g. `"75%"` at 75 health.
pub fn health_percent(health: f64) -> String {
    format!("{:.0}%", health)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors() -> (Point, Point) {
        (Point::new(120.0, 270.0), Point::new(840.0, 270.0))
    }

    #[test]
    fn attack_plans_stagger_hits() {
        let plan = plan_attack(AttackKind::Volley);
        let delays: Vec<f64> = plan.iter().map(|h| h.delay_ms).collect();
        assert_eq!(delays, vec![0.0, 140.0, 280.0]);
        let total: f64 = plan.iter().map(|h| h.damage).sum();
        assert!((total - 20.0).abs() < 1e-9);
    }

    #[test]
    fn hit_sets_effects_and_damages_rival() {
        let mut session = BattleSession::new(11);
        let (from, to) = anchors();
        session.land_player_hit(from, to, 25.0);
        assert_eq!(session.rival_health, 75.0);
        assert!(!session.fx.bolts.is_empty());
        assert_eq!(session.fx.bolts[0].depth, 0);
        assert_eq!(session.fx.flash, 0.2);
        assert_eq!(session.fx.shake, 8.0);
    }

    #[test]
    fn decay_drains_everything_without_overshoot() {
        let mut session = BattleSession::new(21);
        let (from, to) = anchors();
        session.land_player_hit(from, to, 5.0);
        for _ in 0..13 {
            session.fx.advance_frame();
        }
        assert!(session.fx.bolts.is_empty());
        assert_eq!(session.fx.flash, 0.0);
        assert_eq!(session.fx.shake, 0.0);
    }

    #[test]
    fn damage_is_clamped_and_terminal() {
        let mut session = BattleSession::new(5);
        let (from, to) = anchors();
        session.land_player_hit(from, to, 1000.0);
        assert_eq!(session.rival_health, 0.0);
        assert_eq!(session.phase, Phase::Won);
        // later events are no-ops once the duel is decided
        session.land_player_hit(from, to, 50.0);
        assert_eq!(session.rival_health, 0.0);
        let plan = CounterPlan { damage: 10.0, color: PLAYER_BOLT_COLOR, reserve: None };
        session.land_counter_hit(to, from, &plan);
        assert_eq!(session.player_health, FULL_HEALTH);
    }

    #[test]
    fn counter_drains_one_reserve() {
        let mut session = BattleSession::new(17);
        let before: f64 = session.reserves.iter().map(|r| r.charge).sum();
        let plan = session.resolve_counter().unwrap();
        let name = plan.reserve.expect("open reserves should be drained first");
        let drained = session.reserves.iter().find(|r| r.name == name).unwrap();
        assert_eq!(plan.damage, drained.damage);
        let after: f64 = session.reserves.iter().map(|r| r.charge).sum();
        assert_eq!(before - after, drained.cost);
    }

    #[test]
    fn reserve_charge_floors_at_zero() {
        let mut session = BattleSession::new(2);
        for reserve in &mut session.reserves {
            reserve.charge = reserve.cost / 2.0;
        }
        for _ in 0..3 {
            session.resolve_counter().unwrap();
        }
        for reserve in &session.reserves {
            assert_eq!(reserve.charge, 0.0);
        }
    }

    #[test]
    fn exhausted_reserves_force_fading_arc() {
        let mut session = BattleSession::new(13);
        for reserve in &mut session.reserves {
            reserve.charge = 0.0;
        }
        let plan = session.resolve_counter().unwrap();
        assert!(plan.reserve.is_none());
        assert_eq!(plan.damage, FADING_DAMAGE);
        assert_eq!(plan.color, FADING_COLOR);
    }

    #[test]
    fn counter_hit_uses_counter_intensities() {
        let mut session = BattleSession::new(31);
        let (from, to) = anchors();
        let plan = session.resolve_counter().unwrap();
        session.land_counter_hit(to, from, &plan);
        assert_eq!(session.fx.flash, 0.25);
        assert_eq!(session.fx.shake, 12.0);
        assert!(session.player_health < FULL_HEALTH);
    }

    #[test]
    fn shake_offset_stays_in_half_range() {
        let mut session = BattleSession::new(41);
        session.fx.shake = 12.0;
        let mut rng = Lcg::new(77);
        for _ in 0..200 {
            let (ox, oy) = session.fx.shake_offset(&mut rng);
            assert!(ox.abs() <= 6.0);
            assert!(oy.abs() <= 6.0);
        }
        session.fx.shake = 0.0;
        assert_eq!(session.fx.shake_offset(&mut rng), (0.0, 0.0));
    }

    #[test]
    fn health_percent_formats_bar_width() {
        assert_eq!(health_percent(75.0), "75%");
        assert_eq!(health_percent(100.0), "100%");
        assert_eq!(health_percent(0.0), "0%");
    }
}
