//! Procedural lightning geometry.
//!
//! [`spawn`] turns a pair of endpoints into a jittered polyline plus a
//! bounded tree of thinner branch bolts, returned as one flattened list
//! (primary strike first, descendants after). All randomness flows through
//! the caller's [`Lcg`], so a seeded strike is reproducible under test.

/// Branches stop spawning once a bolt sits at this depth.
const MAX_BRANCH_DEPTH: u8 = 2;
/// Chance that an interior point of a bolt sprouts a branch.
const BRANCH_CHANCE: f64 = 0.15;
/// Lateral jitter amplitude as a fraction of strike length.
const JITTER_SCALE: f64 = 0.15;
/// Fixed vertical jitter amplitude in pixels.
const JITTER_RISE: f64 = 30.0;
/// Branch endpoints land within +-150 px of their origin on each axis.
const BRANCH_SPREAD: f64 = 300.0;
/// One jitter point roughly every 25 px of strike length.
const SEGMENT_PITCH: f64 = 25.0;
/// Never fewer jitter segments than this, however short the strike.
const MIN_SEGMENTS: usize = 6;
/// Opacity lost per rendered frame; a fresh bolt survives 13 frames.
pub const OPACITY_DECAY: f64 = 0.08;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Base stroke color of a bolt. The glow pass uses it as-is; the core pass
/// lifts it most of the way toward white.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn glow_style(&self, alpha: f64) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, alpha)
    }

    pub fn core_style(&self, alpha: f64) -> String {
        let lift = |c: u8| (c as f64 + (255.0 - c as f64) * 0.7).round() as u8;
        format!(
            "rgba({},{},{},{:.3})",
            lift(self.r),
            lift(self.g),
            lift(self.b),
            alpha
        )
    }
}

/// One lightning strike: a jittered polyline fading out over 13 frames.
/// Only `opacity` ever changes after construction.
pub struct Bolt {
    pub start: Point,
    pub end: Point,
    /// Consecutive line pieces; insertion order = draw order.
    pub segments: Vec<(Point, Point)>,
    pub opacity: f64,
    /// 0 = primary strike, >0 = branch spawned that many levels down.
    pub depth: u8,
    pub color: Color,
    pub base_width: f64,
}

impl Bolt {
    pub fn fade(&mut self) {
        self.opacity -= OPACITY_DECAY;
    }

    pub fn faded(&self) -> bool {
        self.opacity <= 0.0
    }
}

/// Linear congruential generator yielding uniform floats in `[0, 1)`.
/// Not crypto grade; the duel only needs visual jitter and fair picks.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        ((self.state >> 16) & 0xffff_ffff) as f64 / 4_294_967_296.0
    }
}

/// Generate a strike from `start` to `end` plus any branches it sprouts,
/// flattened so each parent precedes its descendants.
///
/// The first polyline point is exactly `start` and the last exactly `end`;
/// a zero-length strike is legal and collapses to jitter around one point.
pub fn spawn(start: Point, end: Point, color: Color, rng: &mut Lcg) -> Vec<Bolt> {
    let mut out = Vec::new();
    grow(start, end, 0, color, rng, &mut out);
    out
}

fn grow(start: Point, end: Point, depth: u8, color: Color, rng: &mut Lcg, out: &mut Vec<Bolt>) {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let distance = (dx * dx + dy * dy).sqrt();
    let segment_count = ((distance / SEGMENT_PITCH).floor() as usize).max(MIN_SEGMENTS);

    let mut points: Vec<Point> = Vec::with_capacity(segment_count + 1);
    let mut branch_seeds: Vec<Point> = Vec::new();
    for i in 0..=segment_count {
        let point = if i == 0 {
            start
        } else if i == segment_count {
            end
        } else {
            let progress = i as f64 / segment_count as f64;
            Point {
                x: start.x + dx * progress + (rng.next_f64() - 0.5) * distance * JITTER_SCALE,
                y: start.y + dy * progress + (rng.next_f64() - 0.5) * JITTER_RISE,
            }
        };
        points.push(point);
        if i > 0 && i < segment_count && depth < MAX_BRANCH_DEPTH && rng.next_f64() < BRANCH_CHANCE
        {
            branch_seeds.push(point);
        }
    }

    let segments: Vec<(Point, Point)> = points.windows(2).map(|w| (w[0], w[1])).collect();
    out.push(Bolt {
        start,
        end,
        segments,
        opacity: 1.0,
        depth,
        color,
        base_width: width_for(depth),
    });

    for seed in branch_seeds {
        let target = Point {
            x: seed.x + (rng.next_f64() - 0.5) * BRANCH_SPREAD,
            y: seed.y + (rng.next_f64() - 0.5) * BRANCH_SPREAD,
        };
        grow(seed, target, depth + 1, color, rng, out);
    }
}

fn width_for(depth: u8) -> f64 {
    if depth == 0 {
        8.0 * 0.6
    } else {
        (3.0 - depth as f64) * 0.6
    }
}
