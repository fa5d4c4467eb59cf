//! Duel screen: canvas, DOM overlays, input, and attack scheduling.
//!
//! The session arithmetic lives in [`session`]; this module owns everything
//! browser-shaped. Strike hits and rival counters are one-shot timeouts whose
//! ids are recorded on the screen state so `stop_battle_mode()` can cancel
//! them; every callback also re-checks the session phase before mutating
//! anything, since a timeout may fire after the duel is decided.

use std::cell::Cell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, window};

pub mod session;

use crate::bolt::{Bolt, Point};
use crate::quiz;
use session::{AttackKind, BattleSession, Phase};

const CANVAS_W: u32 = 960;
const CANVAS_H: u32 = 540;
const CORRECT_SCORE: i64 = 150;

/// Everything the duel screen owns, including the handles needed to tear
/// the event-loop plumbing down again.
struct BattleScreen {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    session: BattleSession,
    word: (&'static str, &'static str),
    typing: String,
    score: i64,
    pending_timers: Vec<i32>,
    raf_handle: Option<i32>,
}

thread_local! {
    static BATTLE: std::cell::RefCell<Option<BattleScreen>> = std::cell::RefCell::new(None);
    static KEY_LISTENER_INSTALLED: Cell<bool> = const { Cell::new(false) };
}

pub fn start_battle_mode() -> Result<(), JsValue> {
    // A fresh duel always starts from a torn-down screen so only one frame
    // loop is ever running.
    stop_battle_mode()?;

    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Create / reuse the duel canvas
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id("ss-duel-canvas") {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id("ss-duel-canvas");
        c.set_width(CANVAS_W);
        c.set_height(CANVAS_H);
        c.set_attribute("style", "position:fixed; left:50%; top:42%; transform:translate(-50%,-50%); box-shadow:0 0 32px 0 rgba(0,0,0,0.25); border-radius:18px; border:2px solid #222; background:#0b0e16; z-index:20;").ok();
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    let ctx: CanvasRenderingContext2d = canvas.get_context("2d")?.unwrap().dyn_into()?;
    ctx.set_text_align("center");

    ensure_overlays(&doc)?;

    let mut session = BattleSession::new(fresh_seed());
    let word = quiz::pick_word(&mut session.rng);
    let screen = BattleScreen {
        canvas,
        ctx,
        session,
        word,
        typing: String::new(),
        score: 0,
        pending_timers: Vec::new(),
        raf_handle: None,
    };
    BATTLE.with(|b| b.replace(Some(screen)));

    install_key_listener(&doc)?;
    start_frame_loop();
    Ok(())
}

/// Cancel the frame loop and every outstanding one-shot timer, then drop
/// the screen state. Overlay elements stay in the DOM for reuse.
pub fn stop_battle_mode() -> Result<(), JsValue> {
    let handles = BATTLE.with(|cell| {
        cell.borrow_mut()
            .take()
            .map(|screen| (screen.pending_timers, screen.raf_handle))
    });
    if let Some((timers, raf)) = handles {
        if let Some(win) = window() {
            for id in timers {
                win.clear_timeout_with_handle(id);
            }
            if let Some(id) = raf {
                win.cancel_animation_frame(id).ok();
            }
        }
    }
    Ok(())
}

// --- Overlays ----------------------------------------------------------------

fn ensure_overlays(doc: &Document) -> Result<(), JsValue> {
    ensure_div(doc, "ss-player-avatar", "position:fixed; left:50%; top:46%; transform:translate(calc(-50% - 360px), -50%); font-size:64px; pointer-events:none; z-index:30;", Some("\u{1f9d9}"))?;
    ensure_div(doc, "ss-rival-avatar", "position:fixed; left:50%; top:46%; transform:translate(calc(-50% + 360px), -50%); font-size:64px; pointer-events:none; z-index:30;", Some("\u{1f409}"))?;
    ensure_health_bar(doc, "ss-player-health-rail", "ss-player-health", "calc(-50% - 280px)", "#4ade80")?;
    ensure_health_bar(doc, "ss-rival-health-rail", "ss-rival-health", "calc(-50% + 280px)", "#f87171")?;
    ensure_div(doc, "ss-prompt", "position:fixed; top:8%; left:50%; transform:translateX(-50%); font-family:'Fira Code', monospace; font-size:22px; padding:6px 14px; background:rgba(0,0,0,0.4); border:1px solid #333; border-radius:8px; color:#ffd166; z-index:45;", Some(""))?;
    ensure_div(doc, "ss-typing", "position:fixed; bottom:120px; left:50%; transform:translateX(-50%); font-family:'Fira Code', monospace; font-size:20px; padding:4px 10px; background:rgba(0,0,0,0.35); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:30;", Some(""))?;
    ensure_div(doc, "ss-score", "position:fixed; top:10px; left:12px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45; letter-spacing:0.5px;", Some("Score: 0"))?;
    ensure_div(doc, "ss-reserves", "position:fixed; top:10px; right:12px; font-family:'Fira Code', monospace; font-size:13px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#b0c4d8; z-index:45;", Some(""))?;
    Ok(())
}

fn ensure_div(doc: &Document, id: &str, style: &str, text: Option<&str>) -> Result<(), JsValue> {
    if doc.get_element_by_id(id).is_some() {
        return Ok(());
    }
    let div = doc.create_element("div")?;
    div.set_id(id);
    if let Some(t) = text {
        div.set_text_content(Some(t));
    }
    div.set_attribute("style", style).ok();
    if let Some(body) = doc.body() {
        body.append_child(&div)?;
    }
    Ok(())
}

fn ensure_health_bar(
    doc: &Document,
    rail_id: &str,
    fill_id: &str,
    shift: &str,
    color: &str,
) -> Result<(), JsValue> {
    if doc.get_element_by_id(rail_id).is_some() {
        return Ok(());
    }
    let rail = doc.create_element("div")?;
    rail.set_id(rail_id);
    rail.set_attribute(
        "style",
        &format!("position:fixed; left:50%; top:16%; transform:translateX({shift}); width:220px; height:14px; background:rgba(0,0,0,0.5); border:1px solid #333; border-radius:6px; overflow:hidden; z-index:40;"),
    )
    .ok();
    let fill = doc.create_element("div")?;
    fill.set_id(fill_id);
    fill.set_attribute("style", &health_fill_style(session::FULL_HEALTH, color))
        .ok();
    rail.append_child(&fill)?;
    if let Some(body) = doc.body() {
        body.append_child(&rail)?;
    }
    Ok(())
}

fn health_fill_style(health: f64, color: &str) -> String {
    format!(
        "position:absolute; left:0; top:0; bottom:0; width:{}; background:{color}; border-radius:5px;",
        session::health_percent(health)
    )
}

/// Transient notification, removed again by a one-shot timer.
fn toast(message: &str) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    let Ok(div) = doc.create_element("div") else {
        return;
    };
    div.set_text_content(Some(message));
    div.set_attribute("style", "position:fixed; top:64px; left:50%; transform:translateX(-50%); font-family:'Fira Code', monospace; font-size:16px; padding:6px 14px; background:rgba(0,0,0,0.6); border:1px solid #444; border-radius:8px; color:#ff9f9f; z-index:50;").ok();
    if let Some(body) = doc.body() {
        body.append_child(&div).ok();
    }
    let el = div.clone();
    let _ = schedule(1400, move || el.remove());
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

// --- Input -------------------------------------------------------------------

enum Commit {
    Attack(AttackKind),
    Miss(&'static str),
}

fn install_key_listener(doc: &Document) -> Result<(), JsValue> {
    if KEY_LISTENER_INSTALLED.with(|c| c.get()) {
        return Ok(());
    }
    let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
        let committed = BATTLE.with(|cell| {
            let mut borrow = cell.borrow_mut();
            let Some(screen) = borrow.as_mut() else {
                return None;
            };
            let key = evt.key();
            if key == "Escape" {
                screen.typing.clear();
            } else if key == "Backspace" {
                screen.typing.pop();
            } else if key == "Enter" {
                if screen.typing.is_empty() || !screen.session.active() {
                    screen.typing.clear();
                    return None;
                }
                let typed = std::mem::take(&mut screen.typing);
                let (prompt, answer) = screen.word;
                if quiz::check_answer(&typed, answer) {
                    screen.score += CORRECT_SCORE;
                    screen.word = quiz::pick_word(&mut screen.session.rng);
                    return Some(Commit::Attack(quiz::attack_for_prompt(prompt)));
                }
                return Some(Commit::Miss(answer));
            } else if key.len() == 1 {
                let c = key.chars().next().unwrap();
                if c.is_ascii_alphabetic() {
                    screen.typing.push(c.to_ascii_lowercase());
                }
            }
            None
        });
        match committed {
            Some(Commit::Attack(kind)) => {
                if launch_attack(kind).is_err() {
                    warn("attack scheduling failed");
                }
            }
            Some(Commit::Miss(answer)) => toast(&format!("miss \u{2014} {answer}")),
            None => {}
        }
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    KEY_LISTENER_INSTALLED.with(|c| c.set(true));
    Ok(())
}

// --- Attack scheduling -------------------------------------------------------

/// Queue a one-shot callback and record its timer id for teardown.
fn schedule(delay_ms: i32, callback: impl FnOnce() + 'static) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let cb = Closure::once(callback);
    let id = win
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), delay_ms)?;
    cb.forget();
    BATTLE.with(|cell| {
        if let Some(screen) = cell.borrow_mut().as_mut() {
            screen.pending_timers.push(id);
        }
    });
    Ok(())
}

fn launch_attack(kind: AttackKind) -> Result<(), JsValue> {
    for hit in session::plan_attack(kind) {
        if hit.delay_ms <= 0.0 {
            fire_player_hit(hit.damage);
        } else {
            schedule(hit.delay_ms as i32, move || fire_player_hit(hit.damage))?;
        }
    }
    schedule(session::COUNTER_DELAY_MS as i32, fire_counter)?;
    Ok(())
}

fn fire_player_hit(damage: f64) {
    BATTLE.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(screen) = borrow.as_mut() else {
            return;
        };
        if !screen.session.active() {
            return;
        }
        match strike_anchors(&screen.canvas) {
            Some((player, rival)) => screen.session.land_player_hit(player, rival, damage),
            None => warn("duel anchors missing; hit dropped"),
        }
    });
}

fn fire_counter() {
    // Resolve the reserve now; the bolt lands a short beat later.
    let plan = BATTLE.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .and_then(|screen| screen.session.resolve_counter())
    });
    let Some(plan) = plan else {
        return;
    };
    let result = schedule(session::COUNTER_BOLT_DELAY_MS as i32, move || {
        BATTLE.with(|cell| {
            let mut borrow = cell.borrow_mut();
            let Some(screen) = borrow.as_mut() else {
                return;
            };
            if !screen.session.active() {
                return;
            }
            match strike_anchors(&screen.canvas) {
                Some((player, rival)) => screen.session.land_counter_hit(rival, player, &plan),
                None => warn("duel anchors missing; counter dropped"),
            }
        });
    });
    if result.is_err() {
        warn("counter scheduling failed");
    }
}

/// Avatar centers in canvas space, looked up fresh at every firing so the
/// bolts track layout changes. `None` when either anchor is gone.
fn strike_anchors(canvas: &HtmlCanvasElement) -> Option<(Point, Point)> {
    let doc = window()?.document()?;
    let frame = canvas.get_bounding_client_rect();
    let center = |id: &str| -> Option<Point> {
        let rect = doc.get_element_by_id(id)?.get_bounding_client_rect();
        Some(Point {
            x: rect.left() + rect.width() / 2.0 - frame.left(),
            y: rect.top() + rect.height() / 2.0 - frame.top(),
        })
    };
    Some((center("ss-player-avatar")?, center("ss-rival-avatar")?))
}

/// Seed for the duel RNG: crypto bytes behind the `rng` feature, otherwise
/// the current high-resolution timestamp.
fn fresh_seed() -> u64 {
    #[cfg(feature = "rng")]
    {
        let mut seed = [0u8; 8];
        if getrandom::getrandom(&mut seed).is_ok() {
            return u64::from_le_bytes(seed);
        }
    }
    crate::performance_now().to_bits()
}

// --- Frame loop & painting ---------------------------------------------------

type FrameCallback = std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        let live = BATTLE.with(|cell| {
            if let Some(screen) = cell.borrow_mut().as_mut() {
                frame_tick(screen);
                true
            } else {
                false
            }
        });
        if !live {
            // screen torn down: stop rescheduling
            return;
        }
        if let Some(w) = window() {
            if let Ok(id) =
                w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref())
            {
                BATTLE.with(|cell| {
                    if let Some(screen) = cell.borrow_mut().as_mut() {
                        screen.raf_handle = Some(id);
                    }
                });
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        if let Ok(id) =
            w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref())
        {
            BATTLE.with(|cell| {
                if let Some(screen) = cell.borrow_mut().as_mut() {
                    screen.raf_handle = Some(id);
                }
            });
        }
    }
}

fn frame_tick(screen: &mut BattleScreen) {
    paint_frame(screen);
    screen.session.fx.advance_frame();
    sync_overlays(screen);
}

fn paint_frame(screen: &mut BattleScreen) {
    let ctx = screen.ctx.clone();
    let w = screen.canvas.width() as f64;
    let h = screen.canvas.height() as f64;
    let session = &mut screen.session;

    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.set_fill_style_str("#0b0e16");
    ctx.fill_rect(0.0, 0.0, w, h);
    // faint ground band under the casters
    ctx.set_fill_style_str("rgba(120,140,180,0.06)");
    ctx.fill_rect(0.0, h * 0.72, w, h * 0.28);

    if session.fx.flash > 0.0 {
        ctx.set_fill_style_str(&format!("rgba(255,255,255,{:.3})", session.fx.flash));
        ctx.fill_rect(0.0, 0.0, w, h);
    }

    ctx.save();
    if session.fx.shake > 0.0 {
        let (ox, oy) = session.fx.shake_offset(&mut session.rng);
        ctx.translate(ox, oy).ok();
    }
    for bolt in &session.fx.bolts {
        draw_bolt(&ctx, bolt);
    }
    ctx.restore();

    if session.phase != Phase::Playing {
        let headline = if session.phase == Phase::Won {
            "VICTORY"
        } else {
            "DEFEAT"
        };
        ctx.set_fill_style_str("rgba(0,0,0,0.55)");
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.set_font("64px 'Fira Code', monospace");
        ctx.set_line_width(6.0);
        ctx.set_stroke_style_str("#000000");
        ctx.stroke_text(headline, w / 2.0, h / 2.0).ok();
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_text(headline, w / 2.0, h / 2.0).ok();
        ctx.set_font("20px 'Fira Code', monospace");
        ctx.fill_text("Refresh to duel again", w / 2.0, h / 2.0 + 44.0)
            .ok();
    }
}

/// Two-pass strike rendering: a wide blurred glow composited additively,
/// then a narrow near-white core on top.
fn draw_bolt(ctx: &CanvasRenderingContext2d, bolt: &Bolt) {
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    ctx.set_global_composite_operation("lighter").ok();
    let glow = bolt.color.glow_style(bolt.opacity * 0.4);
    ctx.set_shadow_blur(12.0);
    ctx.set_shadow_color(&glow);
    ctx.set_stroke_style_str(&glow);
    ctx.set_line_width(bolt.base_width * 3.0);
    trace_polyline(ctx, bolt);

    ctx.set_shadow_blur(0.0);
    ctx.set_stroke_style_str(&bolt.color.core_style(bolt.opacity));
    ctx.set_line_width(bolt.base_width);
    trace_polyline(ctx, bolt);
    ctx.set_global_composite_operation("source-over").ok();
}

fn trace_polyline(ctx: &CanvasRenderingContext2d, bolt: &Bolt) {
    let Some(first) = bolt.segments.first() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.0.x, first.0.y);
    for (_, to) in &bolt.segments {
        ctx.line_to(to.x, to.y);
    }
    ctx.stroke();
}

fn sync_overlays(screen: &BattleScreen) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(el) = doc.get_element_by_id("ss-typing") {
        el.set_text_content(Some(&screen.typing));
    }
    if let Some(el) = doc.get_element_by_id("ss-score") {
        el.set_text_content(Some(&format!("Score: {}", screen.score)));
    }
    if let Some(el) = doc.get_element_by_id("ss-prompt") {
        el.set_text_content(Some(&format!("Translate: {}", screen.word.0)));
    }
    if let Some(el) = doc.get_element_by_id("ss-reserves") {
        let summary = screen
            .session
            .reserves
            .iter()
            .map(|r| format!("{} {:.0}", r.name, r.charge))
            .collect::<Vec<_>>()
            .join(" \u{b7} ");
        el.set_text_content(Some(&summary));
    }
    if let Some(el) = doc.get_element_by_id("ss-player-health") {
        el.set_attribute(
            "style",
            &health_fill_style(screen.session.player_health, "#4ade80"),
        )
        .ok();
    }
    if let Some(el) = doc.get_element_by_id("ss-rival-health") {
        el.set_attribute(
            "style",
            &health_fill_style(screen.session.rival_health, "#f87171"),
        )
        .ok();
    }
}
