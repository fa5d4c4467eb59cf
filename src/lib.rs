//! Storm Spell core crate.
//!
//! A vocabulary duel: the player translates word prompts, and every correct
//! answer hurls a procedurally generated lightning bolt at the rival caster,
//! who strikes back from a set of depletable casting reserves. `start_game()`
//! boots the duel screen. Shared word datasets live here so future screens
//! (flashcards, review decks) can reuse them.

use wasm_bindgen::prelude::*;

pub mod battle;
pub mod bolt;
pub mod quiz;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Shared word datasets (Spanish prompt -> English answer, ASCII folded)
// -----------------------------------------------------------------------------

pub const CORE_WORDS: &[(&str, &str)] = &[
    ("gato", "cat"), ("perro", "dog"), ("casa", "house"), ("agua", "water"), ("fuego", "fire"),
    ("luz", "light"), ("sol", "sun"), ("luna", "moon"), ("mar", "sea"), ("pan", "bread"),
    ("rojo", "red"), ("azul", "blue"), ("verde", "green"), ("libro", "book"), ("mano", "hand"),
    ("ojo", "eye"), ("pie", "foot"), ("flor", "flower"), ("rey", "king"), ("nube", "cloud"),
    ("viento", "wind"), ("nieve", "snow"), ("noche", "night"), ("dia", "day"), ("tren", "train"),
    ("pez", "fish"), ("sal", "salt"), ("voz", "voice"),
];

pub const BONUS_WORDS: &[(&str, &str)] = &[
    ("relampago", "lightning"), ("tormenta", "storm"), ("biblioteca", "library"),
    ("mariposa", "butterfly"), ("estrella", "star"), ("ventana", "window"),
    ("cuaderno", "notebook"), ("hermano", "brother"), ("desayuno", "breakfast"),
    ("caballo", "horse"), ("naranja", "orange"), ("zapato", "shoe"),
    ("ciudad", "city"), ("escuela", "school"), ("trueno", "thunder"),
    ("corazon", "heart"), ("montana", "mountain"),
];

// -----------------------------------------------------------------------------
// Unified entrypoints
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    battle::start_battle_mode()
}

/// Tear down the duel screen: cancels the frame loop and every pending
/// attack timer so no callback outlives the session.
#[wasm_bindgen]
pub fn stop_game() -> Result<(), JsValue> {
    battle::stop_battle_mode()
}

pub(crate) fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
