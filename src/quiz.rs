//! Word deck: prompt selection and answer checking for the duel screen.

use crate::battle::session::AttackKind;
use crate::bolt::Lcg;
use crate::{BONUS_WORDS, CORE_WORDS};

/// Chance that a prompt comes from the bonus deck instead of the core one.
const BONUS_CHANCE: f64 = 0.25;

pub fn pick_word(rng: &mut Lcg) -> (&'static str, &'static str) {
    let pool = if rng.next_f64() < BONUS_CHANCE {
        BONUS_WORDS
    } else {
        CORE_WORDS
    };
    let idx = (rng.next_f64() * pool.len() as f64) as usize % pool.len();
    pool[idx]
}

pub fn check_answer(typed: &str, answer: &str) -> bool {
    typed.trim().eq_ignore_ascii_case(answer)
}

/// Longer prompts earn bigger attacks.
pub fn attack_for_prompt(prompt: &str) -> AttackKind {
    match prompt.chars().count() {
        0..=4 => AttackKind::Strike,
        5..=6 => AttackKind::Twin,
        _ => AttackKind::Volley,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_words_come_from_the_decks() {
        let mut rng = Lcg::new(9);
        for _ in 0..100 {
            let pair = pick_word(&mut rng);
            assert!(CORE_WORDS.contains(&pair) || BONUS_WORDS.contains(&pair));
        }
    }

    #[test]
    fn picks_are_reproducible_per_seed() {
        let mut a = Lcg::new(55);
        let mut b = Lcg::new(55);
        for _ in 0..20 {
            assert_eq!(pick_word(&mut a), pick_word(&mut b));
        }
    }

    #[test]
    fn answers_are_checked_case_insensitively() {
        assert!(check_answer("Cat", "cat"));
        assert!(check_answer("  lightning ", "lightning"));
        assert!(!check_answer("dog", "cat"));
        assert!(!check_answer("", "cat"));
    }

    #[test]
    fn prompt_length_maps_to_attack_kind() {
        assert_eq!(attack_for_prompt("gato"), AttackKind::Strike);
        assert_eq!(attack_for_prompt("perro"), AttackKind::Twin);
        assert_eq!(attack_for_prompt("viento"), AttackKind::Twin);
        assert_eq!(attack_for_prompt("tormenta"), AttackKind::Volley);
    }
}
