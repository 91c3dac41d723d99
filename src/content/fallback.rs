//! Built-in prompts used when no content could be loaded at all.

use crate::types::{Category, Prompt};
use std::collections::HashMap;

pub const FALLBACK_CATEGORY_ID: &str = "fallback";

const PROMPTS_EN: &[&str] = &[
    "Who would most likely laugh at the wrong moment?",
    "Who would most likely become famous?",
    "Who would most likely sleep through an alarm?",
    "Who would most likely talk their way out of a parking ticket?",
    "Who would most likely adopt a stray animal?",
    "Who would most likely win a game show?",
];

const PROMPTS_DE: &[&str] = &[
    "Wer würde am ehesten im falschen Moment lachen?",
    "Wer würde am ehesten berühmt werden?",
    "Wer würde am ehesten den Wecker verschlafen?",
    "Wer würde sich am ehesten aus einem Strafzettel herausreden?",
    "Wer würde am ehesten ein Streunertier adoptieren?",
    "Wer würde am ehesten eine Spielshow gewinnen?",
];

pub fn fallback_category() -> Category {
    Category {
        id: FALLBACK_CATEGORY_ID.to_string(),
        name: HashMap::from([
            ("en".to_string(), "Classics".to_string()),
            ("de".to_string(), "Klassiker".to_string()),
        ]),
        emoji: "🎲".to_string(),
    }
}

/// Minimal prompt set in the given language (English when unsupported)
pub fn fallback_prompts(language: &str) -> Vec<Prompt> {
    let texts = match language {
        "de" => PROMPTS_DE,
        _ => PROMPTS_EN,
    };

    texts
        .iter()
        .enumerate()
        .map(|(i, text)| Prompt {
            id: format!("{}-{}", FALLBACK_CATEGORY_ID, i + 1),
            category_id: FALLBACK_CATEGORY_ID.to_string(),
            text: text.to_string(),
        })
        .collect()
}
