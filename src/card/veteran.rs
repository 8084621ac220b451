//! Structured veteran effects and the migration from legacy veteran text.
//!
//! Older card data describes promotions in prose ("+1 attack, gains windfury").
//! [`migrate_text`] turns that prose into [`VeteranEffect`] descriptors once, at
//! catalog load. Phrases outside the recognized vocabulary produce no effect.

use crate::card::types::{Keyword, StatusKind};
use serde::{Deserialize, Serialize};

/// A single promotion effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VeteranEffect {
    StatBuff {
        #[serde(default)]
        atk: i32,
        #[serde(default)]
        hp: i32,
        #[serde(default, rename = "move")]
        movement: i32,
        #[serde(default)]
        armor: i32,
    },
    AddStatus { status: StatusKind, value: i32 },
    MinRange { range: u32 },
    GrantKeyword { keyword: Keyword },
}

/// Keywords a veteran text may hand out
const GRANTABLE: [Keyword; 12] = [
    Keyword::Windfury,
    Keyword::Lifesteal,
    Keyword::Stealth,
    Keyword::Ward,
    Keyword::Taunt,
    Keyword::Trample,
    Keyword::Elusive,
    Keyword::Poison,
    Keyword::Freeze,
    Keyword::Flying,
    Keyword::Swift,
    Keyword::DivineShield,
];

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';' || c == '.' || c == '(' || c == ')')
        .filter(|w| !w.is_empty())
        .map(|w| w.trim_matches(|c: char| c == '!' || c == ':' || c == '"').to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

fn parse_signed(word: &str) -> Option<i32> {
    let digits = word.strip_prefix('+').unwrap_or(word);
    digits.parse().ok()
}

fn stat(atk: i32, hp: i32, movement: i32, armor: i32) -> VeteranEffect {
    VeteranEffect::StatBuff {
        atk,
        hp,
        movement,
        armor,
    }
}

/// Convert one legacy veteran text into structured effects
pub fn migrate_text(text: &str) -> Vec<VeteranEffect> {
    let tokens = words(text);
    let mut effects = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let tok = tokens[i].as_str();
        let next = tokens.get(i + 1).map(|s| s.as_str());

        // "+1/+2" shorthand for attack/health
        if tok.starts_with('+') && tok.contains('/') {
            let mut parts = tok.split('/');
            let atk = parts.next().and_then(parse_signed);
            let hp = parts.next().and_then(parse_signed);
            if let (Some(atk), Some(hp)) = (atk, hp) {
                effects.push(stat(atk, hp, 0, 0));
            }
            i += 1;
            continue;
        }

        if tok.starts_with('+') {
            if let Some(amount) = parse_signed(tok) {
                let effect = match next {
                    Some("attack") | Some("atk") => Some(stat(amount, 0, 0, 0)),
                    Some("hp") | Some("health") | Some("max") => Some(stat(0, amount, 0, 0)),
                    Some("move") | Some("movement") => Some(stat(0, 0, amount, 0)),
                    Some("armor") => Some(stat(0, 0, 0, amount)),
                    _ => None,
                };
                if let Some(effect) = effect {
                    effects.push(effect);
                    i += 2;
                    continue;
                }
            }
        }

        if tok == "regen" {
            if let Some(value) = next.and_then(parse_signed) {
                effects.push(VeteranEffect::AddStatus {
                    status: StatusKind::Regen,
                    value,
                });
                i += 2;
                continue;
            }
        }

        if tok == "range" {
            if let Some(range) = next.and_then(|w| w.parse::<u32>().ok()) {
                effects.push(VeteranEffect::MinRange { range });
                i += 2;
                continue;
            }
        }

        let keyword = if tok == "divine" && next == Some("shield") {
            i += 1;
            Some(Keyword::DivineShield)
        } else {
            Keyword::from_name(tok).filter(|k| *k != Keyword::DivineShield || tok == "divine_shield")
        };
        if let Some(keyword) = keyword.filter(|k| GRANTABLE.contains(k)) {
            let grant = VeteranEffect::GrantKeyword { keyword };
            if !effects.contains(&grant) {
                effects.push(grant);
            }
        }

        i += 1;
    }

    effects
}
