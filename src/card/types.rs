use crate::card::veteran::VeteranEffect;
use serde::{Deserialize, Serialize};

/// Elemental affinity shared by cards and titans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
    Shadow,
    Light,
    Arcane,
    #[default]
    Neutral,
}

/// Creature race, used by synergies and a handful of cost/movement rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Goblin,
    Orc,
    Undead,
    Merfolk,
    Dragon,
    Beast,
    Construct,
    #[default]
    None,
}

impl Race {
    /// Every race that can form a synergy
    pub const ALL: [Race; 10] = [
        Race::Human,
        Race::Elf,
        Race::Dwarf,
        Race::Goblin,
        Race::Orc,
        Race::Undead,
        Race::Merfolk,
        Race::Dragon,
        Race::Beast,
        Race::Construct,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Race::Human => "human",
            Race::Elf => "elf",
            Race::Dwarf => "dwarf",
            Race::Goblin => "goblin",
            Race::Orc => "orc",
            Race::Undead => "undead",
            Race::Merfolk => "merfolk",
            Race::Dragon => "dragon",
            Race::Beast => "beast",
            Race::Construct => "construct",
            Race::None => "none",
        }
    }
}

/// Card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Unit,
    Spell,
    Structure,
}

/// Ability tags that combat, movement and deployment branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    #[serde(alias = "guard")]
    Taunt,
    Flying,
    DivineShield,
    Ward,
    Stealth,
    Elusive,
    Haste,
    Rush,
    Charge,
    Swift,
    Battlecry,
    Deathrattle,
    Inspire,
    Windfury,
    Lifesteal,
    Poison,
    Freeze,
    Trample,
}

impl Keyword {
    /// Parse a keyword from designer-facing text ("divine shield", "Guard", "windfury")
    pub fn from_name(name: &str) -> Option<Keyword> {
        let normalized: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        let keyword = match normalized.as_str() {
            "taunt" | "guard" => Keyword::Taunt,
            "flying" => Keyword::Flying,
            "divine_shield" | "shield" => Keyword::DivineShield,
            "ward" => Keyword::Ward,
            "stealth" => Keyword::Stealth,
            "elusive" => Keyword::Elusive,
            "haste" => Keyword::Haste,
            "rush" => Keyword::Rush,
            "charge" => Keyword::Charge,
            "swift" => Keyword::Swift,
            "battlecry" => Keyword::Battlecry,
            "deathrattle" => Keyword::Deathrattle,
            "inspire" => Keyword::Inspire,
            "windfury" => Keyword::Windfury,
            "lifesteal" => Keyword::Lifesteal,
            "poison" => Keyword::Poison,
            "freeze" => Keyword::Freeze,
            "trample" => Keyword::Trample,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Taunt => "taunt",
            Keyword::Flying => "flying",
            Keyword::DivineShield => "divine_shield",
            Keyword::Ward => "ward",
            Keyword::Stealth => "stealth",
            Keyword::Elusive => "elusive",
            Keyword::Haste => "haste",
            Keyword::Rush => "rush",
            Keyword::Charge => "charge",
            Keyword::Swift => "swift",
            Keyword::Battlecry => "battlecry",
            Keyword::Deathrattle => "deathrattle",
            Keyword::Inspire => "inspire",
            Keyword::Windfury => "windfury",
            Keyword::Lifesteal => "lifesteal",
            Keyword::Poison => "poison",
            Keyword::Freeze => "freeze",
            Keyword::Trample => "trample",
        }
    }

    /// Haste-like tags that let a unit act on the turn it is deployed
    pub fn grants_readiness(&self) -> bool {
        matches!(self, Keyword::Haste | Keyword::Rush | Keyword::Charge)
    }
}

/// Timed status effects carried by units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Poison,
    Regen,
    Bleed,
}

/// What a spell or titan ability needs to be pointed at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    #[default]
    None,
    Enemy,
    Friendly,
    Any,
    EmptyTile,
}

impl TargetKind {
    pub fn needs_tile(&self) -> bool {
        !matches!(self, TargetKind::None)
    }
}

/// Immutable card template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: String,
    pub name: String,
    pub cost: u32,
    #[serde(rename = "type")]
    pub card_type: CardType,
    #[serde(default)]
    pub atk: i32,
    #[serde(default)]
    pub hp: i32,
    #[serde(default, rename = "move")]
    pub movement: u32,
    #[serde(default)]
    pub range: u32,
    #[serde(default)]
    pub armor: i32,
    #[serde(default)]
    pub element: Element,
    #[serde(default)]
    pub race: Race,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub description: String,
    /// Legacy free-text veteran abilities, one per level
    #[serde(default)]
    pub vet: Vec<String>,
    /// Structured veteran effects, one list per level
    #[serde(default)]
    pub veteran: Vec<Vec<VeteranEffect>>,
    #[serde(default)]
    pub token: bool,
    #[serde(default)]
    pub target: TargetKind,
}

impl CardDefinition {
    pub fn is_spell(&self) -> bool {
        self.card_type == CardType::Spell
    }

    pub fn is_structure(&self) -> bool {
        self.card_type == CardType::Structure
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Structured effects for veteran level 1..=3
    pub fn veteran_effects(&self, level: u8) -> &[VeteranEffect] {
        match level.checked_sub(1) {
            Some(idx) => self
                .veteran
                .get(idx as usize)
                .map(|v| v.as_slice())
                .unwrap_or(&[]),
            None => &[],
        }
    }

    /// Designer text for veteran level 1..=3
    pub fn veteran_text(&self, level: u8) -> &str {
        match level.checked_sub(1) {
            Some(idx) => self.vet.get(idx as usize).map(|s| s.as_str()).unwrap_or(""),
            None => "",
        }
    }
}

fn default_ultimate_kills() -> u32 {
    3
}

/// Immutable titan template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitanDefinition {
    pub id: String,
    pub name: String,
    pub hp: i32,
    pub element: Element,
    pub passive: String,
    pub active: String,
    pub ultimate: String,
    pub active_cost: u32,
    #[serde(default)]
    pub active_target: TargetKind,
    #[serde(default = "default_ultimate_kills")]
    pub ultimate_kills: u32,
    /// Card ids used when a player brings no deck of their own
    #[serde(default)]
    pub deck: Vec<String>,
}
