use crate::card::CardDefinition;
use serde::{Deserialize, Serialize};

/// Deck - ordered stack of cards, drawn from the end
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<CardDefinition>,
}

impl Deck {
    pub fn new(cards: Vec<CardDefinition>) -> Self {
        Deck { cards }
    }

    pub fn draw(&mut self) -> Option<CardDefinition> {
        self.cards.pop()
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn shuffle(&mut self, rng: &mut crate::rng::GameRng) {
        rng.shuffle(&mut self.cards);
    }

    pub fn cards(&self) -> &[CardDefinition] {
        &self.cards
    }
}

/// Hand - cards in draw order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<CardDefinition>,
}

impl Hand {
    pub fn new() -> Self {
        Hand { cards: Vec::new() }
    }

    pub fn add_card(&mut self, card: CardDefinition) {
        self.cards.push(card);
    }

    pub fn get(&self, index: usize) -> Option<&CardDefinition> {
        self.cards.get(index)
    }

    pub fn remove_card(&mut self, index: usize) -> Option<CardDefinition> {
        if index < self.cards.len() {
            Some(self.cards.remove(index))
        } else {
            None
        }
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[CardDefinition] {
        &self.cards
    }
}

/// Graveyard - destroyed units and resolved spells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graveyard {
    cards: Vec<CardDefinition>,
}

impl Graveyard {
    pub fn new() -> Self {
        Graveyard { cards: Vec::new() }
    }

    pub fn add_card(&mut self, card: CardDefinition) {
        self.cards.push(card);
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn count_of(&self, id: &str) -> usize {
        self.cards.iter().filter(|c| c.id == id).count()
    }

    pub fn cards(&self) -> &[CardDefinition] {
        &self.cards
    }
}
