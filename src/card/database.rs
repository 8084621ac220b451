use crate::card::types::{CardDefinition, TitanDefinition};
use crate::card::veteran::migrate_text;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(Error, Debug)]
pub enum CardDatabaseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Titan not found: {0}")]
    TitanNotFound(String),
    #[error("Invalid card data: {0}")]
    InvalidCard(String),
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    titans: Vec<TitanDefinition>,
    cards: Vec<CardDefinition>,
}

/// Card and titan database loaded from a JSON catalog
#[derive(Debug, Clone)]
pub struct CardDatabase {
    cards: HashMap<String, CardDefinition>,
    titans: HashMap<String, TitanDefinition>,
    card_order: Vec<String>,
    titan_order: Vec<String>,
}

impl CardDatabase {
    /// The catalog compiled into the crate
    pub fn builtin() -> Result<Self, CardDatabaseError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: &str) -> Result<Self, CardDatabaseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a catalog from JSON text
    pub fn from_json(content: &str) -> Result<Self, CardDatabaseError> {
        let file: CatalogFile = serde_json::from_str(content)?;

        let mut cards = HashMap::new();
        let mut card_order = Vec::new();
        for mut card in file.cards {
            if card.veteran.is_empty() && !card.vet.is_empty() {
                card.veteran = card.vet.iter().map(|text| migrate_text(text)).collect();
                for (text, effects) in card.vet.iter().zip(&card.veteran) {
                    if effects.is_empty() {
                        log::warn!("veteran text '{}' of {} has no effect", text, card.id);
                    }
                }
            }
            card_order.push(card.id.clone());
            cards.insert(card.id.clone(), card);
        }

        let mut titans = HashMap::new();
        let mut titan_order = Vec::new();
        for titan in file.titans {
            titan_order.push(titan.id.clone());
            titans.insert(titan.id.clone(), titan);
        }

        let db = CardDatabase {
            cards,
            titans,
            card_order,
            titan_order,
        };
        db.validate()?;
        Ok(db)
    }

    /// Get a card by id
    pub fn get_card(&self, id: &str) -> Result<&CardDefinition, CardDatabaseError> {
        self.cards
            .get(id)
            .ok_or_else(|| CardDatabaseError::CardNotFound(id.to_string()))
    }

    /// Get a titan by id
    pub fn get_titan(&self, id: &str) -> Result<&TitanDefinition, CardDatabaseError> {
        self.titans
            .get(id)
            .ok_or_else(|| CardDatabaseError::TitanNotFound(id.to_string()))
    }

    /// All cards in catalog order
    pub fn cards(&self) -> impl Iterator<Item = &CardDefinition> {
        self.card_order.iter().filter_map(|id| self.cards.get(id))
    }

    /// All titans in catalog order
    pub fn titans(&self) -> impl Iterator<Item = &TitanDefinition> {
        self.titan_order.iter().filter_map(|id| self.titans.get(id))
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Check the catalog is usable: cards exist, ids are unique and every
    /// titan's default deck only names known, non-token cards
    pub fn validate(&self) -> Result<(), CardDatabaseError> {
        if self.cards.is_empty() {
            return Err(CardDatabaseError::InvalidCard("No cards loaded".to_string()));
        }
        if self.cards.len() != self.card_order.len() {
            return Err(CardDatabaseError::InvalidCard(
                "Duplicate card id in catalog".to_string(),
            ));
        }
        for titan in self.titans.values() {
            for id in &titan.deck {
                match self.cards.get(id) {
                    Some(card) if card.token => {
                        return Err(CardDatabaseError::InvalidCard(format!(
                            "Token {} listed in {}'s deck",
                            id, titan.id
                        )))
                    }
                    Some(_) => {}
                    None => return Err(CardDatabaseError::CardNotFound(id.clone())),
                }
            }
        }
        Ok(())
    }
}
