use crate::card::{CardDatabase, CardDatabaseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid deck format at line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },
    #[error("Card database error: {0}")]
    DatabaseError(#[from] CardDatabaseError),
}

/// Read a deck list from disk. See [`parse_deck`] for the format.
pub fn parse_deck_file(path: &str, database: &CardDatabase) -> Result<Vec<String>, DeckError> {
    parse_deck(&std::fs::read_to_string(path)?, database)
}

/// One "COUNT card_id" entry per line. Blank lines and lines starting with
/// `#` or `//` are skipped. Tokens cannot be put in a deck.
pub fn parse_deck(content: &str, database: &CardDatabase) -> Result<Vec<String>, DeckError> {
    let mut cards = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let entry = raw.trim();
        if entry.is_empty() || entry.starts_with('#') || entry.starts_with("//") {
            continue;
        }
        let invalid = |reason: String| DeckError::InvalidFormat {
            line: index + 1,
            reason,
        };

        let (count, id) = entry
            .split_once(char::is_whitespace)
            .ok_or_else(|| invalid("expected 'COUNT CARD_ID'".to_string()))?;
        let copies: usize = count
            .parse()
            .map_err(|_| invalid(format!("'{}' is not a card count", count)))?;
        let card = database.get_card(id.trim())?;
        if card.token {
            return Err(invalid(format!("'{}' is a token", card.id)));
        }
        cards.extend(std::iter::repeat(card.id.clone()).take(copies));
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deck() {
        let db = CardDatabase::builtin().expect("Failed to load cards");
        let text = "# goblins\n3 goblin_raider\n\n// casters\n2 fireball\n";
        let deck = parse_deck(text, &db).expect("Failed to parse deck");
        assert_eq!(deck.len(), 5);
        assert_eq!(deck.iter().filter(|id| *id == "fireball").count(), 2);
    }

    #[test]
    fn test_invalid_lines() {
        let db = CardDatabase::builtin().expect("Failed to load cards");
        assert!(matches!(
            parse_deck("goblin_raider", &db),
            Err(DeckError::InvalidFormat { line: 1, .. })
        ));
        assert!(matches!(
            parse_deck("1 ghoul\nx ghoul", &db),
            Err(DeckError::InvalidFormat { line: 2, .. })
        ));
        assert!(matches!(
            parse_deck("2 skeleton", &db),
            Err(DeckError::InvalidFormat { line: 1, .. })
        ));
        assert!(matches!(
            parse_deck("2 dragon_king", &db),
            Err(DeckError::DatabaseError(_))
        ));
    }
}
