//! Core card types shared by every store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity of a card within a store.
pub type CardId = i32;

/// First id handed out when a store holds no ids yet.
pub const MIN_ID: CardId = CardId::MIN;

/// One flashcard: named field contents plus an optional id.
///
/// Cards are values. Changing a card means building a new one and
/// replacing it in its store. Equality and hashing cover the fields and
/// the id only, so cards decoded by different codecs compare equal when
/// their data matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<CardId>,
}

impl Card {
    /// Create a card from field data and an optional id.
    pub fn new(fields: BTreeMap<String, String>, id: Option<CardId>) -> Self {
        Self { fields, id }
    }

    /// Build a minimal card from `front:back` style text.
    ///
    /// Each colon separated piece becomes `Text 1`, `Text 2`, ... in order.
    /// Trailing empty pieces are dropped.
    pub fn simple(text: &str, id: Option<CardId>) -> Self {
        let mut pieces: Vec<&str> = text.split(':').collect();
        while pieces.len() > 1 && pieces.last().is_some_and(|p| p.is_empty()) {
            pieces.pop();
        }
        let fields = pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| (format!("Text {}", i + 1), piece.to_string()))
            .collect();
        Self { fields, id }
    }

    /// A copy of the field data.
    pub fn fields(&self) -> BTreeMap<String, String> {
        self.fields.clone()
    }

    /// Borrow a single field's content.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Iterate fields in name order without copying.
    pub fn iter_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn id(&self) -> Option<CardId> {
        self.id
    }

    /// The same card data under a different id.
    pub fn with_id(&self, id: Option<CardId>) -> Self {
        Self {
            fields: self.fields.clone(),
            id,
        }
    }
}
