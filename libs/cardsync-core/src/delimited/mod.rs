//! Flashcard export decks in tab-delimited text.
//!
//! # Format
//! ```text
//! *\tan opaque header line\r\n
//! Text 1\tText 2\tNotes\r\n
//! front\tback\t"7 : DO NOT MODIFY THIS LINE\r\nnotes"\r\n
//! next front\tnext back\t
//! ```
//!
//! Header lines start with `*` and a tab and are kept verbatim. The
//! field name line follows, then one record per line with the field
//! grammar from [`field`].

mod field;
mod sentinel;

use crate::config::DelimitedSettings;
use crate::error::{Error, Result};
use crate::store::{CardStore, IdAllocator};
use crate::types::{Card, CardId};
use field::{FieldReader, Terminator};
use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};
use tracing::debug;

const CRLF: &str = "\r\n";

/// A deck loaded from, and savable to, an export file.
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedDeck {
    /// Header lines, each including its CRLF.
    header: Vec<String>,
    field_names: Vec<String>,
    cards: Vec<Card>,
    id_field: String,
    /// Input ended with CRLF after the last record.
    trailing_crlf: bool,
}

impl Default for DelimitedDeck {
    fn default() -> Self {
        Self::new(&DelimitedSettings::default())
    }
}

impl DelimitedDeck {
    /// An empty deck with no header and the default field names.
    pub fn new(settings: &DelimitedSettings) -> Self {
        Self {
            header: Vec::new(),
            field_names: settings.default_field_names.clone(),
            cards: Vec::new(),
            id_field: settings.id_field.clone(),
            trailing_crlf: false,
        }
    }

    pub fn load_from<R: Read>(mut reader: R, settings: &DelimitedSettings) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content, settings)
    }

    /// Parse a whole export file.
    pub fn parse(content: &str, settings: &DelimitedSettings) -> Result<Self> {
        let mut rest = content;

        let mut header = Vec::new();
        while rest.starts_with("*\t") {
            let end = rest
                .find(CRLF)
                .ok_or(Error::UnterminatedHeader { line: header.len() + 1 })?
                + CRLF.len();
            header.push(rest[..end].to_string());
            rest = &rest[end..];
        }

        let (names_line, records) = match rest.find(CRLF) {
            Some(end) => (&rest[..end], &rest[end + CRLF.len()..]),
            None if rest.is_empty() => return Err(Error::MissingFieldNames),
            None => (rest, ""),
        };
        let field_names: Vec<String> = names_line.split('\t').map(str::to_string).collect();
        let mut seen = HashSet::new();
        for name in &field_names {
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateFieldName(name.clone()));
            }
        }

        let mut deck = Self {
            header,
            field_names,
            cards: Vec::new(),
            id_field: settings.id_field.clone(),
            trailing_crlf: false,
        };
        deck.read_records(records)?;
        debug!(
            headers = deck.header.len(),
            fields = deck.field_names.len(),
            cards = deck.cards.len(),
            "loaded delimited deck"
        );
        Ok(deck)
    }

    fn read_records(&mut self, input: &str) -> Result<()> {
        let mut reader = FieldReader::new(input);
        let mut seen_ids = HashSet::new();
        let expected = self.field_names.len();

        while !reader.at_end() {
            let record = self.cards.len() + 1;
            let mut values = Vec::with_capacity(expected);
            let mut last = Terminator::Tab;
            while values.len() < expected {
                if last != Terminator::Tab {
                    return Err(Error::FieldCount {
                        record,
                        found: values.len(),
                        expected,
                    });
                }
                let (value, term) = reader.next_field(record, values.len())?;
                values.push(value);
                last = term;
            }
            if last == Terminator::Tab {
                return Err(Error::FieldCount {
                    record,
                    found: expected + 1,
                    expected,
                });
            }

            let card = self.card_from_values(values)?;
            if let Some(id) = card.id() {
                if !seen_ids.insert(id) {
                    return Err(Error::DuplicateStoredId(id));
                }
            }
            self.cards.push(card);
            self.trailing_crlf = last == Terminator::LineEnd && reader.at_end();
        }
        Ok(())
    }

    fn card_from_values(&self, values: Vec<String>) -> Result<Card> {
        let mut id = None;
        let mut fields = BTreeMap::new();
        for (name, value) in self.field_names.iter().zip(values) {
            let value = if *name == self.id_field {
                let (found, rest) = sentinel::split_id(&value)?;
                id = found;
                rest.to_string()
            } else {
                value
            };
            fields.insert(name.clone(), value);
        }
        Ok(Card::new(fields, id))
    }

    fn encode_card(&self, card: &Card) -> Result<String> {
        if let Some(id) = card.id() {
            if !self.field_names.contains(&self.id_field) {
                return Err(Error::IdNotRepresentable {
                    id,
                    field: self.id_field.clone(),
                });
            }
        }
        for (name, _) in card.iter_fields() {
            if !self.field_names.iter().any(|n| n == name) {
                debug!(field = name, "dropping field unknown to deck");
            }
        }

        let encoded: Vec<String> = self
            .field_names
            .iter()
            .map(|name| {
                let value = card.field(name).unwrap_or("");
                match card.id() {
                    Some(id) if *name == self.id_field => {
                        field::escape(&sentinel::join_id(id, value)).into_owned()
                    }
                    _ => field::escape(value).into_owned(),
                }
            })
            .collect();
        Ok(encoded.join("\t"))
    }

    /// Serialize the whole deck: header, field names, then records.
    pub fn encode(&self) -> Result<String> {
        let mut out = String::new();
        for line in &self.header {
            out.push_str(line);
        }
        out.push_str(&self.field_names.join("\t"));
        out.push_str(CRLF);

        let records = self
            .cards
            .iter()
            .map(|card| self.encode_card(card))
            .collect::<Result<Vec<_>>>()?;
        out.push_str(&records.join(CRLF));
        // An empty last record only survives a reload when it is terminated.
        let empty_last = records.last().is_some_and(String::is_empty);
        if !self.cards.is_empty() && (self.trailing_crlf || empty_last) {
            out.push_str(CRLF);
        }
        Ok(out)
    }

    /// Encode the deck and write it. Nothing is written if encoding fails.
    pub fn save_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let encoded = self.encode()?;
        writer.write_all(encoded.as_bytes())?;
        writer.flush()?;
        debug!(cards = self.cards.len(), "saved delimited deck");
        Ok(())
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Header lines, each with its CRLF.
    pub fn header(&self) -> &[String] {
        &self.header
    }
}

impl CardStore for DelimitedDeck {
    fn ids(&self) -> Vec<Option<CardId>> {
        self.cards.iter().map(Card::id).collect()
    }

    fn get_card(&self, id: CardId) -> Option<Card> {
        self.cards.iter().find(|c| c.id() == Some(id)).cloned()
    }

    fn cards(&self) -> Vec<Card> {
        self.cards.clone()
    }

    fn add_card(&mut self, card: Card) -> Result<()> {
        if let Some(id) = card.id() {
            if self.contains(id) {
                return Err(Error::DuplicateId(id));
            }
        }
        self.cards.push(card);
        Ok(())
    }

    fn update_card(&mut self, card: Card) -> Result<()> {
        let id = card.id().ok_or(Error::MissingId)?;
        let slot = self
            .cards
            .iter_mut()
            .find(|c| c.id() == Some(id))
            .ok_or(Error::CardNotFound(id))?;
        *slot = card;
        Ok(())
    }

    fn delete_cards(&mut self, ids: &[CardId]) -> usize {
        let doomed: HashSet<CardId> = ids.iter().copied().collect();
        let before = self.cards.len();
        self.cards
            .retain(|c| !c.id().is_some_and(|id| doomed.contains(&id)));
        before - self.cards.len()
    }

    fn mark_blank_ids(&mut self) -> Result<Vec<CardId>> {
        let blanks = self.cards.iter().filter(|c| c.id().is_none()).count();
        let new_ids = IdAllocator::after(self.ids()).allocate_many(blanks)?;
        let mut next = new_ids.iter().copied();
        for card in self.cards.iter_mut().filter(|c| c.id().is_none()) {
            *card = card.with_id(next.next());
        }
        Ok(new_ids)
    }

    fn zap_ids(&mut self) {
        for card in &mut self.cards {
            *card = card.with_id(None);
        }
    }
}
