//! The card store contract shared by every storage format.
//!
//! A store owns an ordered list of cards. Order is document or file
//! order and survives a load/save round trip. Ids are unique among the
//! cards that have one; any number of cards may have none.

use crate::config::Settings;
use crate::delimited::DelimitedDeck;
use crate::error::{Error, Result};
use crate::markup::WikiDocument;
use crate::types::{Card, CardId, MIN_ID};
use std::io::{Read, Write};
use std::path::Path;

/// Id-indexed access to a list of cards, independent of storage format.
pub trait CardStore {
    /// Every card's id in store order, `None` for cards without one.
    fn ids(&self) -> Vec<Option<CardId>>;

    /// The card carrying `id`, if any.
    fn get_card(&self, id: CardId) -> Option<Card>;

    /// An independent copy of every card in store order.
    fn cards(&self) -> Vec<Card>;

    /// Append a card. Fails if its id is already present.
    fn add_card(&mut self, card: Card) -> Result<()>;

    /// Replace the card with the same id, keeping its position.
    fn update_card(&mut self, card: Card) -> Result<()>;

    /// Remove every card whose id is listed. Unknown ids are ignored.
    /// Returns how many cards were removed.
    fn delete_cards(&mut self, ids: &[CardId]) -> usize;

    /// Give fresh ids to cards without one, in store order.
    /// Returns the new ids in assignment order.
    fn mark_blank_ids(&mut self) -> Result<Vec<CardId>>;

    /// Clear every card's id.
    fn zap_ids(&mut self);

    fn count_of_ids(&self) -> usize {
        self.ids().into_iter().flatten().count()
    }

    fn contains(&self, id: CardId) -> bool {
        self.ids().contains(&Some(id))
    }

    /// The id the next call to [`CardStore::mark_blank_ids`] would start from.
    fn next_id(&self) -> Result<CardId> {
        IdAllocator::after(self.ids()).peek()
    }
}

/// Hands out ids above everything already in a store.
///
/// Scoped to a single marking pass, so repeated passes over the same
/// store stay deterministic.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: i64,
}

impl IdAllocator {
    /// Start at one past the highest id, or at [`MIN_ID`] when there is none.
    pub fn after<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = Option<CardId>>,
    {
        let next = ids
            .into_iter()
            .flatten()
            .max()
            .map_or(i64::from(MIN_ID), |max| i64::from(max) + 1);
        Self { next }
    }

    pub fn peek(&self) -> Result<CardId> {
        CardId::try_from(self.next).map_err(|_| Error::IdsExhausted)
    }

    pub fn allocate(&mut self) -> Result<CardId> {
        let id = self.peek()?;
        self.next += 1;
        Ok(id)
    }

    /// Allocate `count` ids at once, or none at all.
    pub fn allocate_many(&mut self, count: usize) -> Result<Vec<CardId>> {
        let last = self.next + count as i64 - 1;
        if count > 0 && CardId::try_from(last).is_err() {
            return Err(Error::IdsExhausted);
        }
        (0..count).map(|_| self.allocate()).collect()
    }
}

/// Storage format of a card file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Delimited,
    Markup,
}

impl StoreKind {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("txt") => Ok(Self::Delimited),
            Some("html") | Some("htm") => Ok(Self::Markup),
            _ => Err(Error::UnsupportedExtension(path.display().to_string())),
        }
    }
}

/// A store of either format.
#[derive(Debug, Clone)]
pub enum AnyStore {
    Deck(DelimitedDeck),
    Wiki(WikiDocument),
}

impl AnyStore {
    pub fn load_from<R: Read>(kind: StoreKind, reader: R, settings: &Settings) -> Result<Self> {
        Ok(match kind {
            StoreKind::Delimited => Self::Deck(DelimitedDeck::load_from(reader, &settings.delimited)?),
            StoreKind::Markup => Self::Wiki(WikiDocument::load_from(reader, &settings.markup)?),
        })
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            Self::Deck(_) => StoreKind::Delimited,
            Self::Wiki(_) => StoreKind::Markup,
        }
    }

    /// Serialize to the store's own format.
    pub fn encode(&self) -> Result<String> {
        match self {
            Self::Deck(deck) => deck.encode(),
            Self::Wiki(doc) => Ok(doc.encode()),
        }
    }

    pub fn save_to<W: Write>(&self, writer: W) -> Result<()> {
        match self {
            Self::Deck(deck) => deck.save_to(writer),
            Self::Wiki(doc) => doc.save_to(writer),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            AnyStore::Deck($store) => $call,
            AnyStore::Wiki($store) => $call,
        }
    };
}

impl CardStore for AnyStore {
    fn ids(&self) -> Vec<Option<CardId>> {
        dispatch!(self, s => s.ids())
    }

    fn get_card(&self, id: CardId) -> Option<Card> {
        dispatch!(self, s => s.get_card(id))
    }

    fn cards(&self) -> Vec<Card> {
        dispatch!(self, s => s.cards())
    }

    fn add_card(&mut self, card: Card) -> Result<()> {
        dispatch!(self, s => s.add_card(card))
    }

    fn update_card(&mut self, card: Card) -> Result<()> {
        dispatch!(self, s => s.update_card(card))
    }

    fn delete_cards(&mut self, ids: &[CardId]) -> usize {
        dispatch!(self, s => s.delete_cards(ids))
    }

    fn mark_blank_ids(&mut self) -> Result<Vec<CardId>> {
        dispatch!(self, s => s.mark_blank_ids())
    }

    fn zap_ids(&mut self) {
        dispatch!(self, s => s.zap_ids())
    }
}
