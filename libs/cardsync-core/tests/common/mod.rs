//! Common test utilities for the store and sync integration tests.
//!
//! Provides:
//! - Sample export and wiki files (see [`fixtures`])
//! - Loaders that parse them with default settings
//! - `each_store`, which runs a check against every store format

pub mod fixtures;

use cardsync_core::{AnyStore, CardStore, DelimitedDeck, Settings, StoreKind, WikiDocument};

/// Parse an export file with default settings.
pub fn load_deck(content: &str) -> DelimitedDeck {
    DelimitedDeck::parse(content, &Settings::default().delimited).expect("sample deck should parse")
}

/// Parse a wiki page with default settings.
pub fn load_wiki(content: &str) -> WikiDocument {
    WikiDocument::parse(content, &Settings::default().markup).expect("sample wiki should parse")
}

/// A fresh, empty store of each format.
pub fn empty_stores() -> Vec<AnyStore> {
    vec![
        AnyStore::Deck(DelimitedDeck::default()),
        AnyStore::Wiki(WikiDocument::default()),
    ]
}

/// Run `check` against an empty store of each format.
///
/// The format is passed along so failures say which store broke.
pub fn each_store(check: impl Fn(&mut AnyStore, StoreKind)) {
    for mut store in empty_stores() {
        let kind = store.kind();
        check(&mut store, kind);
    }
}

/// Ids of a store with blanks dropped.
pub fn present_ids(store: &impl CardStore) -> Vec<i32> {
    store.ids().into_iter().flatten().collect()
}
