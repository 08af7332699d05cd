//! Keeps a wiki page of flashcards in step with a flashcard app export.
//!
//! Provides:
//! - Card type with optional ids (`Card`, `CardId`)
//! - Tab-delimited export decks (`DelimitedDeck`)
//! - HTML wiki pages with embedded cards (`WikiDocument`)
//! - The store contract both implement (`CardStore`)
//! - One-way sync operations and a plan that combines them

pub mod config;
pub mod delimited;
pub mod error;
pub mod markup;
pub mod plan;
pub mod store;
pub mod sync;
pub mod types;

pub use config::{DelimitedSettings, MarkupSettings, Settings};
pub use delimited::DelimitedDeck;
pub use error::{Error, Result};
pub use markup::WikiDocument;
pub use plan::{SyncPlan, SyncReport};
pub use store::{AnyStore, CardStore, IdAllocator, StoreKind};
pub use types::{Card, CardId, MIN_ID};
