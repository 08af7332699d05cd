//! Error types for cardsync-core.

use crate::types::CardId;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading, mutating, reconciling or saving card stores.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // Delimited text format violations.
    #[error("header line {line} ends without CRLF")]
    UnterminatedHeader { line: usize },

    #[error("missing field name line")]
    MissingFieldNames,

    #[error("duplicate field name '{0}'")]
    DuplicateFieldName(String),

    #[error("record {record}, field {field}: quoted field not terminated before end of input")]
    UnterminatedQuote { record: usize, field: usize },

    #[error("record {record}, field {field}: closing quote followed by {found:?}")]
    MalformedQuote {
        record: usize,
        field: usize,
        found: char,
    },

    #[error("record {record}, field {field}: carriage return not followed by line feed")]
    BareCarriageReturn { record: usize, field: usize },

    #[error("record {record} has {found} fields, expected {expected}")]
    FieldCount {
        record: usize,
        found: usize,
        expected: usize,
    },

    // Markup format violations.
    #[error("card field is missing its <{0}> element")]
    MissingFieldPart(&'static str),

    #[error("expected exactly one <{tag}> element, found {found}")]
    MarkerCount { tag: String, found: usize },

    // Either format.
    #[error("illegal card id '{0}'")]
    InvalidId(String),

    #[error("card id {0} appears more than once")]
    DuplicateStoredId(CardId),

    // Identity contract violations.
    #[error("can't add id '{0}' as it is already present")]
    DuplicateId(CardId),

    #[error("can't update from a card without an id")]
    MissingId,

    #[error("card id {0} not found")]
    CardNotFound(CardId),

    #[error("card id {id} can't be stored without the '{field}' field")]
    IdNotRepresentable { id: CardId, field: String },

    #[error("no card ids left to assign")]
    IdsExhausted,

    // Cross-collection preconditions.
    #[error("next free id differs: source {source_next}, destination {destination_next}")]
    NextIdMismatch {
        source_next: CardId,
        destination_next: CardId,
    },

    #[error("can't ignore source ids: destination already holds {0} ided cards")]
    DestinationHasIds(usize),

    #[error("unsupported store type for '{0}' (expected .txt, .html or .htm)")]
    UnsupportedExtension(String),
}
