//! Error types for deck construction.

/// Errors raised while building the room deck.
///
/// Everything else in this crate degrades with a logged fallback; an
/// empty catalog is the one configuration error deck building cannot
/// degrade past.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// The catalog offers no room definitions to sample from.
    #[error("cannot build a deck from an empty room catalog")]
    EmptyCatalog,
}
