//! Street-name and signage resolution from raw way tags.

pub mod lang;
pub mod resolver;
pub mod sign_builder;
pub mod tags;

pub use lang::{
    linguistic_map, Language, Linguistic, LinguisticEntry, LinguisticMap, Pronunciation,
    PronunciationAlphabet,
};
pub use resolver::NameResolver;
pub use sign_builder::SignBuilder;
pub use tags::{Direction, Side};

/// One resolved name of a way, as stored in an edge-info record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub text: String,
    /// Unique per edge-info record, stable across directions. Index 0 is
    /// the primary/default-language name when one exists.
    pub name_index: u8,
    pub language: Option<Language>,
    pub pronunciation: Option<Pronunciation>,
    pub is_route_number: bool,
    pub side: Side,
    pub direction: Direction,
}

impl NameEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            name_index: 0,
            language: None,
            pronunciation: None,
            is_route_number: false,
            side: Side::None,
            direction: Direction::None,
        }
    }
}

impl Linguistic for NameEntry {
    fn language(&self) -> Option<Language> {
        self.language
    }

    fn pronunciation(&self) -> Option<&Pronunciation> {
        self.pronunciation.as_ref()
    }
}
