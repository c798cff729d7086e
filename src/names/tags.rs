//! Tag-key grammar for names, destinations and pronunciations.
//!
//! Recognized key shapes:
//!   name
//!   name:<lang>                      name:<marker>
//!   name:left|right|forward|backward [:<lang> | :<marker>]
//!   name[...]:pronunciation[:<alphabet>]
//!   ref                              junction:ref
//!   destination[:ref|:street][:to][:lang:<lang>][:pronunciation[:<alphabet>]]
//!
//! Multi-value tags split on `;`. Combined display names split on ` - `
//! or ` / ` with surrounding spaces ("Rue Bodenbroek - Bodenbroekstraat"
//! is two alternate names for the same way, not one).

use serde::{Deserialize, Serialize};

use crate::names::lang::{Language, PronunciationAlphabet};
use crate::region::ScriptMarkers;

/// Direction of travel a name applies to. `None` means both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    #[default]
    None = 0,
    Forward = 1,
    Backward = 2,
}

impl Direction {
    pub fn from_u8(value: u8) -> Direction {
        match value {
            1 => Direction::Forward,
            2 => Direction::Backward,
            _ => Direction::None,
        }
    }
}

/// Physical side of the way a name applies to (dual-carriageway tagging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    #[default]
    None = 0,
    Left = 1,
    Right = 2,
}

impl Side {
    pub fn from_u8(value: u8) -> Side {
        match value {
            1 => Side::Left,
            2 => Side::Right,
            _ => Side::None,
        }
    }
}

/// Directional/side qualifier on a name key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameQualifier {
    Plain,
    Forward,
    Backward,
    Left,
    Right,
}

impl NameQualifier {
    fn from_segment(segment: &str) -> Option<NameQualifier> {
        Some(match segment {
            "forward" => NameQualifier::Forward,
            "backward" => NameQualifier::Backward,
            "left" => NameQualifier::Left,
            "right" => NameQualifier::Right,
            _ => return None,
        })
    }
}

/// A parsed `name*` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameKey {
    /// `name`, `name:forward`, ...
    Base(NameQualifier),
    /// `name:fr`, `name:left:fr`, ...
    Lang(NameQualifier, Language),
    /// Script/transliteration marker suffix: `name:ja_rm`, ...
    Marker(NameQualifier, String),
    /// `name:pronunciation`, `name:fr:pronunciation:x-sampa`, ...
    Pronunciation(NameQualifier, Option<Language>, PronunciationAlphabet),
}

/// Parse a `name*` tag key. Returns `None` for keys outside the grammar.
pub fn parse_name_key(key: &str, markers: &ScriptMarkers) -> Option<NameKey> {
    let mut segments = key.split(':');
    if segments.next()? != "name" {
        return None;
    }
    let rest: Vec<&str> = segments.collect();

    let mut idx = 0;
    let qualifier = match rest.first().and_then(|s| NameQualifier::from_segment(s)) {
        Some(q) => {
            idx += 1;
            q
        }
        None => NameQualifier::Plain,
    };

    let mut lang = None;
    match rest.get(idx) {
        None => return Some(NameKey::Base(qualifier)),
        Some(&"pronunciation") => {}
        Some(&segment) => {
            if let Some(l) = Language::from_tag(segment) {
                lang = Some(l);
                idx += 1;
            } else if markers.is_marker(segment) {
                // markers cannot carry a pronunciation suffix
                return if rest.len() == idx + 1 {
                    Some(NameKey::Marker(qualifier, segment.to_string()))
                } else {
                    None
                };
            } else {
                return None;
            }
        }
    }

    match rest.get(idx) {
        None => match lang {
            Some(l) => Some(NameKey::Lang(qualifier, l)),
            None => Some(NameKey::Base(qualifier)),
        },
        Some(&"pronunciation") => {
            let alphabet = match rest.get(idx + 1) {
                None => PronunciationAlphabet::default(),
                Some(&code) => {
                    if rest.len() > idx + 2 {
                        return None;
                    }
                    PronunciationAlphabet::from_tag(code)?
                }
            };
            Some(NameKey::Pronunciation(qualifier, lang, alphabet))
        }
        Some(_) => None,
    }
}

/// Which destination field a sign phrase comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestField {
    /// `destination` — place names the road leads toward
    Plain,
    /// `destination:ref` — route number of the road led onto
    Ref,
    /// `destination:street` — street name of the road led onto
    Street,
}

/// A parsed `destination*` or `junction:ref` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignKey {
    JunctionRef,
    Destination {
        field: DestField,
        /// `:to` variant: names what the branch eventually leads to.
        to: bool,
        lang: Option<Language>,
        pronunciation: Option<PronunciationAlphabet>,
    },
}

/// Parse a sign-source tag key. Returns `None` for keys outside the grammar.
pub fn parse_sign_key(key: &str) -> Option<SignKey> {
    if key == "junction:ref" {
        return Some(SignKey::JunctionRef);
    }
    let mut segments = key.split(':');
    if segments.next()? != "destination" {
        return None;
    }
    let rest: Vec<&str> = segments.collect();

    let mut idx = 0;
    let field = match rest.first() {
        Some(&"ref") => {
            idx += 1;
            DestField::Ref
        }
        Some(&"street") => {
            idx += 1;
            DestField::Street
        }
        _ => DestField::Plain,
    };

    let to = if rest.get(idx) == Some(&"to") {
        idx += 1;
        true
    } else {
        false
    };

    let lang = if rest.get(idx) == Some(&"lang") {
        let l = Language::from_tag(rest.get(idx + 1)?)?;
        idx += 2;
        Some(l)
    } else {
        None
    };

    let pronunciation = match rest.get(idx) {
        None => None,
        Some(&"pronunciation") => {
            idx += 1;
            match rest.get(idx) {
                None => Some(PronunciationAlphabet::default()),
                Some(&code) => {
                    idx += 1;
                    Some(PronunciationAlphabet::from_tag(code)?)
                }
            }
        }
        Some(_) => return None,
    };
    if idx != rest.len() {
        return None;
    }

    Some(SignKey::Destination {
        field,
        to,
        lang,
        pronunciation,
    })
}

/// Split a multi-value tag on `;`, dropping empty parts.
pub fn split_multi(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a combined display name ("X - Y", "X / Y") into its alternate
/// names. Separators only count with surrounding spaces; a hyphenated
/// street name stays whole.
pub fn split_display(value: &str) -> Vec<String> {
    for sep in [" - ", " / "] {
        if value.contains(sep) {
            return value
                .split(sep)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_string()]
    }
}

/// Full split for a name value: `;` first, then display separators.
pub fn split_name_value(value: &str) -> Vec<String> {
    split_multi(value)
        .iter()
        .flat_map(|part| split_display(part))
        .collect()
}
