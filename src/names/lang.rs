//! Language and pronunciation tags.
//!
//! Languages are the ISO-639-like codes seen in road data tags
//! (`name:fr`, `destination:lang:ru`). The set is closed and each code has
//! a stable byte value used in the tile encoding; appending new codes is
//! fine, renumbering is a layout change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spoken-language codes. `None` in surrounding `Option`s means the text
/// carries no language marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Language {
    En = 0,
    Fr = 1,
    De = 2,
    Nl = 3,
    Es = 4,
    It = 5,
    Pt = 6,
    Ru = 7,
    Ja = 8,
    Ko = 9,
    Zh = 10,
    Ar = 11,
    El = 12,
    Pl = 13,
    Cs = 14,
    Sk = 15,
    Hu = 16,
    Ro = 17,
    Bg = 18,
    Sr = 19,
    Hr = 20,
    Sl = 21,
    Uk = 22,
    Be = 23,
    Lt = 24,
    Lv = 25,
    Et = 26,
    Fi = 27,
    Sv = 28,
    No = 29,
    Da = 30,
    Is = 31,
    Tr = 32,
    He = 33,
    Th = 34,
    Vi = 35,
    Ca = 36,
    Eu = 37,
    Gl = 38,
    Cy = 39,
    Ga = 40,
    Mk = 41,
    Sq = 42,
    Mt = 43,
    Lb = 44,
}

impl Language {
    /// Parse a tag suffix into a language. Unknown suffixes are not
    /// languages (they may be script markers, see `ScriptMarkers`).
    pub fn from_tag(code: &str) -> Option<Language> {
        use Language::*;
        Some(match code {
            "en" => En,
            "fr" => Fr,
            "de" => De,
            "nl" => Nl,
            "es" => Es,
            "it" => It,
            "pt" => Pt,
            "ru" => Ru,
            "ja" => Ja,
            "ko" => Ko,
            "zh" => Zh,
            "ar" => Ar,
            "el" => El,
            "pl" => Pl,
            "cs" => Cs,
            "sk" => Sk,
            "hu" => Hu,
            "ro" => Ro,
            "bg" => Bg,
            "sr" => Sr,
            "hr" => Hr,
            "sl" => Sl,
            "uk" => Uk,
            "be" => Be,
            "lt" => Lt,
            "lv" => Lv,
            "et" => Et,
            "fi" => Fi,
            "sv" => Sv,
            "no" => No,
            "da" => Da,
            "is" => Is,
            "tr" => Tr,
            "he" => He,
            "th" => Th,
            "vi" => Vi,
            "ca" => Ca,
            "eu" => Eu,
            "gl" => Gl,
            "cy" => Cy,
            "ga" => Ga,
            "mk" => Mk,
            "sq" => Sq,
            "mt" => Mt,
            "lb" => Lb,
            _ => return None,
        })
    }

    pub fn from_u8(value: u8) -> Option<Language> {
        use Language::*;
        Some(match value {
            0 => En,
            1 => Fr,
            2 => De,
            3 => Nl,
            4 => Es,
            5 => It,
            6 => Pt,
            7 => Ru,
            8 => Ja,
            9 => Ko,
            10 => Zh,
            11 => Ar,
            12 => El,
            13 => Pl,
            14 => Cs,
            15 => Sk,
            16 => Hu,
            17 => Ro,
            18 => Bg,
            19 => Sr,
            20 => Hr,
            21 => Sl,
            22 => Uk,
            23 => Be,
            24 => Lt,
            25 => Lv,
            26 => Et,
            27 => Fi,
            28 => Sv,
            29 => No,
            30 => Da,
            31 => Is,
            32 => Tr,
            33 => He,
            34 => Th,
            35 => Vi,
            36 => Ca,
            37 => Eu,
            38 => Gl,
            39 => Cy,
            40 => Ga,
            41 => Mk,
            42 => Sq,
            43 => Mt,
            44 => Lb,
            _ => return None,
        })
    }
}

/// Phonetic alphabet of a pronunciation string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum PronunciationAlphabet {
    #[default]
    Ipa = 0,
    Katakana = 1,
    Jeita = 2,
    NtSampa = 3,
    XSampa = 4,
}

impl PronunciationAlphabet {
    /// Parse a `:pronunciation:<alphabet>` tag suffix.
    pub fn from_tag(code: &str) -> Option<PronunciationAlphabet> {
        use PronunciationAlphabet::*;
        Some(match code {
            "ipa" => Ipa,
            "katakana" => Katakana,
            "jeita" => Jeita,
            "nt-sampa" => NtSampa,
            "x-sampa" => XSampa,
            _ => return None,
        })
    }

    pub fn from_u8(value: u8) -> Option<PronunciationAlphabet> {
        use PronunciationAlphabet::*;
        Some(match value {
            0 => Ipa,
            1 => Katakana,
            2 => Jeita,
            3 => NtSampa,
            4 => XSampa,
            _ => return None,
        })
    }
}

/// A pronunciation: phonetic alphabet plus raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pronunciation {
    pub alphabet: PronunciationAlphabet,
    pub text: String,
}

/// One entry of a linguistic map: the language and/or pronunciation of a
/// name or sign at the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinguisticEntry {
    pub language: Option<Language>,
    pub alphabet: PronunciationAlphabet,
    pub pronunciation: String,
}

/// Index → linguistic entry side table, parallel to a name or sign list.
/// An index with neither language nor pronunciation is absent.
pub type LinguisticMap = BTreeMap<u8, LinguisticEntry>;

/// Anything carrying an optional language and pronunciation. Names and
/// signs both implement this so consumers share one lookup contract.
pub trait Linguistic {
    fn language(&self) -> Option<Language>;
    fn pronunciation(&self) -> Option<&Pronunciation>;
}

/// Build the linguistic map for a list of names or signs. Keys are list
/// indices, so every key is `< items.len()` by construction.
pub fn linguistic_map<T: Linguistic>(items: &[T]) -> LinguisticMap {
    let mut map = LinguisticMap::new();
    for (i, item) in items.iter().enumerate() {
        if item.language().is_none() && item.pronunciation().is_none() {
            continue;
        }
        let (alphabet, text) = match item.pronunciation() {
            Some(p) => (p.alphabet, p.text.clone()),
            None => (PronunciationAlphabet::default(), String::new()),
        };
        map.insert(
            i as u8,
            LinguisticEntry {
                language: item.language(),
                alphabet,
                pronunciation: text,
            },
        );
    }
    map
}
