//! Sign records: exit/guide signage owned by edges, junction names owned
//! by nodes.
//!
//! Blob record layout (little-endian, 20 bytes each):
//!
//!   owner_index: u32  // edge or node index within the tile
//!   text_off:    u32  // into the shared text blob
//!   pron_off:    u32  // valid when has-pronunciation flag set
//!   owner_kind:  u8   // 0 = edge, 1 = node
//!   sign_type:   u8
//!   flags:       u8   // route_number:1 | has_lang:1 | has_pron:1
//!   lang:        u8
//!   alphabet:    u8
//!   reserved:    [u8; 3]

use crate::error::{Result, TileError};
use crate::names::lang::{Language, Linguistic, Pronunciation, PronunciationAlphabet};
use crate::records::text::{self, TextTable};

pub const SIGN_RECORD_SIZE: usize = 20;

const FLAG_ROUTE_NUMBER: u8 = 1 << 0;
const FLAG_HAS_LANG: u8 = 1 << 1;
const FLAG_HAS_PRON: u8 = 1 << 2;

/// What a sign phrase is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SignType {
    /// Exit number from `junction:ref` ("126B")
    ExitNumber = 0,
    /// Road exited onto
    ExitBranch = 1,
    /// Place/road the exit leads toward
    ExitToward = 2,
    /// Name of the exit itself
    ExitName = 3,
    /// Road a fork branches onto (no exit signage)
    GuideBranch = 4,
    /// Place a fork leads toward (no exit signage)
    GuideToward = 5,
    /// Signed name of an intersection node
    JunctionName = 6,
    /// Guidance-view image reference
    GuidanceView = 7,
}

impl SignType {
    pub fn from_u8(value: u8) -> SignType {
        use SignType::*;
        match value {
            1 => ExitBranch,
            2 => ExitToward,
            3 => ExitName,
            4 => GuideBranch,
            5 => GuideToward,
            6 => JunctionName,
            7 => GuidanceView,
            _ => ExitNumber,
        }
    }
}

/// Who a sign belongs to within its tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOwner {
    Edge(u32),
    Node(u32),
}

/// One sign phrase with its optional language and pronunciation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignInfo {
    pub sign_type: SignType,
    pub text: String,
    pub is_route_number: bool,
    pub language: Option<Language>,
    pub pronunciation: Option<Pronunciation>,
}

impl SignInfo {
    pub fn new(sign_type: SignType, text: impl Into<String>) -> Self {
        Self {
            sign_type,
            text: text.into(),
            is_route_number: false,
            language: None,
            pronunciation: None,
        }
    }
}

impl Linguistic for SignInfo {
    fn language(&self) -> Option<Language> {
        self.language
    }

    fn pronunciation(&self) -> Option<&Pronunciation> {
        self.pronunciation.as_ref()
    }
}

/// Encode one owned sign into the blob.
pub fn encode(owner: SignOwner, sign: &SignInfo, text: &mut TextTable, out: &mut Vec<u8>) {
    let (owner_index, owner_kind) = match owner {
        SignOwner::Edge(i) => (i, 0u8),
        SignOwner::Node(i) => (i, 1u8),
    };
    let text_off = text.add(&sign.text);
    let mut flags = 0u8;
    if sign.is_route_number {
        flags |= FLAG_ROUTE_NUMBER;
    }
    let mut lang = 0u8;
    if let Some(l) = sign.language {
        flags |= FLAG_HAS_LANG;
        lang = l as u8;
    }
    let mut pron_off = 0u32;
    let mut alphabet = 0u8;
    if let Some(pron) = &sign.pronunciation {
        flags |= FLAG_HAS_PRON;
        pron_off = text.add(&pron.text);
        alphabet = pron.alphabet as u8;
    }
    out.extend_from_slice(&owner_index.to_le_bytes());
    out.extend_from_slice(&text_off.to_le_bytes());
    out.extend_from_slice(&pron_off.to_le_bytes());
    out.push(owner_kind);
    out.push(sign.sign_type as u8);
    out.push(flags);
    out.push(lang);
    out.push(alphabet);
    out.extend_from_slice(&[0u8; 3]);
}

/// Decode one sign record from the blob.
pub fn decode(bytes: &[u8], text_blob: &[u8]) -> Result<(SignOwner, SignInfo)> {
    let truncated = || TileError::Truncated { section: "signs" };
    if bytes.len() < SIGN_RECORD_SIZE {
        return Err(truncated());
    }
    let owner_index = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    let text_off = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    let pron_off = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let owner = match bytes[12] {
        0 => SignOwner::Edge(owner_index),
        1 => SignOwner::Node(owner_index),
        _ => return Err(truncated()),
    };
    let flags = bytes[14];
    let language = if flags & FLAG_HAS_LANG != 0 {
        Some(Language::from_u8(bytes[15]).ok_or_else(truncated)?)
    } else {
        None
    };
    let pronunciation = if flags & FLAG_HAS_PRON != 0 {
        Some(Pronunciation {
            alphabet: PronunciationAlphabet::from_u8(bytes[16]).ok_or_else(truncated)?,
            text: text::get(text_blob, pron_off)?.to_string(),
        })
    } else {
        None
    };
    Ok((
        owner,
        SignInfo {
            sign_type: SignType::from_u8(bytes[13]),
            text: text::get(text_blob, text_off)?.to_string(),
            is_route_number: flags & FLAG_ROUTE_NUMBER != 0,
            language,
            pronunciation,
        },
    ))
}
