//! Name resolution: from raw way tags to the ordered, language-tagged
//! name list stored in a tile.
//!
//! Resolution never errors. Malformed tag combinations degrade to fewer
//! entries or an empty list; a way with no name is a valid state.

use tracing::debug;

use crate::names::lang::{Language, Pronunciation, PronunciationAlphabet};
use crate::names::tags::{
    parse_name_key, split_multi, split_name_value, Direction, NameKey, NameQualifier, Side,
};
use crate::names::NameEntry;
use crate::region::{RegionPolicy, ScriptMarkers};

/// Name tags of one qualifier family (plain, or one direction/side).
#[derive(Default)]
struct Family<'t> {
    base: Option<&'t str>,
    /// Language-tagged variants in tag-encounter order.
    variants: Vec<(Language, &'t str)>,
    /// Script-marker variants (kept as names, never in the language map).
    markers: Vec<&'t str>,
    base_pronunciations: Vec<(PronunciationAlphabet, &'t str)>,
    lang_pronunciations: Vec<(Language, PronunciationAlphabet, &'t str)>,
}

impl Family<'_> {
    fn is_empty(&self) -> bool {
        self.base.is_none() && self.variants.is_empty() && self.markers.is_empty()
    }
}

/// Resolves the name list for one direction of travel along a way.
pub struct NameResolver<'a> {
    policy: &'a RegionPolicy,
    markers: &'a ScriptMarkers,
}

impl<'a> NameResolver<'a> {
    pub fn new(policy: &'a RegionPolicy, markers: &'a ScriptMarkers) -> Self {
        Self { policy, markers }
    }

    /// Resolve the ordered name list for the given traversal context.
    /// Direction/side-qualified tags win over plain ones when present;
    /// `ref` values are appended as route numbers.
    pub fn resolve(
        &self,
        tags: &[(String, String)],
        direction: Direction,
        side: Side,
    ) -> Vec<NameEntry> {
        let mut plain = Family::default();
        let mut directional = Family::default();
        let mut sided = Family::default();

        for (key, value) in tags {
            let Some(parsed) = parse_name_key(key, self.markers) else {
                continue;
            };
            let family = match qualifier_of(&parsed) {
                NameQualifier::Plain => &mut plain,
                NameQualifier::Forward if direction == Direction::Forward => &mut directional,
                NameQualifier::Backward if direction == Direction::Backward => &mut directional,
                NameQualifier::Left if side == Side::Left => &mut sided,
                NameQualifier::Right if side == Side::Right => &mut sided,
                _ => continue, // qualified for the other direction/side
            };
            match parsed {
                NameKey::Base(_) => family.base = Some(value.as_str()),
                NameKey::Lang(_, lang) => family.variants.push((lang, value.as_str())),
                NameKey::Marker(_, _) => family.markers.push(value.as_str()),
                NameKey::Pronunciation(_, None, alphabet) => {
                    family.base_pronunciations.push((alphabet, value.as_str()))
                }
                NameKey::Pronunciation(_, Some(lang), alphabet) => family
                    .lang_pronunciations
                    .push((lang, alphabet, value.as_str())),
            }
        }

        // Directional variants take precedence; plain tags are the fallback.
        let (family, entry_direction, entry_side) = if !directional.is_empty() {
            (directional, direction, Side::None)
        } else if !sided.is_empty() {
            (sided, Direction::None, side)
        } else {
            (plain, Direction::None, Side::None)
        };

        let mut entries: Vec<NameEntry> = Vec::new();
        let mut base_indices: Vec<usize> = Vec::new();

        let push = |entries: &mut Vec<NameEntry>, mut entry: NameEntry| -> Option<usize> {
            // A name string already present is not re-added under a new index.
            if entries.iter().any(|e| e.text == entry.text) {
                return None;
            }
            entry.side = entry_side;
            entry.direction = entry_direction;
            entries.push(entry);
            Some(entries.len() - 1)
        };

        // Split the language-tagged variants up front; duplicate-suppression
        // of the base compares against these texts.
        let variants: Vec<(Language, String)> = family
            .variants
            .iter()
            .flat_map(|(lang, value)| {
                split_name_value(value)
                    .into_iter()
                    .map(move |text| (*lang, text))
            })
            .collect();

        // The unmarked base name, unless every part of it duplicates a
        // language-tagged variant (combined "X - Y" display names).
        let base_parts = family.base.map(split_name_value).unwrap_or_default();
        let covered = !base_parts.is_empty()
            && base_parts
                .iter()
                .all(|part| variants.iter().any(|(_, text)| text == part));
        if !covered {
            for part in &base_parts {
                let mut entry = NameEntry::new(part.clone());
                // In a region with a single declared language, an unmarked
                // name is that language; in multilingual regions it stays
                // unmarked.
                entry.language = self.policy.sole_language();
                if let Some(i) = push(&mut entries, entry) {
                    base_indices.push(i);
                }
            }
        }

        // Variants in region-preferred order, then remaining languages in
        // tag-encounter order.
        for preferred in &self.policy.languages {
            for (lang, text) in &variants {
                if lang == preferred {
                    let mut entry = NameEntry::new(text.clone());
                    entry.language = Some(*lang);
                    push(&mut entries, entry);
                }
            }
        }
        for (lang, text) in &variants {
            if !self.policy.languages.contains(lang) {
                let mut entry = NameEntry::new(text.clone());
                entry.language = Some(*lang);
                push(&mut entries, entry);
            }
        }

        // Script-marker texts are names without a language.
        for value in &family.markers {
            for text in split_name_value(value) {
                push(&mut entries, NameEntry::new(text));
            }
        }

        self.attach_pronunciations(&mut entries, &base_indices, &family);

        // Route numbers last, never language-tagged.
        for (key, value) in tags {
            if key == "ref" {
                for text in split_multi(value) {
                    let mut entry = NameEntry::new(text);
                    entry.is_route_number = true;
                    push(&mut entries, entry);
                }
            }
        }

        entries.truncate(usize::from(u8::MAX));
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.name_index = i as u8;
        }
        entries
    }

    /// Correlate pronunciation tags with name entries. Unambiguous targets
    /// only: a pronunciation that could bind to several entries (or none)
    /// is dropped, never guessed.
    fn attach_pronunciations(
        &self,
        entries: &mut [NameEntry],
        base_indices: &[usize],
        family: &Family<'_>,
    ) {
        for (alphabet, value) in &family.base_pronunciations {
            let parts = split_multi(value);
            pair_positional(entries, base_indices, &parts, *alphabet);
        }
        for (lang, alphabet, value) in &family.lang_pronunciations {
            let mut targets: Vec<usize> = entries
                .iter()
                .enumerate()
                .filter(|(i, e)| e.language == Some(*lang) && !base_indices.contains(i))
                .map(|(i, _)| i)
                .collect();
            if targets.is_empty() {
                // No variant entry carries this language; a base entry
                // attributed to it (sole-language region) is the target.
                targets = base_indices
                    .iter()
                    .copied()
                    .filter(|&i| entries[i].language == Some(*lang))
                    .collect();
            }
            let parts = split_multi(value);
            pair_positional(entries, &targets, &parts, *alphabet);
        }
    }
}

/// Pair pronunciation parts with target entries element-wise by position.
/// Counts must line up exactly; a mismatch means the binding is ambiguous
/// and everything is dropped.
fn pair_positional(
    entries: &mut [NameEntry],
    targets: &[usize],
    parts: &[String],
    alphabet: PronunciationAlphabet,
) {
    if targets.len() != parts.len() || targets.is_empty() {
        if !parts.is_empty() {
            debug!(
                targets = targets.len(),
                parts = parts.len(),
                "ambiguous pronunciation target, dropping"
            );
        }
        return;
    }
    for (&idx, part) in targets.iter().zip(parts) {
        let entry = &mut entries[idx];
        if entry.pronunciation.is_none() {
            entry.pronunciation = Some(Pronunciation {
                alphabet,
                text: part.clone(),
            });
        }
    }
}

fn qualifier_of(key: &NameKey) -> NameQualifier {
    match key {
        NameKey::Base(q)
        | NameKey::Lang(q, _)
        | NameKey::Marker(q, _)
        | NameKey::Pronunciation(q, _, _) => *q,
    }
}
