//! Sign assembly: exit/guide signage from destination tags, junction
//! names from node tags.
//!
//! The builder is policy-agnostic about junction-name display: it always
//! computes the candidate and the caller's region policy decides whether
//! to keep it.

use tracing::debug;

use crate::names::lang::{Language, Pronunciation, PronunciationAlphabet};
use crate::names::resolver::NameResolver;
use crate::names::tags::{parse_sign_key, split_multi, DestField, Direction, Side, SignKey};
use crate::records::sign::{SignInfo, SignType};
use crate::region::{RegionPolicy, ScriptMarkers};

/// One destination field's tags: base value, language variants and
/// pronunciations, in tag-encounter order.
#[derive(Default)]
struct Source<'t> {
    base: Option<&'t str>,
    variants: Vec<(Language, &'t str)>,
    base_pronunciations: Vec<(PronunciationAlphabet, &'t str)>,
    lang_pronunciations: Vec<(Language, PronunciationAlphabet, &'t str)>,
}

impl<'t> Source<'t> {
    fn add(&mut self, lang: Option<Language>, pron: Option<PronunciationAlphabet>, value: &'t str) {
        match (lang, pron) {
            (None, None) => self.base = Some(value),
            (Some(l), None) => self.variants.push((l, value)),
            (None, Some(a)) => self.base_pronunciations.push((a, value)),
            (Some(l), Some(a)) => self.lang_pronunciations.push((l, a, value)),
        }
    }
}

/// Builds sign lists for edges (exit/guide) and nodes (junction names).
pub struct SignBuilder<'a> {
    policy: &'a RegionPolicy,
    markers: &'a ScriptMarkers,
}

impl<'a> SignBuilder<'a> {
    pub fn new(policy: &'a RegionPolicy, markers: &'a ScriptMarkers) -> Self {
        Self { policy, markers }
    }

    /// Build the ordered sign list for one edge. `is_exit` selects the
    /// exit categories (ramps with signed exits) over the guide
    /// categories (forks and branches without exit signage).
    pub fn build_edge_signs(&self, tags: &[(String, String)], is_exit: bool) -> Vec<SignInfo> {
        let mut junction_ref: Option<&str> = None;
        let mut dest = Source::default();
        let mut dest_ref = Source::default();
        let mut dest_street = Source::default();
        let mut dest_ref_to = Source::default();
        let mut dest_street_to = Source::default();

        for (key, value) in tags {
            match parse_sign_key(key) {
                Some(SignKey::JunctionRef) => junction_ref = Some(value.as_str()),
                Some(SignKey::Destination {
                    field,
                    to,
                    lang,
                    pronunciation,
                }) => {
                    let source = match (field, to) {
                        // plain `destination` already names what the branch
                        // leads toward; `:to` adds nothing on it
                        (DestField::Plain, _) => &mut dest,
                        (DestField::Ref, false) => &mut dest_ref,
                        (DestField::Street, false) => &mut dest_street,
                        (DestField::Ref, true) => &mut dest_ref_to,
                        (DestField::Street, true) => &mut dest_street_to,
                    };
                    source.add(lang, pronunciation, value.as_str());
                }
                None => {}
            }
        }

        let (branch, toward) = if is_exit {
            (SignType::ExitBranch, SignType::ExitToward)
        } else {
            (SignType::GuideBranch, SignType::GuideToward)
        };

        let mut signs = Vec::new();
        if is_exit {
            if let Some(value) = junction_ref {
                for text in split_multi(value) {
                    signs.push(SignInfo::new(SignType::ExitNumber, text));
                }
            }
        }
        self.emit(&mut signs, &dest_ref, branch, true);
        self.emit(&mut signs, &dest_street, branch, false);
        self.emit(&mut signs, &dest_ref_to, toward, true);
        self.emit(&mut signs, &dest_street_to, toward, false);
        self.emit(&mut signs, &dest, toward, false);
        signs
    }

    /// Junction-name candidate for a node. Always computed; callers apply
    /// `RegionPolicy::show_junction_names`.
    pub fn junction_names(&self, node_tags: &[(String, String)]) -> Vec<SignInfo> {
        let resolver = NameResolver::new(self.policy, self.markers);
        resolver
            .resolve(node_tags, Direction::None, Side::None)
            .into_iter()
            .filter(|entry| !entry.is_route_number)
            .map(|entry| {
                let mut sign = SignInfo::new(SignType::JunctionName, entry.text);
                sign.language = entry.language;
                sign.pronunciation = entry.pronunciation;
                sign
            })
            .collect()
    }

    /// Emit one destination field: base values first (tagged with the
    /// region's sole language when one is declared), then each language
    /// variant appended, paired with the base element-wise by position.
    fn emit(
        &self,
        signs: &mut Vec<SignInfo>,
        source: &Source<'_>,
        sign_type: SignType,
        is_route_number: bool,
    ) {
        let base_parts = source.base.map(split_multi).unwrap_or_default();
        let first = signs.len();
        for text in &base_parts {
            let mut sign = SignInfo::new(sign_type, text.clone());
            sign.is_route_number = is_route_number;
            sign.language = self.policy.sole_language();
            signs.push(sign);
        }
        let base_range: Vec<usize> = (first..signs.len()).collect();

        for (alphabet, value) in &source.base_pronunciations {
            pair_positional(signs, &base_range, &split_multi(value), *alphabet);
        }

        for (lang, value) in &source.variants {
            let parts = split_multi(value);
            if !base_parts.is_empty() && parts.len() != base_parts.len() {
                // a language-tagged counterpart must match the base
                // element-wise; a ragged pair cannot be trusted
                debug!(
                    base = base_parts.len(),
                    variant = parts.len(),
                    "sign language variant does not pair with base, dropping"
                );
                continue;
            }
            let first_variant = signs.len();
            for text in parts {
                let mut sign = SignInfo::new(sign_type, text);
                sign.is_route_number = is_route_number;
                sign.language = Some(*lang);
                signs.push(sign);
            }
            let variant_range: Vec<usize> = (first_variant..signs.len()).collect();
            for (pron_lang, alphabet, value) in &source.lang_pronunciations {
                if pron_lang == lang {
                    pair_positional(signs, &variant_range, &split_multi(value), *alphabet);
                }
            }
        }
    }
}

fn pair_positional(
    signs: &mut [SignInfo],
    targets: &[usize],
    parts: &[String],
    alphabet: PronunciationAlphabet,
) {
    if targets.len() != parts.len() || targets.is_empty() {
        if !parts.is_empty() {
            debug!(
                targets = targets.len(),
                parts = parts.len(),
                "ambiguous sign pronunciation target, dropping"
            );
        }
        return;
    }
    for (&idx, part) in targets.iter().zip(parts) {
        let sign = &mut signs[idx];
        if sign.pronunciation.is_none() {
            sign.pronunciation = Some(Pronunciation {
                alphabet,
                text: part.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::lang::linguistic_map;

    fn tags(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn build(pairs: &[(&str, &str)], languages: Vec<Language>, is_exit: bool) -> Vec<SignInfo> {
        let policy = RegionPolicy::new(languages, true);
        let markers = ScriptMarkers::default();
        SignBuilder::new(&policy, &markers).build_edge_signs(&tags(pairs), is_exit)
    }

    #[test]
    fn test_exit_signs_with_language_variants() {
        let pairs = [
            ("junction:ref", "126B"),
            ("destination", "York;Lancaster"),
            ("destination:lang:ru", "Йорк;Ланкастер"),
            ("destination:street", "6th Avenue"),
            ("destination:ref", "SR 37"),
        ];
        let signs = build(&pairs, vec![Language::En], true);

        let numbers: Vec<_> = signs
            .iter()
            .filter(|s| s.sign_type == SignType::ExitNumber)
            .collect();
        assert_eq!(numbers.len(), 1);
        assert_eq!(numbers[0].text, "126B");

        let branches: Vec<_> = signs
            .iter()
            .filter(|s| s.sign_type == SignType::ExitBranch)
            .collect();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].text, "SR 37");
        assert!(branches[0].is_route_number);
        assert_eq!(branches[1].text, "6th Avenue");

        let towards: Vec<_> = signs
            .iter()
            .filter(|s| s.sign_type == SignType::ExitToward)
            .collect();
        assert_eq!(towards.len(), 4);
        assert_eq!(towards[0].text, "York");
        assert_eq!(towards[0].language, Some(Language::En));
        assert_eq!(towards[1].text, "Lancaster");
        assert_eq!(towards[1].language, Some(Language::En));
        // multi-value variant paired element-wise by position
        assert_eq!(towards[2].text, "Йорк");
        assert_eq!(towards[2].language, Some(Language::Ru));
        assert_eq!(towards[3].text, "Ланкастер");
        assert_eq!(towards[3].language, Some(Language::Ru));
    }

    #[test]
    fn test_toward_street_and_ref() {
        let pairs = [
            ("destination:street:to", "Main Street"),
            ("destination:street:to:lang:ru", "Главная улица"),
            ("destination:ref:to", "I 80"),
            ("destination:ref:to:lang:ru", "Я 80"),
        ];
        let signs = build(&pairs, vec![Language::En], true);
        let towards: Vec<_> = signs
            .iter()
            .filter(|s| s.sign_type == SignType::ExitToward)
            .collect();
        assert_eq!(towards.len(), 4);
        assert_eq!(towards[0].text, "I 80");
        assert!(towards[0].is_route_number);
        assert_eq!(towards[1].text, "Я 80");
        assert_eq!(towards[1].language, Some(Language::Ru));
        assert_eq!(towards[2].text, "Main Street");
        assert_eq!(towards[3].text, "Главная улица");
    }

    #[test]
    fn test_plain_destination_to_is_toward() {
        let signs = build(&[("destination:to", "Columbus")], vec![Language::En], true);
        assert_eq!(signs.len(), 1);
        assert_eq!(signs[0].sign_type, SignType::ExitToward);
        assert_eq!(signs[0].text, "Columbus");
        assert!(!signs[0].is_route_number);
    }

    #[test]
    fn test_guide_signs_without_exit() {
        let pairs = [
            ("junction:ref", "126B"),
            ("destination:ref", "I 70 East"),
            ("destination", "Columbus"),
        ];
        let signs = build(&pairs, vec![Language::En], false);
        // no exit number on guide signage
        assert!(signs.iter().all(|s| s.sign_type != SignType::ExitNumber));
        assert_eq!(signs[0].sign_type, SignType::GuideBranch);
        assert_eq!(signs[0].text, "I 70 East");
        assert_eq!(signs[1].sign_type, SignType::GuideToward);
        assert_eq!(signs[1].text, "Columbus");
    }

    #[test]
    fn test_junction_name_candidate() {
        let policy = RegionPolicy::new(vec![Language::En], false);
        let markers = ScriptMarkers::default();
        let builder = SignBuilder::new(&policy, &markers);
        let names = builder.junction_names(&tags(&[("name", "M Junction")]));
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].sign_type, SignType::JunctionName);
        assert_eq!(names[0].text, "M Junction");
        // candidate is computed regardless of the display policy
        assert!(!policy.show_junction_names);
    }

    #[test]
    fn test_ragged_language_variant_dropped() {
        let pairs = [
            ("destination", "York;Lancaster"),
            ("destination:lang:ru", "Йорк"),
        ];
        let signs = build(&pairs, vec![Language::En], true);
        assert_eq!(signs.len(), 2);
        assert!(signs.iter().all(|s| s.language == Some(Language::En)));
    }

    #[test]
    fn test_sign_pronunciation() {
        let pairs = [
            ("destination:street", "6th Avenue"),
            ("destination:street:pronunciation", "sɪksθ ˈævənjuː"),
        ];
        let signs = build(&pairs, vec![Language::En], true);
        let pron = signs[0].pronunciation.as_ref().unwrap();
        assert_eq!(pron.text, "sɪksθ ˈævənjuː");
    }

    #[test]
    fn test_linguistic_map_keys_bounded() {
        let pairs = [
            ("junction:ref", "12"),
            ("destination", "A;B"),
            ("destination:lang:ru", "А;Б"),
        ];
        let signs = build(&pairs, vec![Language::En], true);
        let map = linguistic_map(&signs);
        for key in map.keys() {
            assert!(usize::from(*key) < signs.len());
        }
        // the unmarked exit number has no map entry
        assert!(!map.contains_key(&0));
    }
}
