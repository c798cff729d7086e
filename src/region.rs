//! Region policy: externally supplied per-admin-area preferences.
//!
//! The policy is consumed, not computed, by this crate. An administrative
//! boundary lookup upstream maps a point to the policy for its area; the
//! resolver and sign builder only read it.

use serde::{Deserialize, Serialize};

use crate::names::Language;

/// Per-region naming preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionPolicy {
    /// Preferred languages, most specific first. A bilingual municipality
    /// yields two entries, e.g. `["fr", "nl"]`.
    #[serde(default)]
    pub languages: Vec<Language>,
    /// Whether junction-name signs are shown in this region. The sign
    /// builder always computes the candidate; this gates emission.
    #[serde(default)]
    pub show_junction_names: bool,
}

impl RegionPolicy {
    pub fn new(languages: Vec<Language>, show_junction_names: bool) -> Self {
        Self {
            languages,
            show_junction_names,
        }
    }

    /// The language an unmarked `name` tag is assumed to be in: only
    /// meaningful when the region declares exactly one language.
    pub fn sole_language(&self) -> Option<Language> {
        match self.languages.as_slice() {
            [lang] => Some(*lang),
            _ => None,
        }
    }
}

/// Tag suffixes that mark a script, transliteration, or romanization
/// rather than a spoken language (`name:ja_rm`, `name:ko_rm`, ...). Text
/// under these suffixes is kept as a name entry but never enters the
/// language map. The set is data, not logic: a compiled-in default ships
/// with the crate and deployments override it from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptMarkers {
    suffixes: Vec<String>,
}

const DEFAULT_MARKERS: &[&str] = &[
    "kana", "ja_rm", "ja_kana", "ja_hira", "ko_rm", "zh_py", "zh_pinyin", "iso", "nan-POJ",
];

impl Default for ScriptMarkers {
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScriptMarkers {
    pub fn new(suffixes: Vec<String>) -> Self {
        Self { suffixes }
    }

    /// Load a replacement list from JSON, e.g. `{"suffixes": ["kana"]}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn is_marker(&self, suffix: &str) -> bool {
        self.suffixes.iter().any(|s| s == suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let markers = ScriptMarkers::default();
        assert!(markers.is_marker("ja_rm"));
        assert!(markers.is_marker("kana"));
        assert!(!markers.is_marker("fr"));
    }

    #[test]
    fn test_markers_from_json() {
        let markers = ScriptMarkers::from_json(r#"{"suffixes": ["foo_rm"]}"#).unwrap();
        assert!(markers.is_marker("foo_rm"));
        assert!(!markers.is_marker("ja_rm"));
    }

    #[test]
    fn test_policy_from_json() {
        let policy: RegionPolicy =
            serde_json::from_str(r#"{"languages": ["fr", "nl"], "show_junction_names": true}"#)
                .unwrap();
        assert_eq!(policy.languages, vec![Language::Fr, Language::Nl]);
        assert!(policy.show_junction_names);
        assert_eq!(policy.sole_language(), None);
    }

    #[test]
    fn test_sole_language() {
        let policy = RegionPolicy::new(vec![Language::En], false);
        assert_eq!(policy.sole_language(), Some(Language::En));
    }
}
