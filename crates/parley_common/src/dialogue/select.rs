//! Template selection among equally valid replies.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How one reply is picked from a set of candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TemplateSelector {
    /// Uniform random choice
    #[default]
    Random,
    /// Always the same index (wrapped to the candidate count)
    Fixed { index: usize },
    /// Stable per input: hash of input and seed
    Hashed { seed: u64 },
}

impl TemplateSelector {
    /// Index into a set of `len` candidates. `None` when empty.
    pub fn pick_index(&self, len: usize, input: &str) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let idx = match self {
            TemplateSelector::Random => rand::thread_rng().gen_range(0..len),
            TemplateSelector::Fixed { index } => index % len,
            TemplateSelector::Hashed { seed } => (seed_from_str(input) ^ seed) as usize % len,
        };
        Some(idx)
    }

    pub fn pick<'a, T>(&self, options: &'a [T], input: &str) -> Option<&'a T> {
        self.pick_index(options.len(), input).map(|i| &options[i])
    }
}

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Generate a hash seed from a string.
///
/// 64-bit FNV-1a, so `Hashed` picks stay the same across toolchains
/// and platforms.
pub fn seed_from_str(s: &str) -> u64 {
    s.bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_wraps() {
        let s = TemplateSelector::Fixed { index: 5 };
        assert_eq!(s.pick(&["a", "b", "c"], "x"), Some(&"c"));
    }

    #[test]
    fn test_empty_options() {
        let empty: [&str; 0] = [];
        assert_eq!(TemplateSelector::Random.pick(&empty, "x"), None);
    }

    #[test]
    fn test_hashed_is_stable() {
        let s = TemplateSelector::Hashed { seed: 42 };
        let options = ["a", "b", "c", "d"];
        assert_eq!(s.pick(&options, "hello"), s.pick(&options, "hello"));
    }

    #[test]
    fn test_seed_is_fnv1a() {
        assert_eq!(seed_from_str(""), 0xcbf29ce484222325);
        assert_eq!(seed_from_str("a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_hashed_pick_is_pinned() {
        let s = TemplateSelector::Hashed { seed: 0 };
        // 0xaf63dc4c8601ec8c % 4 == 0
        assert_eq!(s.pick(&["w", "x", "y", "z"], "a"), Some(&"w"));
    }

    #[test]
    fn test_random_in_range() {
        let options = ["a", "b", "c"];
        for _ in 0..50 {
            assert!(options.contains(TemplateSelector::Random.pick(&options, "x").unwrap()));
        }
    }

    #[test]
    fn test_selector_from_toml() {
        let s: TemplateSelector = toml::from_str("mode = \"fixed\"\nindex = 1").unwrap();
        assert_eq!(s, TemplateSelector::Fixed { index: 1 });
    }
}
