//! Title-to-slug normalization and disambiguation.

use std::collections::HashMap;
use std::sync::LazyLock;

use rand::Rng;

/// Accented and Latin-extended characters, with their ASCII replacement at
/// the same index in [`REPLACEMENTS`]. The punctuation tail maps to hyphens.
const SPECIALS: &str =
    "àáâäæãåāăąçćčđďèéêëēėęěğǵḧîïíīįìłḿñńǹňôöòóœøōõőṕŕřßśšşșťțûüùúūǘůűųẃẍÿýžźż·/_,:;";
const REPLACEMENTS: &str =
    "aaaaaaaaaacccddeeeeeeeegghiiiiiilmnnnnoooooooooprrsssssttuuuuuuuuuwxyyzzz------";

/// Charset for random slug suffixes.
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the suffix appended by [`SlugPolicy::Suffixed`].
const SUFFIX_LEN: usize = 4;

static TRANSLITERATION: LazyLock<HashMap<char, char>> =
    LazyLock::new(|| SPECIALS.chars().zip(REPLACEMENTS.chars()).collect());

// ---------------------------------------------------------------------------
// SlugPolicy
// ---------------------------------------------------------------------------

/// How article slugs are disambiguated.
///
/// `Suffixed` is the supported publishing contract on every call path:
/// repeated titles never collide on the same repository path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlugPolicy {
    /// Base slug plus `-` and a random 4-character lowercase-alphanumeric
    /// suffix. Degenerate titles with an empty base slug yield the suffix alone.
    #[default]
    Suffixed,
    /// Base slug only. Two identical titles would target the same path.
    Plain,
}

impl SlugPolicy {
    /// Produce the slug for a title under this policy.
    pub fn apply(&self, title: &str) -> String {
        let base = slugify(title);
        match self {
            Self::Suffixed if base.is_empty() => random_suffix(SUFFIX_LEN),
            Self::Suffixed => format!("{base}-{}", random_suffix(SUFFIX_LEN)),
            Self::Plain => base,
        }
    }
}

// ---------------------------------------------------------------------------
// slugify
// ---------------------------------------------------------------------------

/// Convert a title to a URL-safe slug.
///
/// Lowercases the input, maps whitespace to hyphens, transliterates the
/// fixed character table, turns `&` into `-and-`, drops every remaining
/// character outside `[a-z0-9-]`, collapses repeated hyphens, and trims
/// hyphens at both ends. Pure and total; input with no representable
/// characters (e.g. a fully Cyrillic title) yields an empty string.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());

    for c in title.to_lowercase().chars() {
        if c.is_whitespace() {
            out.push('-');
        } else if let Some(&replacement) = TRANSLITERATION.get(&c) {
            out.push(replacement);
        } else if c == '&' {
            out.push_str("-and-");
        } else if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        }
    }

    collapse_hyphens(&out)
}

/// Collapse hyphen runs to a single hyphen and trim them from the ends.
fn collapse_hyphens(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_hyphen = false;

    for c in s.chars() {
        if c == '-' {
            if !prev_hyphen {
                out.push(c);
            }
            prev_hyphen = true;
        } else {
            out.push(c);
            prev_hyphen = false;
        }
    }

    out.trim_matches('-').to_string()
}

/// Random lowercase-alphanumeric string of the given length.
fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}
