//! Glyph metadata: what each character of a font is called (made by FontLab https://www.fontlab.com/)
//!
//! Text fonts get their descriptions from the Unicode character database;
//! symbol fonts are icon fonts and get icon names instead (Segoe MDL2
//! Assets for most, Font Awesome when the family says so). Lookups and
//! searches are always scoped to one [`FontVariant`]: a code point the
//! variant does not map is never returned, however well it matches.
//!
//! Backends implement [`GlyphDataProvider`]; [`service::GlyphMetadataService`]
//! wraps one and adds single-flight initialisation.

pub mod dataset;
#[cfg(feature = "hpindex")]
pub mod index;
pub mod provider;
pub mod service;

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::variant::FontVariant;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Longest hex form a stored code point may have.
pub const MAX_HEX_LEN: usize = 5;

/// Which description table applies to a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GlyphKind {
    Unicode,
    Mdl2,
    FontAwesome,
}

impl GlyphKind {
    pub const ALL: [GlyphKind; 3] = [GlyphKind::Unicode, GlyphKind::Mdl2, GlyphKind::FontAwesome];

    pub fn for_variant(variant: &FontVariant) -> Self {
        if !variant.is_symbol() {
            GlyphKind::Unicode
        } else if variant.family_name().to_lowercase().contains("awesome") {
            GlyphKind::FontAwesome
        } else {
            GlyphKind::Mdl2
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GlyphKind::Unicode => "unicode",
            GlyphKind::Mdl2 => "mdl2",
            GlyphKind::FontAwesome => "fontawesome",
        }
    }
}

/// One row of a description table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphDescriptor {
    pub code_point: u32,
    /// Uppercase hex, at least four digits.
    pub hex: String,
    pub description: String,
}

impl GlyphDescriptor {
    pub fn new(code_point: u32, description: impl Into<String>) -> Self {
        Self {
            code_point,
            hex: format!("{code_point:04X}"),
            description: description.into(),
        }
    }
}

/// Where descriptions come from and how many search hits to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphStoreConfig {
    /// Directory that may override the embedded `UnicodeData.txt`,
    /// `mdl2.tsv` and `fontawesome.tsv`, file by file.
    pub data_dir: Option<PathBuf>,
    pub search_limit: usize,
}

impl Default for GlyphStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Outcome of a provider's dataset generation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub rows_indexed: usize,
    /// False when the existing data was already current.
    pub regenerated: bool,
}

/// A backend answering description lookups and searches.
pub trait GlyphDataProvider: Send + Sync + 'static {
    /// One-time setup: load tables, open stores.
    fn initialise(&mut self) -> Result<()>;

    /// Description of `code_point` for the variant's kind. Never fails; a miss
    /// or an absent variant is `None`.
    fn description(&self, code_point: u32, variant: Option<&FontVariant>) -> Option<String>;

    /// Descriptors matching `query` within the variant's repertoire.
    fn search(&self, query: &str, variant: Option<&FontVariant>) -> Result<Vec<GlyphDescriptor>>;

    /// Potentially slow dataset generation. Nothing to do by default.
    fn generate(&self) -> Result<InitReport> {
        Ok(InitReport::default())
    }
}

/// Code point named by a hex query: `41`, `U+0041`, `u+41` or `0x41`.
///
/// Only 1 to 5 hex digits qualify.
pub fn parse_hex_query(query: &str) -> Option<u32> {
    let digits = query
        .strip_prefix("U+")
        .or_else(|| query.strip_prefix("u+"))
        .or_else(|| query.strip_prefix("0x"))
        .or_else(|| query.strip_prefix("0X"))
        .unwrap_or(query);
    if digits.is_empty() || digits.len() > MAX_HEX_LEN || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// The search policy every backend shares.
///
/// `repertoire` must be sorted ascending. `lookup` fetches a row of the
/// active table. The exact hex hit (if any) comes first, then description
/// substring matches in code point order, capped at `limit`.
pub fn search_repertoire<F>(
    query: &str,
    repertoire: &[u32],
    limit: usize,
    mut lookup: F,
) -> Result<Vec<GlyphDescriptor>>
where
    F: FnMut(u32) -> Result<Option<GlyphDescriptor>>,
{
    let query = query.trim();
    let mut hits = Vec::new();
    if query.is_empty() || limit == 0 {
        return Ok(hits);
    }

    let mut exact = None;
    if let Some(cp) = parse_hex_query(query) {
        if repertoire.binary_search(&cp).is_ok() {
            if let Some(descriptor) = lookup(cp)? {
                exact = Some(cp);
                hits.push(descriptor);
            }
        }
    }

    let needle = query.to_lowercase();
    for &cp in repertoire {
        if hits.len() >= limit {
            break;
        }
        if Some(cp) == exact {
            continue;
        }
        if let Some(descriptor) = lookup(cp)? {
            if descriptor.description.to_lowercase().contains(&needle) {
                hits.push(descriptor);
            }
        }
    }

    hits.truncate(limit);
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn table() -> BTreeMap<u32, GlyphDescriptor> {
        [
            (0x41, "Latin Capital Letter A"),
            (0x42, "Latin Capital Letter B"),
            (0x61, "Latin Small Letter A"),
            (0x0660, "Arabic-indic Digit Zero"),
        ]
        .into_iter()
        .map(|(cp, d)| (cp, GlyphDescriptor::new(cp, d)))
        .collect()
    }

    fn run(query: &str, repertoire: &[u32], limit: usize) -> Vec<u32> {
        let table = table();
        search_repertoire(query, repertoire, limit, |cp| Ok(table.get(&cp).cloned()))
            .expect("search")
            .into_iter()
            .map(|d| d.code_point)
            .collect()
    }

    #[test]
    fn kind_follows_symbol_flag_and_family() {
        assert_eq!(GlyphKind::for_variant(&FontVariant::new("Arial", [])), GlyphKind::Unicode);
        let mdl2 = FontVariant::new("Segoe MDL2 Assets", []).with_symbol(true);
        assert_eq!(GlyphKind::for_variant(&mdl2), GlyphKind::Mdl2);
        let fa = FontVariant::new("FontAwesome", []).with_symbol(true);
        assert_eq!(GlyphKind::for_variant(&fa), GlyphKind::FontAwesome);
    }

    #[test]
    fn hex_queries_accept_common_prefixes() {
        assert_eq!(parse_hex_query("41"), Some(0x41));
        assert_eq!(parse_hex_query("U+0660"), Some(0x660));
        assert_eq!(parse_hex_query("0x1F600"), Some(0x1F600));
        assert_eq!(parse_hex_query("100000"), None);
        assert_eq!(parse_hex_query("letter"), None);
        assert_eq!(parse_hex_query("U+"), None);
    }

    #[test]
    fn exact_hex_hit_leads_then_descriptions() {
        assert_eq!(run("41", &[0x41, 0x42, 0x61], 20), vec![0x41]);
        assert_eq!(run("0660", &[0x41, 0x0660], 20), vec![0x0660]);
        assert_eq!(run("letter a", &[0x41, 0x42, 0x61], 20), vec![0x41, 0x61]);
    }

    #[test]
    fn repertoire_scopes_everything() {
        assert_eq!(run("41", &[0x42], 20), Vec::<u32>::new());
        assert_eq!(run("capital", &[0x42], 20), vec![0x42]);
    }

    #[test]
    fn hex_hit_is_not_repeated_and_limit_applies() {
        // "a" parses as U+000A, absent from the table, so no hex tier.
        assert_eq!(run("A", &[0x41, 0x42, 0x61, 0x0660], 20), vec![0x41, 0x42, 0x61, 0x0660]);
        assert_eq!(run("A", &[0x41, 0x42, 0x61, 0x0660], 2), vec![0x41, 0x42]);
        assert_eq!(run("   ", &[0x41], 20), Vec::<u32>::new());
    }
}
