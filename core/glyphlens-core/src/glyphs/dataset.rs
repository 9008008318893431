//! Reference tables behind glyph descriptions (made by FontLab https://www.fontlab.com/)
//!
//! Three tables, one per [`GlyphKind`]:
//!
//! - `UnicodeData.txt` in the Unicode Character Database format. Control
//!   characters take their Unicode 1.0 name. `<…, First>` / `<…, Last>`
//!   pairs for CJK and Tangut ideographs and Hangul syllables expand into one
//!   row per code point with the name the standard derives for it; other
//!   ranges (private use, surrogates) carry no per-character name and are
//!   skipped.
//! - `mdl2.tsv` and `fontawesome.tsv`: `HEX<TAB>IconName` per line, `#`
//!   comments allowed.
//!
//! Copies of all three are compiled in; a data directory can replace any of
//! them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use super::{GlyphDescriptor, GlyphKind, GlyphStoreConfig, MAX_HEX_LEN};
use crate::naming::{humanize_identifier, title_case};

pub const UNICODE_DATA_FILE: &str = "UnicodeData.txt";
pub const MDL2_FILE: &str = "mdl2.tsv";
pub const FONT_AWESOME_FILE: &str = "fontawesome.tsv";

const EMBEDDED_UNICODE_DATA: &str = include_str!("../../data/UnicodeData.txt");
const EMBEDDED_MDL2: &str = include_str!("../../data/mdl2.tsv");
const EMBEDDED_FONT_AWESOME: &str = include_str!("../../data/fontawesome.tsv");

pub type DescriptorTable = BTreeMap<u32, GlyphDescriptor>;

/// All description tables, immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphDataset {
    unicode: DescriptorTable,
    mdl2: DescriptorTable,
    font_awesome: DescriptorTable,
}

impl GlyphDataset {
    /// The compiled-in tables.
    pub fn embedded() -> Result<Self> {
        Self::from_sources(EMBEDDED_UNICODE_DATA, EMBEDDED_MDL2, EMBEDDED_FONT_AWESOME)
    }

    /// Tables from `config.data_dir` where present, embedded copies otherwise.
    pub fn load(config: &GlyphStoreConfig) -> Result<Self> {
        let dir = config.data_dir.as_deref();
        let unicode = read_or_embedded(dir, UNICODE_DATA_FILE, EMBEDDED_UNICODE_DATA)?;
        let mdl2 = read_or_embedded(dir, MDL2_FILE, EMBEDDED_MDL2)?;
        let font_awesome = read_or_embedded(dir, FONT_AWESOME_FILE, EMBEDDED_FONT_AWESOME)?;
        Self::from_sources(&unicode, &mdl2, &font_awesome)
    }

    pub fn from_sources(unicode_data: &str, mdl2: &str, font_awesome: &str) -> Result<Self> {
        let dataset = Self {
            unicode: parse_unicode_data(unicode_data).context(UNICODE_DATA_FILE)?,
            mdl2: parse_icon_table(mdl2).context(MDL2_FILE)?,
            font_awesome: parse_icon_table(font_awesome).context(FONT_AWESOME_FILE)?,
        };
        log::debug!(
            "glyph dataset: {} unicode, {} mdl2, {} fontawesome rows",
            dataset.unicode.len(),
            dataset.mdl2.len(),
            dataset.font_awesome.len()
        );
        Ok(dataset)
    }

    pub fn table(&self, kind: GlyphKind) -> &DescriptorTable {
        match kind {
            GlyphKind::Unicode => &self.unicode,
            GlyphKind::Mdl2 => &self.mdl2,
            GlyphKind::FontAwesome => &self.font_awesome,
        }
    }

    pub fn get(&self, kind: GlyphKind, code_point: u32) -> Option<&GlyphDescriptor> {
        self.table(kind).get(&code_point)
    }

    /// Total rows across all tables.
    pub fn len(&self) -> usize {
        GlyphKind::ALL.iter().map(|kind| self.table(*kind).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_or_embedded(dir: Option<&Path>, file: &str, embedded: &str) -> Result<String> {
    if let Some(dir) = dir {
        let path = dir.join(file);
        if path.is_file() {
            log::info!("loading {}", path.display());
            return fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()));
        }
        log::debug!("{} not found, using embedded copy", path.display());
    }
    Ok(embedded.to_string())
}

/// Parses `UnicodeData.txt`.
pub fn parse_unicode_data(source: &str) -> Result<DescriptorTable> {
    let mut table = DescriptorTable::new();
    let mut open_range: Option<(u32, String)> = None;

    for (line_no, line) in (1usize..).zip(source.lines()) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() < 11 {
            return Err(anyhow!(
                "line {line_no}: expected at least 11 fields, found {}",
                fields.len()
            ));
        }
        let code_point = u32::from_str_radix(fields[0], 16)
            .map_err(|_| anyhow!("line {line_no}: invalid code point {:?}", fields[0]))?;
        let name = fields[1];

        if let Some(range) = name.strip_prefix('<').and_then(|rest| rest.strip_suffix(", First>")) {
            open_range = Some((code_point, range.to_string()));
            continue;
        }
        if let Some(range) = name.strip_prefix('<').and_then(|rest| rest.strip_suffix(", Last>")) {
            let (start, first_name) = open_range
                .take()
                .ok_or_else(|| anyhow!("line {line_no}: range end without a start"))?;
            if first_name != range || start > code_point {
                return Err(anyhow!("line {line_no}: mismatched range {range:?}"));
            }
            expand_range(&mut table, range, start, code_point);
            continue;
        }

        let description = if name == "<control>" {
            fields[10].trim()
        } else {
            name
        };
        if description.is_empty() || description.starts_with('<') {
            continue;
        }
        insert(&mut table, code_point, title_case(description));
    }

    if let Some((start, name)) = open_range {
        return Err(anyhow!("range {name:?} starting at {start:04X} is never closed"));
    }
    Ok(table)
}

/// Rows for the code points of a named range, where the name can be derived.
fn expand_range(table: &mut DescriptorTable, range: &str, start: u32, end: u32) {
    if range.starts_with("CJK Ideograph") {
        for cp in start..=end {
            insert(table, cp, format!("CJK Unified Ideograph-{cp:04X}"));
        }
    } else if range.starts_with("Tangut Ideograph") {
        for cp in start..=end {
            insert(table, cp, format!("Tangut Ideograph-{cp:04X}"));
        }
    } else if range == "Hangul Syllable" {
        for cp in start..=end {
            if let Some(name) = hangul_syllable_name(cp) {
                insert(table, cp, title_case(&name));
            }
        }
    }
}

const HANGUL_BASE: u32 = 0xAC00;
const JAMO_L: [&str; 19] = [
    "G", "GG", "N", "D", "DD", "R", "M", "B", "BB", "S", "SS", "", "J", "JJ", "C", "K", "T", "P", "H",
];
const JAMO_V: [&str; 21] = [
    "A", "AE", "YA", "YAE", "EO", "E", "YEO", "YE", "O", "WA", "WAE", "OE", "YO", "U", "WEO", "WE", "WI",
    "YU", "EU", "YI", "I",
];
const JAMO_T: [&str; 28] = [
    "", "G", "GG", "GS", "N", "NJ", "NH", "D", "L", "LG", "LM", "LB", "LS", "LT", "LP", "LH", "M", "B",
    "BS", "S", "SS", "NG", "J", "C", "K", "T", "P", "H",
];

/// Name of a precomposed Hangul syllable, composed from its jamo short names.
pub fn hangul_syllable_name(code_point: u32) -> Option<String> {
    let index = code_point.checked_sub(HANGUL_BASE)? as usize;
    let (t_count, n_count) = (JAMO_T.len(), JAMO_V.len() * JAMO_T.len());
    if index >= JAMO_L.len() * n_count {
        return None;
    }
    let l = JAMO_L[index / n_count];
    let v = JAMO_V[(index % n_count) / t_count];
    let t = JAMO_T[index % t_count];
    Some(format!("HANGUL SYLLABLE {l}{v}{t}"))
}

/// Parses a `HEX<TAB>IconName` table; names are humanized (`ChevronDown` → `Chevron Down`).
pub fn parse_icon_table(source: &str) -> Result<DescriptorTable> {
    let mut table = DescriptorTable::new();

    for (line_no, line) in (1usize..).zip(source.lines()) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (hex, name) = line
            .split_once('\t')
            .ok_or_else(|| anyhow!("line {line_no}: expected HEX<TAB>name"))?;
        let code_point = u32::from_str_radix(hex.trim(), 16)
            .map_err(|_| anyhow!("line {line_no}: invalid code point {hex:?}"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("line {line_no}: empty icon name"));
        }
        insert(&mut table, code_point, humanize_identifier(name));
    }

    Ok(table)
}

/// Rows whose hex form would not fit the 5-character column are dropped.
fn insert(table: &mut DescriptorTable, code_point: u32, description: String) {
    let descriptor = GlyphDescriptor::new(code_point, description);
    if descriptor.hex.len() > MAX_HEX_LEN {
        return;
    }
    table.insert(code_point, descriptor);
}
