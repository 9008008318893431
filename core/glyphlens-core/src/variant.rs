//! Font variants: one face of a font file with its repertoire (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use read_fonts::tables::cmap::PlatformId;
use read_fonts::tables::name::NameId;
use read_fonts::{FontRef, TableProvider};
use serde::{Deserialize, Serialize};
use skrifa::{FontRef as SkrifaFontRef, MetadataProvider};

use crate::discovery::{FontDiscovery, PathDiscovery};
use crate::face::FontFace;

/// Where a variant was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSource {
    pub path: PathBuf,
    pub ttc_index: Option<u32>,
}

impl FontSource {
    /// Render the path, appending `#<index>` for TTC/OTC collections.
    pub fn path_with_index(&self) -> String {
        match self.ttc_index {
            Some(idx) => format!("{}#{idx}", self.path.display()),
            None => self.path.display().to_string(),
        }
    }
}

/// A single face the application can show: names, repertoire, symbol flag,
/// and (when loaded from a file) the face used for shaping.
#[derive(Debug, Clone)]
pub struct FontVariant {
    family_name: String,
    style_name: String,
    characters: Vec<char>,
    is_symbol: bool,
    source: Option<FontSource>,
    face: Option<FontFace>,
}

impl FontVariant {
    /// A variant without backing font data, e.g. for metadata lookups.
    ///
    /// `characters` keeps its order; duplicates after the first are dropped.
    pub fn new(family_name: impl Into<String>, characters: impl IntoIterator<Item = char>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let characters = characters.into_iter().filter(|ch| seen.insert(*ch)).collect();
        Self {
            family_name: family_name.into(),
            style_name: String::from("Regular"),
            characters,
            is_symbol: false,
            source: None,
            face: None,
        }
    }

    pub fn with_style(mut self, style_name: impl Into<String>) -> Self {
        self.style_name = style_name.into();
        self
    }

    pub fn with_symbol(mut self, is_symbol: bool) -> Self {
        self.is_symbol = is_symbol;
        self
    }

    pub fn with_face(mut self, face: FontFace) -> Self {
        self.face = Some(face);
        self
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn style_name(&self) -> &str {
        &self.style_name
    }

    /// Characters the face maps, in the variant's own order.
    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    pub fn is_symbol(&self) -> bool {
        self.is_symbol
    }

    pub fn source(&self) -> Option<&FontSource> {
        self.source.as_ref()
    }

    pub fn face(&self) -> Option<&FontFace> {
        self.face.as_ref()
    }

    /// Repertoire as code points, ascending.
    pub fn sorted_code_points(&self) -> Vec<u32> {
        let mut cps: Vec<u32> = self.characters.iter().map(|&ch| ch as u32).collect();
        cps.sort_unstable();
        cps
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.family_name, self.style_name)
    }
}

/// Loads every face in a font file (one for TTF/OTF, several for TTC/OTC).
pub fn load_variants(path: &Path) -> Result<Vec<FontVariant>> {
    let data: Arc<[u8]> = fs::read(path)
        .with_context(|| format!("reading font {}", path.display()))?
        .into();
    let mut variants = Vec::new();

    for font in FontRef::fonts(&data) {
        let font = font.with_context(|| format!("parsing {}", path.display()))?;
        let ttc_index = font.ttc_index();
        let index = ttc_index.unwrap_or(0);
        let sfont = SkrifaFontRef::from_index(&data, index)
            .with_context(|| format!("parsing {} #{index}", path.display()))?;

        let (family_name, style_name) = collect_names(&font, path);
        let face = FontFace::new(Arc::clone(&data), index)?;

        variants.push(FontVariant {
            family_name,
            style_name,
            characters: collect_characters(&sfont),
            is_symbol: has_symbol_cmap(&font),
            source: Some(FontSource {
                path: path.to_path_buf(),
                ttc_index,
            }),
            face: Some(face),
        });
    }

    if variants.is_empty() {
        return Err(anyhow!("no font faces found in {}", path.display()));
    }

    log::debug!("loaded {} face(s) from {}", variants.len(), path.display());
    Ok(variants)
}

/// Discovers fonts under `paths` and loads all their faces in parallel.
///
/// Output is ordered by file path, then by face index.
pub fn load_all(paths: &[PathBuf], follow_symlinks: bool) -> Result<Vec<FontVariant>> {
    let discovery = PathDiscovery::new(paths.iter().cloned()).follow_symlinks(follow_symlinks);
    let candidates = discovery.discover()?;

    let loaded: Result<Vec<Vec<FontVariant>>> = candidates
        .par_iter()
        .map(|loc| load_variants(&loc.path))
        .collect();
    Ok(loaded?.into_iter().flatten().collect())
}

fn collect_characters(font: &SkrifaFontRef) -> Vec<char> {
    let mut chars: Vec<char> = font
        .charmap()
        .mappings()
        .filter_map(|(cp, _)| char::from_u32(cp))
        .collect();
    chars.sort_unstable();
    chars.dedup();
    chars
}

/// Symbol fonts carry a Windows symbol-encoded (3, 0) cmap subtable.
fn has_symbol_cmap(font: &FontRef) -> bool {
    match font.cmap() {
        Ok(cmap) => cmap
            .encoding_records()
            .iter()
            .any(|rec| rec.platform_id() == PlatformId::Windows && rec.encoding_id() == 0),
        Err(_) => false,
    }
}

fn collect_names(font: &FontRef, path: &Path) -> (String, String) {
    let family = first_name(font, &[NameId::TYPOGRAPHIC_FAMILY_NAME, NameId::FAMILY_NAME])
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string())
        });
    let style = first_name(
        font,
        &[NameId::TYPOGRAPHIC_SUBFAMILY_NAME, NameId::SUBFAMILY_NAME],
    )
    .unwrap_or_else(|| String::from("Regular"));
    (family, style)
}

/// First non-empty Unicode name record, trying `ids` in order.
fn first_name(font: &FontRef, ids: &[NameId]) -> Option<String> {
    let name_table = font.name().ok()?;
    let data = name_table.string_data();

    ids.iter().find_map(|wanted| {
        name_table
            .name_record()
            .iter()
            .filter(|record| record.is_unicode() && record.name_id() == *wanted)
            .filter_map(|record| record.string(data).ok())
            .map(|entry| entry.to_string().trim().to_string())
            .find(|rendered| !rendered.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_variant_drops_duplicate_characters_but_keeps_order() {
        let variant = FontVariant::new("Test", ['b', 'a', 'b', 'c']);
        assert_eq!(variant.characters(), &['b', 'a', 'c']);
        assert_eq!(variant.sorted_code_points(), vec![0x61, 0x62, 0x63]);
    }

    #[test]
    fn source_renders_collection_index() {
        let source = FontSource {
            path: PathBuf::from("/fonts/A.ttc"),
            ttc_index: Some(2),
        };
        assert_eq!(source.path_with_index(), "/fonts/A.ttc#2");
    }

    #[test]
    fn loading_garbage_fails() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("broken.ttf");
        fs::write(&path, b"not a font").expect("write");
        assert!(load_variants(&path).is_err());
    }

    #[test]
    fn load_all_surfaces_broken_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::write(tmp.path().join("broken.otf"), b"OTTO").expect("write");
        fs::write(tmp.path().join("notes.txt"), b"ignored").expect("write");
        let err = load_all(&[tmp.path().to_path_buf()], false).unwrap_err();
        assert!(format!("{err:#}").contains("broken.otf"));
    }
}
