//! Font face capability queries over GSUB/GPOS (made by FontLab https://www.fontlab.com/)

use std::sync::Arc;

use anyhow::{Context, Result};
use read_fonts::tables::layout::{FeatureList, LangSys, ScriptList};
use read_fonts::types::Tag;
use read_fonts::{FontRef, TableProvider};

use crate::feature::FeatureId;
use crate::script::ScriptId;
use crate::tags::{opentype_script_tags, FALLBACK_SCRIPT_TAGS};

/// Answers "which features can text in this script use?".
pub trait FeatureQuery {
    fn supported_features(&self, script: ScriptId) -> Vec<FeatureId>;
}

/// Shared, immutable font bytes plus the face index within them.
#[derive(Clone)]
pub struct FontFace {
    data: Arc<[u8]>,
    index: u32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontFace {
    /// Validates that `data` holds a parseable face at `index`.
    pub fn new(data: Arc<[u8]>, index: u32) -> Result<Self> {
        FontRef::from_index(&data, index)
            .with_context(|| format!("parsing font face #{index}"))?;
        Ok(Self { data, index })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn font_ref(&self) -> Result<FontRef<'_>> {
        FontRef::from_index(&self.data, self.index)
            .with_context(|| format!("parsing font face #{}", self.index))
    }
}

impl FontFace {
    /// Design units per em from `head`.
    pub fn units_per_em(&self) -> Result<u16> {
        let font = self.font_ref()?;
        Ok(font.head().context("reading head table")?.units_per_em())
    }
}

impl FeatureQuery for FontFace {
    fn supported_features(&self, script: ScriptId) -> Vec<FeatureId> {
        let font = match self.font_ref() {
            Ok(font) => font,
            Err(err) => {
                log::debug!("feature query skipped: {err:#}");
                return Vec::new();
            }
        };

        let mut candidates = opentype_script_tags(script.script());
        candidates.extend(FALLBACK_SCRIPT_TAGS);

        let mut tags = Vec::new();
        if let Ok(gsub) = font.gsub() {
            if let (Ok(scripts), Ok(features)) = (gsub.script_list(), gsub.feature_list()) {
                tags.extend(features_for_script(&scripts, &features, &candidates));
            }
        }
        if let Ok(gpos) = font.gpos() {
            if let (Ok(scripts), Ok(features)) = (gpos.script_list(), gpos.feature_list()) {
                tags.extend(features_for_script(&scripts, &features, &candidates));
            }
        }

        let mut ids: Vec<FeatureId> = Vec::with_capacity(tags.len());
        for tag in tags {
            let id = FeatureId::from_tag(tag);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// Feature tags reachable from the first candidate script the table defines.
///
/// Collects the default language system and every named language system,
/// including their required features.
fn features_for_script(scripts: &ScriptList, features: &FeatureList, candidates: &[Tag]) -> Vec<Tag> {
    let records = scripts.script_records();
    let record = match candidates
        .iter()
        .find_map(|tag| records.iter().find(|rec| rec.script_tag() == *tag))
    {
        Some(record) => record,
        None => return Vec::new(),
    };
    let script = match record.script(scripts.offset_data()) {
        Ok(script) => script,
        Err(err) => {
            log::debug!("unreadable script table {}: {err}", record.script_tag());
            return Vec::new();
        }
    };

    let mut indices: Vec<u16> = Vec::new();
    if let Some(Ok(default_lang)) = script.default_lang_sys() {
        push_feature_indices(&mut indices, &default_lang);
    }
    for lang_record in script.lang_sys_records() {
        if let Ok(lang_sys) = lang_record.lang_sys(script.offset_data()) {
            push_feature_indices(&mut indices, &lang_sys);
        }
    }

    let feature_records = features.feature_records();
    let mut tags: Vec<Tag> = indices
        .into_iter()
        .filter_map(|idx| feature_records.get(idx as usize))
        .map(|rec| rec.feature_tag())
        .collect();
    tags.dedup();
    tags
}

fn push_feature_indices(indices: &mut Vec<u16>, lang_sys: &LangSys) {
    let required = lang_sys.required_feature_index();
    if required != 0xFFFF {
        indices.push(required);
    }
    indices.extend(lang_sys.feature_indices().iter().map(|idx| idx.get()));
}
