//! Typographic feature discovery for a font variant (made by FontLab https://www.fontlab.com/)
//!
//! The variant's whole repertoire is laid out as one string. For every glyph
//! run the shaping engine reports, we look up the script active at the run's
//! first character and ask the run's face which features that script can
//! reach. The union, minus duplicates, sorted by display name and headed by
//! the "None" entry, is what a feature picker shows.

use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;

use crate::face::FeatureQuery;
use crate::feature::{FeatureId, TypographyFeature};
use crate::script::{CharacterRange, ScriptId, ScriptSegmentation};
use crate::shaping::{GlyphRun, RustybuzzShaper, ShapingEngine, TextRenderer};
use crate::variant::{FontSource, FontVariant};

/// Features reachable from one script run.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptFeatures {
    pub script: ScriptId,
    pub range: CharacterRange,
    pub features: Vec<TypographyFeature>,
}

/// Analysis result for one variant.
#[derive(Debug, Clone, Serialize)]
pub struct VariantFeatures {
    pub source: Option<FontSource>,
    pub family_name: String,
    pub style_name: String,
    pub features: Vec<TypographyFeature>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<ScriptFeatures>,
}

#[derive(Debug, Default, Clone)]
pub struct AnalysisOptions {
    pub jobs: Option<usize>,
    pub by_script: bool,
}

/// The variant's repertoire as a single string, in repertoire order.
pub fn character_string(variant: &FontVariant) -> String {
    variant.characters().iter().collect()
}

/// Feature list for a variant, shaped with rustybuzz.
pub fn collect_features(variant: &FontVariant) -> Result<Vec<TypographyFeature>> {
    let text = character_string(variant);
    if text.is_empty() {
        return Ok(vec![TypographyFeature::none()]);
    }
    let face = variant
        .face()
        .ok_or_else(|| anyhow!("{} has no font data to shape", variant.display_name()))?;
    collect_with(&RustybuzzShaper::new(face), &text)
}

/// Feature list for `text` under any shaping engine.
pub fn collect_with<E>(engine: &E, text: &str) -> Result<Vec<TypographyFeature>>
where
    E: ShapingEngine + ?Sized,
{
    if text.is_empty() {
        return Ok(vec![TypographyFeature::none()]);
    }

    let segmentation = engine.analyze_scripts(text);
    let mut accumulator = FeatureAccumulator {
        segmentation: &segmentation,
        seen: HashSet::new(),
        features: Vec::new(),
    };
    engine
        .layout(text, &mut accumulator)
        .context("shaping pass failed")?;

    let mut features = accumulator.features;
    sort_by_display_name(&mut features);
    features.insert(0, TypographyFeature::none());
    Ok(features)
}

/// Per-script feature lists straight from the face, without a shaping pass.
pub fn collect_by_script(variant: &FontVariant) -> Result<Vec<ScriptFeatures>> {
    let text = character_string(variant);
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let face = variant
        .face()
        .ok_or_else(|| anyhow!("{} has no font data to query", variant.display_name()))?;
    Ok(features_by_script(face, &ScriptSegmentation::analyze(&text)))
}

pub fn features_by_script(query: &dyn FeatureQuery, segmentation: &ScriptSegmentation) -> Vec<ScriptFeatures> {
    segmentation
        .segments()
        .iter()
        .map(|segment| {
            let mut seen = HashSet::new();
            let mut features: Vec<TypographyFeature> = query
                .supported_features(segment.script)
                .into_iter()
                .filter(|id| *id != FeatureId::NONE && seen.insert(*id))
                .map(TypographyFeature::new)
                .collect();
            sort_by_display_name(&mut features);
            ScriptFeatures {
                script: segment.script,
                range: segment.range,
                features,
            }
        })
        .collect()
}

/// Analyse many variants in parallel. Output order matches `variants`.
pub fn analyze_variants(variants: &[FontVariant], opts: &AnalysisOptions) -> Result<Vec<VariantFeatures>> {
    let run_analysis = || -> Result<Vec<VariantFeatures>> {
        variants
            .par_iter()
            .map(|variant| analyze_one(variant, opts.by_script))
            .collect()
    };

    if let Some(jobs) = opts.jobs {
        let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
        pool.install(run_analysis)
    } else {
        run_analysis()
    }
}

fn analyze_one(variant: &FontVariant, by_script: bool) -> Result<VariantFeatures> {
    let features =
        collect_features(variant).with_context(|| format!("analysing {}", variant.display_name()))?;
    let scripts = if by_script {
        collect_by_script(variant)?
    } else {
        Vec::new()
    };
    Ok(VariantFeatures {
        source: variant.source().cloned(),
        family_name: variant.family_name().to_string(),
        style_name: variant.style_name().to_string(),
        features,
        scripts,
    })
}

/// Case-insensitive by display name; the raw tag breaks ties.
fn sort_by_display_name(features: &mut [TypographyFeature]) {
    features.sort_by_cached_key(|f| (f.display_name().to_lowercase(), f.id().raw()));
}

struct FeatureAccumulator<'s> {
    segmentation: &'s ScriptSegmentation,
    seen: HashSet<FeatureId>,
    features: Vec<TypographyFeature>,
}

impl TextRenderer for FeatureAccumulator<'_> {
    fn draw_glyph_run(&mut self, run: &GlyphRun<'_>) -> Result<()> {
        let Some(script) = self.segmentation.script_at(run.text_position) else {
            return Ok(());
        };
        for id in run.face.supported_features(script) {
            if id != FeatureId::NONE && self.seen.insert(id) {
                self.features.push(TypographyFeature::new(id));
            }
        }
        Ok(())
    }
}
