//! In-memory glyph description backend (made by FontLab https://www.fontlab.com/)

use anyhow::{anyhow, Result};

use super::dataset::GlyphDataset;
use super::{search_repertoire, GlyphDataProvider, GlyphDescriptor, GlyphKind, GlyphStoreConfig};
use crate::variant::FontVariant;

/// Keeps every table in memory. Cheap to build, no generation step.
#[derive(Debug, Default)]
pub struct MemoryGlyphProvider {
    config: GlyphStoreConfig,
    dataset: Option<GlyphDataset>,
}

impl MemoryGlyphProvider {
    pub fn new(config: GlyphStoreConfig) -> Self {
        Self { config, dataset: None }
    }

    /// Provider over tables loaded elsewhere; already initialised.
    pub fn with_dataset(config: GlyphStoreConfig, dataset: GlyphDataset) -> Self {
        Self {
            config,
            dataset: Some(dataset),
        }
    }

    pub fn dataset(&self) -> Option<&GlyphDataset> {
        self.dataset.as_ref()
    }
}

impl GlyphDataProvider for MemoryGlyphProvider {
    fn initialise(&mut self) -> Result<()> {
        if self.dataset.is_none() {
            self.dataset = Some(GlyphDataset::load(&self.config)?);
        }
        Ok(())
    }

    fn description(&self, code_point: u32, variant: Option<&FontVariant>) -> Option<String> {
        let variant = variant?;
        let dataset = self.dataset.as_ref()?;
        dataset
            .get(GlyphKind::for_variant(variant), code_point)
            .map(|row| row.description.clone())
    }

    fn search(&self, query: &str, variant: Option<&FontVariant>) -> Result<Vec<GlyphDescriptor>> {
        let Some(variant) = variant else {
            return Ok(Vec::new());
        };
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| anyhow!("glyph provider used before initialise()"))?;
        let table = dataset.table(GlyphKind::for_variant(variant));

        search_repertoire(query, &variant.sorted_code_points(), self.config.search_limit, |cp| {
            Ok(table.get(&cp).cloned())
        })
    }
}
