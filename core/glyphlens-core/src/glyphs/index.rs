/// The glyph almanac that never has to read the Unicode tables twice
///
/// Parsing `UnicodeData.txt` on every start is honest work, but an index that
/// remembers is better company. This module keeps every description table in
/// LMDB, one database per glyph kind keyed by big-endian code point, so rows
/// sit in code point order and a lookup is a single memory-mapped read.
///
/// The index also remembers which dataset it was built from. Hand it the same
/// tables again and it politely declines to rebuild; change a single
/// description and it starts afresh.
///
/// Made with speed and elegance at FontLab https://www.fontlab.com/
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::{anyhow, Context, Result};
use bytemuck::{Pod, Zeroable};
use byteorder::BigEndian;
use heed::types::{Bytes, U32};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use xxhash_rust::xxh3::Xxh3;

use super::dataset::GlyphDataset;
use super::{search_repertoire, GlyphDataProvider, GlyphDescriptor, GlyphKind, GlyphStoreConfig, InitReport};
use crate::variant::FontVariant;

/// Plenty for the full Unicode database plus icon tables
const MAX_DB_SIZE: usize = 512 * 1024 * 1024;

/// Three tables and the stamp
const MAX_DBS: u32 = 4;

const STAMP_KEY: &[u8] = b"dataset";

type TableDb = Database<U32<BigEndian>, Bytes>;

/// Which dataset the index currently holds
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
struct DatasetStamp {
    fingerprint: u64,
    rows: u64,
}

/// The almanac itself: three shelves of descriptions and a bookmark
pub struct GlyphIndex {
    env: Env,
    db_unicode: TableDb,
    db_mdl2: TableDb,
    db_font_awesome: TableDb,
    /// DB_META: "dataset" -> DatasetStamp
    db_meta: Database<Bytes, Bytes>,
}

impl GlyphIndex {
    /// Opens the index at `index_dir`, creating directory and databases on first use
    pub fn open(index_dir: &Path) -> Result<Self> {
        fs::create_dir_all(index_dir)
            .with_context(|| format!("creating index directory {}", index_dir.display()))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(MAX_DB_SIZE)
                .max_dbs(MAX_DBS)
                .open(index_dir)
                .with_context(|| format!("opening LMDB at {}", index_dir.display()))?
        };

        let mut wtxn = env.write_txn()?;
        let db_unicode = env.create_database(&mut wtxn, Some("unicode"))?;
        let db_mdl2 = env.create_database(&mut wtxn, Some("mdl2"))?;
        let db_font_awesome = env.create_database(&mut wtxn, Some("fontawesome"))?;
        let db_meta = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            db_unicode,
            db_mdl2,
            db_font_awesome,
            db_meta,
        })
    }

    /// Rows across all three tables
    pub fn count(&self) -> Result<usize> {
        let rtxn = self.env.read_txn()?;
        let mut total = 0;
        for kind in GlyphKind::ALL {
            total += self.table(kind).len(&rtxn)? as usize;
        }
        Ok(total)
    }

    /// True once some dataset has been committed, current or not.
    pub fn is_stamped(&self) -> Result<bool> {
        let rtxn = self.env.read_txn()?;
        Ok(self.db_meta.get(&rtxn, STAMP_KEY)?.is_some())
    }

    pub fn writer(&self) -> Result<IndexWriter<'_>> {
        let wtxn = self.env.write_txn()?;
        Ok(IndexWriter { index: self, wtxn })
    }

    pub fn reader(&self) -> Result<IndexReader<'_>> {
        let rtxn = self.env.read_txn()?;
        Ok(IndexReader { index: self, rtxn })
    }

    fn table(&self, kind: GlyphKind) -> TableDb {
        match kind {
            GlyphKind::Unicode => self.db_unicode,
            GlyphKind::Mdl2 => self.db_mdl2,
            GlyphKind::FontAwesome => self.db_font_awesome,
        }
    }
}

/// Writer handle; everything lands in one transaction or not at all.
pub struct IndexWriter<'a> {
    index: &'a GlyphIndex,
    wtxn: RwTxn<'a>,
}

impl<'a> IndexWriter<'a> {
    /// True when the stored stamp matches `dataset`.
    pub fn is_current(&self, dataset: &GlyphDataset) -> Result<bool> {
        let wanted = stamp_for(dataset);
        if let Some(bytes) = self.index.db_meta.get(&self.wtxn, STAMP_KEY)? {
            if bytes.len() == std::mem::size_of::<DatasetStamp>() {
                let stored: DatasetStamp = bytemuck::pod_read_unaligned(bytes);
                return Ok(stored == wanted);
            }
        }
        Ok(false)
    }

    /// Drops every row and stores `dataset` in their place. Returns rows written.
    pub fn replace_all(&mut self, dataset: &GlyphDataset) -> Result<usize> {
        let mut written = 0;
        for kind in GlyphKind::ALL {
            let db = self.index.table(kind);
            db.clear(&mut self.wtxn)?;
            for (cp, descriptor) in dataset.table(kind) {
                let bytes = bincode::serialize(descriptor).map_err(|e| anyhow!("bincode serialize: {e}"))?;
                db.put(&mut self.wtxn, cp, &bytes)?;
                written += 1;
            }
        }

        let stamp = stamp_for(dataset);
        self.index
            .db_meta
            .put(&mut self.wtxn, STAMP_KEY, bytemuck::bytes_of(&stamp))?;
        Ok(written)
    }

    pub fn commit(self) -> Result<()> {
        self.wtxn.commit()?;
        Ok(())
    }

    pub fn abort(self) {
        self.wtxn.abort();
    }
}

/// Reader handle for lookups.
pub struct IndexReader<'a> {
    index: &'a GlyphIndex,
    rtxn: RoTxn<'a>,
}

impl<'a> IndexReader<'a> {
    pub fn get(&self, kind: GlyphKind, code_point: u32) -> Result<Option<GlyphDescriptor>> {
        match self.index.table(kind).get(&self.rtxn, &code_point)? {
            Some(bytes) => Ok(Some(deserialize_descriptor(bytes)?)),
            None => Ok(None),
        }
    }

    /// Shared search policy over the stored `kind` table.
    pub fn search(
        &self,
        kind: GlyphKind,
        query: &str,
        repertoire: &[u32],
        limit: usize,
    ) -> Result<Vec<GlyphDescriptor>> {
        search_repertoire(query, repertoire, limit, |cp| self.get(kind, cp))
    }
}

/// Content hash over every row of every table.
pub fn dataset_fingerprint(dataset: &GlyphDataset) -> u64 {
    let mut hasher = Xxh3::new();
    for kind in GlyphKind::ALL {
        hasher.update(kind.name().as_bytes());
        for (cp, descriptor) in dataset.table(kind) {
            hasher.update(&cp.to_be_bytes());
            hasher.update(descriptor.description.as_bytes());
            hasher.update(&[0]);
        }
    }
    hasher.digest()
}

fn stamp_for(dataset: &GlyphDataset) -> DatasetStamp {
    DatasetStamp {
        fingerprint: dataset_fingerprint(dataset),
        rows: dataset.len() as u64,
    }
}

fn deserialize_descriptor(bytes: &[u8]) -> Result<GlyphDescriptor> {
    bincode::deserialize(bytes).map_err(|e| anyhow!("bincode deserialize: {e}"))
}

/// Provider backed by [`GlyphIndex`]; `generate` (re)builds the index.
///
/// An index that has never been written cannot answer anything, so until the
/// first `generate` commits, lookups are served from the parsed tables held
/// in memory. A stamped index, even an outdated one, answers directly.
pub struct IndexedGlyphProvider {
    config: GlyphStoreConfig,
    index_dir: PathBuf,
    index: Option<GlyphIndex>,
    fallback: RwLock<Option<GlyphDataset>>,
}

impl IndexedGlyphProvider {
    pub fn new(config: GlyphStoreConfig, index_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            index_dir: index_dir.into(),
            index: None,
            fallback: RwLock::new(None),
        }
    }

    pub fn index(&self) -> Option<&GlyphIndex> {
        self.index.as_ref()
    }

    /// True while lookups go to the in-memory tables instead of LMDB.
    pub fn is_serving_fallback(&self) -> bool {
        self.fallback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn opened(&self) -> Result<&GlyphIndex> {
        self.index
            .as_ref()
            .ok_or_else(|| anyhow!("glyph index used before initialise()"))
    }

    fn with_fallback<R>(&self, answer: impl FnOnce(&GlyphDataset) -> R) -> Option<R> {
        let guard = self.fallback.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(answer)
    }

    fn retire_fallback(&self) {
        let mut guard = self.fallback.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            log::debug!("glyph index at {} now serves lookups", self.index_dir.display());
        }
    }
}

impl GlyphDataProvider for IndexedGlyphProvider {
    fn initialise(&mut self) -> Result<()> {
        if self.index.is_none() {
            let index = GlyphIndex::open(&self.index_dir)?;
            if !index.is_stamped()? {
                log::debug!("glyph index at {} is empty; using parsed tables", self.index_dir.display());
                *self.fallback.get_mut().unwrap_or_else(PoisonError::into_inner) =
                    Some(GlyphDataset::load(&self.config)?);
            }
            self.index = Some(index);
        }
        Ok(())
    }

    fn description(&self, code_point: u32, variant: Option<&FontVariant>) -> Option<String> {
        let variant = variant?;
        let kind = GlyphKind::for_variant(variant);
        let from_tables =
            self.with_fallback(|dataset| dataset.get(kind, code_point).map(|row| row.description.clone()));
        if let Some(found) = from_tables {
            return found;
        }

        let lookup = self
            .opened()
            .and_then(|index| index.reader()?.get(kind, code_point));
        match lookup {
            Ok(found) => found.map(|row| row.description),
            Err(err) => {
                log::debug!("description lookup for U+{code_point:04X} failed: {err:#}");
                None
            }
        }
    }

    fn search(&self, query: &str, variant: Option<&FontVariant>) -> Result<Vec<GlyphDescriptor>> {
        let Some(variant) = variant else {
            return Ok(Vec::new());
        };
        let kind = GlyphKind::for_variant(variant);
        let repertoire = variant.sorted_code_points();
        let limit = self.config.search_limit;

        if let Some(hits) = self.with_fallback(|dataset| {
            let table = dataset.table(kind);
            search_repertoire(query, &repertoire, limit, |cp| Ok(table.get(&cp).cloned()))
        }) {
            return hits;
        }

        let reader = self.opened()?.reader()?;
        reader.search(kind, query, &repertoire, limit)
    }

    fn generate(&self) -> Result<InitReport> {
        let index = self.opened()?;
        let dataset = GlyphDataset::load(&self.config)?;

        let mut writer = index.writer()?;
        if writer.is_current(&dataset)? {
            writer.abort();
            self.retire_fallback();
            log::info!("glyph index at {} is current", self.index_dir.display());
            return Ok(InitReport {
                rows_indexed: dataset.len(),
                regenerated: false,
            });
        }

        let rows_indexed = writer.replace_all(&dataset)?;
        writer.commit()?;
        self.retire_fallback();
        log::info!(
            "indexed {rows_indexed} glyph descriptions into {}",
            self.index_dir.display()
        );
        Ok(InitReport {
            rows_indexed,
            regenerated: true,
        })
    }
}
