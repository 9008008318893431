//! A gentle comparison: tables in memory vs descriptions on disk
//!
//! One librarian keeps every Unicode name in their head; the other keeps a
//! beautifully indexed card catalogue in LMDB. Both answer "what is U+0660
//! called?", and this benchmark measures how long each takes to search a
//! typical repertoire.
//!
//! Run with: cargo bench --features hpindex -p glyphlens-core
//!
//! Crafted with curiosity at FontLab https://www.fontlab.com/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::TempDir;

use glyphlens_core::glyphs::index::IndexedGlyphProvider;
use glyphlens_core::glyphs::provider::MemoryGlyphProvider;
use glyphlens_core::glyphs::{GlyphDataProvider, GlyphStoreConfig};
use glyphlens_core::variant::FontVariant;

fn sample_variant() -> FontVariant {
    FontVariant::new(
        "Bench Sans",
        ('\u{20}'..='\u{FF}')
            .chain('\u{0370}'..='\u{03FF}')
            .chain('\u{0600}'..='\u{06FF}')
            .chain('\u{4E00}'..='\u{4FFF}'),
    )
}

fn bench_search(c: &mut Criterion) {
    let variant = sample_variant();

    let mut memory = MemoryGlyphProvider::new(GlyphStoreConfig::default());
    memory.initialise().expect("memory provider");

    let dir = TempDir::new().expect("tempdir");
    let mut indexed = IndexedGlyphProvider::new(GlyphStoreConfig::default(), dir.path());
    indexed.initialise().expect("open index");
    indexed.generate().expect("build index");

    for query in ["U+0660", "letter", "ideograph-4f"] {
        c.bench_function(&format!("memory search {query}"), |b| {
            b.iter(|| memory.search(black_box(query), Some(&variant)).expect("search"))
        });
        c.bench_function(&format!("index search {query}"), |b| {
            b.iter(|| indexed.search(black_box(query), Some(&variant)).expect("search"))
        });
    }
}

fn bench_generate(c: &mut Criterion) {
    c.bench_function("index generate (cold)", |b| {
        b.iter(|| {
            let dir = TempDir::new().expect("tempdir");
            let mut indexed = IndexedGlyphProvider::new(GlyphStoreConfig::default(), dir.path());
            indexed.initialise().expect("open index");
            indexed.generate().expect("build index")
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_search, bench_generate
}
criterion_main!(benches);
