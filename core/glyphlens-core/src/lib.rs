//! glyphlens-core: a close reader of fonts
//!
//! Where a font finder asks "which fonts can do this?", glyphlens turns to a single
//! font and asks "what can *you* do, and what is each of your characters
//! called?". Two subsystems share the work.
//!
//! ## Typographic feature analysis
//!
//! - [`script`] splits a font's repertoire into contiguous script runs and
//!   answers "which script is active at position N?"
//! - [`shaping`] replays those runs through rustybuzz and calls a
//!   [`shaping::TextRenderer`] visitor once per glyph run
//! - [`face`] asks the font's GSUB/GPOS tables which features each script
//!   can reach
//! - [`typography`] listens to the shaping pass and gathers the deduplicated,
//!   sorted list of features, named by [`feature`]
//!
//! ## Glyph metadata
//!
//! - [`glyphs`] maps code points to descriptions (Unicode character names
//!   for text fonts, icon names for symbol fonts), searchable by hex value or
//!   description, always scoped to the active variant's repertoire
//! - [`glyphs::service::GlyphMetadataService`] owns one provider and runs its
//!   (possibly slow) dataset generation exactly once
//!
//! ## A Sample Conversation
//!
//! ```rust,no_run
//! use glyphlens_core::typography::collect_features;
//! use glyphlens_core::variant::load_variants;
//!
//! for variant in load_variants("/Library/Fonts/Baskerville.ttc".as_ref())? {
//!     let features = collect_features(&variant)?;
//!     println!("{} {}", variant.family_name(), variant.style_name());
//!     for feature in features {
//!         println!("  {feature}");
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod codepoints;
pub mod discovery;
pub mod face;
pub mod feature;
pub mod glyphs;
pub mod naming;
pub mod output;
pub mod script;
pub mod shaping;
pub mod tags;
pub mod typography;
pub mod variant;
