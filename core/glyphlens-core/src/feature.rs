//! Typographic feature identifiers and their display names (made by FontLab https://www.fontlab.com/)
//!
//! A font reports features as bare four-byte tags. Most of them belong to a
//! well-known registry and get a proper name (`liga` → "Standard Ligatures");
//! the rest are the font's own inventions and are shown as
//! `Custom: <tag>`. [`FeatureId`] keeps that distinction in the type.

use std::fmt;
use std::hash::{Hash, Hasher};

use read_fonts::types::Tag;
use serde::{Serialize, Serializer};

use crate::naming::humanize_identifier;
use crate::tags::{tag_from_u32, tag_to_string, tag_to_u32};

macro_rules! known_features {
    ($($variant:ident => $tag:literal,)*) => {
        /// Registered OpenType features with a well-known name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum KnownFeature {
            /// Placeholder meaning "no feature applied"; packs to tag 0.
            None,
            $($variant,)*
        }

        impl KnownFeature {
            pub const ALL: &'static [KnownFeature] = &[
                KnownFeature::None,
                $(KnownFeature::$variant,)*
            ];

            /// The enumerant's PascalCase name.
            pub fn canonical_name(self) -> &'static str {
                match self {
                    KnownFeature::None => "None",
                    $(KnownFeature::$variant => stringify!($variant),)*
                }
            }

            /// Packed big-endian tag value.
            pub fn tag(self) -> u32 {
                match self {
                    KnownFeature::None => 0,
                    $(KnownFeature::$variant => u32::from_be_bytes(*$tag),)*
                }
            }

            pub fn from_tag(tag: u32) -> Option<Self> {
                if tag == 0 {
                    return Some(KnownFeature::None);
                }
                match &tag.to_be_bytes() {
                    $($tag => Some(KnownFeature::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

known_features! {
    AlternativeFractions => b"afrc",
    PetiteCapitalsFromCapitals => b"c2pc",
    SmallCapitalsFromCapitals => b"c2sc",
    ContextualAlternates => b"calt",
    CaseSensitiveForms => b"case",
    GlyphCompositionDecomposition => b"ccmp",
    ContextualLigatures => b"clig",
    CapitalSpacing => b"cpsp",
    ContextualSwash => b"cswh",
    CursivePositioning => b"curs",
    Default => b"dflt",
    DiscretionaryLigatures => b"dlig",
    ExpertForms => b"expt",
    Fractions => b"frac",
    FullWidth => b"fwid",
    HalfForms => b"half",
    HalantForms => b"haln",
    AlternateHalfWidth => b"halt",
    HistoricalForms => b"hist",
    HorizontalKanaAlternates => b"hkna",
    HistoricalLigatures => b"hlig",
    HalfWidth => b"hwid",
    HojoKanjiForms => b"hojo",
    Jis04Forms => b"jp04",
    Jis78Forms => b"jp78",
    Jis83Forms => b"jp83",
    Jis90Forms => b"jp90",
    Kerning => b"kern",
    StandardLigatures => b"liga",
    LiningFigures => b"lnum",
    LocalizedForms => b"locl",
    MarkPositioning => b"mark",
    MathematicalGreek => b"mgrk",
    MarkToMarkPositioning => b"mkmk",
    AlternateAnnotationForms => b"nalt",
    NlcKanjiForms => b"nlck",
    OldStyleFigures => b"onum",
    Ordinals => b"ordn",
    ProportionalAlternateWidth => b"palt",
    PetiteCapitals => b"pcap",
    ProportionalFigures => b"pnum",
    ProportionalWidths => b"pwid",
    QuarterWidths => b"qwid",
    RequiredLigatures => b"rlig",
    RubyNotationForms => b"ruby",
    StylisticAlternates => b"salt",
    ScientificInferiors => b"sinf",
    SmallCapitals => b"smcp",
    SimplifiedForms => b"smpl",
    StylisticSet1 => b"ss01",
    StylisticSet2 => b"ss02",
    StylisticSet3 => b"ss03",
    StylisticSet4 => b"ss04",
    StylisticSet5 => b"ss05",
    StylisticSet6 => b"ss06",
    StylisticSet7 => b"ss07",
    StylisticSet8 => b"ss08",
    StylisticSet9 => b"ss09",
    StylisticSet10 => b"ss10",
    StylisticSet11 => b"ss11",
    StylisticSet12 => b"ss12",
    StylisticSet13 => b"ss13",
    StylisticSet14 => b"ss14",
    StylisticSet15 => b"ss15",
    StylisticSet16 => b"ss16",
    StylisticSet17 => b"ss17",
    StylisticSet18 => b"ss18",
    StylisticSet19 => b"ss19",
    StylisticSet20 => b"ss20",
    Subscript => b"subs",
    Superscript => b"sups",
    Swash => b"swsh",
    Titling => b"titl",
    TraditionalNameForms => b"tnam",
    TabularFigures => b"tnum",
    TraditionalForms => b"trad",
    ThirdWidths => b"twid",
    Unicase => b"unic",
    VerticalWriting => b"vert",
    VerticalAlternatesAndRotation => b"vrt2",
    SlashedZero => b"zero",
}

/// A feature as reported by a font: either registered or the font's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureId {
    Named(KnownFeature),
    Custom(u32),
}

impl FeatureId {
    pub const NONE: FeatureId = FeatureId::Named(KnownFeature::None);

    /// Classifies a packed tag value.
    pub fn from_raw(raw: u32) -> Self {
        match KnownFeature::from_tag(raw) {
            Some(known) => FeatureId::Named(known),
            None => FeatureId::Custom(raw),
        }
    }

    pub fn from_tag(tag: Tag) -> Self {
        Self::from_raw(tag_to_u32(tag))
    }

    pub fn raw(self) -> u32 {
        match self {
            FeatureId::Named(known) => known.tag(),
            FeatureId::Custom(raw) => raw,
        }
    }

    pub fn tag(self) -> Tag {
        tag_from_u32(self.raw())
    }
}

/// Produces the display string for a feature id.
///
/// Named features are humanized from their enumerant name. Custom tags are
/// decoded byte by byte, most significant first, each byte shown as the
/// character with that value.
pub fn resolve(id: FeatureId) -> String {
    match id {
        FeatureId::Named(known) => humanize_identifier(known.canonical_name()),
        FeatureId::Custom(raw) => {
            let decoded: String = [24u32, 16, 8, 0]
                .iter()
                .map(|shift| char::from(((raw >> shift) & 0xFF) as u8))
                .collect();
            format!("Custom: {decoded}")
        }
    }
}

/// A feature paired with its display name. Equality and hashing use the id only.
#[derive(Debug, Clone, Serialize)]
pub struct TypographyFeature {
    #[serde(rename = "tag", serialize_with = "serialize_feature_tag")]
    id: FeatureId,
    display_name: String,
}

impl TypographyFeature {
    pub fn new(id: FeatureId) -> Self {
        Self {
            id,
            display_name: resolve(id),
        }
    }

    /// The "None" entry that heads every feature list.
    pub fn none() -> Self {
        Self::new(FeatureId::NONE)
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_none(&self) -> bool {
        self.id == FeatureId::NONE
    }
}

impl PartialEq for TypographyFeature {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypographyFeature {}

impl Hash for TypographyFeature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypographyFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

fn serialize_feature_tag<S>(id: &FeatureId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if *id == FeatureId::NONE {
        serializer.serialize_none()
    } else {
        serializer.serialize_some(&tag_to_string(id.tag()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_round_trip_through_the_enum() {
        for known in KnownFeature::ALL {
            assert_eq!(KnownFeature::from_tag(known.tag()), Some(*known));
        }
    }

    #[test]
    fn unregistered_tags_stay_custom() {
        let id = FeatureId::from_tag(Tag::new(b"cv01"));
        assert_eq!(id, FeatureId::Custom(u32::from_be_bytes(*b"cv01")));
        assert_eq!(resolve(id), "Custom: cv01");
    }

    #[test]
    fn registered_tags_get_title_case_names() {
        let liga = FeatureId::from_tag(Tag::new(b"liga"));
        assert_eq!(liga, FeatureId::Named(KnownFeature::StandardLigatures));
        assert_eq!(resolve(liga), "Standard Ligatures");
        assert_eq!(resolve(FeatureId::from_tag(Tag::new(b"ss07"))), "Stylistic Set 7");
        assert_eq!(resolve(FeatureId::NONE), "None");
    }

    #[test]
    fn equality_ignores_display_name() {
        let a = TypographyFeature::new(FeatureId::Custom(0x6162_6364));
        let mut b = a.clone();
        b.display_name = "something else".into();
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_tag_and_name() {
        let json = serde_json::to_string(&TypographyFeature::new(FeatureId::from_tag(Tag::new(b"smcp"))))
            .unwrap();
        assert_eq!(json, r#"{"tag":"smcp","display_name":"Small Capitals"}"#);

        let none = serde_json::to_string(&TypographyFeature::none()).unwrap();
        assert_eq!(none, r#"{"tag":null,"display_name":"None"}"#);
    }
}
