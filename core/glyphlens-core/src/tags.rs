/// The secret language of font tags, decoded for human understanding
///
/// Font tags are four bytes pretending to be a word. Fonts speak them
/// fluently, shaping engines speak them in ISO 15924 dialect, and the rest
/// of us need a phrasebook. This module is that phrasebook: packing and
/// unpacking tags, and translating a Unicode script into the OpenType
/// script tags a font file actually files its features under.
///
/// Made with curiosity at FontLab https://www.fontlab.com/
use anyhow::{anyhow, Result};
use read_fonts::types::Tag;
use unicode_script::Script;

/// Default-script tags a shaper falls back to, in preference order.
pub const FALLBACK_SCRIPT_TAGS: [Tag; 3] = [
    Tag::new(b"DFLT"),
    Tag::new(b"dflt"),
    Tag::new(b"latn"),
];

/// Encodes 1-4 printable ASCII characters as a tag, padding with spaces.
///
/// `"yi"` becomes `yi  `, exactly as the OpenType registry spells it.
pub fn tag4(raw: &str) -> Result<Tag> {
    if raw.is_empty() || raw.len() > 4 {
        return Err(anyhow!("tag must be 1-4 printable ASCII chars: {raw:?}"));
    }

    let mut buf = [b' '; 4];
    for (slot, byte) in buf.iter_mut().zip(raw.bytes()) {
        if !(0x20..=0x7E).contains(&byte) {
            return Err(anyhow!("tag byte out of range: {raw:?}"));
        }
        *slot = byte;
    }

    Ok(Tag::new(&buf))
}

/// Renders a tag back into the four characters it was made of.
pub fn tag_to_string(tag: Tag) -> String {
    String::from_utf8_lossy(&tag.to_be_bytes()).to_string()
}

/// Packs a tag into its big-endian `u32` form.
pub fn tag_to_u32(tag: Tag) -> u32 {
    u32::from_be_bytes(tag.to_be_bytes())
}

/// Unpacks a big-endian `u32` into a tag.
pub fn tag_from_u32(raw: u32) -> Tag {
    Tag::new(&raw.to_be_bytes())
}

/// The OpenType script tags a font may use for `script`, most preferred first.
///
/// Scripts with a second-generation Indic shaping model list their `xxx2`
/// tag ahead of the classic one. Common, inherited and unknown text has no
/// tag of its own and yields an empty list; callers fall back to
/// [`FALLBACK_SCRIPT_TAGS`].
pub fn opentype_script_tags(script: Script) -> Vec<Tag> {
    match script {
        Script::Common | Script::Inherited | Script::Unknown => Vec::new(),
        Script::Bengali => vec![Tag::new(b"bng2"), Tag::new(b"beng")],
        Script::Devanagari => vec![Tag::new(b"dev2"), Tag::new(b"deva")],
        Script::Gujarati => vec![Tag::new(b"gjr2"), Tag::new(b"gujr")],
        Script::Gurmukhi => vec![Tag::new(b"gur2"), Tag::new(b"guru")],
        Script::Kannada => vec![Tag::new(b"knd2"), Tag::new(b"knda")],
        Script::Malayalam => vec![Tag::new(b"mlm2"), Tag::new(b"mlym")],
        Script::Oriya => vec![Tag::new(b"ory2"), Tag::new(b"orya")],
        Script::Tamil => vec![Tag::new(b"tml2"), Tag::new(b"taml")],
        Script::Telugu => vec![Tag::new(b"tel2"), Tag::new(b"telu")],
        Script::Myanmar => vec![Tag::new(b"mym2"), Tag::new(b"mymr")],
        Script::Hiragana | Script::Katakana => vec![Tag::new(b"kana")],
        Script::Lao => vec![Tag::new(b"lao ")],
        Script::Yi => vec![Tag::new(b"yi  ")],
        Script::Nko => vec![Tag::new(b"nko ")],
        Script::Vai => vec![Tag::new(b"vai ")],
        other => tag4(&other.short_name().to_ascii_lowercase())
            .map(|tag| vec![tag])
            .unwrap_or_default(),
    }
}
