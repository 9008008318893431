//! Script segmentation of character sequences (made by FontLab https://www.fontlab.com/)

use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Serialize, Serializer};
use unicode_script::{Script, UnicodeScript};

/// Opaque script token. Only equality is meaningful to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptId(Script);

impl ScriptId {
    pub fn new(script: Script) -> Self {
        Self(script)
    }

    pub fn of(ch: char) -> Self {
        Self(ch.script())
    }

    pub fn script(self) -> Script {
        self.0
    }

    /// Four-letter ISO 15924 code, e.g. `Latn`.
    pub fn iso15924(self) -> &'static str {
        self.0.short_name()
    }

    /// Common, inherited and unknown text borrows the script of its neighbours.
    pub fn is_neutral(self) -> bool {
        matches!(self.0, Script::Common | Script::Inherited | Script::Unknown)
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.full_name())
    }
}

impl Serialize for ScriptId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.iso15924())
    }
}

/// Half-open span `[start, start + count)` of character positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterRange {
    pub start: u32,
    pub count: u32,
}

impl CharacterRange {
    pub fn end(&self) -> u32 {
        self.start + self.count
    }

    pub fn contains(&self, position: u32) -> bool {
        position >= self.start && position < self.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScriptSegment {
    pub range: CharacterRange,
    pub script: ScriptId,
}

/// Ordered, gap-free partition of a text into script runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptSegmentation {
    segments: Vec<ScriptSegment>,
    text_len: u32,
}

impl ScriptSegmentation {
    /// Segments `text` by Unicode script.
    ///
    /// Neutral characters (punctuation, digits shared across scripts,
    /// combining marks) extend the run before them; a neutral prefix is
    /// folded into the first real run. Text made only of neutral characters
    /// forms a single segment.
    pub fn analyze(text: &str) -> Self {
        let mut segments: Vec<ScriptSegment> = Vec::new();
        let mut pending_neutral: Option<(u32, ScriptId)> = None;
        let mut len: u32 = 0;

        for (index, ch) in (0u32..).zip(text.chars()) {
            len = index + 1;
            let script = ScriptId::of(ch);

            if script.is_neutral() {
                match segments.last_mut() {
                    Some(last) => last.range.count += 1,
                    None => {
                        pending_neutral.get_or_insert((0, script));
                    }
                }
                continue;
            }

            match segments.last_mut() {
                Some(last) if last.script == script => last.range.count += 1,
                Some(_) => segments.push(ScriptSegment {
                    range: CharacterRange {
                        start: index,
                        count: 1,
                    },
                    script,
                }),
                None => {
                    let start = pending_neutral.take().map_or(index, |(start, _)| start);
                    segments.push(ScriptSegment {
                        range: CharacterRange {
                            start,
                            count: index - start + 1,
                        },
                        script,
                    });
                }
            }
        }

        if let Some((start, script)) = pending_neutral {
            segments.push(ScriptSegment {
                range: CharacterRange {
                    start,
                    count: len - start,
                },
                script,
            });
        }

        Self {
            segments,
            text_len: len,
        }
    }

    /// Wraps a partition produced elsewhere (e.g. by a shaping engine).
    ///
    /// The segments must start at 0 and be contiguous with non-empty ranges;
    /// they may stop short of `text_len`.
    pub fn from_segments(segments: Vec<ScriptSegment>, text_len: u32) -> Result<Self> {
        let mut expected_start = 0u32;
        for segment in &segments {
            if segment.range.count == 0 {
                return Err(anyhow!("empty script segment at {}", segment.range.start));
            }
            if segment.range.start != expected_start {
                return Err(anyhow!(
                    "script segments not contiguous: expected start {expected_start}, found {}",
                    segment.range.start
                ));
            }
            expected_start = segment.range.end();
        }
        if expected_start > text_len {
            return Err(anyhow!(
                "script segments cover {expected_start} characters but text has {text_len}"
            ));
        }

        Ok(Self { segments, text_len })
    }

    pub fn segments(&self) -> &[ScriptSegment] {
        &self.segments
    }

    pub fn text_len(&self) -> u32 {
        self.text_len
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Script of the segment containing `position`.
    ///
    /// Positions at or past the end of the last segment resolve to the last
    /// segment's script. Returns `None` only when there are no segments.
    pub fn script_at(&self, position: u32) -> Option<ScriptId> {
        let last = self.segments.last()?;

        let idx = self
            .segments
            .partition_point(|segment| segment.range.end() <= position);
        if let Some(segment) = self.segments.get(idx) {
            if segment.range.contains(position) {
                return Some(segment.script);
            }
        }

        if position < self.text_len {
            log::debug!(
                "position {position} lies in trailing text not covered by script analysis (covered up to {}); using last script",
                last.range.end()
            );
        } else {
            log::warn!(
                "position {position} is beyond the analysed text ({} chars); glyph run boundaries disagree with the text",
                self.text_len
            );
        }
        Some(last.script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripts(seg: &ScriptSegmentation) -> Vec<Script> {
        seg.segments().iter().map(|s| s.script.script()).collect()
    }

    #[test]
    fn empty_text_has_no_segments() {
        let seg = ScriptSegmentation::analyze("");
        assert!(seg.is_empty());
        assert_eq!(seg.script_at(0), None);
    }

    #[test]
    fn splits_latin_and_arabic() {
        let seg = ScriptSegmentation::analyze("A\u{0660}");
        assert_eq!(scripts(&seg), vec![Script::Latin, Script::Arabic]);
        assert_eq!(seg.script_at(0), Some(ScriptId::new(Script::Latin)));
        assert_eq!(seg.script_at(1), Some(ScriptId::new(Script::Arabic)));
    }

    #[test]
    fn neutral_characters_join_neighbouring_runs() {
        let seg = ScriptSegmentation::analyze("12ab, \u{0627}\u{0628}!");
        assert_eq!(scripts(&seg), vec![Script::Latin, Script::Arabic]);
        assert_eq!(seg.segments()[0].range, CharacterRange { start: 0, count: 6 });
        assert_eq!(seg.segments()[1].range, CharacterRange { start: 6, count: 3 });
    }

    #[test]
    fn all_neutral_text_is_one_segment() {
        let seg = ScriptSegmentation::analyze("123 !?");
        assert_eq!(seg.segments().len(), 1);
        assert_eq!(seg.segments()[0].range.count, 6);
        assert!(seg.segments()[0].script.is_neutral());
    }

    #[test]
    fn positions_past_the_end_use_last_script() {
        let seg = ScriptSegmentation::analyze("ab\u{05D0}");
        assert_eq!(seg.script_at(2), Some(ScriptId::new(Script::Hebrew)));
        assert_eq!(seg.script_at(3), Some(ScriptId::new(Script::Hebrew)));
        assert_eq!(seg.script_at(400), Some(ScriptId::new(Script::Hebrew)));
    }

    #[test]
    fn trailing_uncovered_positions_use_last_script() {
        let partial = vec![ScriptSegment {
            range: CharacterRange { start: 0, count: 2 },
            script: ScriptId::new(Script::Greek),
        }];
        let seg = ScriptSegmentation::from_segments(partial, 5).expect("valid");
        assert_eq!(seg.script_at(3), Some(ScriptId::new(Script::Greek)));
    }

    #[test]
    fn rejects_gapped_segments() {
        let gapped = vec![
            ScriptSegment {
                range: CharacterRange { start: 0, count: 2 },
                script: ScriptId::new(Script::Latin),
            },
            ScriptSegment {
                range: CharacterRange { start: 3, count: 1 },
                script: ScriptId::new(Script::Greek),
            },
        ];
        assert!(ScriptSegmentation::from_segments(gapped, 4).is_err());
    }
}
