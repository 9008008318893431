//! Code point list parsing for command-line input (made by FontLab https://www.fontlab.com/)
//!
//! Accepts comma-separated items; each item is a literal character (`B`),
//! a hex code point (`U+0041`, `0x41`, `41`) or an inclusive range of those
//! written `lo-hi` or `lo..hi`. Reversed ranges are normalised.

use anyhow::{anyhow, Result};

pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Parses `input` into code points, preserving item order.
pub fn parse_codepoint_list(input: &str) -> Result<Vec<u32>> {
    let mut result = Vec::new();
    if input.trim().is_empty() {
        return Ok(result);
    }

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match split_range(part) {
            Some((lo, hi)) => {
                let start = parse_codepoint(lo)?;
                let end = parse_codepoint(hi)?;
                let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
                result.extend(lo..=hi);
            }
            None => result.push(parse_codepoint(part)?),
        }
    }

    Ok(result)
}

/// Joins several raw arguments, sorts and drops duplicates.
pub fn parse_codepoint_args(raw: &[String]) -> Result<Vec<u32>> {
    let mut cps = Vec::new();
    for chunk in raw {
        cps.extend(parse_codepoint_list(chunk)?);
    }
    cps.sort_unstable();
    cps.dedup();
    Ok(cps)
}

fn split_range(part: &str) -> Option<(&str, &str)> {
    if part.chars().count() == 1 {
        return None;
    }
    part.split_once("..").or_else(|| part.split_once('-'))
}

fn parse_codepoint(token: &str) -> Result<u32> {
    let token = token.trim();
    let mut chars = token.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(ch as u32);
    }

    let digits = token
        .strip_prefix("U+")
        .or_else(|| token.strip_prefix("u+"))
        .or_else(|| token.strip_prefix("0x"))
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    let cp = u32::from_str_radix(digits, 16).map_err(|_| anyhow!("invalid codepoint: {token}"))?;
    if cp > MAX_CODE_POINT {
        return Err(anyhow!("codepoint out of range: {token}"));
    }
    Ok(cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_characters_and_prefixes() {
        let cps = parse_codepoint_list("B,U+0041,0x43,u+44,45").expect("parse");
        assert_eq!(cps, vec![0x42, 0x41, 0x43, 0x44, 0x45]);
    }

    #[test]
    fn dash_and_dot_ranges() {
        assert_eq!(parse_codepoint_list("U+0044-U+0041").expect("parse"), vec![0x41, 0x42, 0x43, 0x44]);
        assert_eq!(parse_codepoint_list("0660..0662").expect("parse"), vec![0x660, 0x661, 0x662]);
    }

    #[test]
    fn a_lone_dash_is_a_character() {
        assert_eq!(parse_codepoint_list("-").expect("parse"), vec![0x2D]);
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        assert!(parse_codepoint_list("U+XYZ").is_err());
        assert!(parse_codepoint_list("110000").is_err());
        assert!(parse_codepoint_list("A-").is_err());
    }

    #[test]
    fn args_are_sorted_and_deduplicated() {
        let raw = vec!["C,A".to_string(), "U+0041-U+0042".to_string()];
        assert_eq!(parse_codepoint_args(&raw).expect("parse"), vec![0x41, 0x42, 0x43]);
    }
}
