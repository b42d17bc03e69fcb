//! ```text
//! meme-diff version 0
//! format normal
//!
//! !delete 2,1
//! !add 2,1
//! x
//!
//! ```
//!
//! A header line, a format line naming the element kind, then `!delete` and
//! `!add` directives. Each `!add` is followed by exactly `length` elements as
//! printed by the element kind. Directives are grouped by start position
//! with blank lines, which carry no meaning when reading.

use super::PatchInfo;
use crate::element::{Element, ElementKind, TextCursor, Token};
use crate::error::{PatchError, Result};
use crate::patch::{Addition, Deletion, Patch};
use crate::registry::Registry;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Read, Write};
use tracing::debug;

pub(crate) const HEADER_NAME: &str = "meme-diff";
pub(crate) const VERSION: u32 = 0;

static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*meme-diff\s+version\s+(\d+)\s*$").expect("valid pattern"));
static FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*format\s+(\w+)\s*$").expect("valid pattern"));
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*!(delete|add)\s+(\d+)\s*,\s*(\d+)\s*$").expect("valid pattern")
});

pub(crate) fn encode<W: Write>(info: &PatchInfo, out: &mut W) -> Result<()> {
    match info {
        PatchInfo::Line(p) => write_patch(p, out),
        PatchInfo::Byte(p) => write_patch(p, out),
        PatchInfo::Token(p) => write_patch(p, out),
    }
}

fn write_patch<E: Element, W: Write>(patch: &Patch<E>, out: &mut W) -> Result<()> {
    writeln!(out, "{} version {}", HEADER_NAME, VERSION)?;
    writeln!(out, "format {}", E::KIND.name())?;

    let mut additions = patch.additions().iter().peekable();
    let mut deletions = patch.deletions().iter().peekable();
    let mut previous_start = None;

    loop {
        let deletion_first = match (additions.peek(), deletions.peek()) {
            (None, None) => break,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (Some(a), Some(d)) => d.start <= a.start,
        };

        let start = if deletion_first {
            deletions.peek().map(|d| d.start)
        } else {
            additions.peek().map(|a| a.start)
        };
        if start != previous_start {
            writeln!(out)?;
            previous_start = start;
        }

        if deletion_first {
            if let Some(d) = deletions.next() {
                writeln!(out, "!delete {},{}", d.start, d.length)?;
            }
        } else if let Some(a) = additions.next() {
            writeln!(out, "!add {},{}", a.start, a.len())?;
            E::print_patch_text(&a.elements, out)?;
        }
    }

    writeln!(out)?;
    Ok(())
}

pub(crate) fn decode<R: Read>(mut input: R, registry: &Registry) -> Result<PatchInfo> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .map_err(PatchError::from_body)?;
    let mut cursor = TextCursor::new(&text);

    let header = cursor.next_line().ok_or_else(PatchError::truncated)?;
    let version = HEADER
        .captures(header)
        .and_then(|c| c[1].parse::<u32>().ok())
        .ok_or_else(|| PatchError::invalid(format!("invalid header \"{}\"", header)))?;
    if version != VERSION {
        return Err(PatchError::invalid(format!(
            "unsupported patch file version: {}",
            version
        )));
    }

    let format_line = cursor.next_line().ok_or_else(PatchError::truncated)?;
    let name = FORMAT
        .captures(format_line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            PatchError::invalid(format!("invalid format line \"{}\"", format_line))
        })?;
    let kind = registry
        .kind(name)
        .ok_or_else(|| PatchError::invalid(format!("unrecognized format \"{}\"", name)))?;
    debug!(%kind, "reading text patch");

    Ok(match kind {
        ElementKind::Line => PatchInfo::Line(read_directives::<String>(&mut cursor)?),
        ElementKind::Byte => PatchInfo::Byte(read_directives::<u8>(&mut cursor)?),
        ElementKind::Token => PatchInfo::Token(read_directives::<Token>(&mut cursor)?),
    })
}

fn read_directives<E: Element>(cursor: &mut TextCursor<'_>) -> Result<Patch<E>> {
    let mut patch = Patch::new();

    while let Some(line) = cursor.next_line() {
        if line.trim().is_empty() {
            continue;
        }
        let number = cursor.line_number();
        let caps = DIRECTIVE.captures(line).ok_or_else(|| {
            PatchError::invalid(format!("line {}: invalid directive \"{}\"", number, line))
        })?;
        let parse = |i: usize| {
            caps[i].parse::<usize>().map_err(|_| {
                PatchError::invalid(format!("line {}: number out of range \"{}\"", number, line))
            })
        };
        let (start, length) = (parse(2)?, parse(3)?);

        if &caps[1] == "delete" {
            patch.push_deletion(Deletion::new(start, length));
        } else {
            let elements = E::read_patch_text(cursor, length)?;
            if elements.len() != length {
                return Err(PatchError::truncated());
            }
            patch.push_addition(Addition::new(start, elements));
        }
    }

    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcs::diff;

    fn decode_str(text: &str) -> Result<PatchInfo> {
        decode(text.as_bytes(), &Registry::standard())
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_encode_replacement() {
        let patch = diff(&strings(&["a", "b", "c"]), &strings(&["a", "x", "c"]));
        let mut out = vec![];
        encode(&PatchInfo::Line(patch), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "meme-diff version 0\nformat normal\n\n!delete 2,1\n!add 2,1\nx\n\n"
        );
    }

    #[test]
    fn test_encode_groups_by_start() {
        let patch = Patch::from_parts(
            vec![Addition::new(0, vec![0xabu8]), Addition::new(4, vec![1, 2])],
            vec![Deletion::new(2, 1)],
        );
        let mut out = vec![];
        encode(&PatchInfo::Byte(patch), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "meme-diff version 0\nformat byte\n\n!add 0,1\nAB\n\n!delete 2,1\n\n!add 4,2\n0102\n\n"
        );
    }

    #[test]
    fn test_encode_empty() {
        let mut out = vec![];
        encode(&PatchInfo::Token(Patch::new()), &mut out).unwrap();
        assert_eq!(out, b"meme-diff version 0\nformat java\n\n");
    }

    #[test]
    fn test_decode_tolerates_whitespace() {
        let info = decode_str("  meme-diff  version 0 \nformat   normal\n!delete 3 , 2\n\n\n  !add 1,2  \none\n\n")
            .unwrap();
        let expected = Patch::from_parts(
            vec![Addition::new(1, strings(&["one", ""]))],
            vec![Deletion::new(3, 2)],
        );
        assert_eq!(info, PatchInfo::Line(expected));
    }

    #[test]
    fn test_decode_invalid_header() {
        let err = decode_str("diff version 0\nformat normal\n").unwrap_err();
        assert!(err.to_string().contains("invalid header"));
    }

    #[test]
    fn test_decode_unsupported_version() {
        let err = decode_str("meme-diff version 3\nformat normal\n").unwrap_err();
        assert!(err.to_string().contains("unsupported patch file version: 3"));
    }

    #[test]
    fn test_decode_unknown_format() {
        let err = decode_str("meme-diff version 0\nformat cobol\n").unwrap_err();
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn test_decode_bad_format_line() {
        assert!(decode_str("meme-diff version 0\nformats normal\n").is_err());
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(matches!(decode_str(""), Err(PatchError::InvalidFormat(_))));
        assert!(decode_str("meme-diff version 0\n").is_err());
    }

    #[test]
    fn test_decode_bad_directive() {
        let err = decode_str("meme-diff version 0\nformat normal\n\n!move 1,2\n").unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_decode_truncated_addition() {
        let err = decode_str("meme-diff version 0\nformat normal\n\n!add 1,3\na\nb\n").unwrap_err();
        assert!(err.to_string().contains("end of the file"));
    }

    #[test]
    fn test_decode_token_patch() {
        let info = decode_str("meme-diff version 0\nformat java\n\n!add 4,3\nx = 1\n!delete 9,2\n").unwrap();
        let PatchInfo::Token(patch) = info else {
            panic!("expected a token patch");
        };
        let values: Vec<_> = patch.additions()[0].elements.iter().map(Token::value).collect();
        assert_eq!(values, ["x", " ", "="]);
        assert_eq!(patch.deletions(), &[Deletion::new(9, 2)]);
    }

    #[test]
    fn test_decode_with_alias() {
        let registry = Registry::standard().with_kind("lines", ElementKind::Line);
        let info = decode("meme-diff version 0\nformat lines\n".as_bytes(), &registry).unwrap();
        assert_eq!(info, PatchInfo::Line(Patch::new()));
    }
}
