//! Element kinds: what a single unit of comparison is, and how it is read
//! from source files and patch files and written back out.

mod byte;
mod line;
mod token;

pub use token::{tokenize, Lexer, Token, TokenCategory};

use crate::error::Result;
use crate::patch::Patch;
use crate::serialization::PatchInfo;
use std::fmt;
use std::io::{self, Read, Write};

/// The closed set of element kinds a patch can be computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// One line of text, without its terminator.
    Line,
    /// One raw byte.
    Byte,
    /// One lexical token of C-like source code.
    Token,
}

impl ElementKind {
    pub const ALL: [ElementKind; 3] = [ElementKind::Line, ElementKind::Byte, ElementKind::Token];

    /// The name written into patch files.
    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Line => "normal",
            ElementKind::Byte => "byte",
            ElementKind::Token => "java",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities every element kind provides.
///
/// Implemented by `String` (lines), `u8` (bytes) and [`Token`].
pub trait Element: Clone + Eq + fmt::Debug + Sized {
    const KIND: ElementKind;

    /// Reads a whole base or work file.
    fn read_source<R: Read>(mut input: R) -> Result<Vec<Self>> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        Self::read_patch_text(&mut TextCursor::new(&text), usize::MAX)
    }

    /// Reads at most `count` elements from the body of a text patch file.
    fn read_patch_text(cursor: &mut TextCursor<'_>, count: usize) -> Result<Vec<Self>>;

    /// Prints elements into a text patch file. The output always ends on a
    /// line break unless `elements` is empty.
    fn print_patch_text<W: Write>(elements: &[Self], out: &mut W) -> io::Result<()>;

    /// Writes a reconstructed work file.
    fn write_work<W: Write>(elements: &[Self], out: &mut W) -> io::Result<()>;

    fn serialize<W: Write>(&self, out: &mut W) -> io::Result<()>;

    fn deserialize<R: Read>(input: &mut R) -> io::Result<Self>;

    /// Pairs a patch over this kind with its kind tag.
    fn into_info(patch: Patch<Self>) -> PatchInfo;
}

/// Line-by-line view over the text of a patch or source file.
pub struct TextCursor<'a> {
    lines: std::str::Lines<'a>,
    line_number: usize,
}

impl<'a> TextCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        TextCursor {
            lines: text.lines(),
            line_number: 0,
        }
    }

    pub fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_number += 1;
        Some(line)
    }

    /// 1-based number of the line last returned by `next_line`.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Length-prefixed UTF-8, shared by the text based kinds.
fn write_utf<W: Write>(value: &str, out: &mut W) -> io::Result<()> {
    use byteorder::{BigEndian, WriteBytesExt};

    let len = u16::try_from(value.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("element of {} bytes is too long to serialize", value.len()),
        )
    })?;
    out.write_u16::<BigEndian>(len)?;
    out.write_all(value.as_bytes())
}

fn read_utf<R: Read>(input: &mut R) -> io::Result<String> {
    use byteorder::{BigEndian, ReadBytesExt};

    let len = input.read_u16::<BigEndian>()?;
    let mut buf = vec![0; usize::from(len)];
    input.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_counts_lines() {
        let mut cursor = TextCursor::new("a\r\nb\n\nc");
        assert_eq!(cursor.next_line(), Some("a"));
        assert_eq!(cursor.next_line(), Some("b"));
        assert_eq!(cursor.next_line(), Some(""));
        assert_eq!(cursor.next_line(), Some("c"));
        assert_eq!(cursor.line_number(), 4);
        assert_eq!(cursor.next_line(), None);
    }

    #[test]
    fn test_utf_roundtrip() {
        let mut buf = vec![];
        write_utf("héllo", &mut buf).unwrap();
        assert_eq!(&buf[..2], &[0, 6]);
        assert_eq!(read_utf(&mut buf.as_slice()).unwrap(), "héllo");
    }

    #[test]
    fn test_utf_too_long() {
        let long = "x".repeat(70_000);
        let err = write_utf(&long, &mut vec![]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_utf_truncated() {
        let err = read_utf(&mut &[0u8, 5, b'a'][..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_kind_names() {
        let names: Vec<_> = ElementKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, ["normal", "byte", "java"]);
    }
}
