use super::{Element, ElementKind, TextCursor};
use crate::error::{PatchError, Result};
use crate::patch::Patch;
use crate::serialization::PatchInfo;
use std::io::{self, Read, Write};

impl Element for u8 {
    const KIND: ElementKind = ElementKind::Byte;

    fn read_source<R: Read>(mut input: R) -> Result<Vec<Self>> {
        let mut bytes = vec![];
        input.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Reads one line of exactly `2 * count` hex digits.
    fn read_patch_text(cursor: &mut TextCursor<'_>, count: usize) -> Result<Vec<Self>> {
        if count == 0 {
            return Ok(vec![]);
        }
        let digits = loop {
            match cursor.next_line() {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line.trim(),
                None => return Err(PatchError::truncated()),
            }
        };
        if Some(digits.len()) != count.checked_mul(2) {
            return Err(PatchError::invalid(format!(
                "line {}: expected {} hex digits, found {}",
                cursor.line_number(),
                count.saturating_mul(2),
                digits.len()
            )));
        }
        hex::decode(digits).map_err(|e| {
            PatchError::invalid(format!("line {}: {}", cursor.line_number(), e))
        })
    }

    fn print_patch_text<W: Write>(elements: &[Self], out: &mut W) -> io::Result<()> {
        if elements.is_empty() {
            return Ok(());
        }
        writeln!(out, "{}", hex::encode_upper(elements))
    }

    fn write_work<W: Write>(elements: &[Self], out: &mut W) -> io::Result<()> {
        out.write_all(elements)
    }

    fn serialize<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&[*self])
    }

    fn deserialize<R: Read>(input: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; 1];
        input.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn into_info(patch: Patch<Self>) -> PatchInfo {
        PatchInfo::Byte(patch)
    }
}
