use super::{read_utf, write_utf, Element, ElementKind, TextCursor};
use crate::error::Result;
use crate::patch::Patch;
use crate::serialization::PatchInfo;
use std::io::{self, Read, Write};

impl Element for String {
    const KIND: ElementKind = ElementKind::Line;

    fn read_patch_text(cursor: &mut TextCursor<'_>, count: usize) -> Result<Vec<Self>> {
        let mut lines = vec![];
        while lines.len() < count {
            match cursor.next_line() {
                Some(line) => lines.push(line.to_string()),
                None => break,
            }
        }
        Ok(lines)
    }

    fn print_patch_text<W: Write>(elements: &[Self], out: &mut W) -> io::Result<()> {
        for line in elements {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    fn write_work<W: Write>(elements: &[Self], out: &mut W) -> io::Result<()> {
        Self::print_patch_text(elements, out)
    }

    fn serialize<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_utf(self, out)
    }

    fn deserialize<R: Read>(input: &mut R) -> io::Result<Self> {
        read_utf(input)
    }

    fn into_info(patch: Patch<Self>) -> PatchInfo {
        PatchInfo::Line(patch)
    }
}
