//! Layout, all integers big-endian:
//!
//! | field           | size                          |
//! |-----------------|-------------------------------|
//! | magic `MDIF`    | 4                             |
//! | version         | 1                             |
//! | kind name       | `u16` length + UTF-8          |
//! | addition count  | `i32`                         |
//! | additions       | `i32` start, `i32` length, elements |
//! | deletion count  | `i32`                         |
//! | deletions       | `i32` start, `i32` length     |

use super::PatchInfo;
use crate::element::{Element, ElementKind, Token};
use crate::error::{PatchError, Result};
use crate::patch::{Addition, Deletion, Patch};
use crate::registry::Registry;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use tracing::debug;

const MAGIC: [u8; 4] = *b"MDIF";
const VERSION: u8 = 0;

pub(crate) fn encode<W: Write>(info: &PatchInfo, out: &mut W) -> Result<()> {
    match info {
        PatchInfo::Line(p) => write_patch(p, out),
        PatchInfo::Byte(p) => write_patch(p, out),
        PatchInfo::Token(p) => write_patch(p, out),
    }
}

fn write_count<W: Write>(value: usize, out: &mut W) -> io::Result<()> {
    let value = i32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not fit the binary patch format", value),
        )
    })?;
    out.write_i32::<BigEndian>(value)
}

fn write_patch<E: Element, W: Write>(patch: &Patch<E>, out: &mut W) -> Result<()> {
    out.write_all(&MAGIC)?;
    out.write_u8(VERSION)?;
    let name = E::KIND.name();
    out.write_u16::<BigEndian>(name.len() as u16)?;
    out.write_all(name.as_bytes())?;

    write_count(patch.additions().len(), out)?;
    for addition in patch.additions() {
        write_count(addition.start, out)?;
        write_count(addition.len(), out)?;
        for element in &addition.elements {
            element.serialize(out)?;
        }
    }

    write_count(patch.deletions().len(), out)?;
    for deletion in patch.deletions() {
        write_count(deletion.start, out)?;
        write_count(deletion.length, out)?;
    }
    out.flush()?;
    Ok(())
}

fn read_count<R: Read>(input: &mut R, what: &str) -> Result<usize> {
    let value = input
        .read_i32::<BigEndian>()
        .map_err(PatchError::from_body)?;
    usize::try_from(value).map_err(|_| PatchError::invalid(format!("{} < 0", what)))
}

pub(crate) fn decode<R: Read>(mut input: R, registry: &Registry) -> Result<PatchInfo> {
    let mut magic = [0u8; 4];
    input
        .read_exact(&mut magic)
        .map_err(PatchError::from_body)?;
    if magic != MAGIC {
        return Err(PatchError::invalid("invalid magic number"));
    }
    let version = input.read_u8().map_err(PatchError::from_body)?;
    if version != VERSION {
        return Err(PatchError::invalid(format!(
            "unsupported patch format version: {}",
            version
        )));
    }

    let len = input
        .read_u16::<BigEndian>()
        .map_err(PatchError::from_body)?;
    let mut name = vec![0; usize::from(len)];
    input.read_exact(&mut name).map_err(PatchError::from_body)?;
    let name = String::from_utf8(name)
        .map_err(|_| PatchError::invalid("element kind name is not valid UTF-8"))?;
    let kind = registry
        .kind(&name)
        .ok_or_else(|| PatchError::invalid(format!("unrecognized format \"{}\"", name)))?;
    debug!(%kind, "reading binary patch");

    Ok(match kind {
        ElementKind::Line => PatchInfo::Line(read_body::<String, _>(&mut input)?),
        ElementKind::Byte => PatchInfo::Byte(read_body::<u8, _>(&mut input)?),
        ElementKind::Token => PatchInfo::Token(read_body::<Token, _>(&mut input)?),
    })
}

fn read_body<E: Element, R: Read>(input: &mut R) -> Result<Patch<E>> {
    let mut patch = Patch::new();

    let additions = read_count(input, "addition count")?;
    for _ in 0..additions {
        let start = read_count(input, "start")?;
        let length = read_count(input, "length")?;
        let elements = (0..length)
            .map(|_| E::deserialize(input).map_err(PatchError::from_body))
            .collect::<Result<Vec<_>>>()?;
        patch.push_addition(Addition::new(start, elements));
    }

    let deletions = read_count(input, "deletion count")?;
    for _ in 0..deletions {
        let start = read_count(input, "start")?;
        let length = read_count(input, "length")?;
        patch.push_deletion(Deletion::new(start, length));
    }

    Ok(patch)
}
