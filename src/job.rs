//! File-level diff and patch runs.
//!
//! A job is checked when it is built: inputs must be existing files and the
//! output must not exist yet. Running reads every input completely and only
//! creates the output once the result is ready, so a failed run leaves no
//! output file behind.

use crate::element::{Element, ElementKind, Token};
use crate::error::{PatchError, Result};
use crate::lcs::diff;
use crate::patch::{apply, Patch};
use crate::registry::Registry;
use crate::serialization::{CodecKind, PatchInfo};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Diffs `base` against `work` over the given element kind.
pub fn compute<R: Read, S: Read>(kind: ElementKind, base: R, work: S) -> Result<PatchInfo> {
    match kind {
        ElementKind::Line => compute_as::<String, _, _>(base, work),
        ElementKind::Byte => compute_as::<u8, _, _>(base, work),
        ElementKind::Token => compute_as::<Token, _, _>(base, work),
    }
}

fn compute_as<E: Element, R: Read, S: Read>(base: R, work: S) -> Result<PatchInfo> {
    let base = E::read_source(base)?;
    let work = E::read_source(work)?;
    Ok(E::into_info(diff(&base, &work)))
}

/// Applies a patch to `base` and returns the work file contents.
pub fn reconstruct<R: Read>(info: &PatchInfo, base: R) -> Result<Vec<u8>> {
    match info {
        PatchInfo::Line(p) => reconstruct_as(p, base),
        PatchInfo::Byte(p) => reconstruct_as(p, base),
        PatchInfo::Token(p) => reconstruct_as(p, base),
    }
}

fn reconstruct_as<E: Element, R: Read>(patch: &Patch<E>, base: R) -> Result<Vec<u8>> {
    let base = E::read_source(base)?;
    let work = apply(&base, patch)?;
    debug!(base = base.len(), work = work.len(), "reconstructed work sequence");
    let mut out = vec![];
    E::write_work(&work, &mut out)?;
    Ok(out)
}

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PatchError::NoSuchFile {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not an existing file"),
        })
    }
}

fn require_absent(path: &Path) -> Result<()> {
    if path.exists() {
        Err(PatchError::OutputExists(path.to_path_buf()))
    } else {
        Ok(())
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| PatchError::NoSuchFile {
            path: path.to_path_buf(),
            source,
        })
}

fn write_new(path: &Path, contents: &[u8]) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| match source.kind() {
            io::ErrorKind::AlreadyExists => PatchError::OutputExists(path.to_path_buf()),
            _ => PatchError::NoSuchFile {
                path: path.to_path_buf(),
                source,
            },
        })?;
    let mut out = BufWriter::new(file);
    out.write_all(contents)?;
    out.flush()?;
    Ok(())
}

/// Writes the patch between two files.
#[derive(Debug, Clone)]
pub struct DiffJob {
    base: PathBuf,
    work: PathBuf,
    output: PathBuf,
    kind: ElementKind,
    codec: CodecKind,
}

impl DiffJob {
    pub fn new(
        base: impl Into<PathBuf>,
        work: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        kind: ElementKind,
        codec: CodecKind,
    ) -> Result<Self> {
        let job = DiffJob {
            base: base.into(),
            work: work.into(),
            output: output.into(),
            kind,
            codec,
        };
        require_file(&job.base)?;
        require_file(&job.work)?;
        require_absent(&job.output)?;
        Ok(job)
    }

    pub fn run(&self) -> Result<PatchInfo> {
        let info = compute(self.kind, open(&self.base)?, open(&self.work)?)?;
        let mut encoded = vec![];
        self.codec.encode(&info, &mut encoded)?;
        write_new(&self.output, &encoded)?;
        info!(
            kind = %self.kind,
            codec = %self.codec,
            output = %self.output.display(),
            unchanged = info.is_empty(),
            "wrote patch"
        );
        Ok(info)
    }
}

/// Rebuilds a work file from a base file and a patch file.
#[derive(Debug, Clone)]
pub struct PatchJob {
    base: PathBuf,
    patch: PathBuf,
    output: PathBuf,
    codec: CodecKind,
}

impl PatchJob {
    pub fn new(
        base: impl Into<PathBuf>,
        patch: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        codec: CodecKind,
    ) -> Result<Self> {
        let job = PatchJob {
            base: base.into(),
            patch: patch.into(),
            output: output.into(),
            codec,
        };
        require_file(&job.base)?;
        require_file(&job.patch)?;
        require_absent(&job.output)?;
        Ok(job)
    }

    /// The element kind comes from the patch file itself.
    pub fn run(&self, registry: &Registry) -> Result<ElementKind> {
        let info = self.codec.decode(open(&self.patch)?, registry)?;
        let contents = reconstruct(&info, open(&self.base)?)?;
        write_new(&self.output, &contents)?;
        info!(
            kind = %info.kind(),
            codec = %self.codec,
            output = %self.output.display(),
            bytes = contents.len(),
            "wrote work file"
        );
        Ok(info.kind())
    }
}
