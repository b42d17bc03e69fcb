//! Patch files: a patch together with the element kind it was computed over,
//! in either a line-oriented text encoding or a compact binary one.

mod binary;
mod text;

use crate::element::{ElementKind, Token};
use crate::error::Result;
use crate::patch::Patch;
use crate::registry::Registry;
use std::fmt;
use std::io::{Read, Write};

/// A patch tagged with its element kind, which is what a patch file stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchInfo {
    Line(Patch<String>),
    Byte(Patch<u8>),
    Token(Patch<Token>),
}

impl PatchInfo {
    pub fn kind(&self) -> ElementKind {
        match self {
            PatchInfo::Line(_) => ElementKind::Line,
            PatchInfo::Byte(_) => ElementKind::Byte,
            PatchInfo::Token(_) => ElementKind::Token,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PatchInfo::Line(p) => p.is_empty(),
            PatchInfo::Byte(p) => p.is_empty(),
            PatchInfo::Token(p) => p.is_empty(),
        }
    }
}

/// The available patch file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    Text,
    Binary,
}

impl CodecKind {
    pub const ALL: [CodecKind; 2] = [CodecKind::Text, CodecKind::Binary];

    pub const fn name(self) -> &'static str {
        match self {
            CodecKind::Text => "text",
            CodecKind::Binary => "binary",
        }
    }

    pub fn encode<W: Write>(self, info: &PatchInfo, out: &mut W) -> Result<()> {
        match self {
            CodecKind::Text => text::encode(info, out),
            CodecKind::Binary => binary::encode(info, out),
        }
    }

    /// Decodes a patch file, resolving its element kind through `registry`.
    pub fn decode<R: Read>(self, input: R, registry: &Registry) -> Result<PatchInfo> {
        match self {
            CodecKind::Text => text::decode(input, registry),
            CodecKind::Binary => binary::decode(input, registry),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::tokenize;
    use crate::lcs::diff;
    use proptest::prelude::*;

    fn roundtrip(info: &PatchInfo) {
        let registry = Registry::standard();
        for codec in CodecKind::ALL {
            let mut buf = vec![];
            codec.encode(info, &mut buf).unwrap();
            let decoded = codec.decode(buf.as_slice(), &registry).unwrap();
            assert_eq!(&decoded, info, "{} codec", codec);
        }
    }

    proptest! {
        #[test]
        fn test_line_roundtrip(
            old in prop::collection::vec("[a-z !]{0,6}", 0..15usize),
            new in prop::collection::vec("[a-z !]{0,6}", 0..15usize),
        ) {
            roundtrip(&PatchInfo::Line(diff(&old, &new)));
        }

        #[test]
        fn test_byte_roundtrip(old: Vec<u8>, new: Vec<u8>) {
            roundtrip(&PatchInfo::Byte(diff(&old, &new)));
        }

        #[test]
        fn test_token_roundtrip(
            old in "[a-c =;\n(){}]{0,40}",
            new in "[a-c =;\n(){}]{0,40}",
        ) {
            let patch = diff(&tokenize(&old), &tokenize(&new));
            roundtrip(&PatchInfo::Token(patch));
        }
    }

    #[test]
    fn test_token_roundtrip_with_comments() {
        let old = tokenize("int a; /* old\n comment */\nint b;\n");
        let new = tokenize("int a; /* new\n\n comment */ int c;\n// tail\n");
        roundtrip(&PatchInfo::Token(diff(&old, &new)));
    }

    #[test]
    fn test_token_roundtrip_ending_in_open_comment() {
        let patch = diff(&tokenize("x\n"), &tokenize("x\n/* c"));
        assert_eq!(patch.additions().last().unwrap().elements.last().unwrap().value(), "/* c\n");
        roundtrip(&PatchInfo::Token(patch));

        let patch = diff(&tokenize("x\n"), &tokenize("x\n/* c\n\n"));
        roundtrip(&PatchInfo::Token(patch));
    }

    #[test]
    fn test_empty_patch_roundtrip() {
        for kind in ElementKind::ALL {
            let info = match kind {
                ElementKind::Line => PatchInfo::Line(Patch::new()),
                ElementKind::Byte => PatchInfo::Byte(Patch::new()),
                ElementKind::Token => PatchInfo::Token(Patch::new()),
            };
            assert!(info.is_empty());
            assert_eq!(info.kind(), kind);
            roundtrip(&info);
        }
    }
}
