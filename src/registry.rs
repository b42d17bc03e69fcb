use crate::element::ElementKind;
use crate::serialization::CodecKind;
use std::collections::HashMap;

/// Name lookup for element kinds and patch file codecs.
///
/// Built once at start-up and handed to whatever needs to resolve a name,
/// such as the decoders reading the kind out of a patch file.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    kinds: HashMap<String, ElementKind>,
    codecs: HashMap<String, CodecKind>,
}

impl Registry {
    /// The stock names: `normal`, `byte` and `java` for element kinds, `text`
    /// and `binary` for codecs.
    pub fn standard() -> Self {
        let registry = ElementKind::ALL
            .into_iter()
            .fold(Registry::default(), |r, kind| r.with_kind(kind.name(), kind));
        CodecKind::ALL
            .into_iter()
            .fold(registry, |r, codec| r.with_codec(codec.name(), codec))
    }

    pub fn with_kind(mut self, name: impl Into<String>, kind: ElementKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    pub fn with_codec(mut self, name: impl Into<String>, codec: CodecKind) -> Self {
        self.codecs.insert(name.into(), codec);
        self
    }

    pub fn kind(&self, name: &str) -> Option<ElementKind> {
        self.kinds.get(name).copied()
    }

    pub fn codec(&self, name: &str) -> Option<CodecKind> {
        self.codecs.get(name).copied()
    }

    /// Falls back to line elements for unknown names.
    pub fn kind_or_default(&self, name: &str) -> ElementKind {
        self.kind(name).unwrap_or(ElementKind::Line)
    }

    /// Falls back to the text codec for unknown names.
    pub fn codec_or_default(&self, name: &str) -> CodecKind {
        self.codec(name).unwrap_or(CodecKind::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_names() {
        let registry = Registry::standard();
        assert_eq!(registry.kind("normal"), Some(ElementKind::Line));
        assert_eq!(registry.kind("byte"), Some(ElementKind::Byte));
        assert_eq!(registry.kind("java"), Some(ElementKind::Token));
        assert_eq!(registry.codec("text"), Some(CodecKind::Text));
        assert_eq!(registry.codec("binary"), Some(CodecKind::Binary));
        assert_eq!(registry.kind("text"), None);
    }

    #[test]
    fn test_defaults() {
        let registry = Registry::standard();
        assert_eq!(registry.kind_or_default("nope"), ElementKind::Line);
        assert_eq!(registry.codec_or_default("nope"), CodecKind::Text);
    }

    #[test]
    fn test_aliases() {
        let registry = Registry::default()
            .with_kind("c", ElementKind::Token)
            .with_codec("bin", CodecKind::Binary);
        assert_eq!(registry.kind("c"), Some(ElementKind::Token));
        assert_eq!(registry.codec("bin"), Some(CodecKind::Binary));
        assert_eq!(registry.kind("java"), None);
    }
}
