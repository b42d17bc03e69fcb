pub mod element;
pub mod error;
pub mod job;
pub mod lcs;
pub mod patch;
pub mod registry;
pub mod serialization;

pub use element::{Element, ElementKind, Token};
pub use error::{PatchError, Result};
pub use lcs::diff;
pub use patch::{apply, Addition, Deletion, Patch};
pub use registry::Registry;
pub use serialization::{CodecKind, PatchInfo};
