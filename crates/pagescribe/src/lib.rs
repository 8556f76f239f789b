//! Pagescribe: heuristic page snapshots and form replay.
//!
//! Extraction turns whatever a rendered document currently shows into a
//! compact [`StructuredRecord`]; apply writes such a record back into the
//! document's interactive controls. Both passes run over the [`Document`]
//! trait, so the engine works the same against a live DOM bridge or the
//! bundled [`MemoryDocument`].

pub mod apply;
pub mod assemble;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod record;
pub mod refresh;
pub mod text;
pub mod visibility;

pub use apply::{apply_text, apply_value, ApplyReport, ApplyStatus};
pub use config::{ApplyConfig, Config, ExtractConfig};
pub use dom::memory::{Mutation, MutationKind, MemoryDocument};
pub use dom::{Document, DocumentExt, DocumentMut, NodeId, Signal};
pub use error::{ApplyError, ConfigError, DocumentError};
pub use extract::Extractor;
pub use record::*;
pub use refresh::{MutationOrigin, RefreshScheduler};
pub use text::normalize;
pub use visibility::is_perceivable;
