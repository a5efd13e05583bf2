//! Export of online docx pages to Markdown and friends
//!
//!     This crate takes a snapshot of the editor's block tree and turns it into a Markdown
//!     abstract syntax tree (mdast), which the output formats then serialize (Markdown, HTML,
//!     JSON, a tree view, PDF).
//!
//!     TLDR: for readers of the code:
//!         - blocks/ is the typed view of the editor snapshot; nothing below it knows about JSON.
//!         - transform/ is the only place that looks at blocks. It produces an mdast [`mdast::Root`]
//!           plus the list of resources (images, whiteboards, attachments) still to be fetched.
//!         - resources/ resolves those requests through caller-supplied capabilities and writes
//!           the resulting URLs back into the tree.
//!         - formats/ never see blocks, only the mdast.
//!
//!     This is a pure lib: no code should suppose a shell environment (stdout, env vars, cwd).
//!     The one exception is the PDF format, which has to find a browser binary.
//!
//! Architecture
//!
//!     .
//!     ├── error.rs
//!     ├── blocks                  # editor block model + raw JSON snapshot
//!     ├── mdast                   # Markdown AST and its content model
//!     ├── transform               # blocks → mdast
//!     │   ├── inline.rs           # text operations → phrasing nodes
//!     │   ├── lists.rs            # sibling list items → lists
//!     │   └── headings.rs         # heading numbering
//!     ├── resources               # deferred images, whiteboards, attachments
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── formats
//!     │   └── <format>/mod.rs
//!     └── publish.rs              # serialize + write, asset files
//!
//! Testing
//!
//!     tests
//!     ├── lib.rs                  # wires the subdirectories below
//!     ├── common/                 # snapshot builders and fixtures loader
//!     ├── transform/
//!     ├── markdown/
//!     ├── html/
//!     ├── resources/
//!     └── fixtures/
//!
//! Core Algorithms
//!
//!     The editor has no list container and no nested inline marks: list items are siblings,
//!     and inline formatting is a flat run of attributed text operations. The transformer
//!     rebuilds both structures (see transform/lists.rs and transform/inline.rs). Everything
//!     that would require network access is deferred as a [`resources::PendingResource`], so
//!     the transform itself is synchronous and deterministic.
//!
//! Library Choices
//!
//!     We never write serializers: comrak writes Markdown, html5ever writes HTML, serde_json
//!     writes JSON. The work here is mapping the block tree onto those libraries' ASTs.

pub mod blocks;
pub mod error;
pub mod format;
pub mod formats;
pub mod mdast;
pub mod publish;
pub mod registry;
pub mod resources;
pub mod transform;

pub use blocks::{Block, BlockId, BlockKind};
pub use error::{FormatError, ResourceError};
pub use format::{Format, SerializedDocument};
pub use mdast::{Node, Root};
pub use publish::{publish, write_assets, PublishArtifact, PublishResult, PublishSpec};
pub use registry::FormatRegistry;
pub use resources::{apply_resolved, AssetPolicy, ResourceResolver};
pub use transform::{TransformOptions, TransformResult, Transformer};
