//! BTT Graph
//!
//! Structural rewriting for BetterTouchTool presets.
//!
//! # Core Concepts
//!
//! - [`walk`]: visit every leaf of a nested mapping/sequence tree and rewrite it in place
//! - [`ObjectGraph`]: the flat `$objects` table of an `NSKeyedArchiver` archive
//! - [`ConditionCodec`]: base64 + binary plist encoding of activation group conditions
//! - [`locate`]: find the predicate subgraph that matches one application
//! - [`graft`]: duplicate that subgraph for other applications and splice it into the root list
//!
//! # Example
//!
//! ```rust,ignore
//! use btt_graph::{graft, locate, AppIdentity, ConditionCodec, KeyedArchiveCodec};
//!
//! let codec = KeyedArchiveCodec;
//! let mut graph = codec.decode(condition)?;
//! let source = AppIdentity::new("com.microsoft.VSCode", "Visual Studio Code");
//! let range = locate(&graph, &source)?;
//! graft(&mut graph, range, &source, &targets)?;
//! let patched = codec.encode(&graph)?;
//! ```

#![warn(unreachable_pub)]

pub mod codec;
pub mod error;
pub mod graft;
pub mod graph;
pub mod identity;
pub mod locate;
pub mod walk;

pub use codec::{ConditionCodec, KeyedArchiveCodec};
pub use error::{CodecError, GraftError};
pub use graft::{graft, renumber, GraftReport};
pub use graph::{direct_references, max_direct_reference, ObjectGraph, NS_OBJECTS_KEY, OBJECTS_KEY};
pub use identity::AppIdentity;
pub use locate::{locate, MarkerKind, PredicateRange};
pub use walk::{walk, walk_with, Children, NodeKind, Rewrite, TreeNode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
