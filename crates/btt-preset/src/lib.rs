//! BTT Preset
//!
//! Patches BetterTouchTool preset archives.
//!
//! # Core Concepts
//!
//! - [`PresetArchive`]: the `.bttpreset` zip and its `presetjson.bttpreset` document
//! - [`PatchProfile`]: triggers and apps to drop, apps to clone
//! - [`Patcher`]: the single pass that deletes, clones and grafts activation group conditions
//!
//! # Example
//!
//! ```rust,ignore
//! use btt_preset::{PatchProfile, Patcher, PresetArchive};
//!
//! let archive = PresetArchive::open("AquaTouch.bttpreset")?;
//! let mut document = archive.read_document()?;
//! let summary = Patcher::new(PatchProfile::default()).patch(&mut document)?;
//! std::fs::write("AquaTouch_new.bttpreset", archive.write_patched(&document)?)?;
//! ```

#![warn(unreachable_pub)]

pub mod archive;
pub mod clone;
pub mod document;
pub mod error;
pub mod orchestrator;
pub mod profile;

pub use archive::{output_path, patch_file, PatchOutcome, PresetArchive, PRESET_JSON_ENTRY};
pub use btt_graph::AppIdentity;
pub use clone::{clone_entry, fresh_uuid};
pub use document::{AppEntry, PresetDocument};
pub use error::{ArchiveError, CloneError, DocumentError, PatchError, PresetError, ProfileError};
pub use orchestrator::{PatchSummary, Patcher};
pub use profile::{CloneRule, PatchProfile};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
