//! Preset archive I/O
//!
//! A `.bttpreset` file is a zip holding the configuration document plus
//! arbitrary payload (icons, scripts). Only the document is rewritten; every
//! other entry is copied without recompression.

use crate::document::PresetDocument;
use crate::error::{ArchiveError, PresetError};
use crate::orchestrator::{PatchSummary, Patcher};
use crate::profile::PatchProfile;
use std::ffi::OsString;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Archive entry holding the configuration document
pub const PRESET_JSON_ENTRY: &str = "presetjson.bttpreset";

/// Preset archive held in memory
#[derive(Debug, Clone)]
pub struct PresetArchive {
    bytes: Vec<u8>,
}

impl PresetArchive {
    /// Read an archive from disk
    ///
    /// # Errors
    /// Returns [`ArchiveError::Io`] when the file cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ArchiveError::io_error(path, e))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Wrap archive bytes
    #[inline]
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Raw archive bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parse the configuration document
    ///
    /// # Errors
    /// - [`ArchiveError::Zip`] when the bytes are not a zip archive
    /// - [`ArchiveError::MissingEntry`] when the document entry is absent
    /// - [`ArchiveError::Document`] when the entry is not valid JSON
    pub fn read_document(&self) -> Result<PresetDocument, ArchiveError> {
        let mut archive = self.open_zip()?;
        let mut entry = match archive.by_name(PRESET_JSON_ENTRY) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(ArchiveError::MissingEntry(PRESET_JSON_ENTRY)),
            Err(e) => return Err(e.into()),
        };
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(PresetDocument::from_slice(&bytes)?)
    }

    /// Build a new archive with `document` in place of the configuration entry
    ///
    /// Entry order is kept. The document keeps its compression method when
    /// stored, otherwise it is deflated.
    ///
    /// # Errors
    /// Returns [`ArchiveError`] on zip or serialization failure.
    pub fn write_patched(&self, document: &PresetDocument) -> Result<Vec<u8>, ArchiveError> {
        let json = document.to_vec()?;
        let mut archive = self.open_zip()?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index)?;
            if entry.name() == PRESET_JSON_ENTRY {
                let method = match entry.compression() {
                    CompressionMethod::Stored => CompressionMethod::Stored,
                    _ => CompressionMethod::Deflated,
                };
                writer.start_file(PRESET_JSON_ENTRY, SimpleFileOptions::default().compression_method(method))?;
                writer.write_all(&json)?;
            } else {
                tracing::debug!("Copying {}", entry.name());
                writer.raw_copy_file(entry)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    fn open_zip(&self) -> Result<ZipArchive<Cursor<&[u8]>>, ArchiveError> {
        Ok(ZipArchive::new(Cursor::new(self.bytes.as_slice()))?)
    }
}

/// `<stem>_new<.ext>` next to `input`
#[must_use]
pub fn output_path(input: &Path) -> PathBuf {
    let mut name = input.file_stem().map(OsString::from).unwrap_or_default();
    name.push("_new");
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

/// Result of [`patch_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Where the patched archive was written
    pub output: PathBuf,
    /// Patch counts
    pub summary: PatchSummary,
}

/// Patch the preset at `input` and write `<stem>_new<.ext>` next to it
///
/// Nothing is written unless every step succeeded.
///
/// # Errors
/// Returns [`PresetError`] from reading, patching or writing.
pub fn patch_file(input: &Path, profile: PatchProfile) -> Result<PatchOutcome, PresetError> {
    let archive = PresetArchive::open(input)?;
    let mut document = archive.read_document()?;
    let summary = Patcher::new(profile).patch(&mut document)?;
    let bytes = archive.write_patched(&document)?;

    let output = output_path(input);
    std::fs::write(&output, bytes).map_err(|e| ArchiveError::io_error(&output, e))?;
    tracing::info!("Wrote {}", output.display());

    Ok(PatchOutcome { output, summary })
}
