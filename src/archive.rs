//! Archive extraction for tarball installs.
//!
//! The portal's Linux TGZ packages carry a single versioned top-level
//! directory (e.g. `JLink_Linux_V810g_x86_64/`), which is preserved under the
//! extraction root.

use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use log::debug;
use std::path::{Component, Path};
use tar::Archive;

use crate::runtime::Runtime;

/// Trait for format-specific archive extractors
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor: Send + Sync {
    /// Check if this extractor can handle the given archive format
    fn can_handle(&self, archive_path: &Path) -> bool;

    /// Extract the archive into the given directory
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()>;
}

/// Extractor for .tgz / .tar.gz archives
pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".tgz") || name.ends_with(".tar.gz")
    }

    #[tracing::instrument(skip(self, runtime, archive_path, extract_to))]
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()> {
        debug!("Extracting tarball to {:?}...", extract_to);

        let file = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);

        runtime.create_dir_all(extract_to)?;

        for entry in archive
            .entries()
            .context("Failed to read tarball entries")?
        {
            let mut entry = entry.context("Failed to read tarball entry")?;
            let entry_path = entry.path().context("Invalid entry path")?.into_owned();

            // Refuse entries that would escape the extraction root
            if entry_path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
            {
                return Err(anyhow!("Archive entry escapes extraction root: {:?}", entry_path));
            }

            let full_path = extract_to.join(&entry_path);

            if entry.header().entry_type().is_dir() {
                runtime.create_dir_all(&full_path)?;
                continue;
            }
            if !entry.header().entry_type().is_file() {
                debug!("Skipping special entry {:?}", entry_path);
                continue;
            }

            if let Some(parent) = full_path.parent() {
                runtime.create_dir_all(parent)?;
            }
            let mut dest_file = runtime.create_file(&full_path)?;
            std::io::copy(&mut entry, &mut dest_file)
                .with_context(|| format!("Failed to extract file {:?}", full_path))?;

            #[cfg(unix)]
            if let Ok(mode) = entry.header().mode()
                && let Err(e) = runtime.set_permissions(&full_path, mode)
            {
                debug!("Failed to set permissions on {:?}: {}", full_path, e);
            }
        }

        Ok(())
    }
}
