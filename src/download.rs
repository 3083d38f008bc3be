//! Package download orchestration with progress reporting.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::io::Write;
use std::path::Path;

use crate::http::HttpClient;
use crate::runtime::Runtime;

/// Downloads a package from the portal to the given destination, drawing a
/// progress bar sized from the server's Content-Length.
#[tracing::instrument(skip(runtime, http_client))]
pub async fn download_package<R: Runtime>(
    runtime: &R,
    url: &str,
    dest_path: &Path,
    http_client: &HttpClient,
) -> Result<u64> {
    info!("Downloading {}...", url);

    if let Some(parent) = dest_path.parent()
        && !parent.as_os_str().is_empty()
    {
        runtime
            .create_dir_all(parent)
            .with_context(|| format!("Failed to create download directory {:?}", parent))?;
    }

    let dest_path_buf = dest_path.to_path_buf();
    let bytes = http_client
        .download_package(url, |content_length| {
            let writer = runtime
                .create_file(&dest_path_buf)
                .with_context(|| format!("Failed to create file at {:?}", dest_path_buf))?;
            Ok(ProgressWriter::new(writer, content_length))
        })
        .await?;

    info!("Download complete ({} bytes).", bytes);
    Ok(bytes)
}

/// Writer adapter advancing a progress bar as bytes stream through, keeping
/// the HTTP layer progress-agnostic.
struct ProgressWriter<W: Write> {
    inner: W,
    bar: ProgressBar,
}

impl<W: Write> ProgressWriter<W> {
    fn new(inner: W, content_length: Option<u64>) -> Self {
        let bar = ProgressBar::new(content_length.unwrap_or(0));
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
        ) {
            bar.set_style(style);
        }
        Self { inner, bar }
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bar.inc(written as u64);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Drop for ProgressWriter<W> {
    fn drop(&mut self) {
        self.bar.finish();
    }
}
