//! The update flows: check, install, download.
//!
//! This module ties the portal catalog, the installed-version probe, package
//! selection, download and the install step together, mirroring the original
//! updater's main path.

mod config;

pub use config::Config;

use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

use crate::archive::{ArchiveExtractor, TarGzExtractor};
use crate::download;
use crate::http::HttpClient;
use crate::installer;
use crate::pick::{Arch, DefaultPackagePicker, Host, PackagePicker, System};
use crate::pkgmgr::{self, InstallCommand, PackageFormat};
use crate::portal::{FetchPortal, find_version_index};
use crate::probe::{InstalledProbe, LibraryProbe};
use crate::runtime::Runtime;
use crate::version::JLinkVersion;

/// Options shared by the install and download flows.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Requested version name, or "latest"
    pub version: String,
    pub system: Option<System>,
    pub arch: Option<Arch>,
    pub format: Option<PackageFormat>,
    pub install_cmd: Option<InstallCommand>,
    pub force: bool,
    pub assume_yes: bool,
    /// Extraction prefix for tarball installs
    pub prefix: PathBuf,
    /// Download destination directory
    pub dir: Option<PathBuf>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            version: "latest".to_string(),
            system: None,
            arch: None,
            format: None,
            install_cmd: None,
            force: false,
            assume_yes: false,
            prefix: PathBuf::from("/opt"),
            dir: None,
        }
    }
}

/// Report produced by the check flow.
#[derive(Debug, Serialize, PartialEq)]
pub struct CheckReport {
    pub latest: String,
    pub latest_number: i32,
    pub installed: Option<String>,
    pub installed_number: Option<i32>,
    pub update_available: bool,
}

/// Check the portal for the latest version and compare with the installed one.
#[tracing::instrument(skip(portal_url))]
pub async fn check(portal_url: Option<String>, json: bool) -> Result<()> {
    let config = Config::new(portal_url)?;
    let host = Host::detect()?;
    let report = run_check(&config.portal, &LibraryProbe, host).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Check flow over injectable portal and probe.
#[tracing::instrument(skip(portal, probe))]
pub async fn run_check<P: FetchPortal, I: InstalledProbe>(
    portal: &P,
    probe: &I,
    host: Host,
) -> Result<CheckReport> {
    let page = portal.fetch().await?;
    let versions = page.versions()?;
    let latest = versions
        .first()
        .ok_or_else(|| anyhow!("The portal listed no versions"))?;

    let latest_version: JLinkVersion = latest
        .name
        .parse()
        .with_context(|| format!("Unexpected version name on portal: {:?}", latest.name))?;

    let installed = probe.installed_version(host.system);
    let update_available = installed.is_none_or(|current| current < latest_version);

    Ok(CheckReport {
        latest: latest.name.clone(),
        latest_number: latest_version.number(),
        installed: installed.map(|v| v.to_string()),
        installed_number: installed.map(|v| v.number()),
        update_available,
    })
}

fn print_report(report: &CheckReport) {
    println!("Latest Version: {} ({})", report.latest, report.latest_number);
    match (&report.installed, report.installed_number) {
        (Some(installed), Some(number)) => {
            println!("Installed version: {} ({})", installed, number)
        }
        _ => println!("Installed version: None"),
    }
    if report.update_available {
        println!("Update available.");
    } else {
        println!("Already on latest version.");
    }
}

/// Download and install the requested version.
#[tracing::instrument(skip(runtime, opts, portal_url))]
pub async fn install<R: Runtime + 'static>(
    runtime: R,
    opts: InstallOptions,
    portal_url: Option<String>,
) -> Result<()> {
    let config = Config::new(portal_url)?;
    run_install(
        &runtime,
        &config.portal,
        &LibraryProbe,
        &TarGzExtractor,
        &config.http_client,
        opts,
        false,
    )
    .await
}

/// Download only, without installing.
#[tracing::instrument(skip(runtime, opts, portal_url))]
pub async fn download<R: Runtime + 'static>(
    runtime: R,
    opts: InstallOptions,
    portal_url: Option<String>,
) -> Result<()> {
    let config = Config::new(portal_url)?;
    run_install(
        &runtime,
        &config.portal,
        &LibraryProbe,
        &TarGzExtractor,
        &config.http_client,
        opts,
        true,
    )
    .await
}

/// The full update flow over injectable collaborators.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip(runtime, portal, probe, extractor, http_client, opts))]
pub async fn run_install<R, P, I, E>(
    runtime: &R,
    portal: &P,
    probe: &I,
    extractor: &E,
    http_client: &HttpClient,
    opts: InstallOptions,
    download_only: bool,
) -> Result<()>
where
    R: Runtime + 'static,
    P: FetchPortal,
    I: InstalledProbe,
    E: ArchiveExtractor,
{
    let host = resolve_host(opts.system, opts.arch)?;
    info!("System: {}", host.system);
    info!("Architecture: {}", host.arch);

    let page = portal.fetch().await?;
    let versions = page.versions()?;
    if versions.is_empty() {
        return Err(anyhow!("The portal listed no versions"));
    }

    let wants_latest = opts.version.eq_ignore_ascii_case("latest");
    let index = if wants_latest {
        // The portal always lists the newest release at index 0
        "0"
    } else {
        find_version_index(&versions, &opts.version)
            .ok_or_else(|| anyhow!("Could not find J-Link version: {}", opts.version))?
    };
    let target_name = versions
        .iter()
        .find(|entry| entry.index == index)
        .map(|entry| entry.name.clone())
        .ok_or_else(|| anyhow!("The portal listed no version at index {}", index))?;

    let target_version: Option<JLinkVersion> = match target_name.parse() {
        Ok(version) => Some(version),
        Err(e) => {
            warn!(
                "Unexpected version name on portal ({}), skipping version comparison",
                e
            );
            None
        }
    };

    match target_version {
        Some(version) => println!("Target Version: {} ({})", target_name, version.number()),
        None => println!("Target Version: {}", target_name),
    }

    // Package format and install command only matter for the Linux flow
    let (format, install_cmd) = resolve_format(&host, opts.format, opts.install_cmd);
    if let Some(format) = format {
        info!("Package Type: {}", format);
    }
    if let Some(cmd) = &install_cmd {
        info!("Package Install Command: {}", cmd);
    }

    match probe.installed_version(host.system) {
        Some(current) => {
            println!("Installed version: {} ({})", current, current.number());
            if wants_latest
                && !opts.force
                && target_version.is_some_and(|target| current >= target)
            {
                println!("Already on latest version.");
                return Ok(());
            }
        }
        None => println!("Installed version: None"),
    }

    let catalog = page.packages(index)?;
    let picker = DefaultPackagePicker::new(host, format);
    let package = picker
        .pick(&catalog)
        .ok_or_else(|| anyhow!("No package found for this system."))?;
    info!("Selected package: {}", package.name);

    if !opts.assume_yes && !download_only {
        let prompt = format!("Download and install {} {}?", package.name, target_name);
        if !runtime.confirm(&prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let dest_dir = resolve_download_dir(runtime, opts.dir, download_only)?;
    let dest_path = dest_dir.join(package.file_name());
    let url = package.download_url(portal.base_url());

    download::download_package(runtime, &url, &dest_path, http_client).await?;

    if download_only {
        println!("Downloaded to {}", dest_path.display());
        return Ok(());
    }

    let method = installer::plan_install(&dest_path, install_cmd.as_ref(), &opts.prefix)?;
    installer::install_package(runtime, extractor, &dest_path, &method).await?;

    println!("Success");
    Ok(())
}

/// Host detection with CLI overrides applied.
fn resolve_host(system: Option<System>, arch: Option<Arch>) -> Result<Host> {
    let detected = Host::detect()?;
    Ok(Host {
        system: system.unwrap_or(detected.system),
        arch: arch.unwrap_or(detected.arch),
    })
}

/// Preferred package format and install command for the host.
fn resolve_format(
    host: &Host,
    format: Option<PackageFormat>,
    install_cmd: Option<InstallCommand>,
) -> (Option<PackageFormat>, Option<InstallCommand>) {
    if host.system != System::Linux {
        return (None, install_cmd);
    }

    match (format, install_cmd) {
        (Some(format), Some(cmd)) => (Some(format), Some(cmd)),
        (Some(format), None) => {
            // Format forced: only take the detected command when it matches
            let (detected_format, detected_cmd) = pkgmgr::detect();
            let cmd = (detected_format == format).then_some(detected_cmd).flatten();
            (Some(format), cmd)
        }
        (None, cmd_override) => {
            let (detected_format, detected_cmd) = pkgmgr::detect();
            (Some(detected_format), cmd_override.or(detected_cmd))
        }
    }
}

/// Where downloads land when no directory is given: the current directory for
/// plain downloads, the user cache for installs.
fn resolve_download_dir<R: Runtime>(
    runtime: &R,
    dir: Option<PathBuf>,
    download_only: bool,
) -> Result<PathBuf> {
    if let Some(dir) = dir {
        return Ok(dir);
    }
    if download_only {
        return runtime.current_dir();
    }
    match runtime.cache_dir() {
        Some(cache) => Ok(cache.join("jlink-update")),
        None => runtime.current_dir(),
    }
}
