//! The install step: hand a downloaded package to the system.

use anyhow::{Context, Result, anyhow};
use log::info;
use std::path::{Path, PathBuf};

use crate::archive::ArchiveExtractor;
use crate::pkgmgr::InstallCommand;
use crate::runtime::Runtime;

/// How a downloaded package gets installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMethod {
    /// Linux deb/rpm: run the system package manager
    PackageManager(InstallCommand),
    /// macOS pkg: run the system installer
    MacInstaller,
    /// Windows exe: run the downloaded installer itself
    WindowsInstaller,
    /// Plain tarball: extract under `<prefix>/SEGGER`
    Extract { prefix: PathBuf },
}

/// Decide the install method from the downloaded file's extension.
///
/// The extension decides, not the preferred format: the picker may fall back
/// to a tarball when the preferred installer is not published.
pub fn plan_install(
    package_file: &Path,
    command: Option<&InstallCommand>,
    prefix: &Path,
) -> Result<InstallMethod> {
    let extension = package_file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "deb" | "rpm" => {
            let command = command.ok_or_else(|| {
                anyhow!(
                    "No package manager available to install {:?}",
                    package_file
                )
            })?;
            Ok(InstallMethod::PackageManager(command.clone()))
        }
        "tgz" => Ok(InstallMethod::Extract {
            prefix: prefix.to_path_buf(),
        }),
        "pkg" => Ok(InstallMethod::MacInstaller),
        "exe" => Ok(InstallMethod::WindowsInstaller),
        other => Err(anyhow!(
            "Don't know how to install a {:?} package: {:?}",
            other,
            package_file
        )),
    }
}

/// Execute the install step for a downloaded package.
#[tracing::instrument(skip(runtime, extractor, package_path, method))]
pub async fn install_package<R: Runtime + 'static, E: ArchiveExtractor>(
    runtime: &R,
    extractor: &E,
    package_path: &Path,
    method: &InstallMethod,
) -> Result<()> {
    match method {
        InstallMethod::PackageManager(command) => {
            let package = runtime
                .canonicalize(package_path)
                .with_context(|| format!("Failed to resolve package path {:?}", package_path))?;

            let mut args = command.args.clone();
            args.push(package.to_string_lossy().into_owned());
            run_elevated(runtime, &command.program, args).await
        }
        InstallMethod::MacInstaller => {
            let package = runtime
                .canonicalize(package_path)
                .with_context(|| format!("Failed to resolve package path {:?}", package_path))?;

            let args = vec![
                "-target".to_string(),
                "/".to_string(),
                "-pkg".to_string(),
                package.to_string_lossy().into_owned(),
            ];
            run_elevated(runtime, "installer", args).await
        }
        InstallMethod::WindowsInstaller => {
            let package = runtime
                .canonicalize(package_path)
                .with_context(|| format!("Failed to resolve package path {:?}", package_path))?;

            let status = runtime
                .run_command(&package.to_string_lossy(), &[])
                .await?;
            if !status.success() {
                return Err(anyhow!("Installer exited with status {}", status));
            }
            Ok(())
        }
        InstallMethod::Extract { prefix } => {
            if !extractor.can_handle(package_path) {
                return Err(anyhow!(
                    "Unsupported archive format: {}",
                    package_path.display()
                ));
            }
            let target = prefix.join("SEGGER");
            info!("Extracting {:?} to {:?}...", package_path, target);
            extractor.extract(runtime, package_path, &target)
        }
    }
}

/// Run a command, prefixed with sudo when the process lacks privileges.
async fn run_elevated<R: Runtime>(runtime: &R, program: &str, args: Vec<String>) -> Result<()> {
    let (program, args) = if runtime.is_privileged() {
        (program.to_string(), args)
    } else {
        let mut sudo_args = vec![program.to_string()];
        sudo_args.extend(args);
        ("sudo".to_string(), sudo_args)
    };

    let status = runtime.run_command(&program, &args).await?;
    if !status.success() {
        return Err(anyhow!(
            "{} exited with status {}",
            program,
            status
        ));
    }
    Ok(())
}
