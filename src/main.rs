use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use jlink_update::pick::{Arch, System};
use jlink_update::pkgmgr::{InstallCommand, PackageFormat};
use jlink_update::update::{self, InstallOptions};

/// jlink-update - SEGGER J-Link software updater
///
/// Check SEGGER's download portal for new J-Link software releases, download
/// the right package for this machine and install it.
///
/// Examples:
///   jlink-update check                 # Compare installed and latest version
///   jlink-update install               # Update to the latest release
///   jlink-update install --version V8.10g
#[derive(Parser, Debug)]
#[command(author, version = env!("JLINK_UPDATE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Download portal URL (defaults to https://www.segger.com/downloads/jlink/)
    #[arg(
        long = "portal-url",
        env = "JLINK_UPDATE_PORTAL_URL",
        value_name = "URL",
        global = true
    )]
    pub portal_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Report the installed and the latest published version
    Check(CheckArgs),

    /// Download and install a J-Link release
    Install(InstallArgs),

    /// Download a J-Link package without installing it
    Download(DownloadArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Emit a machine-readable JSON report
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct SelectArgs {
    /// Which version of J-Link to use. Takes a version string such as
    /// "V8.10g". Default: latest
    #[arg(long, default_value = "latest", value_name = "VERSION")]
    pub version: String,

    /// Host OS - 'auto' to autodetect
    #[arg(long, default_value = "auto")]
    #[arg(value_parser = ["auto", "linux", "macos", "windows"])]
    pub system: String,

    /// Host architecture - 'auto' to autodetect
    #[arg(long, default_value = "auto")]
    #[arg(value_parser = ["auto", "x86_64", "i386", "arm", "arm64"])]
    pub arch: String,

    /// Package format to download - 'auto' to autodetect
    #[arg(long, default_value = "auto")]
    #[arg(value_parser = ["auto", "deb", "rpm", "tgz"])]
    pub format: String,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Package manager invocation to install with - 'auto' to autodetect
    #[arg(long = "install-cmd", default_value = "auto", value_name = "CMD")]
    pub install_cmd: String,

    /// Proceed even if the installed version is current
    #[arg(long)]
    pub force: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Extraction prefix for tarball installs
    #[arg(long, default_value = "/opt", value_name = "DIR")]
    pub prefix: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Directory to download into (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Map "auto" to None, anything else through FromStr.
fn auto_or_parse<T: std::str::FromStr<Err = anyhow::Error>>(value: &str) -> Result<Option<T>> {
    if value == "auto" {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

impl SelectArgs {
    fn into_options(self) -> Result<InstallOptions> {
        Ok(InstallOptions {
            version: self.version,
            system: auto_or_parse::<System>(&self.system)?,
            arch: auto_or_parse::<Arch>(&self.arch)?,
            format: auto_or_parse::<PackageFormat>(&self.format)?,
            ..Default::default()
        })
    }
}

impl InstallArgs {
    fn into_options(self) -> Result<InstallOptions> {
        let install_cmd = if self.install_cmd == "auto" {
            None
        } else {
            Some(InstallCommand::parse(&self.install_cmd)?)
        };

        Ok(InstallOptions {
            install_cmd,
            force: self.force,
            assume_yes: self.yes,
            prefix: self.prefix,
            ..self.select.into_options()?
        })
    }
}

impl DownloadArgs {
    fn into_options(self) -> Result<InstallOptions> {
        Ok(InstallOptions {
            dir: self.dir,
            ..self.select.into_options()?
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = jlink_update::runtime::RealRuntime;

    match cli.command {
        Commands::Check(args) => update::check(cli.portal_url, args.json).await?,
        Commands::Install(args) => {
            update::install(runtime, args.into_options()?, cli.portal_url).await?
        }
        Commands::Download(args) => {
            update::download(runtime, args.into_options()?, cli.portal_url).await?
        }
    }
    Ok(())
}
