//! Subprocess execution.

use anyhow::{Context, Result};
use log::info;
use std::process::ExitStatus;
use tokio::process::Command;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) async fn run_command_impl(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<ExitStatus> {
        info!("Executing {} {}", program, args.join(" "));

        Command::new(program)
            .args(args)
            .status()
            .await
            .with_context(|| format!("Failed to execute {}", program))
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_success() {
        let runtime = RealRuntime;
        let status = runtime.run_command("true", &[]).await.unwrap();
        assert!(status.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_failure_status() {
        let runtime = RealRuntime;
        let status = runtime.run_command("false", &[]).await.unwrap();
        assert!(!status.success());
        assert_eq!(status.code(), Some(1));
    }

    #[tokio::test]
    async fn test_run_command_missing_program() {
        let runtime = RealRuntime;
        let result = runtime
            .run_command("definitely-not-a-real-program-12345", &[])
            .await;
        assert!(result.is_err());
    }
}
