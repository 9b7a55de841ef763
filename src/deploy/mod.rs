//! Upload, install and start the service inside a sandbox.
//!
//! Each step stands alone and can be rerun after a failure: upload skips files
//! whose sandbox copy already matches, install and start just run their command.
pub mod plan;
pub mod sandbox;

use std::path::PathBuf;

use crate::error::AppResult;
pub use plan::{UploadEntry, UploadPlan};
pub use sandbox::{DirSandbox, ExecOutcome, Sandbox};

pub const DEFAULT_INSTALL_CMD: &str = "cargo build --release";
pub const DEFAULT_START_CMD: &str = "cargo run --release --bin data-agent-service";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Step {
    Upload,
    Install,
    Start,
    All,
}

impl Step {
    pub fn expand(self) -> Vec<Step> {
        match self {
            Step::All => vec![Step::Upload, Step::Install, Step::Start],
            other => vec![other],
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub source: PathBuf,
    pub install_cmd: String,
    pub start_cmd: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub written: usize,
    pub unchanged: usize,
}

pub async fn upload(sandbox: &dyn Sandbox, plan: &UploadPlan) -> AppResult<UploadReport> {
    let mut report = UploadReport::default();
    for entry in &plan.files {
        let contents = tokio::fs::read(&entry.local).await?;
        if sandbox.read_file(&entry.remote).await?.as_deref() == Some(contents.as_slice()) {
            report.unchanged += 1;
            continue;
        }
        sandbox.write_file(&entry.remote, &contents).await?;
        tracing::info!("Wrote {}", entry.remote);
        report.written += 1;
    }
    Ok(report)
}

pub async fn install(sandbox: &dyn Sandbox, command: &str) -> AppResult<()> {
    tracing::info!("Installing with '{}'", command);
    sandbox.exec(command, &[], false).await?;
    Ok(())
}

pub async fn start(sandbox: &dyn Sandbox, command: &str, port: u16) -> AppResult<ExecOutcome> {
    tracing::info!("Starting with '{}' on port {}", command, port);
    let env = vec![("PORT".to_string(), port.to_string())];
    sandbox.exec(command, &env, true).await
}

pub async fn run(sandbox: &dyn Sandbox, options: &DeployOptions, step: Step) -> AppResult<()> {
    for s in step.expand() {
        match s {
            Step::Upload => {
                let plan = UploadPlan::collect(&options.source)?;
                let report = upload(sandbox, &plan).await?;
                tracing::info!("Upload done: {} written, {} unchanged", report.written, report.unchanged);
            }
            Step::Install => install(sandbox, &options.install_cmd).await?,
            Step::Start => {
                let outcome = start(sandbox, &options.start_cmd, options.port).await?;
                tracing::info!("Start: {:?}", outcome);
            }
            Step::All => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn upload_is_idempotent() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("freestyle")).unwrap();
        fs::write(src.path().join("freestyle/data_ui_agent.yaml"), "prompt: x").unwrap();
        fs::write(src.path().join("Cargo.toml"), "[package]").unwrap();

        let sandbox = DirSandbox::new(dst.path());
        let plan = UploadPlan::collect(src.path()).unwrap();
        let first = upload(&sandbox, &plan).await.unwrap();
        assert_eq!(first, UploadReport { written: 2, unchanged: 0 });

        fs::write(src.path().join("Cargo.toml"), "[package]\nname = \"x\"").unwrap();
        let second = upload(&sandbox, &plan).await.unwrap();
        assert_eq!(second, UploadReport { written: 1, unchanged: 1 });
        assert_eq!(
            fs::read_to_string(dst.path().join("Cargo.toml")).unwrap(),
            "[package]\nname = \"x\""
        );
    }

    #[tokio::test]
    async fn run_all_steps_in_order() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::write(src.path().join("app.txt"), "v1").unwrap();
        let options = DeployOptions {
            source: src.path().to_path_buf(),
            install_cmd: "cat app.txt > installed.txt".into(),
            start_cmd: "echo $PORT > port.txt".into(),
            port: 4123,
        };
        let sandbox = DirSandbox::new(dst.path());
        run(&sandbox, &options, Step::All).await.unwrap();

        assert_eq!(fs::read_to_string(dst.path().join("installed.txt")).unwrap(), "v1");
        // start is detached
        let mut port = String::new();
        for _ in 0..100 {
            port = fs::read_to_string(dst.path().join("port.txt")).unwrap_or_default();
            if !port.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(port.trim(), "4123");
    }

    #[test]
    fn all_expands_to_three_steps() {
        assert_eq!(Step::All.expand(), vec![Step::Upload, Step::Install, Step::Start]);
        assert_eq!(Step::Install.expand(), vec![Step::Install]);
    }
}
