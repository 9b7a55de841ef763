//! Sandbox abstraction and a local-directory implementation.
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    Finished { stdout: String },
    Spawned { pid: Option<u32> },
}

/// Remote filesystem plus shell, the surface the deploy steps need.
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn write_file(&self, path: &str, contents: &[u8]) -> AppResult<()>;

    /// `Ok(None)` when the file does not exist yet.
    async fn read_file(&self, path: &str) -> AppResult<Option<Vec<u8>>>;

    /// Run `command` through the shell. Background commands return once spawned.
    async fn exec(&self, command: &str, env: &[(String, String)], background: bool) -> AppResult<ExecOutcome>;
}

pub struct DirSandbox {
    root: PathBuf,
}

impl DirSandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSandbox { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let rel = Path::new(path);
        if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(AppError::Deploy(format!("Refusing path outside sandbox: {}", path)));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl Sandbox for DirSandbox {
    async fn write_file(&self, path: &str, contents: &[u8]) -> AppResult<()> {
        let dst = self.resolve(path)?;
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&dst, contents).await?;
        Ok(())
    }

    async fn read_file(&self, path: &str) -> AppResult<Option<Vec<u8>>> {
        let src = self.resolve(path)?;
        match fs::read(&src).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn exec(&self, command: &str, env: &[(String, String)], background: bool) -> AppResult<ExecOutcome> {
        fs::create_dir_all(&self.root).await?;
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).current_dir(&self.root);
        for (k, v) in env {
            cmd.env(k, v);
        }

        if background {
            let child = cmd
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()?;
            return Ok(ExecOutcome::Spawned { pid: child.id() });
        }

        let output = cmd.output().await?;
        if output.status.success() {
            Ok(ExecOutcome::Finished { stdout: String::from_utf8_lossy(&output.stdout).into_owned() })
        } else {
            Err(AppError::Deploy(format!(
                "'{}' exited with {}: {}",
                command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
