use settlement_rollback::{TreeStorage, TreeStorageError};
use std::path::PathBuf;
use tokio::process::Command;

/// A [`TreeStorage`] rolled back by an operator provided command, invoked with its arguments
/// followed by the target height.
#[derive(Debug, Clone)]
pub struct ExternalCommandTree {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalCommandTree {
    /// Returns a new [`ExternalCommandTree`].
    pub const fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

#[async_trait::async_trait]
impl TreeStorage for ExternalCommandTree {
    async fn rollback_to(&self, height: u64) -> Result<(), TreeStorageError> {
        tracing::info!(
            target: "settlement::node",
            program = %self.program.display(),
            height,
            "running tree rollback command"
        );
        let output =
            Command::new(&self.program).args(&self.args).arg(height.to_string()).output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TreeStorageError::Failed {
                height,
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}
