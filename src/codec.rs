use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("failed to launch codec '{tool}': {source}")]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("codec exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Boundary to the black-box binary<->intermediate converter. Both calls
/// block until the subprocess exits; no timeout is enforced here.
pub trait ScriptCodec {
    fn decode(&self, version: &str, input: &Path, output: &Path) -> Result<(), CodecError>;
    fn encode(&self, version: &str, input: &Path, output: &Path) -> Result<(), CodecError>;
}

/// The real external tool, invoked as `tool -d|-c <version> <input> <output>`.
#[derive(Debug, Clone)]
pub struct ExternalCodec {
    tool: PathBuf,
}

impl ExternalCodec {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    fn run(&self, flag: &str, version: &str, input: &Path, output: &Path) -> Result<(), CodecError> {
        debug!(tool = %self.tool.display(), flag, version, "invoking codec");
        let out = Command::new(&self.tool)
            .arg(flag)
            .arg(version)
            .arg(input)
            .arg(output)
            .output()
            .map_err(|source| CodecError::Spawn {
                tool: self.tool.clone(),
                source,
            })?;
        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        if !out.status.success() {
            return Err(CodecError::Failed {
                status: out.status,
                stderr,
            });
        }
        // Some codec builds report non-fatal problems on stderr with a zero
        // exit; surface them rather than swallowing.
        if !stderr.is_empty() {
            warn!(%stderr, "codec reported diagnostics on success");
        }
        Ok(())
    }
}

impl ScriptCodec for ExternalCodec {
    fn decode(&self, version: &str, input: &Path, output: &Path) -> Result<(), CodecError> {
        self.run("-d", version, input, output)
    }

    fn encode(&self, version: &str, input: &Path, output: &Path) -> Result<(), CodecError> {
        self.run("-c", version, input, output)
    }
}
