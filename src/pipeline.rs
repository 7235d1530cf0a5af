use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::asm;
use crate::codec::{CodecError, ScriptCodec};
use crate::disasm::{self, DisasmOptions};
use crate::reference::ReferenceTable;
use crate::resolver::{self, ResolveError};
use crate::stream::{self, Warning};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct UnpackOptions {
    pub version: String,
    /// Emit `// description` documentation lines.
    pub verbose: bool,
    /// Keep the decoded intermediate stream next to the output for debugging.
    pub keep_intermediate: bool,
}

impl UnpackOptions {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            verbose: true,
            keep_intermediate: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackOptions {
    pub version: String,
    /// Keep the recovered intermediate stream next to the output for debugging.
    pub keep_intermediate: bool,
}

impl PackOptions {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            keep_intermediate: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub output: PathBuf,
    pub warnings: Vec<Warning>,
}

/// Sequences the two directions: decode -> disassemble (unpack) and
/// resolve -> assemble -> encode (pack). One full operation per call,
/// synchronous throughout; the first failing stage aborts the operation.
pub struct Pipeline<'a, C: ScriptCodec> {
    codec: &'a C,
    table: &'a ReferenceTable,
}

impl<'a, C: ScriptCodec> Pipeline<'a, C> {
    pub fn new(codec: &'a C, table: &'a ReferenceTable) -> Self {
        Self { codec, table }
    }

    /// Compiled script -> readable text.
    pub fn unpack(
        &self,
        input: &Path,
        output: &Path,
        opts: &UnpackOptions,
    ) -> Result<Report, PipelineError> {
        ensure_parent(output)?;
        // Temp dir is removed on drop, on the error paths too.
        let tmp = tempfile::tempdir()?;
        let decoded = tmp.path().join("decoded.stream");

        self.codec.decode(&opts.version, input, &decoded)?;
        let text = fs::read_to_string(&decoded)?;
        if opts.keep_intermediate {
            fs::copy(&decoded, output.with_extension("stream"))?;
        }

        debug!(input = %input.display(), "translating decoded stream");
        let (records, warnings) = stream::parse(&text);
        let readable = disasm::disassemble(
            &records,
            self.table,
            &DisasmOptions {
                verbose: opts.verbose,
            },
        );
        fs::write(output, readable)?;
        Ok(Report {
            output: output.to_path_buf(),
            warnings,
        })
    }

    /// Readable text -> compiled script.
    pub fn pack(
        &self,
        input: &Path,
        output: &Path,
        opts: &PackOptions,
    ) -> Result<Report, PipelineError> {
        ensure_parent(output)?;
        let text = fs::read_to_string(input)?;

        debug!(input = %input.display(), "resolving labels");
        let resolved = resolver::resolve(&text)?;
        let assembled = asm::assemble(&resolved, self.table);
        let stream_text = stream::serialize(&assembled.records);

        let tmp = tempfile::tempdir()?;
        let recovered = tmp.path().join("recovered.stream");
        fs::write(&recovered, &stream_text)?;
        if opts.keep_intermediate {
            fs::copy(&recovered, output.with_extension("stream"))?;
        }

        self.codec.encode(&opts.version, &recovered, output)?;
        Ok(Report {
            output: output.to_path_buf(),
            warnings: assembled.warnings,
        })
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
