use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::error::CliError;
use crate::jar::{JarType, detect_jar_type, resolve_jar_path};
use crate::launcher::JvmLauncher;
use crate::operation::Operation;
use crate::options::ExecutionOptions;
use crate::response::{ResponseEnvelope, read_response};

const STDERR_TAIL_LINES: usize = 20;

static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub jar: PathBuf,
    pub operation: Operation,
    pub options: ExecutionOptions,
}

#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub jar_path: PathBuf,
    pub jar_type: JarType,
    pub exit_code: i32,
    pub response: ResponseEnvelope,
    /// Application stdout, present only when streaming was off.
    pub captured_output: Option<String>,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        self.response.success && self.exit_code == 0
    }
}

/// Runs one operation against the target application, start to finish.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    launcher: JvmLauncher,
    work_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(launcher: JvmLauncher, work_dir: PathBuf) -> Self {
        Self { launcher, work_dir }
    }

    pub fn run(&self, request: &ExecutionRequest) -> Result<ExecutionOutcome> {
        let jar_path = resolve_jar_path(&request.jar)?;
        let jar_type = detect_jar_type(&jar_path)?;
        info!(jar = %jar_path.display(), %jar_type, operation = %request.operation, "running operation");

        let output = ResponseFile::allocate(&self.work_dir)?;
        let jar_arg = jar_path
            .to_str()
            .context("jar path is not valid UTF-8")?
            .to_string();
        let command = self.launcher.build_command(
            &jar_arg,
            Some(request.operation),
            Some(output.path()),
            jar_type,
            &request.options,
        );

        let launched = self.launcher.launch(&command, request.options.stream_output())?;
        debug!(exit_code = launched.exit_code, "application finished");

        let response = match read_response(output.path())? {
            Some(response) => response,
            None if launched.success() => {
                return Err(CliError::MissingResponse(output.path().to_path_buf()).into());
            }
            None => {
                return Err(CliError::ProcessFailed {
                    exit_code: launched.exit_code,
                    stderr_tail: launched.stderr.as_deref().map(tail_lines),
                }
                .into());
            }
        };

        if response.operation.is_some_and(|op| op != request.operation) {
            warn!(
                expected = %request.operation,
                reported = ?response.operation,
                "application reported a different operation"
            );
        }

        Ok(ExecutionOutcome {
            jar_path,
            jar_type,
            exit_code: launched.exit_code,
            response,
            captured_output: launched.stdout,
        })
    }
}

fn tail_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Unique response file path, removed on drop whether or not the run succeeded.
struct ResponseFile {
    path: PathBuf,
}

impl ResponseFile {
    fn allocate(work_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(work_dir)
            .with_context(|| format!("Failed to create work directory: {}", work_dir.display()))?;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let seq = RUN_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = work_dir.join(format!("flamingock-{}-{nanos}-{seq}.json", std::process::id()));
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ResponseFile {
    fn drop(&mut self) {
        if self.path.exists()
            && let Err(e) = std::fs::remove_file(&self.path)
        {
            warn!(path = %self.path.display(), error = %e, "failed to remove response file");
        }
    }
}
