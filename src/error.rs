use std::path::PathBuf;
use thiserror::Error;

/// Failures that decide the process exit code.
///
/// Everything else travels as a plain `anyhow::Error` and ends up as a
/// launch/protocol failure.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    ReservedArgument(String),

    #[error("Jar not found: {}", .0.display())]
    JarNotFound(PathBuf),

    #[error("No jar found in directory: {}", .0.display())]
    NoJarInDirectory(PathBuf),

    #[error("Multiple jars found in {}, pass one explicitly with --jar:\n{}", .dir.display(), format_candidates(.candidates))]
    AmbiguousJar {
        dir: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error(
        "Unsupported jar: {}\n\n  The jar must be a Spring Boot executable jar, or an uber jar bundling Flamingock ({entry_point})",
        .path.display()
    )]
    UnsupportedJar {
        path: PathBuf,
        entry_point: &'static str,
    },

    #[error("Invalid jar {}: {reason}", .path.display())]
    InvalidJar { path: PathBuf, reason: String },

    #[error("Failed to start java ({java})")]
    JavaLaunch {
        java: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Application exited with code {exit_code} without writing a response{}", format_stderr(.stderr_tail))]
    ProcessFailed {
        exit_code: i32,
        stderr_tail: Option<String>,
    },

    #[error("Application exited successfully but no response was written to {}", .0.display())]
    MissingResponse(PathBuf),

    #[error("Malformed response in {}", .path.display())]
    MalformedResponse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub const EXIT_OK: i32 = 0;
pub const EXIT_OPERATION_FAILED: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_LAUNCH: i32 = 3;

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ReservedArgument(_)
            | CliError::JarNotFound(_)
            | CliError::NoJarInDirectory(_)
            | CliError::AmbiguousJar { .. }
            | CliError::InvalidJar { .. }
            | CliError::UnsupportedJar { .. } => EXIT_USAGE,
            CliError::ProcessFailed { .. } => EXIT_OPERATION_FAILED,
            CliError::JavaLaunch { .. }
            | CliError::MissingResponse(_)
            | CliError::MalformedResponse { .. } => EXIT_LAUNCH,
        }
    }
}

/// Walks the error chain looking for a [`CliError`]; defaults to a launch failure.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|e| e.downcast_ref::<CliError>())
        .map(CliError::exit_code)
        .unwrap_or(EXIT_LAUNCH)
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_stderr(tail: &Option<String>) -> String {
    match tail {
        Some(t) if !t.trim().is_empty() => format!(":\n{}", t.trim_end()),
        _ => String::new(),
    }
}
