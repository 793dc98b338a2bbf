use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

pub const JAVA_HOME_ENV: &str = "JAVA_HOME";
pub const LOG_FILTER_ENV: &str = "FLAMINGOCK_LOG";

/// Picks the java binary: `--java` / `FLAMINGOCK_JAVA`, then `$JAVA_HOME/bin/java`,
/// then whatever `java` resolves to on `PATH`.
pub fn resolve_java_executable(cli: &Cli) -> PathBuf {
    if let Some(p) = cli.java.clone() {
        return p;
    }

    if let Some(home) = env::var_os(JAVA_HOME_ENV).filter(|h| !h.is_empty()) {
        let candidate = java_in_home(Path::new(&home));
        if candidate.is_file() {
            return candidate;
        }
    }

    PathBuf::from("java")
}

fn java_in_home(home: &Path) -> PathBuf {
    let name = if cfg!(windows) { "java.exe" } else { "java" };
    home.join("bin").join(name)
}

/// Directory holding per-run response files.
pub fn resolve_work_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().unwrap_or_else(env::temp_dir);
    let dir = base.join("flamingock-cli").join("runs");
    match std::fs::create_dir_all(&dir) {
        Ok(()) => Ok(dir),
        Err(_) => {
            let fallback = env::temp_dir().join("flamingock-cli");
            std::fs::create_dir_all(&fallback)
                .with_context(|| format!("Failed to create work directory: {}", fallback.display()))?;
            Ok(fallback)
        }
    }
}

/// Default tracing filter when `FLAMINGOCK_LOG` is not set.
pub fn default_log_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "warn,flamingock=debug,flamingock_cli=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}
