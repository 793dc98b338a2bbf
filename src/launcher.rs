use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::CliError;
use crate::jar::JarType;
use crate::operation::Operation;
use crate::options::ExecutionOptions;

/// Main class used to start a plain uber jar in CLI mode.
pub const FLAMINGOCK_CLI_ENTRY_POINT: &str = "io.flamingock.internal.core.cli.FlamingockCliLauncher";

const SPRING_WEB_DISABLED: &str = "--spring.main.web-application-type=none";
const SPRING_CLI_PROFILE: &str = "--spring.profiles.include=flamingock-cli";
const SPRING_BANNER_OFF: &str = "--spring.main.banner-mode=off";
const CLI_MODE: &str = "--flamingock.cli.mode=true";

/// Result of a finished JVM process. Output is only captured when streaming is off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub exit_code: i32,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl LaunchOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, Clone)]
pub struct JvmLauncher {
    java: PathBuf,
}

impl Default for JvmLauncher {
    fn default() -> Self {
        Self::new(PathBuf::from("java"))
    }
}

impl JvmLauncher {
    pub fn new(java: PathBuf) -> Self {
        Self { java }
    }

    pub fn java_executable(&self) -> String {
        let java = self.java.to_string_lossy().to_string();
        if java.is_empty() { "java".to_string() } else { java }
    }

    pub fn build_command(
        &self,
        jar: &str,
        operation: Option<Operation>,
        output_file: Option<&Path>,
        jar_type: JarType,
        options: &ExecutionOptions,
    ) -> Vec<String> {
        match jar_type {
            JarType::SpringBoot => self.build_spring_boot_command(jar, operation, output_file, options),
            JarType::PlainUber => self.build_plain_uber_command(jar, operation, output_file, options),
        }
    }

    pub fn build_spring_boot_command(
        &self,
        jar: &str,
        operation: Option<Operation>,
        output_file: Option<&Path>,
        options: &ExecutionOptions,
    ) -> Vec<String> {
        let mut command = vec![self.java_executable()];
        command.extend(options.jvm_args().iter().cloned());
        command.push("-jar".to_string());
        command.push(jar.to_string());
        command.push(SPRING_WEB_DISABLED.to_string());
        command.push(SPRING_CLI_PROFILE.to_string());
        command.push(SPRING_BANNER_OFF.to_string());
        command.push(CLI_MODE.to_string());
        push_flamingock_flags(&mut command, operation, output_file);
        if let Some(level) = normalized_log_level(options) {
            command.push(format!("--logging.level.root={level}"));
        }
        push_trailing_args(&mut command, options);
        command
    }

    pub fn build_plain_uber_command(
        &self,
        jar: &str,
        operation: Option<Operation>,
        output_file: Option<&Path>,
        options: &ExecutionOptions,
    ) -> Vec<String> {
        let mut command = vec![self.java_executable()];
        command.extend(options.jvm_args().iter().cloned());
        command.push("-cp".to_string());
        command.push(jar.to_string());
        command.push(FLAMINGOCK_CLI_ENTRY_POINT.to_string());
        command.push(CLI_MODE.to_string());
        push_flamingock_flags(&mut command, operation, output_file);
        if let Some(level) = normalized_log_level(options) {
            command.push(format!("--flamingock.log.level={level}"));
        }
        push_trailing_args(&mut command, options);
        command
    }

    /// Runs a command produced by one of the `build_*` methods and waits for it.
    pub fn launch(&self, command: &[String], stream_output: bool) -> Result<LaunchOutcome, CliError> {
        let (program, args) = command.split_first().ok_or_else(|| CliError::JavaLaunch {
            java: self.java_executable(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;
        debug!(command = %command.join(" "), stream_output, "launching application");

        let mut cmd = java_process(program, args);
        let to_launch_error = |source| CliError::JavaLaunch {
            java: program.clone(),
            source,
        };

        if stream_output {
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(to_launch_error)?;
            return Ok(LaunchOutcome {
                exit_code: status.code().unwrap_or(-1),
                stdout: None,
                stderr: None,
            });
        }

        let output = cmd.stdin(Stdio::null()).output().map_err(to_launch_error)?;
        Ok(LaunchOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        })
    }
}

fn java_process(program: &str, args: &[String]) -> Command {
    #[cfg(windows)]
    {
        let lower = program.to_ascii_lowercase();
        if lower.ends_with(".cmd") || lower.ends_with(".bat") {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(program).args(args);
            return cmd;
        }
    }

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}

fn push_flamingock_flags(command: &mut Vec<String>, operation: Option<Operation>, output_file: Option<&Path>) {
    if let Some(op) = operation {
        command.push(format!("--flamingock.operation={op}"));
    }
    if let Some(file) = output_file {
        command.push(format!("--flamingock.output-file={}", file.display()));
    }
}

fn push_trailing_args(command: &mut Vec<String>, options: &ExecutionOptions) {
    for (key, value) in options.operation_args() {
        command.push(format!("--{key}={value}"));
    }
    command.extend(options.app_args().iter().cloned());
}

fn normalized_log_level(options: &ExecutionOptions) -> Option<String> {
    options
        .log_level()
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .map(str::to_uppercase)
}
