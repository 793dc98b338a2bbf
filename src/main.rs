use anyhow::Result;
use clap::Parser;
use flamingock_cli::cli::Cli;
use flamingock_cli::config::{
    LOG_FILTER_ENV, default_log_filter, resolve_java_executable, resolve_work_dir,
};
use flamingock_cli::error::{EXIT_OK, EXIT_OPERATION_FAILED, exit_code_for};
use flamingock_cli::launcher::JvmLauncher;
use flamingock_cli::orchestration::{ExecutionRequest, Orchestrator};
use flamingock_cli::render::render;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(code) => exit_code(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code(exit_code_for(&err))
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(cli.verbose, cli.quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<i32> {
    let invocation = cli.command.invocation();
    invocation.args.passthrough.validate()?;

    let launcher = JvmLauncher::new(resolve_java_executable(cli));
    debug!(java = %launcher.java_executable(), "resolved java executable");
    let orchestrator = Orchestrator::new(launcher, resolve_work_dir()?);

    let request = ExecutionRequest {
        jar: invocation.args.jar.clone(),
        operation: invocation.operation,
        options: invocation.execution_options(),
    };
    let outcome = orchestrator.run(&request)?;

    if let Some(captured) = outcome.captured_output.as_deref() {
        let failed = !outcome.is_success();
        for line in captured.lines() {
            if failed {
                warn!(target: "flamingock_cli::app", "{line}");
            } else {
                debug!(target: "flamingock_cli::app", "{line}");
            }
        }
    }

    let rendered = render(&outcome.response, invocation.operation, invocation.args.format)?;
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }

    if outcome.is_success() {
        return Ok(EXIT_OK);
    }
    if outcome.response.success {
        warn!(
            exit_code = outcome.exit_code,
            "application reported success but exited with a non-zero code"
        );
    }
    Ok(EXIT_OPERATION_FAILED)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
