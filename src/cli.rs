use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::operation::Operation;
use crate::options::ExecutionOptions;
use crate::passthrough::PassthroughArgs;
use crate::response::Resolution;

pub const CHANGE_ID_ARG: &str = "flamingock.change-id";
pub const RESOLUTION_ARG: &str = "flamingock.resolution";

#[derive(Debug, Clone, Parser)]
#[command(name = "flamingock", version)]
#[command(about = "Flamingock CLI for executing changes in applications")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Java binary used to launch the application
    #[arg(long, value_name = "FILE", env = "FLAMINGOCK_JAVA", global = true)]
    pub java: Option<PathBuf>,

    /// Print CLI diagnostics
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors and the result
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run pending changes
    Execute {
        #[command(subcommand)]
        command: ExecuteCommands,
    },
    /// Inspect and repair the audit log
    Audit {
        #[command(subcommand)]
        command: AuditCommands,
    },
    /// Inspect changes left in an inconsistent state
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ExecuteCommands {
    /// Apply all pending changes
    Apply(OperationArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum AuditCommands {
    /// List audit entries
    List(OperationArgs),
    /// Mark a change as applied or rolled back
    Fix {
        #[arg(long, value_name = "ID")]
        change_id: String,

        #[arg(long, value_enum)]
        resolution: Resolution,

        #[command(flatten)]
        common: OperationArgs,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum IssueCommands {
    /// List changes with issues
    List(OperationArgs),
    /// Show details for one issue (the first one when no id is given)
    Get {
        #[arg(long, value_name = "ID")]
        change_id: Option<String>,

        #[command(flatten)]
        common: OperationArgs,
    },
}

/// Arguments shared by every operation subcommand.
#[derive(Debug, Clone, Args)]
pub struct OperationArgs {
    /// Application jar, or a directory containing exactly one launchable jar
    #[arg(long, value_name = "PATH")]
    pub jar: PathBuf,

    /// Log level for the application
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Capture application output instead of streaming it; captured output is
    /// shown on failure, or always with --verbose
    #[arg(long)]
    pub no_stream: bool,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub passthrough: PassthroughArgs,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A parsed subcommand reduced to what the orchestrator needs.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    pub operation: Operation,
    pub args: &'a OperationArgs,
    pub operation_args: BTreeMap<String, String>,
}

impl Invocation<'_> {
    pub fn execution_options(&self) -> ExecutionOptions {
        ExecutionOptions::builder()
            .log_level(self.args.log_level.clone())
            .stream_output(!self.args.no_stream)
            .operation_args(self.operation_args.clone())
            .jvm_args(self.args.passthrough.jvm_args().to_vec())
            .app_args(self.args.passthrough.app_args().to_vec())
            .build()
    }
}

impl Commands {
    pub fn invocation(&self) -> Invocation<'_> {
        let mut operation_args = BTreeMap::new();
        let (operation, args) = match self {
            Commands::Execute {
                command: ExecuteCommands::Apply(args),
            } => (Operation::Execute, args),
            Commands::Audit {
                command: AuditCommands::List(args),
            } => (Operation::List, args),
            Commands::Audit {
                command:
                    AuditCommands::Fix {
                        change_id,
                        resolution,
                        common,
                    },
            } => {
                operation_args.insert(CHANGE_ID_ARG.to_string(), change_id.clone());
                operation_args.insert(RESOLUTION_ARG.to_string(), resolution.wire_name().to_string());
                (Operation::Fix, common)
            }
            Commands::Issue {
                command: IssueCommands::List(args),
            } => (Operation::IssueList, args),
            Commands::Issue {
                command: IssueCommands::Get { change_id, common },
            } => {
                if let Some(id) = change_id {
                    operation_args.insert(CHANGE_ID_ARG.to_string(), id.clone());
                }
                (Operation::IssueGet, common)
            }
        };

        Invocation {
            operation,
            args,
            operation_args,
        }
    }
}
