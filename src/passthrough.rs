//! Passthrough arguments for the spawned JVM process.
//!
//! Two categories are supported:
//!
//! - **JVM arguments** (`-J` / `--java-opt`): placed before `-jar`/`-cp`. Memory
//!   settings, system properties, GC options.
//! - **Application arguments** (after `--`): appended at the end of the spawned
//!   command, after every Flamingock flag. Profiles, datasource overrides,
//!   custom properties.
//!
//! ```text
//! flamingock execute apply --jar app.jar -J -Xmx512m -- --spring.profiles.active=prod
//! ```

use clap::Args;

use crate::error::CliError;

/// Application argument prefixes the CLI controls itself.
pub const RESERVED_APP_ARG_PREFIXES: [&str; 3] = [
    "--flamingock.",
    "--spring.main.web-application-type",
    "--spring.main.banner-mode",
];

#[derive(Debug, Clone, Default, Args)]
pub struct PassthroughArgs {
    /// JVM argument passed to the spawned process (repeatable, placed before -jar/-cp).
    /// Example: -J -Xmx512m -J -Xms256m -J "-Dmy.prop=value"
    #[arg(
        short = 'J',
        long = "java-opt",
        value_name = "JVM_ARG",
        allow_hyphen_values = true
    )]
    jvm_args: Vec<String>,

    /// Application arguments passed after '--' to the spawned process.
    /// Example: -- --spring.profiles.active=prod --spring.datasource.url=jdbc:mysql://host/db
    #[arg(last = true, value_name = "APP_ARGS")]
    app_args: Vec<String>,
}

impl PassthroughArgs {
    pub fn new(jvm_args: Vec<String>, app_args: Vec<String>) -> Self {
        Self { jvm_args, app_args }
    }

    pub fn jvm_args(&self) -> &[String] {
        &self.jvm_args
    }

    pub fn app_args(&self) -> &[String] {
        &self.app_args
    }

    /// Rejects application arguments that start with a reserved prefix.
    ///
    /// JVM arguments are left alone: they act at the JVM level and cannot
    /// collide with application-level Flamingock flags.
    pub fn validate(&self) -> Result<(), CliError> {
        for arg in &self.app_args {
            let lower = arg.to_lowercase();
            let Some(reserved) = RESERVED_APP_ARG_PREFIXES
                .iter()
                .find(|prefix| lower.starts_with(&prefix.to_lowercase()))
            else {
                continue;
            };

            let category = if reserved.starts_with("--flamingock.") {
                "Arguments starting with '--flamingock.' are controlled by the CLI and cannot be overridden."
                    .to_string()
            } else {
                format!("The argument '{reserved}' is a safety-critical flag controlled by the CLI.")
            };
            return Err(CliError::ReservedArgument(format!(
                "Reserved argument cannot be passed after '--': {arg}\n\n  {category}\n\n  For help: flamingock <command> --help"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn with_app_args(args: &[&str]) -> PassthroughArgs {
        PassthroughArgs::new(Vec::new(), args.iter().map(|s| s.to_string()).collect())
    }

    fn message(args: &PassthroughArgs) -> String {
        args.validate().unwrap_err().to_string()
    }

    #[test]
    fn rejects_flamingock_operation() {
        let msg = message(&with_app_args(&["--flamingock.operation=EXECUTE"]));
        assert!(msg.contains("Reserved argument cannot be passed after '--'"));
        assert!(msg.contains("--flamingock.operation=EXECUTE"));
        assert!(msg.contains("'--flamingock.'"));
        assert!(msg.contains("For help: flamingock <command> --help"));
    }

    #[test]
    fn rejects_flamingock_namespace_regardless_of_case() {
        assert!(with_app_args(&["--flamingock.cli.mode=false"]).validate().is_err());
        assert!(with_app_args(&["--flamingock.output-file=/tmp/hack.json"]).validate().is_err());
        assert!(with_app_args(&["--FLAMINGOCK.Operation=LIST"]).validate().is_err());
    }

    #[test]
    fn rejects_spring_safety_flags() {
        let msg = message(&with_app_args(&["--spring.main.web-application-type=servlet"]));
        assert!(msg.contains("safety-critical flag"));
        assert!(msg.contains("'--spring.main.web-application-type'"));

        assert!(with_app_args(&["--spring.main.banner-mode=console"]).validate().is_err());
    }

    #[test]
    fn reports_first_reserved_argument() {
        let msg = message(&with_app_args(&[
            "--spring.profiles.active=prod",
            "--spring.main.banner-mode=log",
            "--flamingock.operation=LIST",
        ]));
        assert!(msg.contains("--spring.main.banner-mode=log"));
        assert!(!msg.contains("--flamingock.operation=LIST"));
    }

    #[test]
    fn allows_regular_application_args() {
        let args = with_app_args(&[
            "--spring.profiles.active=prod",
            "--spring.datasource.url=jdbc:mysql://prod/db",
            "--spring.profiles.include=extra-profile",
            "--my.custom.property=value",
            "--another.prop=123",
        ]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn empty_args_pass_and_are_never_missing() {
        let args = PassthroughArgs::default();
        assert!(args.validate().is_ok());
        assert!(args.jvm_args().is_empty());
        assert!(args.app_args().is_empty());
    }

    #[test]
    fn jvm_args_are_not_validated() {
        let args = PassthroughArgs::new(vec!["-Dflamingock.operation=EXECUTE".to_string()], Vec::new());
        assert!(args.validate().is_ok());
        assert_eq!(args.jvm_args(), ["-Dflamingock.operation=EXECUTE"]);
    }

    #[derive(Debug, Parser)]
    struct Harness {
        #[arg(long)]
        jar: Option<String>,

        #[command(flatten)]
        passthrough: PassthroughArgs,
    }

    #[test]
    fn parses_hyphenated_jvm_args_and_trailing_app_args() {
        let parsed = Harness::try_parse_from([
            "flamingock",
            "--jar",
            "app.jar",
            "-J",
            "-Xmx512m",
            "--java-opt",
            "-Dmy.prop=value",
            "--",
            "--spring.profiles.active=prod",
            "--custom=1",
        ])
        .unwrap();

        assert_eq!(parsed.jar.as_deref(), Some("app.jar"));
        assert_eq!(parsed.passthrough.jvm_args(), ["-Xmx512m", "-Dmy.prop=value"]);
        assert_eq!(
            parsed.passthrough.app_args(),
            ["--spring.profiles.active=prod", "--custom=1"]
        );
    }
}
