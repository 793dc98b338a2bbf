use std::collections::BTreeMap;

/// Options for a single command execution.
///
/// Operation args are kept sorted by key so the spawned command line is stable
/// between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    log_level: Option<String>,
    stream_output: bool,
    operation_args: BTreeMap<String, String>,
    jvm_args: Vec<String>,
    app_args: Vec<String>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        ExecutionOptions::builder().build()
    }
}

impl ExecutionOptions {
    pub fn builder() -> ExecutionOptionsBuilder {
        ExecutionOptionsBuilder::default()
    }

    /// Log level for the spawned application, if any.
    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }

    pub fn stream_output(&self) -> bool {
        self.stream_output
    }

    /// Operation-specific arguments, emitted as `--<key>=<value>`.
    pub fn operation_args(&self) -> &BTreeMap<String, String> {
        &self.operation_args
    }

    /// Arguments placed before `-jar`/`-cp`.
    pub fn jvm_args(&self) -> &[String] {
        &self.jvm_args
    }

    /// Arguments appended at the end of the spawned command.
    pub fn app_args(&self) -> &[String] {
        &self.app_args
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionOptionsBuilder {
    log_level: Option<String>,
    stream_output: bool,
    operation_args: BTreeMap<String, String>,
    jvm_args: Vec<String>,
    app_args: Vec<String>,
}

impl Default for ExecutionOptionsBuilder {
    fn default() -> Self {
        Self {
            log_level: None,
            stream_output: true,
            operation_args: BTreeMap::new(),
            jvm_args: Vec::new(),
            app_args: Vec::new(),
        }
    }
}

impl ExecutionOptionsBuilder {
    pub fn log_level(mut self, log_level: Option<impl Into<String>>) -> Self {
        self.log_level = log_level.map(Into::into);
        self
    }

    pub fn stream_output(mut self, stream_output: bool) -> Self {
        self.stream_output = stream_output;
        self
    }

    pub fn operation_args(mut self, operation_args: BTreeMap<String, String>) -> Self {
        self.operation_args = operation_args;
        self
    }

    pub fn operation_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.operation_args.insert(key.into(), value.into());
        self
    }

    pub fn jvm_args(mut self, jvm_args: Vec<String>) -> Self {
        self.jvm_args = jvm_args;
        self
    }

    pub fn app_args(mut self, app_args: Vec<String>) -> Self {
        self.app_args = app_args;
        self
    }

    pub fn build(self) -> ExecutionOptions {
        ExecutionOptions {
            log_level: self.log_level,
            stream_output: self.stream_output,
            operation_args: self.operation_args,
            jvm_args: self.jvm_args,
            app_args: self.app_args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_stream_output_and_leave_everything_else_empty() {
        let options = ExecutionOptions::default();
        assert!(options.stream_output());
        assert_eq!(options.log_level(), None);
        assert!(options.operation_args().is_empty());
        assert!(options.jvm_args().is_empty());
        assert!(options.app_args().is_empty());
    }

    #[test]
    fn operation_arg_adds_to_replaced_map() {
        let mut initial = BTreeMap::new();
        initial.insert("flamingock.change-id".to_string(), "c-1".to_string());

        let options = ExecutionOptions::builder()
            .operation_args(initial)
            .operation_arg("flamingock.resolution", "APPLIED")
            .stream_output(false)
            .log_level(Some("debug"))
            .build();

        let keys: Vec<&str> = options.operation_args().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["flamingock.change-id", "flamingock.resolution"]);
        assert!(!options.stream_output());
        assert_eq!(options.log_level(), Some("debug"));
    }
}
