use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operation requested from the application through `--flamingock.operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Execute,
    List,
    Fix,
    IssueList,
    IssueGet,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Execute,
        Operation::List,
        Operation::Fix,
        Operation::IssueList,
        Operation::IssueGet,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Operation::Execute => "EXECUTE",
            Operation::List => "LIST",
            Operation::Fix => "FIX",
            Operation::IssueList => "ISSUE_LIST",
            Operation::IssueGet => "ISSUE_GET",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Operation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Operation::ALL
            .into_iter()
            .find(|op| op.wire_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow::anyhow!("Unknown operation: {wanted}"))
    }
}
