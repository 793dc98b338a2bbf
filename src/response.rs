//! Response document written by the application to `--flamingock.output-file`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::error::CliError;
use crate::operation::Operation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub success: bool,
    /// Operation the application says it ran. Names this CLI does not know
    /// decode to `None`, so a newer engine's response is still readable.
    #[serde(
        default,
        deserialize_with = "lenient_operation",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

fn lenient_operation<'de, D>(deserializer: D) -> std::result::Result<Option<Operation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|name| match name.parse::<Operation>() {
        Ok(op) => Some(op),
        Err(_) => {
            warn!(operation = %name, "response reports an unknown operation");
            None
        }
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_id: Option<String>,
}

impl ResponseEnvelope {
    /// Decodes `data` into an operation-specific payload; `None` when absent.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.data {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => {
                let typed = T::deserialize(value)
                    .with_context(|| format!("Unexpected response data for {:?}", self.operation))?;
                Ok(Some(typed))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    Applied,
    Skipped,
    Failed,
    RolledBack,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOutcome {
    pub change_id: String,
    pub status: ChangeStatus,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResult {
    #[serde(default)]
    pub applied: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub changes: Vec<ChangeOutcome>,
}

/// Audit state of a change as stored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditState {
    Started,
    Executed,
    Failed,
    RolledBack,
    RollbackFailed,
    ManualMarkedAsExecuted,
    ManualMarkedAsRolledBack,
    #[serde(other)]
    Unknown,
}

impl AuditState {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditState::Started => "STARTED",
            AuditState::Executed => "EXECUTED",
            AuditState::Failed => "FAILED",
            AuditState::RolledBack => "ROLLED_BACK",
            AuditState::RollbackFailed => "ROLLBACK_FAILED",
            AuditState::ManualMarkedAsExecuted => "MANUAL_MARKED_AS_EXECUTED",
            AuditState::ManualMarkedAsRolledBack => "MANUAL_MARKED_AS_ROLLED_BACK",
            AuditState::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub change_id: String,
    #[serde(default)]
    pub author: Option<String>,
    pub state: AuditState,
    #[serde(default)]
    pub stage_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub execution_millis: Option<u64>,
    #[serde(default)]
    pub error_trace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditListResult {
    #[serde(default)]
    pub entries: Vec<AuditEntry>,
}

/// Manual resolution applied by `audit fix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    Applied,
    RolledBack,
}

impl Resolution {
    pub fn wire_name(self) -> &'static str {
        match self {
            Resolution::Applied => "APPLIED",
            Resolution::RolledBack => "ROLLED_BACK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResult {
    pub change_id: String,
    pub resolution: Resolution,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub change_id: String,
    pub state: AuditState,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueListResult {
    #[serde(default)]
    pub issues: Vec<IssueSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetail {
    pub change_id: String,
    pub state: AuditState,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub stage_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub execution_millis: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_trace: Option<String>,
    #[serde(default)]
    pub guidance: Option<String>,
}

/// Reads the response file. A missing file is `Ok(None)`: the application may
/// have died before writing it, and the caller decides what that means.
pub fn read_response(path: &Path) -> Result<Option<ResponseEnvelope>> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read response file: {}", path.display()));
        }
    };

    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let envelope = serde_json::from_slice(&raw).map_err(|source| CliError::MalformedResponse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(envelope))
}
