use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::cli::OutputFormat;
use crate::operation::Operation;
use crate::response::{
    AuditListResult, ExecuteResult, FixResult, IssueDetail, IssueListResult, ResponseEnvelope,
};

pub fn render(response: &ResponseEnvelope, operation: Operation, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        OutputFormat::Text => render_text(response, operation),
    }
}

fn render_text(response: &ResponseEnvelope, operation: Operation) -> Result<String> {
    if !response.success {
        return Ok(render_failure(response));
    }

    let mut out = match operation {
        Operation::Execute => match response.data_as::<ExecuteResult>()? {
            Some(result) => render_execute(&result),
            None => "Changes executed\n".to_string(),
        },
        Operation::List => {
            let list = response.data_as::<AuditListResult>()?.unwrap_or_default();
            let rows = list
                .entries
                .iter()
                .map(|e| row(&e.change_id, e.state.as_str(), e.author.as_deref(), e.created_at))
                .collect();
            render_table(rows, "No audit entries")
        }
        Operation::Fix => match response.data_as::<FixResult>()? {
            Some(fix) => format!(
                "Change {} marked as {}{}\n",
                fix.change_id,
                fix.resolution.wire_name(),
                fix.result.map(|r| format!(" ({r})")).unwrap_or_default()
            ),
            None => "Audit fixed\n".to_string(),
        },
        Operation::IssueList => {
            let list = response.data_as::<IssueListResult>()?.unwrap_or_default();
            let rows = list
                .issues
                .iter()
                .map(|i| row(&i.change_id, i.state.as_str(), i.author.as_deref(), i.created_at))
                .collect();
            render_table(rows, "No issues found")
        }
        Operation::IssueGet => match response.data_as::<IssueDetail>()? {
            Some(detail) => render_issue(&detail),
            None => "No issues found\n".to_string(),
        },
    };

    if let Some(ms) = response.duration_ms {
        out.push_str(&format!("duration_ms: {ms}\n"));
    }
    Ok(out)
}

fn render_failure(response: &ResponseEnvelope) -> String {
    match &response.error {
        Some(err) => {
            let mut out = if err.code.is_empty() {
                format!("error: {}\n", err.message)
            } else {
                format!("error: {}: {}\n", err.code, err.message)
            };
            if let Some(id) = &err.change_id {
                out.push_str(&format!("change_id: {id}\n"));
            }
            out
        }
        None => "error: operation failed without details\n".to_string(),
    }
}

fn render_execute(result: &ExecuteResult) -> String {
    let mut out = format!(
        "applied: {}, skipped: {}, failed: {}\n",
        result.applied, result.skipped, result.failed
    );
    for change in &result.changes {
        out.push_str(&format!("- {} {:?}", change.change_id, change.status));
        if let Some(ms) = change.duration_ms {
            out.push_str(&format!(" ({ms} ms)"));
        }
        if let Some(msg) = &change.error_message {
            out.push_str(&format!(": {msg}"));
        }
        out.push('\n');
    }
    out
}

fn render_issue(detail: &IssueDetail) -> String {
    let mut out = String::new();
    out.push_str(&format!("change_id: {}\n", detail.change_id));
    out.push_str(&format!("state: {}\n", detail.state.as_str()));
    let optional = [
        ("author", detail.author.clone()),
        ("stage_id", detail.stage_id.clone()),
        ("created_at", detail.created_at.map(format_timestamp)),
        ("execution_ms", detail.execution_millis.map(|m| m.to_string())),
        ("error", detail.error_message.clone()),
        ("guidance", detail.guidance.clone()),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            out.push_str(&format!("{label}: {value}\n"));
        }
    }
    if let Some(trace) = &detail.error_trace {
        out.push_str("trace:\n");
        for line in trace.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}

const TABLE_HEADER: [&str; 4] = ["CHANGE ID", "STATE", "AUTHOR", "CREATED AT"];

fn row(change_id: &str, state: &str, author: Option<&str>, created_at: Option<DateTime<Utc>>) -> [String; 4] {
    [
        change_id.to_string(),
        state.to_string(),
        author.unwrap_or("-").to_string(),
        created_at.map(format_timestamp).unwrap_or_else(|| "-".to_string()),
    ]
}

fn render_table(rows: Vec<[String; 4]>, empty_message: &str) -> String {
    if rows.is_empty() {
        return format!("{empty_message}\n");
    }

    let mut widths = TABLE_HEADER.map(str::len);
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header = TABLE_HEADER.map(str::to_string);
    let mut out = String::new();
    for r in std::iter::once(&header).chain(rows.iter()) {
        let line = r
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseError;

    fn envelope(operation: Operation, data: serde_json::Value) -> ResponseEnvelope {
        ResponseEnvelope {
            success: true,
            operation: Some(operation),
            duration_ms: None,
            data: Some(data),
            error: None,
        }
    }

    #[test]
    fn audit_list_renders_aligned_table() {
        let response = envelope(
            Operation::List,
            serde_json::json!({
                "entries": [
                    { "changeId": "create-users", "state": "EXECUTED", "author": "ops",
                      "createdAt": "2025-03-01T10:15:30Z" },
                    { "changeId": "seed", "state": "FAILED" }
                ]
            }),
        );

        let text = render(&response, Operation::List, OutputFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "CHANGE ID     STATE     AUTHOR  CREATED AT");
        assert_eq!(lines[1], "create-users  EXECUTED  ops     2025-03-01 10:15:30");
        assert_eq!(lines[2], "seed          FAILED    -       -");
    }

    #[test]
    fn empty_lists_print_a_message() {
        let response = envelope(Operation::IssueList, serde_json::json!({ "issues": [] }));
        let text = render(&response, Operation::IssueList, OutputFormat::Text).unwrap();
        assert_eq!(text, "No issues found\n");
    }

    #[test]
    fn execute_summary_lists_changes() {
        let mut response = envelope(
            Operation::Execute,
            serde_json::json!({
                "applied": 1, "skipped": 1, "failed": 0,
                "changes": [
                    { "changeId": "a", "status": "APPLIED", "durationMs": 30 },
                    { "changeId": "b", "status": "SKIPPED" }
                ]
            }),
        );
        response.duration_ms = Some(45);

        let text = render(&response, Operation::Execute, OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "applied: 1, skipped: 1, failed: 0\n- a Applied (30 ms)\n- b Skipped\nduration_ms: 45\n"
        );
    }

    #[test]
    fn failure_renders_error_code_and_change() {
        let response = ResponseEnvelope {
            success: false,
            operation: Some(Operation::Execute),
            duration_ms: None,
            data: None,
            error: Some(ResponseError {
                code: "CHANGE_FAILED".to_string(),
                message: "duplicate key".to_string(),
                change_id: Some("seed".to_string()),
            }),
        };

        let text = render(&response, Operation::Execute, OutputFormat::Text).unwrap();
        assert_eq!(text, "error: CHANGE_FAILED: duplicate key\nchange_id: seed\n");
    }

    #[test]
    fn issue_detail_includes_trace() {
        let response = envelope(
            Operation::IssueGet,
            serde_json::json!({
                "changeId": "seed", "state": "FAILED", "errorMessage": "boom",
                "errorTrace": "java.lang.IllegalStateException: boom\n\tat Seed.run"
            }),
        );

        let text = render(&response, Operation::IssueGet, OutputFormat::Text).unwrap();
        assert!(text.starts_with("change_id: seed\nstate: FAILED\nerror: boom\ntrace:\n"));
        assert!(text.contains("  java.lang.IllegalStateException: boom\n"));
    }

    #[test]
    fn json_format_prints_the_envelope() {
        let response = envelope(Operation::Fix, serde_json::json!({ "changeId": "a", "resolution": "APPLIED" }));
        let json = render(&response, Operation::Fix, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["operation"], "FIX");
        assert_eq!(parsed["data"]["changeId"], "a");
        assert!(parsed.get("error").is_none());
    }
}
