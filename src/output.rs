//! Rendering of command results.
//!
//! Each command hands over a serializable report and, optionally, a
//! [`HumanOutput`] view of it. With `--json` the report goes to stdout inside a
//! versioned envelope; otherwise the human view is printed unless `--quiet`.
//! Errors print to stderr, or as an error envelope on stdout with `--json`.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "tapestry.v1";

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Text view of a command result: a title line, `key: value` fields,
/// free-form lines and follow-up commands.
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    title: String,
    fields: Vec<(String, String)>,
    lines: Vec<String>,
    hints: Vec<String>,
}

impl HumanOutput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Add a `key: value` field; an empty value prints the key alone
    pub fn field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// Suggest a command to run next
    pub fn hint(&mut self, command: impl Into<String>) {
        self.hints.push(command.into());
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for (key, value) in &self.fields {
            if value.is_empty() {
                write!(f, "\n  {key}")?;
            } else {
                write!(f, "\n  {key}: {value}")?;
            }
        }
        for line in &self.lines {
            write!(f, "\n  {line}")?;
        }
        for hint in &self.hints {
            write!(f, "\nnext: {hint}")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Success,
    Error,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    next_steps: &'a [String],
}

fn print_envelope<T: Serialize>(envelope: &Envelope<'_, T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        return print_envelope(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Success,
            data: Some(data),
            error: None,
            next_steps: human.map(|h| h.hints.as_slice()).unwrap_or_default(),
        });
    }

    if let (false, Some(human)) = (options.quiet, human) {
        println!("{human}");
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        return print_envelope::<()>(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Error,
            data: None,
            error: Some(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            }),
            next_steps: &next_steps,
        });
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Best-effort `command subcommand` name for error envelopes, read from argv
/// before clap has parsed anything.
pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

fn infer_command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut skip_value = false;
    let mut positional = args.into_iter().filter(|arg| {
        if std::mem::take(&mut skip_value) {
            return false;
        }
        if arg == "--data-dir" {
            skip_value = true;
        }
        !arg.starts_with('-')
    });

    let command = match positional.next() {
        Some(cmd) => cmd,
        None => return "tapestry".to_string(),
    };

    if matches!(command.as_str(), "task" | "period" | "session") {
        if let Some(sub) = positional.next() {
            return format!("{command} {sub}");
        }
    }

    command
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    let step = match err {
        Error::PeriodNotFound(_) => "tapestry period ls",
        Error::TaskNotFound(_) | Error::AmbiguousTask { .. } => "tapestry task ls",
        Error::InvalidConfig(_) => "fix .tapestry.toml then retry",
        Error::LockFailed(_) => "retry once other tapestry commands finish",
        _ => return Vec::new(),
    };
    vec![step.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn infers_nested_command_names() {
        assert_eq!(infer_command_name(args(&["--json", "task", "add", "x"])), "task add");
        assert_eq!(infer_command_name(args(&["summary"])), "summary");
        assert_eq!(
            infer_command_name(args(&["--data-dir", "/tmp/t", "session", "show"])),
            "session show"
        );
        assert_eq!(infer_command_name(args(&["period"])), "period");
        assert_eq!(infer_command_name(args(&[])), "tapestry");
    }

    #[test]
    fn not_found_errors_suggest_listing() {
        let steps = error_next_steps(&Error::PeriodNotFound("brunch".to_string()));
        assert_eq!(steps, vec!["tapestry period ls".to_string()]);
        assert_eq!(error_kind(&Error::InvalidArgument("x".to_string())), "user_error");
        assert!(error_next_steps(&Error::InvalidArgument("x".to_string())).is_empty());
    }

    #[test]
    fn envelope_omits_empty_parts() {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command: "stats",
            status: Status::Success,
            data: Some(&42),
            error: None,
            next_steps: &[],
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"], 42);
        assert!(value.get("error").is_none());
        assert!(value.get("next_steps").is_none());
    }
}
