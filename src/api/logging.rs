use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};

use crate::util::parse_bool_flag;

const DEFAULT_EVENT_LOG_PATH: &str = "/tmp/badge-events.log";
const DEBUG_EVENTS_ENV: &str = "BADGE_DEBUG_EVENTS";
const EVENT_LOG_PATH_ENV: &str = "BADGE_EVENT_LOG_PATH";

pub fn debug_events_enabled() -> bool {
    std::env::var(DEBUG_EVENTS_ENV)
        .ok()
        .and_then(parse_bool_flag)
        .unwrap_or(false)
}

pub fn emit_event_payload(payload: &str) {
    emit_log_message(&format!("BADGE DEBUG status_event data={payload}\n"));
}

pub fn emit_payload_parse_error(payload: &str, error: &anyhow::Error) {
    emit_log_message(&format!(
        "BADGE ERROR payload_parse_failed error={error:#}\ndata:\n{payload}\n"
    ));
}

/// Route diagnostics to a file whenever stderr is the interactive terminal
/// the badge is drawn on; raw writes there would shred the display.
fn emit_log_message(message: &str) {
    if let Some(path) = resolve_log_path() {
        if append_log_file(&path, message).is_ok() {
            return;
        }
    }

    eprintln!("{message}");
}

fn resolve_log_path() -> Option<String> {
    std::env::var(EVENT_LOG_PATH_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            if std::io::stderr().is_terminal() {
                Some(DEFAULT_EVENT_LOG_PATH.to_string())
            } else {
                None
            }
        })
}

fn append_log_file(path: &str, message: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(message.as_bytes())
}
