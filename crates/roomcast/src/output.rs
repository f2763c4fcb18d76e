use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use roomcast_events::{EventDescriptor, PayloadParam};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One JSON object per line.
pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// `username: string, msg: string`
pub fn payload_signature(payload: &[PayloadParam]) -> String {
    payload
        .iter()
        .map(|param| format!("{}: {}", param.name, param.kind))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `s2c`, `c2s`, `s2c+c2s` or `-`.
pub fn direction(event: &EventDescriptor) -> &'static str {
    match (event.server_to_client(), event.client_to_server()) {
        (true, true) => "s2c+c2s",
        (true, false) => "s2c",
        (false, true) => "c2s",
        (false, false) => "-",
    }
}
