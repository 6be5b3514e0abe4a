use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
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

/// One channel position as reported by the controller.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PositionReading {
    pub channel: u8,
    /// Quarter-microseconds.
    pub position: u16,
    /// Pulse width in microseconds.
    pub pulse_us: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving: Option<bool>,
}

impl PositionReading {
    pub fn new(channel: u8, position: u16) -> Self {
        Self {
            channel,
            position,
            pulse_us: quarter_us_to_us(position),
            moving: None,
        }
    }
}

/// Result of a command that changes controller state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommandReport {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving: Option<bool>,
}

impl CommandReport {
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            channel: None,
            requested: None,
            sent: None,
            moving: None,
        }
    }

    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn values(mut self, requested: u16, sent: u16) -> Self {
        self.requested = Some(requested);
        self.sent = Some(sent);
        self
    }

    pub fn moving(mut self, moving: bool) -> Self {
        self.moving = Some(moving);
        self
    }
}

pub fn quarter_us_to_us(value: u16) -> f64 {
    f64::from(value) / 4.0
}

pub fn print_positions(readings: &[PositionReading], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for reading in readings {
                print_json(reading);
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "POSITION", "PULSE (us)", "MOVING"]);
            for reading in readings {
                table.add_row(vec![
                    reading.channel.to_string(),
                    reading.position.to_string(),
                    format!("{:.2}", reading.pulse_us),
                    reading
                        .moving
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for reading in readings {
                let moving = match reading.moving {
                    Some(true) => " moving",
                    Some(false) => " settled",
                    None => "",
                };
                println!(
                    "channel={} position={} pulse={:.2}us{}",
                    reading.channel, reading.position, reading.pulse_us, moving
                );
            }
        }
    }
}

pub fn print_report(report: &CommandReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["command".to_string(), report.command.to_string()]);
            for (name, value) in report_fields(report) {
                table.add_row(vec![name.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = report.command.to_string();
            for (name, value) in report_fields(report) {
                line.push_str(&format!(" {name}={value}"));
            }
            println!("{line}");
        }
    }
}

fn report_fields(report: &CommandReport) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    if let Some(channel) = report.channel {
        fields.push(("channel", channel.to_string()));
    }
    if let Some(requested) = report.requested {
        fields.push(("requested", requested.to_string()));
    }
    if let Some(sent) = report.sent {
        fields.push(("sent", sent.to_string()));
    }
    if let Some(moving) = report.moving {
        fields.push(("moving", moving.to_string()));
    }
    fields
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
