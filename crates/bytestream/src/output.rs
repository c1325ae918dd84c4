use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::cmd::demo::DemoReport;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
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

#[derive(Serialize)]
struct MessageOutput {
    index: usize,
    size: usize,
    payload: String,
}

/// Print one decoded message.
pub fn print_message(index: usize, payload: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                index,
                size: payload.len(),
                payload: payload_preview(payload),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    index.to_string(),
                    payload.len().to_string(),
                    payload_preview(payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "message={} size={} payload={}",
                index,
                payload.len(),
                payload_preview(payload)
            );
        }
        OutputFormat::Raw => print_raw(payload),
    }
}

#[derive(Serialize)]
pub struct ChecksumReport {
    pub size: usize,
    pub endian: bool,
    pub sum: u32,
    pub stored: u32,
}

/// Print a checksum computation. `raw` writes the stored field as it would
/// appear on the wire.
pub fn print_checksum(report: &ChecksumReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SIZE", "ENDIAN", "SUM", "STORED"])
                .add_row(vec![
                    report.size.to_string(),
                    report.endian.to_string(),
                    format!("{:#010x}", report.sum),
                    format!("{:#010x}", report.stored),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "size={} endian={} sum={:#010x} stored={:#010x}",
                report.size, report.endian, report.sum, report.stored
            );
        }
        OutputFormat::Raw => print_raw(&report.stored.to_ne_bytes()),
    }
}

/// Print what a demo run submitted and what came out the other side.
pub fn print_demo(report: &DemoReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            println!("checksum {}", report.checksum_verified);

            let mut submitted = Table::new();
            submitted
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ACCEPTED", "MESSAGE", "ERROR"]);
            for entry in &report.submitted {
                submitted.add_row(vec![
                    entry.accepted.to_string(),
                    entry.message.clone(),
                    entry.error.clone().unwrap_or_default(),
                ]);
            }
            println!("{submitted}");

            let mut received = Table::new();
            received
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "RECEIVED"]);
            for (index, message) in report.received.iter().enumerate() {
                received.add_row(vec![index.to_string(), message.clone()]);
            }
            println!("{received}");
        }
        OutputFormat::Pretty => {
            println!("checksum {}", report.checksum_verified);
            println!("\noutput");
            for entry in &report.submitted {
                println!("{} {}", entry.accepted, entry.message);
            }
            println!("\ninput");
            for message in &report.received {
                println!("{message}");
            }
        }
        OutputFormat::Raw => {
            for message in &report.received {
                print_raw(message.as_bytes());
                print_raw(b"\n");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_shows_text_or_size() {
        assert_eq!(payload_preview(b"hello"), "hello");
        assert_eq!(payload_preview(&[0xFF, 0xFE, 0x00]), "<binary 3 bytes>");
    }

    #[test]
    fn checksum_report_serializes() {
        let report = ChecksumReport {
            size: 4,
            endian: true,
            sum: 0x0102_0304,
            stored: !0x0102_0304,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"sum\":16909060"));
        assert!(json.contains("\"endian\":true"));
    }
}
