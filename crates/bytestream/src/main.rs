mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "bytestream", version, about = "Binary message framing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from([
            "bytestream",
            "encode",
            "--data",
            "hello",
            "--data",
            "world",
            "--endian",
            "--checksum",
            "--max-frame-size",
            "64",
        ])
        .expect("encode args should parse");

        match cli.command {
            Command::Encode(args) => {
                assert_eq!(args.data, ["hello", "world"]);
                assert!(args.stream.endian && args.stream.checksum);
                assert_eq!(args.stream.max_frame_size, 64);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_checksum_inputs() {
        let err = Cli::try_parse_from([
            "bytestream",
            "checksum",
            "--data",
            "hello",
            "--file",
            "/tmp/payload.bin",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_demo_defaults() {
        let cli = Cli::try_parse_from(["bytestream", "--format", "json", "demo"])
            .expect("demo args should parse");
        match cli.command {
            Command::Demo(args) => {
                assert_eq!(args.max_frame_size, 64);
                assert_eq!(args.capacity, 2);
                assert_eq!(args.chunk_size, 16);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from([
            "bytestream",
            "decode",
            "--file",
            "/tmp/wire.bin",
            "--capacity",
            "2",
            "--chunk-size",
            "1",
        ])
        .expect("decode args should parse");
        assert!(matches!(cli.command, Command::Decode(_)));
    }
}
