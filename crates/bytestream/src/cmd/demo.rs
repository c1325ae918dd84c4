use std::sync::Arc;

use bytes::Bytes;
use bytestream_frame::{
    calculate_sum, check_sum, convert_sum, Decoder, Encoder, Flags, FrameError, MessageQueue,
    StreamConfig,
};
use serde::Serialize;

use crate::cmd::DemoArgs;
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_demo, OutputFormat};

const OPENING: &str = "Trust neither luck nor the hearts of others.";

const PARAGRAPH: &[&str] = &[
    "Parting palm",
    "Longing is of no use; only parting remains. If the day of reunion were \
     fixed, what would a thousand torments matter?",
    "One palm, and gods and ghosts fall silent.",
];

#[derive(Debug, Serialize)]
pub struct Submission {
    pub message: String,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub checksum_verified: bool,
    pub submitted: Vec<Submission>,
    pub received: Vec<String>,
}

pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    if args.chunk_size == 0 {
        return Err(CliError::new(USAGE, "--chunk-size must be greater than zero"));
    }

    let report = exchange(&args)?;
    print_demo(&report, format);
    Ok(SUCCESS)
}

fn exchange(args: &DemoArgs) -> CliResult<DemoReport> {
    let flags = Flags::ENDIAN | Flags::CHECKSUM;
    let outbound = Arc::new(StreamConfig::new(args.max_frame_size, args.capacity));
    outbound.replace_flags(flags);
    let inbound = Arc::new(StreamConfig::new(args.max_frame_size, args.capacity));
    inbound.replace_flags(flags);

    let mut encoder = Encoder::with_config(outbound);
    let mut decoder = Decoder::with_config(inbound);
    let mut submitted = Vec::new();
    let mut received = Vec::new();

    submitted.push(submit(&mut encoder, OPENING));
    pump(&mut encoder, &mut decoder, &mut received, args.chunk_size)?;

    for sentence in PARAGRAPH {
        submitted.push(submit(&mut encoder, sentence));
    }
    pump(&mut encoder, &mut decoder, &mut received, args.chunk_size)?;
    drain(&mut decoder, &mut received)?;

    Ok(DemoReport {
        checksum_verified: checksum_self_check(),
        submitted,
        received: received
            .iter()
            .map(|message| String::from_utf8_lossy(message).into_owned())
            .collect(),
    })
}

fn submit(encoder: &mut Encoder, sentence: &str) -> Submission {
    let result = encoder.put(Bytes::copy_from_slice(sentence.as_bytes()));
    if let Err(err) = &result {
        tracing::info!(error = %err, size = sentence.len(), "message refused");
    }
    Submission {
        message: sentence.to_string(),
        accepted: result.is_ok(),
        error: result.err().map(|err| err.to_string()),
    }
}

/// Move encoded bytes to the decoder `chunk_size` at a time.
///
/// When the decoder stops accepting input, its completed messages are
/// drained so that held-back frames can be extracted.
fn pump(
    encoder: &mut Encoder,
    decoder: &mut Decoder,
    received: &mut Vec<Bytes>,
    chunk_size: usize,
) -> CliResult<()> {
    while !encoder.is_empty() {
        let data = encoder.data(chunk_size);
        let data = &data[..data.len().min(chunk_size)];
        if data.is_empty() {
            break;
        }

        let mut offset = 0usize;
        while offset < data.len() {
            let before = offset;
            decoder
                .put(data, &mut offset)
                .map_err(|err| frame_error("demo decode failed", err))?;
            if offset == before {
                if decoder.is_empty() {
                    return Err(frame_error("demo decode failed", FrameError::BufferFull));
                }
                drain(decoder, received)?;
            }
        }

        let size = data.len();
        encoder.take(size);
    }
    Ok(())
}

/// Collect completed messages, re-parsing frames held back by capacity.
fn drain(decoder: &mut Decoder, received: &mut Vec<Bytes>) -> CliResult<()> {
    let mut queue = MessageQueue::new();
    if decoder.take_queue(&mut queue) {
        received.extend(queue);
        loop {
            decoder
                .flush()
                .map_err(|err| frame_error("demo decode failed", err))?;
            match decoder.take() {
                Some(message) => received.push(message),
                None => break,
            }
        }
    }
    Ok(())
}

/// Checksum a patterned payload placed at an unaligned address, store the
/// complemented sum ahead of it and verify it.
fn checksum_self_check() -> bool {
    const WORDS: usize = 10;
    const EXTRA: usize = 1;
    const LENGTH: usize = 4 * WORDS + EXTRA;

    let mut buffer = vec![0u8; 1 + 4 + LENGTH];
    for (index, byte) in buffer[5..].iter_mut().enumerate() {
        *byte = (index as u8).wrapping_mul(37).wrapping_add(11);
    }

    let sum = calculate_sum(&buffer[5..], true);
    buffer[1..5].copy_from_slice(&convert_sum(sum, true).to_ne_bytes());

    let sum = calculate_sum(&buffer[5..], true);
    check_sum(&buffer[1..5], sum, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(max_frame_size: usize, capacity: usize, chunk_size: usize) -> DemoArgs {
        DemoArgs {
            max_frame_size,
            capacity,
            chunk_size,
        }
    }

    #[test]
    fn default_run_refuses_the_long_sentence() {
        let report = exchange(&args(64, 2, 16)).unwrap();
        assert!(report.checksum_verified);

        let accepted: Vec<bool> = report.submitted.iter().map(|s| s.accepted).collect();
        assert_eq!(accepted, [true, true, false, true]);
        assert!(report.submitted[2]
            .error
            .as_deref()
            .unwrap()
            .starts_with("payload too large"));

        assert_eq!(report.received, [OPENING, PARAGRAPH[0], PARAGRAPH[2]]);
    }

    #[test]
    fn capacity_one_refuses_while_a_message_is_pending() {
        let report = exchange(&args(128, 1, 3)).unwrap();

        let accepted: Vec<bool> = report.submitted.iter().map(|s| s.accepted).collect();
        assert_eq!(accepted, [true, true, false, false]);
        assert!(report.submitted[3]
            .error
            .as_deref()
            .unwrap()
            .starts_with("queue full"));
        assert_eq!(report.received, [OPENING, PARAGRAPH[0]]);
    }

    #[test]
    fn limit_below_header_refuses_everything() {
        let report = exchange(&args(6, 0, 16)).unwrap();
        assert!(report.submitted.iter().all(|s| !s.accepted));
        assert!(report.submitted[0]
            .error
            .as_deref()
            .unwrap()
            .starts_with("max frame size 6"));
        assert!(report.received.is_empty());
    }

    #[test]
    fn unbounded_run_delivers_every_sentence() {
        let report = exchange(&args(0, 0, 7)).unwrap();
        assert!(report.submitted.iter().all(|s| s.accepted));
        assert_eq!(report.received.len(), 1 + PARAGRAPH.len());
        assert_eq!(report.received[0], OPENING);
    }
}
