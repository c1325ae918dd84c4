use std::sync::Arc;

use bytestream_frame::{Decoder, FrameError, StreamConfig};

use crate::cmd::{read_input, DecodeArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.chunk_size == 0 {
        return Err(CliError::new(USAGE, "--chunk-size must be greater than zero"));
    }

    let input = read_input(args.file.as_ref())?;
    let config = Arc::new(StreamConfig::from(&args.stream.settings(args.capacity)));
    let mut decoder = Decoder::with_config(config);

    let mut printed = 0usize;
    for chunk in input.chunks(args.chunk_size) {
        let mut offset = 0usize;
        while offset < chunk.len() {
            let before = offset;
            decoder
                .put(chunk, &mut offset)
                .map_err(|err| frame_error("decode failed", err))?;
            if offset == before && decoder.is_empty() {
                return Err(frame_error("decode failed", FrameError::BufferFull));
            }
            drain(&mut decoder, &mut printed, format)?;
        }
    }
    drain(&mut decoder, &mut printed, format)?;

    if decoder.buffered() > 0 {
        return Err(frame_error("decode failed", FrameError::ConnectionClosed));
    }

    tracing::info!(messages = printed, bytes = input.len(), "input decoded");
    Ok(SUCCESS)
}

/// Print every completed message, re-parsing frames held back by capacity.
fn drain(decoder: &mut Decoder, printed: &mut usize, format: OutputFormat) -> CliResult<()> {
    loop {
        while let Some(message) = decoder.take() {
            print_message(*printed, &message, format);
            *printed += 1;
        }
        if decoder.buffered() == 0 {
            return Ok(());
        }
        decoder
            .flush()
            .map_err(|err| frame_error("decode failed", err))?;
        if decoder.is_empty() {
            return Ok(());
        }
    }
}
