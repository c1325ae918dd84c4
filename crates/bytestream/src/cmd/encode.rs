use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use bytes::Bytes;
use bytestream_frame::{FrameWriter, StreamConfig};

use crate::cmd::{read_input, EncodeArgs};
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let messages = collect_messages(&args)?;
    let config = Arc::new(StreamConfig::from(&args.stream.settings(0)));

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|err| {
                io_error(&format!("failed creating {}", path.display()), err)
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let mut writer = FrameWriter::with_config(sink, config);
    for (index, message) in messages.into_iter().enumerate() {
        let size = message.len();
        writer
            .queue(message)
            .map_err(|err| frame_error(&format!("message {index} rejected"), err))?;
        tracing::debug!(index, size, "message queued");
    }

    let count = writer.encoder().len();
    writer
        .flush()
        .map_err(|err| frame_error("write failed", err))?;
    tracing::info!(messages = count, "frames written");

    Ok(SUCCESS)
}

fn collect_messages(args: &EncodeArgs) -> CliResult<Vec<Bytes>> {
    let mut messages: Vec<Bytes> = args
        .data
        .iter()
        .map(|data| Bytes::copy_from_slice(data.as_bytes()))
        .collect();

    if args.file.is_some() || messages.is_empty() {
        messages.push(Bytes::from(read_input(args.file.as_ref())?));
    }
    Ok(messages)
}
