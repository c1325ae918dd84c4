//! `tokio_util::codec` integration.
//!
//! [`StreamCodec`] plugs the encoder and decoder into `FramedRead` /
//! `FramedWrite`, sharing one [`StreamConfig`] between both directions.

use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec;

use crate::config::StreamConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{FrameError, Result};

/// Length-prefixed codec over [`Encoder`] and [`Decoder`].
#[derive(Debug)]
pub struct StreamCodec {
    encoder: Encoder,
    decoder: Decoder,
}

impl StreamCodec {
    pub fn new() -> Self {
        Self::with_config(Arc::new(StreamConfig::default()))
    }

    pub fn with_config(config: Arc<StreamConfig>) -> Self {
        Self {
            encoder: Encoder::with_config(Arc::clone(&config)),
            decoder: Decoder::with_config(config),
        }
    }

    pub fn config(&self) -> &Arc<StreamConfig> {
        self.decoder.config()
    }
}

impl Default for StreamCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl codec::Decoder for StreamCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if let Some(message) = self.decoder.take() {
            return Ok(Some(message));
        }

        let mut offset = 0usize;
        let result = self.decoder.put(src, &mut offset);
        src.advance(offset);
        result?;

        Ok(self.decoder.take())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() && self.decoder.buffered() == 0 => Ok(None),
            None => Err(FrameError::ConnectionClosed),
        }
    }
}

impl codec::Encoder<Bytes> for StreamCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        self.encoder.put(item)?;
        loop {
            let data = self.encoder.data(usize::MAX);
            if data.is_empty() {
                break;
            }
            let size = data.len();
            dst.extend_from_slice(data);
            self.encoder.take(size);
        }
        Ok(())
    }
}
