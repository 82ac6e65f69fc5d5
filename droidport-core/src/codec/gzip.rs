use super::{CodecId, Decompressor};
use crate::error::Result;
use flate2::read::GzDecoder;
use std::io::{Read, Write};

pub struct GzipCodec;

impl Decompressor for GzipCodec {
    fn id(&self) -> CodecId {
        CodecId::Gzip
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        let mut dec = GzDecoder::new(src);
        let written_uncompressed = std::io::copy(&mut dec, dst)?;
        Ok(written_uncompressed)
    }
}
