use super::{CodecId, Decompressor};
use crate::error::Result;
use flate2::read::ZlibDecoder;
use std::io::{Read, Write};

pub struct ZlibCodec;

impl Decompressor for ZlibCodec {
    fn id(&self) -> CodecId {
        CodecId::Zlib
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        let mut dec = ZlibDecoder::new(src);
        Ok(std::io::copy(&mut dec, dst)?)
    }
}
