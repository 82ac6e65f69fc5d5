use crate::error::{PortError, Result};
use std::io::{Read, Write};

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CodecId {
    Gzip = 0,
    Zlib = 1,
}

pub trait Decompressor: Send + Sync {
    fn id(&self) -> CodecId;
    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64>;
}

pub mod gzip;
pub mod zlib;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Identify the framing of a stored blob from its leading bytes.
pub fn sniff(blob: &[u8]) -> Result<CodecId> {
    match blob {
        [a, b, ..] if [*a, *b] == GZIP_MAGIC => Ok(CodecId::Gzip),
        // RFC 1950: CM=8, header checksum divisible by 31
        [cmf, flg, ..] if cmf & 0x0f == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0 => {
            Ok(CodecId::Zlib)
        }
        _ => Err(PortError::UnknownCodec(blob.iter().take(4).copied().collect())),
    }
}

pub fn decompressor(id: CodecId) -> &'static dyn Decompressor {
    match id {
        CodecId::Gzip => &gzip::GzipCodec,
        CodecId::Zlib => &zlib::ZlibCodec,
    }
}

/// Sniff and inflate a whole blob.
pub fn inflate(blob: &[u8]) -> Result<Vec<u8>> {
    let codec = decompressor(sniff(blob)?);
    let mut out = Vec::with_capacity(blob.len() * 4);
    codec.decompress(&mut &blob[..], &mut out)?;
    Ok(out)
}
