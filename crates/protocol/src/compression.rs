//! Compression layer for response payloads

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use weightmap_core::{Result, WeightMapError};

/// Compress data with zlib, as the server does for `GET_WEIGHTS`
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| WeightMapError::Decode(format!("Failed to compress payload: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| WeightMapError::Decode(format!("Failed to finish compression: {}", e)))
}

/// Decompress a zlib stream
///
/// Bytes after the end of the stream (frame padding) are ignored.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| WeightMapError::Decode(format!("Failed to decompress payload: {}", e)))?;
    Ok(decompressed)
}
