//! Fixed-size frame codec
//!
//! Every transmission in either direction is exactly [`FRAME_SIZE`] bytes:
//!
//! ```text
//! [header: i32 LE][payload ... zero padding]
//! ```
//!
//! Requests carry an [`Opcode`] in the header, responses a [`ResponseStatus`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use weightmap_core::{Result, WeightMapError};

use crate::packets::{Opcode, ResponseStatus};

/// Bytes per frame, shared with the server's `BUFFER_SIZE`
pub const FRAME_SIZE: usize = 1024;

/// Bytes taken by the status/opcode header
pub const HEADER_SIZE: usize = 4;

/// Payload bytes available in one frame
pub const PAYLOAD_CAPACITY: usize = FRAME_SIZE - HEADER_SIZE;

/// A parsed frame: raw header value plus the bytes after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: i32,
    pub payload: Bytes,
}

impl Frame {
    /// Split received bytes into header and payload
    ///
    /// The payload is whatever follows the header, trimmed to the bytes
    /// actually received.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = read_header(data)?;
        Ok(Self {
            header,
            payload: Bytes::copy_from_slice(&data[HEADER_SIZE..]),
        })
    }

    pub fn status(&self) -> Option<ResponseStatus> {
        ResponseStatus::from_i32(self.header)
    }

}

/// Read the little-endian header from the start of a buffer
pub fn read_header(data: &[u8]) -> Result<i32> {
    if data.len() < HEADER_SIZE {
        return Err(WeightMapError::Decode(format!(
            "frame too short for header: {} bytes",
            data.len()
        )));
    }
    let mut buf = data;
    Ok(buf.get_i32_le())
}

/// Build a full frame from a header value and payload
///
/// Fails with `ProtocolOverflow` instead of truncating when the payload does
/// not fit.
pub fn encode_frame(header: i32, payload: &[u8]) -> Result<BytesMut> {
    let needed = HEADER_SIZE + payload.len();
    if needed > FRAME_SIZE {
        return Err(WeightMapError::ProtocolOverflow {
            needed,
            capacity: FRAME_SIZE,
        });
    }

    let mut buf = BytesMut::with_capacity(FRAME_SIZE);
    buf.put_i32_le(header);
    buf.put_slice(payload);
    buf.resize(FRAME_SIZE, 0);
    Ok(buf)
}

/// Build a request frame for `opcode`
#[inline]
pub fn encode_request(opcode: Opcode, payload: &[u8]) -> Result<BytesMut> {
    encode_frame(opcode.as_i32(), payload)
}

/// The frame a client sends after each `CONTINUE` response
pub fn ack_frame() -> BytesMut {
    let mut buf = BytesMut::with_capacity(FRAME_SIZE);
    buf.put_i32_le(ResponseStatus::Acknowledge.as_i32());
    buf.resize(FRAME_SIZE, 0);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_layout() {
        let frame = encode_request(Opcode::SetWeight, &[1, 0, 0, 0, 2, 0, 0, 0]).unwrap();
        assert_eq!(frame.len(), FRAME_SIZE);
        assert_eq!(&frame[..4], &9i32.to_le_bytes());
        assert_eq!(&frame[4..12], &[1, 0, 0, 0, 2, 0, 0, 0]);
        assert!(frame[12..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_payload_exactly_fills_frame() {
        let payload = vec![0xAB; PAYLOAD_CAPACITY];
        let frame = encode_request(Opcode::GetPath, &payload).unwrap();
        assert_eq!(frame.len(), FRAME_SIZE);
        assert_eq!(frame[FRAME_SIZE - 1], 0xAB);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let payload = vec![0u8; PAYLOAD_CAPACITY + 1];
        match encode_request(Opcode::GetPath, &payload) {
            Err(WeightMapError::ProtocolOverflow { needed, capacity }) => {
                assert_eq!(needed, FRAME_SIZE + 1);
                assert_eq!(capacity, FRAME_SIZE);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_ack_frame() {
        let ack = ack_frame();
        assert_eq!(ack.len(), FRAME_SIZE);
        assert_eq!(read_header(&ack).unwrap(), 4);
        assert!(ack[HEADER_SIZE..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_parse_trims_to_received() {
        let mut data = 1i32.to_le_bytes().to_vec();
        data.extend_from_slice(b"bad arg");
        let frame = Frame::parse(&data).unwrap();
        assert_eq!(frame.status(), Some(ResponseStatus::Failure));
        assert_eq!(&frame.payload[..], b"bad arg");
    }

    #[test]
    fn test_parse_negative_header() {
        let frame = Frame::parse(&(-7i32).to_le_bytes()).unwrap();
        assert_eq!(frame.header, -7);
        assert_eq!(frame.status(), None);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_short_frame() {
        assert!(matches!(Frame::parse(&[0, 0]), Err(WeightMapError::Decode(_))));
    }
}
