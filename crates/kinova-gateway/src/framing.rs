//! Length-prefixed JSON framing.
//!
//! Every message on the wire is a 4-byte little-endian `u32` length followed
//! by that many bytes of UTF-8 JSON.
//!
//! ```text
//! +----------------+------------------+
//! | Length (4B LE) | JSON Payload     |
//! +----------------+------------------+
//! ```

use std::io::{ErrorKind, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::protocol::{MAX_MESSAGE_SIZE, ProtocolError};

/// Read one frame and return its raw payload.
///
/// Returns `Ok(None)` only when the stream ends before any prefix byte
/// (clean disconnect). A stream that ends inside the prefix or the payload
/// is an IO error.
pub fn read_frame(reader: &mut impl Read) -> Result<Option<Vec<u8>>, ProtocolError> {
    let Some(len_buf) = read_prefix(reader)? else {
        return Ok(None);
    };

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

/// Fill the 4-byte length prefix, telling a zero-byte EOF apart from a
/// truncated prefix.
fn read_prefix(reader: &mut impl Read) -> Result<Option<[u8; 4]>, ProtocolError> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(ProtocolError::Io(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("stream ended after {filled} of 4 length-prefix bytes"),
                )));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(ProtocolError::Io(e)),
        }
    }
    Ok(Some(buf))
}

/// Read one frame and decode it as JSON.
pub fn read_message<T: DeserializeOwned>(
    reader: &mut impl Read,
) -> Result<Option<T>, ProtocolError> {
    match read_frame(reader)? {
        Some(payload) => Ok(Some(serde_json::from_slice(&payload)?)),
        None => Ok(None),
    }
}

/// Serialize `msg`, write the length prefix and payload, then flush.
pub fn write_message<T: Serialize>(writer: &mut impl Write, msg: &T) -> Result<(), ProtocolError> {
    let payload = serde_json::to_vec(msg)?;
    let too_large = || ProtocolError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_MESSAGE_SIZE,
    };

    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(too_large());
    }
    let len = u32::try_from(payload.len()).map_err(|_| too_large())?;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::{Map, Value, json};

    use super::*;
    use crate::protocol::{Operation, Request, Response};

    fn frame(bytes: &[u8]) -> Vec<u8> {
        let mut buf = u32::try_from(bytes.len()).unwrap().to_le_bytes().to_vec();
        buf.extend_from_slice(bytes);
        buf
    }

    #[test]
    fn request_survives_the_wire() {
        let mut data = Map::new();
        data.insert("angle2".into(), json!("344"));
        let req = Request::new(Operation::Angular2Cartesian, data);

        let mut buf = Vec::new();
        write_message(&mut buf, &req).unwrap();
        let back: Request = read_message(&mut Cursor::new(buf)).unwrap().unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn length_prefix_is_little_endian() {
        let mut buf = Vec::new();
        write_message(&mut buf, &Response::ack()).unwrap();
        let payload = br#"{"success":true}"#;
        assert_eq!(&buf[..4], &[16, 0, 0, 0]);
        assert_eq!(&buf[4..], payload);
    }

    #[test]
    fn eof_is_clean_disconnect() {
        let msg: Option<Value> = read_message(&mut Cursor::new(Vec::new())).unwrap();
        assert!(msg.is_none());
    }

    #[test]
    fn truncated_prefix_is_error_not_disconnect() {
        let result = read_frame(&mut Cursor::new(vec![16u8, 0]));
        assert!(matches!(
            result,
            Err(ProtocolError::Io(ref e)) if e.kind() == ErrorKind::UnexpectedEof
        ));
    }

    /// Yields its bytes one at a time, then reports `WouldBlock`.
    struct Trickle {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.bytes.get(self.pos) {
                Some(&b) if !buf.is_empty() => {
                    buf[0] = b;
                    self.pos += 1;
                    Ok(1)
                }
                _ => Err(std::io::Error::from(ErrorKind::WouldBlock)),
            }
        }
    }

    #[test]
    fn would_block_is_not_a_disconnect() {
        let mut idle = Trickle {
            bytes: Vec::new(),
            pos: 0,
        };
        assert!(matches!(
            read_frame(&mut idle),
            Err(ProtocolError::Io(ref e)) if e.kind() == ErrorKind::WouldBlock
        ));
    }

    #[test]
    fn prefix_assembled_from_short_reads() {
        let mut trickle = Trickle {
            bytes: frame(br#"{"op":"info"}"#),
            pos: 0,
        };
        let req: Request = read_message(&mut trickle).unwrap().unwrap();
        assert_eq!(req.op, Operation::Info);
    }

    #[test]
    fn truncated_payload_is_error() {
        let mut buf = frame(br#"{"op":"info"}"#);
        buf.truncate(8);
        let result: Result<Option<Value>, _> = read_message(&mut Cursor::new(buf));
        assert!(matches!(result, Err(ProtocolError::Io(_))));
    }

    #[test]
    fn oversized_prefix_rejected() {
        let len = u32::try_from(MAX_MESSAGE_SIZE + 1).unwrap();
        let buf = len.to_le_bytes().to_vec();
        let result = read_frame(&mut Cursor::new(buf));
        assert!(matches!(
            result,
            Err(ProtocolError::PayloadTooLarge { size, max })
                if size == MAX_MESSAGE_SIZE + 1 && max == MAX_MESSAGE_SIZE
        ));
    }

    #[test]
    fn sequence_of_frames() {
        let mut buf = Vec::new();
        write_message(&mut buf, &Request::new(Operation::Info, Map::new())).unwrap();
        write_message(&mut buf, &Request::close()).unwrap();

        let mut cursor = Cursor::new(buf);
        let a: Request = read_message(&mut cursor).unwrap().unwrap();
        let b: Request = read_message(&mut cursor).unwrap().unwrap();
        let c: Option<Request> = read_message(&mut cursor).unwrap();
        assert_eq!(a.op, Operation::Info);
        assert_eq!(b.op, Operation::Close);
        assert!(c.is_none());
    }

    #[test]
    fn invalid_json_is_error() {
        let buf = frame(b"not json");
        let result: Result<Option<Value>, _> = read_message(&mut Cursor::new(buf));
        assert!(matches!(result, Err(ProtocolError::Json(_))));
    }

    #[test]
    fn raw_frame_keeps_bytes() {
        let buf = frame(b"\x00\x01\x02");
        let payload = read_frame(&mut Cursor::new(buf)).unwrap().unwrap();
        assert_eq!(payload, vec![0, 1, 2]);
    }
}
