//! Broadcast frame marshaling and unmarshaling.
//!
//! A frame is one self-contained datagram: preamble, reserved flag, sender
//! uid, authentication tag, counter, the two length bytes, the topic and
//! message bytes, and the end-of-broadcast marker. All offsets here derive
//! from field sizes; nothing indexes the buffer with literal positions.
//!
//! The codec never touches the crypto layer. The tag travels through it as
//! an opaque 16-byte field, computed and checked elsewhere.

use crate::error::FrameError;
use crate::protocol::constants::{
    END_OF_BROADCAST, FLAG_RESERVED, FRAME_OVERHEAD, MAC_LEN, PREAMBLE,
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::io::{Cursor, Read};

/// One vispr broadcast datagram in decoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Sender identity.
    pub uid: u16,
    /// Authentication tag over flag, uid, counter, topic and message.
    pub tag: [u8; MAC_LEN],
    /// Anti-replay counter; matches the value the tag was computed with.
    pub counter: u64,
    /// Topic string, at most 255 bytes on the wire.
    pub topic: String,
    /// Message payload, at most 255 bytes on the wire.
    pub message: Bytes,
}

impl Frame {
    /// Number of bytes [`marshal`](Self::marshal) will produce for this frame.
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.topic.len() + self.message.len()
    }

    /// Encodes the frame into a fresh datagram buffer.
    ///
    /// Fails with [`FrameError::FieldTooLong`] if the topic or message does
    /// not fit its one-byte length field.
    pub fn marshal(&self) -> Result<Vec<u8>, FrameError> {
        let topic_len = u8::try_from(self.topic.len())
            .map_err(|_| FrameError::FieldTooLong(self.topic.len()))?;
        let message_len = u8::try_from(self.message.len())
            .map_err(|_| FrameError::FieldTooLong(self.message.len()))?;

        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.write_u8(PREAMBLE)?;
        buf.write_u8(FLAG_RESERVED)?;
        buf.write_u16::<LittleEndian>(self.uid)?;
        buf.extend_from_slice(&self.tag);
        buf.write_u64::<LittleEndian>(self.counter)?;
        buf.write_u8(topic_len)?;
        buf.write_u8(message_len)?;
        buf.extend_from_slice(self.topic.as_bytes());
        buf.extend_from_slice(&self.message);
        buf.write_u8(END_OF_BROADCAST)?;

        Ok(buf)
    }

    /// Decodes one datagram into a frame.
    ///
    /// Validates the preamble, the end marker and that the datagram length
    /// agrees exactly with the two declared field lengths, so trailing or
    /// missing bytes are rejected. The reserved flag byte is read and
    /// ignored; listeners stay compatible if a future sender assigns it a
    /// meaning. The tag is surfaced as-is, not verified.
    pub fn unmarshal(data: &[u8]) -> Result<Self, FrameError> {
        let mut cursor = Cursor::new(data);

        let preamble = cursor.read_u8()?;
        if preamble != PREAMBLE {
            return Err(FrameError::BadPreamble(preamble));
        }

        // Reserved flag byte
        let _flag = cursor.read_u8()?;

        let uid = cursor.read_u16::<LittleEndian>()?;

        let mut tag = [0u8; MAC_LEN];
        cursor.read_exact(&mut tag)?;

        let counter = cursor.read_u64::<LittleEndian>()?;

        let topic_len = cursor.read_u8()? as usize;
        let message_len = cursor.read_u8()? as usize;

        // Both lengths come from one-byte fields, so the reads below
        // allocate at most 255 bytes each
        let expected = FRAME_OVERHEAD + topic_len + message_len;
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        let mut topic_bytes = vec![0u8; topic_len];
        cursor.read_exact(&mut topic_bytes)?;
        let topic = String::from_utf8(topic_bytes).map_err(|_| FrameError::TopicNotUtf8)?;

        let mut message = vec![0u8; message_len];
        cursor.read_exact(&mut message)?;

        let end = cursor.read_u8()?;
        if end != END_OF_BROADCAST {
            return Err(FrameError::BadEndMarker(end));
        }

        Ok(Self {
            uid,
            tag,
            counter,
            topic,
            message: Bytes::from(message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::MAX_MESSAGE_LEN;
    use crate::protocol::{crypto, mac};

    fn sample_frame() -> Frame {
        Frame {
            uid: 7,
            tag: [0xAB; MAC_LEN],
            counter: 100,
            topic: "sensors/temp".to_string(),
            message: Bytes::from_static(b"23.5C"),
        }
    }

    #[test]
    fn roundtrip_recovers_all_fields() {
        let frame = sample_frame();
        let encoded = frame.marshal().unwrap();
        assert_eq!(encoded.len(), frame.encoded_len());

        let decoded = Frame::unmarshal(&encoded).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn roundtrip_at_every_message_length() {
        for len in 0..=MAX_MESSAGE_LEN {
            let frame = Frame {
                message: Bytes::from(vec![0x42; len]),
                ..sample_frame()
            };
            let decoded = Frame::unmarshal(&frame.marshal().unwrap()).unwrap();
            assert_eq!(decoded.message.len(), len);
            assert_eq!(decoded, frame);
        }
    }

    #[test]
    fn wire_layout_matches_contract() {
        let key = b"0123456789ABCDEF";
        let tag = mac::compute_tag(key, 7, 100, "sensors/temp", b"23.5C").unwrap();
        let frame = Frame {
            uid: 7,
            tag,
            counter: 100,
            topic: "sensors/temp".to_string(),
            message: Bytes::from_static(b"23.5C"),
        };

        let encoded = frame.marshal().unwrap();
        assert_eq!(encoded[0], 0xEF);
        assert_eq!(encoded[1], 0x00);
        assert_eq!(encoded[2..4], [7, 0]);
        assert_eq!(encoded[20..28], [100, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encoded[28], 12);
        assert_eq!(encoded[29], 5);
        assert_eq!(*encoded.last().unwrap(), 0xFE);

        let mut preimage = vec![0x00u8, 7, 0, 100, 0, 0, 0, 0, 0, 0, 0];
        preimage.extend_from_slice(b"sensors/temp");
        preimage.extend_from_slice(b"23.5C");
        let expected_tag = crypto::encrypt(key, &crypto::digest(&preimage)).unwrap();
        assert_eq!(encoded[4..20], expected_tag[..]);
    }

    #[test]
    fn bad_preamble_is_rejected() {
        let mut encoded = sample_frame().marshal().unwrap();
        encoded[0] = 0xEE;
        assert!(matches!(
            Frame::unmarshal(&encoded),
            Err(FrameError::BadPreamble(0xEE))
        ));
    }

    #[test]
    fn bad_end_marker_is_rejected() {
        let mut encoded = sample_frame().marshal().unwrap();
        let last = encoded.len() - 1;
        encoded[last] = 0x00;
        assert!(matches!(
            Frame::unmarshal(&encoded),
            Err(FrameError::BadEndMarker(0x00))
        ));
    }

    #[test]
    fn reserved_flag_value_is_tolerated() {
        let mut encoded = sample_frame().marshal().unwrap();
        encoded[1] = 0x01;
        let decoded = Frame::unmarshal(&encoded).unwrap();
        assert_eq!(decoded.uid, 7);
    }

    #[test]
    fn truncated_header_is_rejected() {
        let encoded = sample_frame().marshal().unwrap();
        assert!(matches!(
            Frame::unmarshal(&encoded[..10]),
            Err(FrameError::UnexpectedEof)
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut encoded = sample_frame().marshal().unwrap();
        encoded.push(0x00);
        let expected = encoded.len() - 1;
        assert!(matches!(
            Frame::unmarshal(&encoded),
            Err(FrameError::LengthMismatch { expected: e, actual: a })
                if e == expected && a == expected + 1
        ));
    }

    #[test]
    fn declared_lengths_must_account_for_every_byte() {
        let mut encoded = sample_frame().marshal().unwrap();
        // Claim one message byte fewer than the datagram carries
        encoded[29] -= 1;
        assert!(matches!(
            Frame::unmarshal(&encoded),
            Err(FrameError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn oversized_fields_do_not_marshal() {
        let frame = Frame {
            topic: "t".repeat(300),
            ..sample_frame()
        };
        assert!(matches!(
            frame.marshal(),
            Err(FrameError::FieldTooLong(300))
        ));

        let frame = Frame {
            message: Bytes::from(vec![0u8; 256]),
            ..sample_frame()
        };
        assert!(matches!(
            frame.marshal(),
            Err(FrameError::FieldTooLong(256))
        ));
    }

    #[test]
    fn invalid_topic_utf8_is_rejected() {
        let frame = Frame {
            topic: "abcde".to_string(),
            ..sample_frame()
        };
        let mut encoded = frame.marshal().unwrap();
        // Topic bytes start right after the fixed header
        encoded[30] = 0xFF;
        encoded[31] = 0xFE;
        assert!(matches!(
            Frame::unmarshal(&encoded),
            Err(FrameError::TopicNotUtf8)
        ));
    }
}
