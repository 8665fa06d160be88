//! Protobuf body of a frame.
//!
//! # Format
//!
//! ```text
//! message CastMessage {
//!   required ProtocolVersion protocol_version = 1;
//!   required string source_id = 2;
//!   required string destination_id = 3;
//!   required string namespace = 4;
//!   required PayloadType payload_type = 5;
//!   optional string payload_utf8 = 6;
//!   optional bytes payload_binary = 7;
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use prost::Message;

use crate::error::{Error, Result};

use super::Envelope;

// ============================================================================
// Enums
// ============================================================================

/// Protocol revision tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ProtocolVersion {
    /// CASTV2_1_0, the only revision in use.
    Castv210 = 0,
}

/// Payload encoding of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PayloadType {
    /// UTF-8 text in `payload_utf8`.
    String = 0,
    /// Raw bytes in `payload_binary`.
    Binary = 1,
}

// ============================================================================
// CastMessage
// ============================================================================

/// One message on the wire, without its length prefix.
#[derive(Clone, PartialEq, Message)]
pub struct CastMessage {
    /// Protocol revision.
    #[prost(enumeration = "ProtocolVersion", required, tag = "1")]
    pub protocol_version: i32,

    /// Sender id.
    #[prost(string, required, tag = "2")]
    pub source_id: String,

    /// Destination id.
    #[prost(string, required, tag = "3")]
    pub destination_id: String,

    /// Namespace of the handler.
    #[prost(string, required, tag = "4")]
    pub namespace: String,

    /// Which payload field is populated.
    #[prost(enumeration = "PayloadType", required, tag = "5")]
    pub payload_type: i32,

    /// Text payload.
    #[prost(string, optional, tag = "6")]
    pub payload_utf8: Option<String>,

    /// Binary payload.
    #[prost(bytes = "vec", optional, tag = "7")]
    pub payload_binary: Option<Vec<u8>>,
}

impl CastMessage {
    /// Builds a STRING message for the given envelope.
    #[must_use]
    pub fn text(envelope: &Envelope, payload: impl Into<String>) -> Self {
        Self {
            protocol_version: ProtocolVersion::Castv210 as i32,
            source_id: envelope.source().to_string(),
            destination_id: envelope.destination().to_string(),
            namespace: envelope.namespace().to_string(),
            payload_type: PayloadType::String as i32,
            payload_utf8: Some(payload.into()),
            payload_binary: None,
        }
    }

    /// Returns the envelope of this message.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        Envelope::new(
            self.source_id.clone(),
            self.destination_id.clone(),
            self.namespace.clone(),
        )
    }

    /// Splits into envelope and text payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] for binary or missing payloads.
    pub fn into_parts(self) -> Result<(Envelope, String)> {
        let envelope = self.envelope();

        match PayloadType::try_from(self.payload_type) {
            Ok(PayloadType::String) => {}
            Ok(PayloadType::Binary) => {
                return Err(Error::malformed_frame(format!(
                    "binary payload on {}",
                    envelope.namespace()
                )));
            }
            Err(_) => {
                return Err(Error::malformed_frame(format!(
                    "unknown payload type {}",
                    self.payload_type
                )));
            }
        }

        let payload = self
            .payload_utf8
            .ok_or_else(|| Error::malformed_frame("missing payload_utf8"))?;

        Ok((envelope, payload))
    }

    /// Encodes the body.
    #[inline]
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Decodes a body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] if the bytes are not a valid message.
    pub fn from_bytes(body: &[u8]) -> Result<Self> {
        Self::decode(body).map_err(|e| Error::malformed_frame(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_bytes() {
        let env = Envelope::new("sender-0", "receiver-0", "ns");
        let bytes = CastMessage::text(&env, "{}").to_bytes();

        let mut expected = vec![0x08, 0x00];
        expected.extend_from_slice(&[0x12, 8]);
        expected.extend_from_slice(b"sender-0");
        expected.extend_from_slice(&[0x1a, 10]);
        expected.extend_from_slice(b"receiver-0");
        expected.extend_from_slice(&[0x22, 2]);
        expected.extend_from_slice(b"ns");
        expected.extend_from_slice(&[0x28, 0x00]);
        expected.extend_from_slice(&[0x32, 2]);
        expected.extend_from_slice(b"{}");

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_into_parts() {
        let env = Envelope::new("a", "b", "c");
        let (parsed, payload) = CastMessage::text(&env, "hello")
            .into_parts()
            .expect("string payload");

        assert_eq!(parsed, env);
        assert_eq!(payload, "hello");
    }

    #[test]
    fn test_binary_payload_rejected() {
        let env = Envelope::new("a", "b", "c");
        let mut message = CastMessage::text(&env, "");
        message.payload_type = PayloadType::Binary as i32;
        message.payload_utf8 = None;
        message.payload_binary = Some(vec![1, 2, 3]);

        let err = message.into_parts().unwrap_err();
        assert!(err.is_frame_error());
    }

    #[test]
    fn test_missing_payload_rejected() {
        let env = Envelope::new("a", "b", "c");
        let mut message = CastMessage::text(&env, "");
        message.payload_utf8 = None;

        assert!(matches!(
            message.into_parts(),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_garbage_body_rejected() {
        let result = CastMessage::from_bytes(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(Error::MalformedFrame { .. })));
    }
}
