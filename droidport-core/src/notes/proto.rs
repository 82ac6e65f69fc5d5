//! Subset of the notes app's document protobuf needed to recover plain text.
//! Unknown fields (formatting runs, attachments) are skipped by the decoder.

use prost::Message;

use crate::error::{PortError, Result};

#[derive(Clone, PartialEq, Message)]
pub struct NoteStoreProto {
    #[prost(message, optional, tag = "2")]
    pub document: Option<Document>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Document {
    #[prost(int32, tag = "2")]
    pub version: i32,
    #[prost(message, optional, tag = "3")]
    pub note: Option<NoteBody>,
}

#[derive(Clone, PartialEq, Message)]
pub struct NoteBody {
    #[prost(string, tag = "2")]
    pub note_text: String,
}

#[cfg(test)]
impl NoteStoreProto {
    pub(crate) fn with_text(text: &str) -> Self {
        Self {
            document: Some(Document {
                version: 1,
                note: Some(NoteBody {
                    note_text: text.to_string(),
                }),
            }),
        }
    }
}

/// Plain text carried by an inflated note blob.
pub fn note_text(inflated: &[u8]) -> Result<String> {
    let proto = NoteStoreProto::decode(inflated)
        .map_err(|e| PortError::Decode(format!("note protobuf: {e}")))?;
    proto
        .document
        .and_then(|d| d.note)
        .map(|n| n.note_text)
        .ok_or_else(|| PortError::Decode("note protobuf has no note body".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text() {
        let bytes = NoteStoreProto::with_text("milk\neggs").encode_to_vec();
        assert_eq!(note_text(&bytes).unwrap(), "milk\neggs");
    }

    #[test]
    fn missing_body_is_an_error() {
        let bytes = NoteStoreProto { document: None }.encode_to_vec();
        assert!(note_text(&bytes).is_err());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(note_text(&[0xff, 0xff, 0xff, 0xff]).is_err());
    }
}
