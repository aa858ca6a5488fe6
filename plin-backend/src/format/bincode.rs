use ::bincode::config::standard;
use ::bincode::serde::{decode_from_slice, encode_to_vec};
use bytes::Bytes;
use plin_core::{Raw, StoredResponse};

use super::{Format, FormatError, FormatTypeId};

/// Bincode format
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeFormat;

impl Format for BincodeFormat {
    fn serialize(&self, value: &StoredResponse) -> Result<Raw, FormatError> {
        encode_to_vec(value, standard())
            .map(Bytes::from)
            .map_err(|e| FormatError::Serialize(Box::new(e)))
    }

    fn deserialize(&self, data: &[u8]) -> Result<StoredResponse, FormatError> {
        decode_from_slice(data, standard())
            .map(|(value, _)| value)
            .map_err(|e| FormatError::Deserialize(Box::new(e)))
    }

    fn clone_box(&self) -> Box<dyn Format> {
        Box::new(*self)
    }

    fn format_type_id(&self) -> FormatTypeId {
        FormatTypeId::Bincode
    }
}
