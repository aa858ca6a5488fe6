//! Value formats for stored entries.
//!
//! A backend stores opaque bytes; the [`Format`] it reports decides how a
//! [`StoredResponse`] becomes those bytes and back.
//!
//! | format            | crate        | notes                          |
//! |-------------------|--------------|--------------------------------|
//! | [`JsonFormat`]    | `serde_json` | default, human readable        |
//! | [`BincodeFormat`] | `bincode`    | compact, schema-less binary    |

use plin_core::{Raw, StoredResponse};
use thiserror::Error;

mod bincode;
mod json;

pub use self::bincode::BincodeFormat;
pub use self::json::JsonFormat;

/// Serialization or deserialization failure.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Value could not be encoded.
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    /// Bytes could not be decoded into a value.
    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),
}

/// Unique identifier for format types, used to compare format equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTypeId {
    /// [`JsonFormat`]
    Json,
    /// [`BincodeFormat`]
    Bincode,
    /// For user-defined custom formats. The string should be a unique identifier.
    Custom(&'static str),
}

/// Encoding of stored entries.
pub trait Format: std::fmt::Debug + Send + Sync {
    /// Encodes a stored response.
    fn serialize(&self, value: &StoredResponse) -> Result<Raw, FormatError>;

    /// Decodes a stored response.
    fn deserialize(&self, data: &[u8]) -> Result<StoredResponse, FormatError>;

    /// Clone this format into a box.
    fn clone_box(&self) -> Box<dyn Format>;

    /// Identifier used to compare formats.
    fn format_type_id(&self) -> FormatTypeId;
}

impl Clone for Box<dyn Format> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Format for Box<dyn Format> {
    fn serialize(&self, value: &StoredResponse) -> Result<Raw, FormatError> {
        (**self).serialize(value)
    }

    fn deserialize(&self, data: &[u8]) -> Result<StoredResponse, FormatError> {
        (**self).deserialize(data)
    }

    fn clone_box(&self) -> Box<dyn Format> {
        (**self).clone_box()
    }

    fn format_type_id(&self) -> FormatTypeId {
        (**self).format_type_id()
    }
}
