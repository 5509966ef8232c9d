//! Protocol error types
//!
//! Every decode/encode failure is an enumerated, recoverable result. Nothing
//! in this crate is fatal: the worst outcome is "configuration unchanged,
//! error reported to the caller".

use thiserror::Error;

/// Codec and settings-image errors
#[derive(Error, Debug)]
pub enum Error {
    /// Frame shorter than the minimum STX + ETX + checksum
    #[error("data too short: got {got} bytes, minimum frame is {min}")]
    DataTooShort {
        /// Bytes available
        got: usize,
        /// Minimum possible frame length
        min: usize,
    },

    /// First byte is not the frame-start marker
    #[error("no STX: first byte is {found:#04x}")]
    NoStx {
        /// Byte found where STX was expected
        found: u8,
    },

    /// A tag inside a frame is not in the field dictionary
    #[error("invalid field tag {tag:#04x} at offset {offset}")]
    InvalidField {
        /// Offending tag byte
        tag: u8,
        /// Byte offset of the tag within the frame
        offset: usize,
    },

    /// The frame ran out of bytes before the frame-end marker
    #[error("no ETX before end of data")]
    NoEtx,

    /// The trailing checksum bytes do not match the frame contents
    #[error(
        "checksum mismatch: expected {expected_a:#04x},{expected_b:#04x}, \
         got {found_a:#04x},{found_b:#04x}"
    )]
    ChecksumError {
        /// Computed checksum byte A
        expected_a: u8,
        /// Computed checksum byte B
        expected_b: u8,
        /// Checksum byte A carried by the frame
        found_a: u8,
        /// Checksum byte B carried by the frame
        found_b: u8,
    },

    /// A field's declared width exceeds the bytes remaining in the frame
    #[error("field {tag:#04x} declares {needed} value bytes but only {remaining} remain")]
    DataWidthInvalid {
        /// Tag whose value was truncated
        tag: u8,
        /// Declared width
        needed: usize,
        /// Bytes left in the frame
        remaining: usize,
    },

    /// A tag looked up in the field dictionary is absent from it
    #[error("unknown field tag {tag:#04x}")]
    UnknownField {
        /// Tag not present in the dictionary
        tag: u8,
    },

    /// A command-channel field name is absent from the dictionary
    #[error("unknown field name {name:?}")]
    UnknownFieldName {
        /// Name not present in the dictionary
        name: String,
    },

    /// A command-channel value failed validation for its field
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field the value was destined for
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// The persisted settings image failed guard-byte or checksum validation
    #[error("corrupt settings image: {reason}")]
    CorruptImage {
        /// Which validation failed
        reason: &'static str,
    },

    /// An encoded message would exceed the direction's length limit
    #[error("message too long: {size} bytes (limit {limit})")]
    MessageTooLong {
        /// Encoded size
        size: usize,
        /// Applicable length limit
        limit: usize,
    },

    /// A persistence collaborator failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
