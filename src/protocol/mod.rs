//! Tracker message protocol core
//!
//! This module provides the field dictionary, wire framing, checksum, and
//! codec for Mobile Originated (MO) and Mobile Terminated (MT) messages.

mod checksum;
mod encoder;
mod error;
mod fields;
mod parser;
mod receiver;
mod selection;

pub use checksum::Checksum;
pub use encoder::encode_mo;
pub use error::{Error, Result};
pub use fields::{FieldId, FieldKind, width_of};
pub use parser::{DecodeSummary, UserFunction, decode_mt, parse_text_commands};
pub use receiver::{FrameReceiver, RX_IDLE_TIMEOUT, RX_OVERALL_TIMEOUT, RxStatus};
pub use selection::{FieldSelection, Flags1, Flags2};

/// Frame-start sentinel byte (ASCII STX)
pub const STX: u8 = 0x02;

/// Frame-end sentinel byte (ASCII ETX)
pub const ETX: u8 = 0x03;

/// Length limit for a Mobile Originated (outbound) message
pub const MO_LIMIT: usize = 340;

/// Length limit for a Mobile Terminated (inbound) message
pub const MT_LIMIT: usize = 270;

/// Checksum size in bytes (running sums A and B)
pub const CHECKSUM_SIZE: usize = 2;

/// Minimum possible frame: STX + ETX + two checksum bytes
pub const MIN_FRAME_SIZE: usize = 2 + CHECKSUM_SIZE;
