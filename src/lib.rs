//! Self-describing binary message codec for satellite-linked trackers
//!
//! This library implements the tagged-field message format used between a
//! remote tracker and its ground segment over a short-burst-data satellite
//! link, plus the persisted byte image the tracker keeps its settings in.
//! Outbound (Mobile Originated) messages carry a caller-selected subset of
//! the settings record; inbound (Mobile Terminated) messages update the
//! record, field by field, after full-frame validation.
//!
//! # Quick Start
//!
//! ```rust
//! use sbdmsg::{FieldId, SettingsRecord, decode_mt, encode_mo};
//!
//! // The tracker encodes its default tracking fields...
//! let mut tracker = SettingsRecord::default();
//! tracker.lat = 515_074_000; // degrees * 10^-7
//! tracker.lon = -1_278_000;
//! let frame = encode_mo(&tracker, tracker.mo_fields)?;
//!
//! // ...and the ground segment decodes them.
//! let mut ground = SettingsRecord::default();
//! let summary = decode_mt(&frame, &mut ground)?;
//! assert!(summary.fields.contains(&FieldId::Lat));
//! assert_eq!(ground.lat, 515_074_000);
//! # Ok::<(), sbdmsg::Error>(())
//! ```
//!
//! # Features
//!
//! - **Self-describing frames** - every field is tagged, receivers skip
//!   nothing blindly
//! - **Single width dictionary** - encoder and parser share one field table
//! - **All-or-nothing updates** - a frame mutates the settings record only
//!   after its checksum validates
//! - **Fixed persisted layout** - the settings image round-trips bit-exact
//!   across power cycles

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod io;
pub mod protocol;
pub mod settings;

pub use io::{ByteSource, Clock, FrameSink, SettingsStore};
pub use protocol::{
    DecodeSummary, Error, FieldId, FieldKind, FieldSelection, Flags1, Flags2, FrameReceiver,
    MO_LIMIT, MT_LIMIT, Result, RxStatus, UserFunction, decode_mt, encode_mo,
    parse_text_commands,
};
pub use settings::{DynModel, FieldValue, Geofence, IMAGE_LEN, SettingsRecord, UtcTime};

/// Message format version (major.minor, as carried by the SWVER field)
pub const VERSION: &str = "2.1";
