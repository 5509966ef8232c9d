//! MO message encoder
//!
//! Serializes a caller-chosen subset of the settings record into a framed
//! binary message: `[STX][tag,value]*[ETX][csumA][csumB]`. Field order
//! follows the selection binding table, value bytes go out least-significant
//! byte first, and widths come from the field dictionary via the shared
//! value model.

use tracing::{debug, trace};

use super::{CHECKSUM_SIZE, Checksum, ETX, Error, FieldSelection, MO_LIMIT, Result, STX};
use crate::settings::SettingsRecord;

/// Encode an MO message carrying the selected fields.
///
/// The empty selection encodes to exactly `[STX][ETX][csumA][csumB]`.
///
/// # Errors
///
/// Returns [`Error::MessageTooLong`] if the framed message would exceed the
/// outbound limit; the caller must drop fields from the selection rather
/// than rely on truncation.
pub fn encode_mo(settings: &SettingsRecord, selection: FieldSelection) -> Result<Vec<u8>> {
    encode_mo_limited(settings, selection, MO_LIMIT)
}

pub(crate) fn encode_mo_limited(
    settings: &SettingsRecord,
    selection: FieldSelection,
    limit: usize,
) -> Result<Vec<u8>> {
    let mut frame = Vec::with_capacity(limit.min(MO_LIMIT));
    frame.push(STX);
    for field in selection.iter() {
        // Every selectable field has a value in the record.
        let Some(value) = settings.value_of(field) else {
            continue;
        };
        frame.push(field.as_u8());
        value.encode_into(&mut frame);
        trace!(%field, "encoded MO field");
    }
    frame.push(ETX);

    let total = frame.len() + CHECKSUM_SIZE;
    if total > limit {
        debug!(size = total, limit, "MO message over length limit");
        return Err(Error::MessageTooLong { size: total, limit });
    }

    let cs = Checksum::over(&frame);
    frame.extend_from_slice(&cs.bytes());
    debug!(bytes = frame.len(), fields = selection.len(), "encoded MO message");
    Ok(frame)
}
