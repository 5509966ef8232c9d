//! MT message and command parser
//!
//! Decodes an assembled inbound frame, or a textual `NAME=VALUE` command
//! stream from a local channel, into the settings record. Both paths consult
//! the same field dictionary. A frame mutates the record only after the
//! whole frame has validated, so any failure leaves the configuration
//! untouched.

use tracing::{debug, warn};

use super::{ETX, Error, FieldId, FieldKind, MIN_FRAME_SIZE, MT_LIMIT, Result, STX};
use crate::protocol::Checksum;
use crate::settings::{FieldValue, SettingsRecord};

/// A user-function trigger carried by an MT message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UserFunction {
    /// Trigger 1, no argument
    Func1,
    /// Trigger 2, no argument
    Func2,
    /// Trigger 3, no argument
    Func3,
    /// Trigger 4, no argument
    Func4,
    /// Trigger 5 with its 16-bit argument
    Func5(u16),
    /// Trigger 6 with its 16-bit argument
    Func6(u16),
    /// Trigger 7 with its 32-bit argument
    Func7(u32),
    /// Trigger 8 with its 32-bit argument
    Func8(u32),
}

/// What a successful decode did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Fields whose values were stored into the settings record, in frame
    /// order.
    pub fields: Vec<FieldId>,
    /// User-function triggers to be dispatched by the application.
    pub user_functions: Vec<UserFunction>,
}

enum Scanned {
    Store(FieldId, FieldValue),
    Trigger(UserFunction),
    Skip,
}

/// Decode a complete binary MT frame and store its fields.
///
/// Runs the validation ladder in order: inbound length limit, minimum frame
/// length, frame-start marker, per-field dictionary and width checks,
/// frame-end marker, checksum. The record is updated only when every step
/// passes; trailing bytes after the checksum are ignored (the gateway may
/// pad).
pub fn decode_mt(bytes: &[u8], settings: &mut SettingsRecord) -> Result<DecodeSummary> {
    if bytes.len() > MT_LIMIT {
        return Err(Error::MessageTooLong {
            size: bytes.len(),
            limit: MT_LIMIT,
        });
    }
    if bytes.len() < MIN_FRAME_SIZE {
        return Err(Error::DataTooShort {
            got: bytes.len(),
            min: MIN_FRAME_SIZE,
        });
    }
    if bytes[0] != STX {
        return Err(Error::NoStx { found: bytes[0] });
    }

    let mut staged = Vec::new();
    let mut summary = DecodeSummary::default();
    let mut offset = 1;
    let etx_offset = loop {
        if offset >= bytes.len() {
            warn!("frame ended without ETX");
            return Err(Error::NoEtx);
        }
        let tag = bytes[offset];
        if tag == ETX {
            break offset;
        }
        let field = FieldId::from_u8(tag).ok_or(Error::InvalidField { tag, offset })?;
        let width = field.width();
        offset += 1;
        let remaining = bytes.len() - offset;
        if remaining < width {
            return Err(Error::DataWidthInvalid {
                tag,
                needed: width,
                remaining,
            });
        }
        match scan_field(field, &bytes[offset..offset + width])? {
            Scanned::Store(field, value) => staged.push((field, value)),
            Scanned::Trigger(func) => summary.user_functions.push(func),
            Scanned::Skip => {}
        }
        offset += width;
    };

    let checksum_end = etx_offset + 1 + super::CHECKSUM_SIZE;
    if bytes.len() < checksum_end {
        return Err(Error::DataTooShort {
            got: bytes.len(),
            min: checksum_end,
        });
    }
    let body = &bytes[..=etx_offset];
    let expected = Checksum::over(body).bytes();
    let found = [bytes[etx_offset + 1], bytes[etx_offset + 2]];
    if expected != found {
        warn!(
            expected_a = expected[0],
            expected_b = expected[1],
            found_a = found[0],
            found_b = found[1],
            "frame checksum mismatch"
        );
        return Err(Error::ChecksumError {
            expected_a: expected[0],
            expected_b: expected[1],
            found_a: found[0],
            found_b: found[1],
        });
    }

    commit(settings, staged, &mut summary)?;
    debug!(
        fields = summary.fields.len(),
        triggers = summary.user_functions.len(),
        "decoded MT frame"
    );
    Ok(summary)
}

fn scan_field(field: FieldId, value_bytes: &[u8]) -> Result<Scanned> {
    let scanned = match field {
        // A stray STX inside the frame carries no payload; the gateway
        // routing header is consumed and discarded.
        FieldId::Stx | FieldId::RbHead => Scanned::Skip,
        FieldId::UserFunc1 => Scanned::Trigger(UserFunction::Func1),
        FieldId::UserFunc2 => Scanned::Trigger(UserFunction::Func2),
        FieldId::UserFunc3 => Scanned::Trigger(UserFunction::Func3),
        FieldId::UserFunc4 => Scanned::Trigger(UserFunction::Func4),
        FieldId::UserFunc5 | FieldId::UserFunc6 => {
            let arg = u16::from_le_bytes([value_bytes[0], value_bytes[1]]);
            Scanned::Trigger(if field == FieldId::UserFunc5 {
                UserFunction::Func5(arg)
            } else {
                UserFunction::Func6(arg)
            })
        }
        FieldId::UserFunc7 | FieldId::UserFunc8 => {
            let arg = u32::from_le_bytes([
                value_bytes[0],
                value_bytes[1],
                value_bytes[2],
                value_bytes[3],
            ]);
            Scanned::Trigger(if field == FieldId::UserFunc7 {
                UserFunction::Func7(arg)
            } else {
                UserFunction::Func8(arg)
            })
        }
        _ => {
            let value = FieldValue::decode(field.kind(), value_bytes).ok_or(
                Error::DataWidthInvalid {
                    tag: field.as_u8(),
                    needed: field.width(),
                    remaining: value_bytes.len(),
                },
            )?;
            Scanned::Store(field, value)
        }
    };
    Ok(scanned)
}

// Apply staged fields through a scratch copy so a validation failure leaves
// the live record untouched.
fn commit(
    settings: &mut SettingsRecord,
    staged: Vec<(FieldId, FieldValue)>,
    summary: &mut DecodeSummary,
) -> Result<()> {
    let mut updated = settings.clone();
    for (field, value) in staged {
        updated.apply(field, value)?;
        summary.fields.push(field);
    }
    *settings = updated;
    Ok(())
}

/// Parse a textual command stream from the local channel.
///
/// Commands are `NAME=VALUE` entries separated by newlines or semicolons;
/// names come from the field dictionary and are case-insensitive. User
/// function triggers may appear bare (`USERFUNC1`) or with their argument
/// (`USERFUNC5=17`). There is no framing or checksum, but the inbound length
/// limit still applies and unknown names are rejected.
pub fn parse_text_commands(input: &str, settings: &mut SettingsRecord) -> Result<DecodeSummary> {
    if input.len() > MT_LIMIT {
        return Err(Error::MessageTooLong {
            size: input.len(),
            limit: MT_LIMIT,
        });
    }

    let mut staged = Vec::new();
    let mut summary = DecodeSummary::default();
    for entry in input.split(['\n', '\r', ';']) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (name, value_text) = match entry.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value)),
            None => (entry, None),
        };
        let field = FieldId::from_name(name).ok_or_else(|| Error::UnknownFieldName {
            name: name.to_string(),
        })?;
        match (field.kind(), value_text) {
            // Bare user-function triggers.
            (FieldKind::Marker, None) => match trigger_without_arg(field) {
                Some(func) => summary.user_functions.push(func),
                None => {
                    return Err(Error::InvalidValue {
                        field: field.name(),
                        reason: "not a command".to_string(),
                    });
                }
            },
            (_, None) => {
                return Err(Error::InvalidValue {
                    field: field.name(),
                    reason: "missing value".to_string(),
                });
            }
            (_, Some(text)) => match field {
                FieldId::UserFunc5 | FieldId::UserFunc6 | FieldId::UserFunc7
                | FieldId::UserFunc8 => {
                    let value = FieldValue::parse_text(field, text)?;
                    let mut bytes = Vec::with_capacity(4);
                    value.encode_into(&mut bytes);
                    match scan_field(field, &bytes)? {
                        Scanned::Trigger(func) => summary.user_functions.push(func),
                        _ => unreachable!("user function scan always triggers"),
                    }
                }
                _ => {
                    let value = FieldValue::parse_text(field, text)?;
                    staged.push((field, value));
                }
            },
        }
    }

    commit(settings, staged, &mut summary)?;
    debug!(
        fields = summary.fields.len(),
        triggers = summary.user_functions.len(),
        "applied text commands"
    );
    Ok(summary)
}

fn trigger_without_arg(field: FieldId) -> Option<UserFunction> {
    match field {
        FieldId::UserFunc1 => Some(UserFunction::Func1),
        FieldId::UserFunc2 => Some(UserFunction::Func2),
        FieldId::UserFunc3 => Some(UserFunction::Func3),
        FieldId::UserFunc4 => Some(UserFunction::Func4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FieldSelection, encode_mo};

    fn frame(fields: &[(u8, &[u8])]) -> Vec<u8> {
        let mut f = vec![STX];
        for &(tag, value) in fields {
            f.push(tag);
            f.extend_from_slice(value);
        }
        f.push(ETX);
        let cs = Checksum::over(&f);
        f.extend_from_slice(&cs.bytes());
        f
    }

    #[test]
    fn decode_applies_fields() {
        let mut settings = SettingsRecord::default();
        let f = frame(&[
            (0x49, &2u16.to_le_bytes()),            // TXINT
            (0x15, &515_074_000i32.to_le_bytes()),  // LAT
            (0x36, &7600i16.to_le_bytes()),         // HITEMP
        ]);
        let summary = decode_mt(&f, &mut settings).unwrap();
        assert_eq!(
            summary.fields,
            vec![FieldId::TxInt, FieldId::Lat, FieldId::HiTemp]
        );
        assert_eq!(settings.txint(), 2);
        assert_eq!(settings.lat, 515_074_000);
        assert_eq!(settings.hitemp, 7600);
    }

    #[test]
    fn minimal_frame_leaves_settings_unmodified() {
        let mut settings = SettingsRecord::default();
        let summary = decode_mt(&[0x02, 0x03, 0x05, 0x07], &mut settings).unwrap();
        assert!(summary.fields.is_empty());
        assert_eq!(settings, SettingsRecord::default());
    }

    #[test]
    fn error_ladder() {
        let mut settings = SettingsRecord::default();

        assert!(matches!(
            decode_mt(&[0x02, 0x03, 0x05], &mut settings),
            Err(Error::DataTooShort { got: 3, .. })
        ));
        assert!(matches!(
            decode_mt(&[0x55, 0x03, 0x00, 0x00], &mut settings),
            Err(Error::NoStx { found: 0x55 })
        ));
        // 0x05 is not in the dictionary
        assert!(matches!(
            decode_mt(&frame(&[(0x05, &[])]), &mut settings),
            Err(Error::InvalidField { tag: 0x05, offset: 1 })
        ));
        // LAT declares 4 bytes but only 3 remain before the end of data
        assert!(matches!(
            decode_mt(&[0x02, 0x15, 0x01, 0x02, 0x03], &mut settings),
            Err(Error::DataWidthInvalid { tag: 0x15, needed: 4, remaining: 3 })
        ));
        // No ETX anywhere within the data
        assert!(matches!(
            decode_mt(&[0x02, 0x20, 0x01, 0x20, 0x01, 0x20], &mut settings),
            Err(Error::NoEtx)
        ));
    }

    #[test]
    fn checksum_failure_reports_both_sums() {
        let mut settings = SettingsRecord::default();
        let mut f = frame(&[(0x20, &[7])]); // USERVAL1 = 7
        let last = f.len() - 1;
        f[last] ^= 0x10;
        assert!(matches!(
            decode_mt(&f, &mut settings),
            Err(Error::ChecksumError { .. })
        ));
        // Nothing was applied.
        assert_eq!(settings, SettingsRecord::default());
    }

    #[test]
    fn corrupt_payload_does_not_mutate() {
        let mut settings = SettingsRecord::default();
        let mut f = frame(&[(0x20, &[7]), (0x21, &[9])]);
        f[2] ^= 0x01; // flip a payload bit, checksum now stale
        assert!(matches!(
            decode_mt(&f, &mut settings),
            Err(Error::ChecksumError { .. })
        ));
        assert_eq!(settings, SettingsRecord::default());
    }

    #[test]
    fn invalid_dynmodel_rejected_without_partial_apply() {
        let mut settings = SettingsRecord::default();
        // USERVAL1 stages fine, then DYNMODEL=1 fails validation; neither
        // may stick.
        let f = frame(&[(0x20, &[42]), (0x4B, &[1])]);
        assert!(decode_mt(&f, &mut settings).is_err());
        assert_eq!(settings, SettingsRecord::default());
    }

    #[test]
    fn inbound_length_limit_enforced() {
        let mut settings = SettingsRecord::default();
        // USERVAL1 entries are 2 bytes each: 133 of them plus the framing
        // lands exactly on the 270-byte limit.
        let fields = vec![(0x20u8, &[1u8][..]); 133];
        let f = frame(&fields);
        assert_eq!(f.len(), MT_LIMIT);
        assert!(decode_mt(&f, &mut settings).is_ok());

        let mut too_long = frame(&fields);
        too_long.push(0x00);
        assert!(matches!(
            decode_mt(&too_long, &mut settings),
            Err(Error::MessageTooLong { size: 271, limit: MT_LIMIT })
        ));
    }

    #[test]
    fn gateway_header_skipped() {
        let mut settings = SettingsRecord::default();
        let f = frame(&[(0x52, &[0xAA, 0xBB, 0xCC, 0xDD]), (0x20, &[3])]);
        let summary = decode_mt(&f, &mut settings).unwrap();
        assert_eq!(summary.fields, vec![FieldId::UserVal1]);
        assert_eq!(settings.userval1, 3);
    }

    #[test]
    fn user_function_triggers_reported() {
        let mut settings = SettingsRecord::default();
        let f = frame(&[
            (0x58, &[]),
            (0x5C, &1500u16.to_le_bytes()),
            (0x5E, &70_000u32.to_le_bytes()),
        ]);
        let summary = decode_mt(&f, &mut settings).unwrap();
        assert_eq!(
            summary.user_functions,
            vec![
                UserFunction::Func1,
                UserFunction::Func5(1500),
                UserFunction::Func7(70_000),
            ]
        );
        assert!(summary.fields.is_empty());
    }

    #[test]
    fn trailing_bytes_after_checksum_ignored() {
        let mut settings = SettingsRecord::default();
        let mut f = frame(&[(0x20, &[5])]);
        f.extend_from_slice(&[0x00, 0x00]);
        assert!(decode_mt(&f, &mut settings).is_ok());
        assert_eq!(settings.userval1, 5);
    }

    #[test]
    fn mo_frames_decode_back_exactly() {
        let mut source = SettingsRecord::default();
        source.battv = 389;
        source.lat = -77_000_123;
        source.lon = 1_667_000;
        source.alt = 1_234_567;
        source.utc = crate::settings::UtcTime {
            year: 2026,
            month: 8,
            day: 29,
            hour: 12,
            minute: 1,
            second: 2,
        };
        let selection = FieldSelection::from_words([0x0000_0F00, 0, 0])
            .with(FieldId::BattV);
        let f = encode_mo(&source, selection).unwrap();

        let mut target = SettingsRecord::default();
        let summary = decode_mt(&f, &mut target).unwrap();
        assert_eq!(
            summary.fields,
            vec![
                FieldId::BattV,
                FieldId::DateTime,
                FieldId::Lat,
                FieldId::Lon,
                FieldId::Alt,
            ]
        );
        assert_eq!(target.battv, source.battv);
        assert_eq!(target.utc, source.utc);
        assert_eq!(target.lat, source.lat);
        assert_eq!(target.lon, source.lon);
        assert_eq!(target.alt, source.alt);
        // No other field moved.
        assert_eq!(target.press, u16::MAX);
        assert_eq!(target.dest, 0);
    }

    #[test]
    fn text_commands_apply() {
        let mut settings = SettingsRecord::default();
        let summary = parse_text_commands(
            "TXINT=30\nwakeint=120; DEST=12345\nUSERFUNC1\nUSERFUNC5=99",
            &mut settings,
        )
        .unwrap();
        assert_eq!(settings.txint(), 30);
        assert_eq!(settings.wakeint, 120);
        assert_eq!(settings.dest, 12345);
        assert_eq!(
            summary.user_functions,
            vec![UserFunction::Func1, UserFunction::Func5(99)]
        );
    }

    #[test]
    fn text_commands_reject_unknown_names() {
        let mut settings = SettingsRecord::default();
        let err = parse_text_commands("TXINT=30\nBOGUS=1", &mut settings).unwrap_err();
        assert!(matches!(err, Error::UnknownFieldName { .. }));
        // The valid entry before the bad one must not have been applied.
        assert_eq!(settings.txint(), 5);
    }

    #[test]
    fn text_commands_enforce_length_limit() {
        let mut settings = SettingsRecord::default();
        let input = "USERVAL1=1\n".repeat(30);
        assert!(input.len() > MT_LIMIT);
        assert!(matches!(
            parse_text_commands(&input, &mut settings),
            Err(Error::MessageTooLong { limit: MT_LIMIT, .. })
        ));
    }

    #[test]
    fn text_commands_validate_values() {
        let mut settings = SettingsRecord::default();
        assert!(parse_text_commands("TXINT=", &mut settings).is_err());
        assert!(parse_text_commands("TXINT", &mut settings).is_err());
        assert!(parse_text_commands("STX", &mut settings).is_err());
        assert!(parse_text_commands("DYNMODEL=1", &mut settings).is_err());
        assert_eq!(settings, SettingsRecord::default());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_selection() -> impl Strategy<Value = FieldSelection> {
            (any::<u32>(), any::<u32>(), any::<u32>())
                .prop_map(|(a, b, c)| FieldSelection::from_words([a, b, c]))
        }

        proptest! {
            /// Any selection of fields encodes within the MO limit and
            /// decodes back into an identical record.
            #[test]
            fn prop_mo_roundtrip(selection in arb_selection()) {
                let source = SettingsRecord::default();
                let f = encode_mo(&source, selection).unwrap();
                prop_assert!(f.len() <= crate::protocol::MO_LIMIT);

                let mut target = SettingsRecord::default();
                let summary = decode_mt(&f, &mut target).unwrap();
                let expected: Vec<_> = selection.iter().collect();
                prop_assert_eq!(summary.fields, expected);
                prop_assert_eq!(target, source);
            }

            /// Flipping any single bit of a frame's body is detected.
            #[test]
            fn prop_single_bit_flip_detected(
                bit in 0usize..8,
                offset_ratio in 0.0f64..1.0,
            ) {
                let mut source = SettingsRecord::default();
                source.battv = 421;
                source.lat = 515_074_000;
                let selection = FieldSelection::empty()
                    .with(FieldId::BattV)
                    .with(FieldId::Lat);
                let mut f = encode_mo(&source, selection).unwrap();

                // Corrupt one bit anywhere in the body (STX..=ETX).
                let body_len = f.len() - 2;
                let offset = ((body_len as f64) * offset_ratio) as usize;
                let offset = offset.min(body_len - 1);
                f[offset] ^= 1 << bit;

                let mut target = SettingsRecord::default();
                prop_assert!(decode_mt(&f, &mut target).is_err());
                prop_assert_eq!(target, SettingsRecord::default());
            }
        }
    }
}
