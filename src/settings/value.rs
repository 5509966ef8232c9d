//! Typed field values
//!
//! A [`FieldValue`] is the decoded form of one message field. The encoder and
//! the parser both go through this type, so the little-endian byte rules live
//! in exactly one place instead of being hardcoded per call site.

use crate::protocol::{Error, FieldId, FieldKind, Result};

/// Packed UTC date and time carried by the 7-byte DATETIME field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtcTime {
    /// UTC year
    pub year: u16,
    /// UTC month (1-12, 0 when no fix has been obtained)
    pub month: u8,
    /// UTC day of month
    pub day: u8,
    /// UTC hour
    pub hour: u8,
    /// UTC minute
    pub minute: u8,
    /// UTC second
    pub second: u8,
}

impl UtcTime {
    /// Wire bytes: u16 year little-endian, then month through second.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 7] {
        let year = self.year.to_le_bytes();
        [
            year[0],
            year[1],
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }

    /// Parse from the 7 wire bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 7]) -> Self {
        Self {
            year: u16::from_le_bytes([bytes[0], bytes[1]]),
            month: bytes[2],
            day: bytes[3],
            hour: bytes[4],
            minute: bytes[5],
            second: bytes[6],
        }
    }
}

/// GNSS dynamic platform model (motion profile used for position filtering).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DynModel {
    /// General purpose, the stock setting
    #[default]
    Portable = 0,
    /// Stationary installation
    Stationary = 2,
    /// Pedestrian motion
    Pedestrian = 3,
    /// Road vehicle
    Automotive = 4,
    /// Marine use
    Sea = 5,
    /// Airborne, up to 1g acceleration
    Airborne1g = 6,
    /// Airborne, up to 2g acceleration
    Airborne2g = 7,
    /// Airborne, up to 4g acceleration
    Airborne4g = 8,
    /// Wrist-worn device
    Wrist = 9,
    /// Motorbike
    Bike = 10,
}

impl DynModel {
    /// Convert from the wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Portable),
            2 => Some(Self::Stationary),
            3 => Some(Self::Pedestrian),
            4 => Some(Self::Automotive),
            5 => Some(Self::Sea),
            6 => Some(Self::Airborne1g),
            7 => Some(Self::Airborne2g),
            8 => Some(Self::Airborne4g),
            9 => Some(Self::Wrist),
            10 => Some(Self::Bike),
            _ => None,
        }
    }

    /// Convert to the wire byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One geofence circle: center coordinates and radius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geofence {
    /// Center latitude in degrees * 10^-7
    pub lat: i32,
    /// Center longitude in degrees * 10^-7
    pub lon: i32,
    /// Radius in cm
    pub radius: u32,
}

/// Decoded value of one message field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    /// Unsigned 8-bit value
    U8(u8),
    /// Unsigned 16-bit value
    U16(u16),
    /// Unsigned 32-bit value
    U32(u32),
    /// Signed 16-bit value
    I16(i16),
    /// Signed 32-bit value
    I32(i32),
    /// IEEE-754 single
    F32(f32),
    /// Packed UTC date/time
    DateTime(UtcTime),
    /// Raw 3-byte geofence status
    GeofenceStatus([u8; 3]),
    /// The MOFIELDS selection words
    Selection([u32; 3]),
}

impl FieldValue {
    /// Decode a value of `kind` from exactly `kind.width()` bytes.
    ///
    /// Returns `None` for markers or when the slice length does not match.
    #[must_use]
    pub fn decode(kind: FieldKind, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != kind.width() {
            return None;
        }
        match kind {
            FieldKind::Marker => None,
            FieldKind::U8 => Some(Self::U8(bytes[0])),
            FieldKind::U16 => Some(Self::U16(u16::from_le_bytes([bytes[0], bytes[1]]))),
            FieldKind::I16 => Some(Self::I16(i16::from_le_bytes([bytes[0], bytes[1]]))),
            FieldKind::U32 => Some(Self::U32(u32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]))),
            FieldKind::I32 => Some(Self::I32(i32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]))),
            FieldKind::F32 => Some(Self::F32(f32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]))),
            FieldKind::DateTime => Some(Self::DateTime(UtcTime::from_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6],
            ]))),
            FieldKind::GeofenceStatus => {
                Some(Self::GeofenceStatus([bytes[0], bytes[1], bytes[2]]))
            }
            FieldKind::Selection => Some(Self::Selection([
                u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
                u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
                u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            ])),
        }
    }

    /// Append the value's wire bytes, least-significant byte first.
    pub fn encode_into(self, out: &mut Vec<u8>) {
        match self {
            Self::U8(v) => out.push(v),
            Self::U16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::U32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::I16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::I32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::F32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::DateTime(t) => out.extend_from_slice(&t.to_bytes()),
            Self::GeofenceStatus(s) => out.extend_from_slice(&s),
            Self::Selection(words) => {
                for word in words {
                    out.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
    }

    /// Kind of this value.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::U8(_) => FieldKind::U8,
            Self::U16(_) => FieldKind::U16,
            Self::U32(_) => FieldKind::U32,
            Self::I16(_) => FieldKind::I16,
            Self::I32(_) => FieldKind::I32,
            Self::F32(_) => FieldKind::F32,
            Self::DateTime(_) => FieldKind::DateTime,
            Self::GeofenceStatus(_) => FieldKind::GeofenceStatus,
            Self::Selection(_) => FieldKind::Selection,
        }
    }

    /// Parse a command-channel textual value for a field of `kind`.
    ///
    /// Integers are decimal (or `0x`-prefixed hex), floats use the standard
    /// float syntax, DATETIME is six comma-separated integers
    /// (`year,month,day,hour,minute,second`), GEOFSTAT three comma-separated
    /// bytes, MOFIELDS three comma-separated 32-bit words.
    pub fn parse_text(field: FieldId, text: &str) -> Result<Self> {
        let kind = field.kind();
        let invalid = |reason: String| Error::InvalidValue {
            field: field.name(),
            reason,
        };
        let text = text.trim();
        match kind {
            FieldKind::Marker => Err(invalid("field takes no value".to_string())),
            FieldKind::U8 => parse_int::<u8>(text).map(Self::U8).map_err(invalid),
            FieldKind::U16 => parse_int::<u16>(text).map(Self::U16).map_err(invalid),
            FieldKind::U32 => parse_int::<u32>(text).map(Self::U32).map_err(invalid),
            FieldKind::I16 => parse_int::<i16>(text).map(Self::I16).map_err(invalid),
            FieldKind::I32 => parse_int::<i32>(text).map(Self::I32).map_err(invalid),
            FieldKind::F32 => text
                .parse::<f32>()
                .map(Self::F32)
                .map_err(|e| invalid(e.to_string())),
            FieldKind::DateTime => {
                let parts = parse_int_list::<u16>(text, 6).map_err(invalid)?;
                let narrow = |v: u16| -> Result<u8> {
                    u8::try_from(v).map_err(|_| {
                        Error::InvalidValue {
                            field: field.name(),
                            reason: format!("component {v} out of range"),
                        }
                    })
                };
                Ok(Self::DateTime(UtcTime {
                    year: parts[0],
                    month: narrow(parts[1])?,
                    day: narrow(parts[2])?,
                    hour: narrow(parts[3])?,
                    minute: narrow(parts[4])?,
                    second: narrow(parts[5])?,
                }))
            }
            FieldKind::GeofenceStatus => {
                let parts = parse_int_list::<u8>(text, 3).map_err(invalid)?;
                Ok(Self::GeofenceStatus([parts[0], parts[1], parts[2]]))
            }
            FieldKind::Selection => {
                let parts = parse_int_list::<u32>(text, 3).map_err(invalid)?;
                Ok(Self::Selection([parts[0], parts[1], parts[2]]))
            }
        }
    }

    pub(crate) fn expect_u8(self, field: FieldId) -> Result<u8> {
        match self {
            Self::U8(v) => Ok(v),
            other => Err(kind_mismatch(field, other)),
        }
    }

    pub(crate) fn expect_u16(self, field: FieldId) -> Result<u16> {
        match self {
            Self::U16(v) => Ok(v),
            other => Err(kind_mismatch(field, other)),
        }
    }

    pub(crate) fn expect_u32(self, field: FieldId) -> Result<u32> {
        match self {
            Self::U32(v) => Ok(v),
            other => Err(kind_mismatch(field, other)),
        }
    }

    pub(crate) fn expect_i16(self, field: FieldId) -> Result<i16> {
        match self {
            Self::I16(v) => Ok(v),
            other => Err(kind_mismatch(field, other)),
        }
    }

    pub(crate) fn expect_i32(self, field: FieldId) -> Result<i32> {
        match self {
            Self::I32(v) => Ok(v),
            other => Err(kind_mismatch(field, other)),
        }
    }

    pub(crate) fn expect_f32(self, field: FieldId) -> Result<f32> {
        match self {
            Self::F32(v) => Ok(v),
            other => Err(kind_mismatch(field, other)),
        }
    }
}

fn kind_mismatch(field: FieldId, value: FieldValue) -> Error {
    Error::InvalidValue {
        field: field.name(),
        reason: format!("expected {:?} value, got {:?}", field.kind(), value.kind()),
    }
}

fn parse_int<T>(text: &str) -> std::result::Result<T, String>
where
    T: TryFrom<i64>,
{
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else {
        text.parse::<i64>()
    };
    let wide = parsed.map_err(|e| format!("{text:?}: {e}"))?;
    T::try_from(wide).map_err(|_| format!("{text:?} out of range"))
}

fn parse_int_list<T>(text: &str, expected: usize) -> std::result::Result<Vec<T>, String>
where
    T: TryFrom<i64>,
{
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != expected {
        return Err(format!("expected {expected} comma-separated values"));
    }
    parts.into_iter().map(parse_int).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FieldId;

    #[test]
    fn datetime_bytes() {
        let t = UtcTime {
            year: 2023,
            month: 7,
            day: 14,
            hour: 9,
            minute: 30,
            second: 59,
        };
        let bytes = t.to_bytes();
        assert_eq!(bytes[0..2], 2023u16.to_le_bytes());
        assert_eq!(UtcTime::from_bytes(bytes), t);
    }

    #[test]
    fn decode_rejects_wrong_width() {
        assert!(FieldValue::decode(FieldKind::U16, &[1]).is_none());
        assert!(FieldValue::decode(FieldKind::U16, &[1, 2, 3]).is_none());
        assert!(FieldValue::decode(FieldKind::Marker, &[]).is_none());
    }

    #[test]
    fn little_endian_contract() {
        let mut out = Vec::new();
        FieldValue::I32(-124_567_890).encode_into(&mut out);
        assert_eq!(
            FieldValue::decode(FieldKind::I32, &out),
            Some(FieldValue::I32(-124_567_890))
        );
        assert_eq!(out, (-124_567_890i32).to_le_bytes());
    }

    #[test]
    fn selection_words_roundtrip() {
        let mut out = Vec::new();
        FieldValue::Selection([0x0000_0F00, 0xDEAD_BEEF, 1]).encode_into(&mut out);
        assert_eq!(out.len(), 12);
        assert_eq!(
            FieldValue::decode(FieldKind::Selection, &out),
            Some(FieldValue::Selection([0x0000_0F00, 0xDEAD_BEEF, 1]))
        );
    }

    #[test]
    fn dynmodel_validation() {
        assert_eq!(DynModel::from_u8(0), Some(DynModel::Portable));
        assert_eq!(DynModel::from_u8(10), Some(DynModel::Bike));
        assert_eq!(DynModel::from_u8(1), None);
        assert_eq!(DynModel::from_u8(11), None);
    }

    #[test]
    fn text_values() {
        assert_eq!(
            FieldValue::parse_text(FieldId::TxInt, "15").unwrap(),
            FieldValue::U16(15)
        );
        assert_eq!(
            FieldValue::parse_text(FieldId::MoFields, "0x0f00, 0, 0").unwrap(),
            FieldValue::Selection([0x0F00, 0, 0])
        );
        assert_eq!(
            FieldValue::parse_text(FieldId::HiTemp, "-4000").unwrap(),
            FieldValue::I16(-4000)
        );
        assert_eq!(
            FieldValue::parse_text(FieldId::UserVal7, "1.5").unwrap(),
            FieldValue::F32(1.5)
        );
        assert!(FieldValue::parse_text(FieldId::TxInt, "70000").is_err());
        assert!(FieldValue::parse_text(FieldId::UserFunc1, "1").is_err());
    }

    #[test]
    fn text_datetime() {
        let v = FieldValue::parse_text(FieldId::DateTime, "2024,2,29,23,59,1").unwrap();
        assert_eq!(
            v,
            FieldValue::DateTime(UtcTime {
                year: 2024,
                month: 2,
                day: 29,
                hour: 23,
                minute: 59,
                second: 1,
            })
        );
    }
}
