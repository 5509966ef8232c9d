//! Message field dictionary
//!
//! Every MO/MT message field is identified by an 8-bit tag. This table is the
//! single source of truth for the byte width of each field: both the encoder
//! and the parser look widths up here and never hardcode them.

use std::fmt;

use super::{Error, Result};

/// Message field identifiers used in binary MO and MT messages.
///
/// Tag values are part of the wire contract and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FieldId {
    /// Frame-start marker
    Stx = 0x02,
    /// Frame-end marker
    Etx = 0x03,
    /// Software version: bits 7-4 major, bits 3-0 minor
    SwVer = 0x04,
    /// The tracker's modem serial number
    Source = 0x08,
    /// Battery (bus) voltage in V * 10^-2
    BattV = 0x09,
    /// Pressure in mbar
    Press = 0x0A,
    /// Temperature in degrees C * 10^-2
    Temp = 0x0B,
    /// Humidity in %RH * 10^-2
    Humid = 0x0C,
    /// UTC year
    Year = 0x0D,
    /// UTC month
    Month = 0x0E,
    /// UTC day
    Day = 0x0F,
    /// UTC hour
    Hour = 0x10,
    /// UTC minute
    Min = 0x11,
    /// UTC seconds
    Sec = 0x12,
    /// UTC milliseconds
    Millis = 0x13,
    /// Packed UTC date and time: year (2 bytes) + month/day/hour/min/sec
    DateTime = 0x14,
    /// Latitude in degrees * 10^-7
    Lat = 0x15,
    /// Longitude in degrees * 10^-7
    Lon = 0x16,
    /// Altitude above MSL in mm
    Alt = 0x17,
    /// Ground speed in mm/s
    Speed = 0x18,
    /// Heading in degrees * 10^-7
    Head = 0x19,
    /// Number of satellites used in the solution
    Sats = 0x1A,
    /// Positional dilution of precision in cm
    Pdop = 0x1B,
    /// GNSS fix type
    Fix = 0x1C,
    /// Geofence status (3 bytes)
    GeofStat = 0x1D,
    /// User value 1
    UserVal1 = 0x20,
    /// User value 2
    UserVal2 = 0x21,
    /// User value 3
    UserVal3 = 0x22,
    /// User value 4
    UserVal4 = 0x23,
    /// User value 5
    UserVal5 = 0x24,
    /// User value 6
    UserVal6 = 0x25,
    /// User value 7
    UserVal7 = 0x26,
    /// User value 8
    UserVal8 = 0x27,
    /// The MO field-selection bitmask triplet (12 bytes)
    MoFields = 0x30,
    /// Message option flags, group 1
    Flags1 = 0x31,
    /// Message option flags, group 2
    Flags2 = 0x32,
    /// Destination serial number for message forwarding
    Dest = 0x33,
    /// High pressure limit in mbar
    HiPress = 0x34,
    /// Low pressure limit in mbar
    LoPress = 0x35,
    /// High temperature limit in degrees C * 10^-2
    HiTemp = 0x36,
    /// Low temperature limit in degrees C * 10^-2
    LoTemp = 0x37,
    /// High humidity limit in %RH * 10^-2
    HiHumid = 0x38,
    /// Low humidity limit in %RH * 10^-2
    LoHumid = 0x39,
    /// Bits 7-4: number of geofences; bits 3-0: confidence level
    GeofNum = 0x3A,
    /// Geofence 1 center latitude in degrees * 10^-7
    Geof1Lat = 0x3B,
    /// Geofence 1 center longitude in degrees * 10^-7
    Geof1Lon = 0x3C,
    /// Geofence 1 radius in cm
    Geof1Rad = 0x3D,
    /// Geofence 2 center latitude in degrees * 10^-7
    Geof2Lat = 0x3E,
    /// Geofence 2 center longitude in degrees * 10^-7
    Geof2Lon = 0x3F,
    /// Geofence 2 radius in cm
    Geof2Rad = 0x40,
    /// Geofence 3 center latitude in degrees * 10^-7
    Geof3Lat = 0x41,
    /// Geofence 3 center longitude in degrees * 10^-7
    Geof3Lon = 0x42,
    /// Geofence 3 radius in cm
    Geof3Rad = 0x43,
    /// Geofence 4 center latitude in degrees * 10^-7
    Geof4Lat = 0x44,
    /// Geofence 4 center longitude in degrees * 10^-7
    Geof4Lon = 0x45,
    /// Geofence 4 radius in cm
    Geof4Rad = 0x46,
    /// Wake-up interval in seconds
    WakeInt = 0x47,
    /// Alarm transmit interval in minutes
    AlarmInt = 0x48,
    /// Message transmit interval in minutes
    TxInt = 0x49,
    /// Low battery limit in V * 10^-2
    LowBatt = 0x4A,
    /// GNSS dynamic platform model
    DynModel = 0x4B,
    /// Gateway routing header prepended by the ground segment
    RbHead = 0x52,
    /// User function trigger 1 (no payload)
    UserFunc1 = 0x58,
    /// User function trigger 2 (no payload)
    UserFunc2 = 0x59,
    /// User function trigger 3 (no payload)
    UserFunc3 = 0x5A,
    /// User function trigger 4 (no payload)
    UserFunc4 = 0x5B,
    /// User function trigger 5 (u16 argument)
    UserFunc5 = 0x5C,
    /// User function trigger 6 (u16 argument)
    UserFunc6 = 0x5D,
    /// User function trigger 7 (u32 argument)
    UserFunc7 = 0x5E,
    /// User function trigger 8 (u32 argument)
    UserFunc8 = 0x5F,
}

/// Wire representation of a field's value.
///
/// The kind fixes both the byte width and the decode rule for the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldKind {
    /// Pure marker, no payload bytes
    Marker,
    /// Unsigned 8-bit value
    U8,
    /// Unsigned 16-bit value, little-endian
    U16,
    /// Unsigned 32-bit value, little-endian
    U32,
    /// Signed 16-bit value, little-endian
    I16,
    /// Signed 32-bit value, little-endian
    I32,
    /// IEEE-754 single, little-endian bit pattern
    F32,
    /// Packed UTC date/time: u16 year LE + month, day, hour, minute, second
    DateTime,
    /// Raw 3-byte geofence status
    GeofenceStatus,
    /// Three u32 selection words, little-endian each
    Selection,
}

impl FieldKind {
    /// Byte width of a value of this kind.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Marker => 0,
            Self::U8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::GeofenceStatus => 3,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::DateTime => 7,
            Self::Selection => 12,
        }
    }
}

impl FieldId {
    /// Every field identifier in the dictionary, in tag order.
    pub const ALL: &'static [FieldId] = ALL_FIELDS;

    /// Convert from a wire tag byte.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x02 => Some(Self::Stx),
            0x03 => Some(Self::Etx),
            0x04 => Some(Self::SwVer),
            0x08 => Some(Self::Source),
            0x09 => Some(Self::BattV),
            0x0A => Some(Self::Press),
            0x0B => Some(Self::Temp),
            0x0C => Some(Self::Humid),
            0x0D => Some(Self::Year),
            0x0E => Some(Self::Month),
            0x0F => Some(Self::Day),
            0x10 => Some(Self::Hour),
            0x11 => Some(Self::Min),
            0x12 => Some(Self::Sec),
            0x13 => Some(Self::Millis),
            0x14 => Some(Self::DateTime),
            0x15 => Some(Self::Lat),
            0x16 => Some(Self::Lon),
            0x17 => Some(Self::Alt),
            0x18 => Some(Self::Speed),
            0x19 => Some(Self::Head),
            0x1A => Some(Self::Sats),
            0x1B => Some(Self::Pdop),
            0x1C => Some(Self::Fix),
            0x1D => Some(Self::GeofStat),
            0x20 => Some(Self::UserVal1),
            0x21 => Some(Self::UserVal2),
            0x22 => Some(Self::UserVal3),
            0x23 => Some(Self::UserVal4),
            0x24 => Some(Self::UserVal5),
            0x25 => Some(Self::UserVal6),
            0x26 => Some(Self::UserVal7),
            0x27 => Some(Self::UserVal8),
            0x30 => Some(Self::MoFields),
            0x31 => Some(Self::Flags1),
            0x32 => Some(Self::Flags2),
            0x33 => Some(Self::Dest),
            0x34 => Some(Self::HiPress),
            0x35 => Some(Self::LoPress),
            0x36 => Some(Self::HiTemp),
            0x37 => Some(Self::LoTemp),
            0x38 => Some(Self::HiHumid),
            0x39 => Some(Self::LoHumid),
            0x3A => Some(Self::GeofNum),
            0x3B => Some(Self::Geof1Lat),
            0x3C => Some(Self::Geof1Lon),
            0x3D => Some(Self::Geof1Rad),
            0x3E => Some(Self::Geof2Lat),
            0x3F => Some(Self::Geof2Lon),
            0x40 => Some(Self::Geof2Rad),
            0x41 => Some(Self::Geof3Lat),
            0x42 => Some(Self::Geof3Lon),
            0x43 => Some(Self::Geof3Rad),
            0x44 => Some(Self::Geof4Lat),
            0x45 => Some(Self::Geof4Lon),
            0x46 => Some(Self::Geof4Rad),
            0x47 => Some(Self::WakeInt),
            0x48 => Some(Self::AlarmInt),
            0x49 => Some(Self::TxInt),
            0x4A => Some(Self::LowBatt),
            0x4B => Some(Self::DynModel),
            0x52 => Some(Self::RbHead),
            0x58 => Some(Self::UserFunc1),
            0x59 => Some(Self::UserFunc2),
            0x5A => Some(Self::UserFunc3),
            0x5B => Some(Self::UserFunc4),
            0x5C => Some(Self::UserFunc5),
            0x5D => Some(Self::UserFunc6),
            0x5E => Some(Self::UserFunc7),
            0x5F => Some(Self::UserFunc8),
            _ => None,
        }
    }

    /// Convert to the wire tag byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Value kind of this field.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Stx | Self::Etx | Self::UserFunc1 | Self::UserFunc2 | Self::UserFunc3
            | Self::UserFunc4 => FieldKind::Marker,
            Self::SwVer
            | Self::Month
            | Self::Day
            | Self::Hour
            | Self::Min
            | Self::Sec
            | Self::Sats
            | Self::Fix
            | Self::UserVal1
            | Self::UserVal2
            | Self::Flags1
            | Self::Flags2
            | Self::GeofNum
            | Self::DynModel => FieldKind::U8,
            Self::BattV
            | Self::Press
            | Self::Humid
            | Self::Year
            | Self::Millis
            | Self::Pdop
            | Self::UserVal3
            | Self::UserVal4
            | Self::HiPress
            | Self::LoPress
            | Self::HiHumid
            | Self::LoHumid
            | Self::AlarmInt
            | Self::TxInt
            | Self::LowBatt
            | Self::UserFunc5
            | Self::UserFunc6 => FieldKind::U16,
            Self::Source
            | Self::UserVal5
            | Self::UserVal6
            | Self::Dest
            | Self::Geof1Rad
            | Self::Geof2Rad
            | Self::Geof3Rad
            | Self::Geof4Rad
            | Self::WakeInt
            | Self::RbHead
            | Self::UserFunc7
            | Self::UserFunc8 => FieldKind::U32,
            Self::Temp | Self::HiTemp | Self::LoTemp => FieldKind::I16,
            Self::Lat
            | Self::Lon
            | Self::Alt
            | Self::Speed
            | Self::Head
            | Self::Geof1Lat
            | Self::Geof1Lon
            | Self::Geof2Lat
            | Self::Geof2Lon
            | Self::Geof3Lat
            | Self::Geof3Lon
            | Self::Geof4Lat
            | Self::Geof4Lon => FieldKind::I32,
            Self::UserVal7 | Self::UserVal8 => FieldKind::F32,
            Self::DateTime => FieldKind::DateTime,
            Self::GeofStat => FieldKind::GeofenceStatus,
            Self::MoFields => FieldKind::Selection,
        }
    }

    /// Byte width of this field's payload on the wire.
    #[must_use]
    pub const fn width(self) -> usize {
        self.kind().width()
    }

    /// Textual name used on the local command channel.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stx => "STX",
            Self::Etx => "ETX",
            Self::SwVer => "SWVER",
            Self::Source => "SOURCE",
            Self::BattV => "BATTV",
            Self::Press => "PRESS",
            Self::Temp => "TEMP",
            Self::Humid => "HUMID",
            Self::Year => "YEAR",
            Self::Month => "MONTH",
            Self::Day => "DAY",
            Self::Hour => "HOUR",
            Self::Min => "MIN",
            Self::Sec => "SEC",
            Self::Millis => "MILLIS",
            Self::DateTime => "DATETIME",
            Self::Lat => "LAT",
            Self::Lon => "LON",
            Self::Alt => "ALT",
            Self::Speed => "SPEED",
            Self::Head => "HEAD",
            Self::Sats => "SATS",
            Self::Pdop => "PDOP",
            Self::Fix => "FIX",
            Self::GeofStat => "GEOFSTAT",
            Self::UserVal1 => "USERVAL1",
            Self::UserVal2 => "USERVAL2",
            Self::UserVal3 => "USERVAL3",
            Self::UserVal4 => "USERVAL4",
            Self::UserVal5 => "USERVAL5",
            Self::UserVal6 => "USERVAL6",
            Self::UserVal7 => "USERVAL7",
            Self::UserVal8 => "USERVAL8",
            Self::MoFields => "MOFIELDS",
            Self::Flags1 => "FLAGS1",
            Self::Flags2 => "FLAGS2",
            Self::Dest => "DEST",
            Self::HiPress => "HIPRESS",
            Self::LoPress => "LOPRESS",
            Self::HiTemp => "HITEMP",
            Self::LoTemp => "LOTEMP",
            Self::HiHumid => "HIHUMID",
            Self::LoHumid => "LOHUMID",
            Self::GeofNum => "GEOFNUM",
            Self::Geof1Lat => "GEOF1LAT",
            Self::Geof1Lon => "GEOF1LON",
            Self::Geof1Rad => "GEOF1RAD",
            Self::Geof2Lat => "GEOF2LAT",
            Self::Geof2Lon => "GEOF2LON",
            Self::Geof2Rad => "GEOF2RAD",
            Self::Geof3Lat => "GEOF3LAT",
            Self::Geof3Lon => "GEOF3LON",
            Self::Geof3Rad => "GEOF3RAD",
            Self::Geof4Lat => "GEOF4LAT",
            Self::Geof4Lon => "GEOF4LON",
            Self::Geof4Rad => "GEOF4RAD",
            Self::WakeInt => "WAKEINT",
            Self::AlarmInt => "ALARMINT",
            Self::TxInt => "TXINT",
            Self::LowBatt => "LOWBATT",
            Self::DynModel => "DYNMODEL",
            Self::RbHead => "RBHEAD",
            Self::UserFunc1 => "USERFUNC1",
            Self::UserFunc2 => "USERFUNC2",
            Self::UserFunc3 => "USERFUNC3",
            Self::UserFunc4 => "USERFUNC4",
            Self::UserFunc5 => "USERFUNC5",
            Self::UserFunc6 => "USERFUNC6",
            Self::UserFunc7 => "USERFUNC7",
            Self::UserFunc8 => "USERFUNC8",
        }
    }

    /// Look a field up by its command-channel name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_FIELDS
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Every field identifier in the dictionary, in tag order.
pub(crate) const ALL_FIELDS: &[FieldId] = &[
    FieldId::Stx,
    FieldId::Etx,
    FieldId::SwVer,
    FieldId::Source,
    FieldId::BattV,
    FieldId::Press,
    FieldId::Temp,
    FieldId::Humid,
    FieldId::Year,
    FieldId::Month,
    FieldId::Day,
    FieldId::Hour,
    FieldId::Min,
    FieldId::Sec,
    FieldId::Millis,
    FieldId::DateTime,
    FieldId::Lat,
    FieldId::Lon,
    FieldId::Alt,
    FieldId::Speed,
    FieldId::Head,
    FieldId::Sats,
    FieldId::Pdop,
    FieldId::Fix,
    FieldId::GeofStat,
    FieldId::UserVal1,
    FieldId::UserVal2,
    FieldId::UserVal3,
    FieldId::UserVal4,
    FieldId::UserVal5,
    FieldId::UserVal6,
    FieldId::UserVal7,
    FieldId::UserVal8,
    FieldId::MoFields,
    FieldId::Flags1,
    FieldId::Flags2,
    FieldId::Dest,
    FieldId::HiPress,
    FieldId::LoPress,
    FieldId::HiTemp,
    FieldId::LoTemp,
    FieldId::HiHumid,
    FieldId::LoHumid,
    FieldId::GeofNum,
    FieldId::Geof1Lat,
    FieldId::Geof1Lon,
    FieldId::Geof1Rad,
    FieldId::Geof2Lat,
    FieldId::Geof2Lon,
    FieldId::Geof2Rad,
    FieldId::Geof3Lat,
    FieldId::Geof3Lon,
    FieldId::Geof3Rad,
    FieldId::Geof4Lat,
    FieldId::Geof4Lon,
    FieldId::Geof4Rad,
    FieldId::WakeInt,
    FieldId::AlarmInt,
    FieldId::TxInt,
    FieldId::LowBatt,
    FieldId::DynModel,
    FieldId::RbHead,
    FieldId::UserFunc1,
    FieldId::UserFunc2,
    FieldId::UserFunc3,
    FieldId::UserFunc4,
    FieldId::UserFunc5,
    FieldId::UserFunc6,
    FieldId::UserFunc7,
    FieldId::UserFunc8,
];

/// Look up the byte width for a raw tag byte.
///
/// This is the dictionary operation shared by the encoder and the parser.
pub fn width_of(tag: u8) -> Result<usize> {
    FieldId::from_u8(tag)
        .map(FieldId::width)
        .ok_or(Error::UnknownField { tag })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The widths published in the original field table, in tag order.
    const DECLARED_WIDTHS: &[(u8, usize)] = &[
        (0x02, 0),
        (0x03, 0),
        (0x04, 1),
        (0x08, 4),
        (0x09, 2),
        (0x0A, 2),
        (0x0B, 2),
        (0x0C, 2),
        (0x0D, 2),
        (0x0E, 1),
        (0x0F, 1),
        (0x10, 1),
        (0x11, 1),
        (0x12, 1),
        (0x13, 2),
        (0x14, 7),
        (0x15, 4),
        (0x16, 4),
        (0x17, 4),
        (0x18, 4),
        (0x19, 4),
        (0x1A, 1),
        (0x1B, 2),
        (0x1C, 1),
        (0x1D, 3),
        (0x20, 1),
        (0x21, 1),
        (0x22, 2),
        (0x23, 2),
        (0x24, 4),
        (0x25, 4),
        (0x26, 4),
        (0x27, 4),
        (0x30, 12),
        (0x31, 1),
        (0x32, 1),
        (0x33, 4),
        (0x34, 2),
        (0x35, 2),
        (0x36, 2),
        (0x37, 2),
        (0x38, 2),
        (0x39, 2),
        (0x3A, 1),
        (0x3B, 4),
        (0x3C, 4),
        (0x3D, 4),
        (0x3E, 4),
        (0x3F, 4),
        (0x40, 4),
        (0x41, 4),
        (0x42, 4),
        (0x43, 4),
        (0x44, 4),
        (0x45, 4),
        (0x46, 4),
        (0x47, 4),
        (0x48, 2),
        (0x49, 2),
        (0x4A, 2),
        (0x4B, 1),
        (0x52, 4),
        (0x58, 0),
        (0x59, 0),
        (0x5A, 0),
        (0x5B, 0),
        (0x5C, 2),
        (0x5D, 2),
        (0x5E, 4),
        (0x5F, 4),
    ];

    #[test]
    fn dictionary_is_complete() {
        assert_eq!(ALL_FIELDS.len(), DECLARED_WIDTHS.len());
        for &(tag, declared) in DECLARED_WIDTHS {
            assert_eq!(
                width_of(tag).unwrap(),
                declared,
                "width mismatch for tag {tag:#04x}"
            );
        }
    }

    #[test]
    fn tag_roundtrip() {
        for &field in ALL_FIELDS {
            assert_eq!(FieldId::from_u8(field.as_u8()), Some(field));
        }
    }

    #[test]
    fn unknown_tag_rejected() {
        assert!(matches!(
            width_of(0x05),
            Err(Error::UnknownField { tag: 0x05 })
        ));
        assert!(FieldId::from_u8(0xFF).is_none());
    }

    #[test]
    fn name_roundtrip() {
        for &field in ALL_FIELDS {
            assert_eq!(FieldId::from_name(field.name()), Some(field));
            assert_eq!(FieldId::from_name(&field.name().to_lowercase()), Some(field));
        }
        assert!(FieldId::from_name("NOTAFIELD").is_none());
    }
}
