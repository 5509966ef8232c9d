//! Canonical tracker settings
//!
//! One [`SettingsRecord`] per device holds the current value of every
//! telemetry and configuration field. The parser mutates it on successful
//! decode, the encoder reads it, and `image` maps it to and from the
//! persisted byte image.

mod image;
mod value;

pub use image::{IMAGE_LEN, load, persist};
pub use value::{DynModel, FieldValue, Geofence, UtcTime};

use std::sync::atomic::{AtomicU16, Ordering};

use crate::protocol::{Error, FieldId, FieldSelection, Flags1, Flags2, Result};

/// Default transmit interval in minutes
const DEF_TXINT: u16 = 5;

/// The full set of tracker message fields held in RAM.
///
/// Numeric fields carry the wire fixed-point scaling (documented per field);
/// the scaling is part of the wire contract, not cosmetic. Fill values mark
/// readings that have not been acquired yet: `u16::MAX` for pressure,
/// humidity and milliseconds, `i16::MIN` for temperature, `i32::MIN` for
/// position, 255 for hour/minute/second.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettingsRecord {
    /// Software version: bits 7-4 major, bits 3-0 minor
    pub swver: u8,
    /// The tracker's modem serial number
    pub source: u32,
    /// Battery (bus) voltage in V * 10^-2
    pub battv: u16,
    /// Pressure in mbar
    pub press: u16,
    /// Temperature in degrees C * 10^-2
    pub temp: i16,
    /// Humidity in %RH * 10^-2
    pub humid: u16,
    /// UTC date and time of the last fix
    pub utc: UtcTime,
    /// UTC milliseconds
    pub millis: u16,
    /// Latitude in degrees * 10^-7
    pub lat: i32,
    /// Longitude in degrees * 10^-7
    pub lon: i32,
    /// Altitude above MSL in mm
    pub alt: i32,
    /// Ground speed in mm/s
    pub speed: i32,
    /// Heading in degrees * 10^-7
    pub head: i32,
    /// Satellites used in the solution
    pub sats: u8,
    /// Positional dilution of precision in cm
    pub pdop: u16,
    /// GNSS fix type
    pub fix: u8,
    /// Raw geofence status bytes
    pub geofstat: [u8; 3],
    /// User value 1
    pub userval1: u8,
    /// User value 2
    pub userval2: u8,
    /// User value 3
    pub userval3: u16,
    /// User value 4
    pub userval4: u16,
    /// User value 5
    pub userval5: u32,
    /// User value 6
    pub userval6: u32,
    /// User value 7
    pub userval7: f32,
    /// User value 8
    pub userval8: f32,
    /// Which fields go out in MO messages
    pub mo_fields: FieldSelection,
    /// Message option flags, group 1
    pub flags1: Flags1,
    /// Message option flags, group 2
    pub flags2: Flags2,
    /// Destination serial number for message forwarding
    pub dest: u32,
    /// High pressure alarm limit in mbar
    pub hipress: u16,
    /// Low pressure alarm limit in mbar
    pub lopress: u16,
    /// High temperature alarm limit in degrees C * 10^-2
    pub hitemp: i16,
    /// Low temperature alarm limit in degrees C * 10^-2
    pub lotemp: i16,
    /// High humidity alarm limit in %RH * 10^-2
    pub hihumid: u16,
    /// Low humidity alarm limit in %RH * 10^-2
    pub lohumid: u16,
    /// Bits 7-4: number of geofences in use; bits 3-0: confidence level
    pub geofnum: u8,
    /// The four geofence circles
    pub geofences: [Geofence; 4],
    /// Wake-up interval in seconds
    pub wakeint: u32,
    /// Alarm transmit interval in minutes
    pub alarmint: u16,
    /// Message transmit interval in minutes.
    ///
    /// Written by the periodic RTC tick outside the main control flow, so it
    /// lives behind an atomic rather than a plain field. Use [`Self::txint`]
    /// and [`Self::set_txint`].
    #[cfg_attr(feature = "serde", serde(with = "atomic_u16"))]
    tx_interval: AtomicU16,
    /// Low battery alarm limit in V * 10^-2
    pub lowbatt: u16,
    /// GNSS dynamic platform model
    pub dyn_model: DynModel,
}

impl Default for SettingsRecord {
    /// The documented power-on defaults: fill values for telemetry, stock
    /// limits and intervals for configuration, DATETIME + LAT + LON + ALT
    /// selected for MO messages.
    fn default() -> Self {
        Self {
            swver: 0x21,
            source: 0,
            battv: 500,
            press: u16::MAX,
            temp: i16::MIN,
            humid: u16::MAX,
            utc: UtcTime {
                year: 0,
                month: 0,
                day: 0,
                hour: u8::MAX,
                minute: u8::MAX,
                second: u8::MAX,
            },
            millis: u16::MAX,
            lat: i32::MIN,
            lon: i32::MIN,
            alt: i32::MIN,
            speed: 0,
            head: 0,
            sats: 0,
            pdop: 0,
            fix: 0,
            geofstat: [0; 3],
            userval1: 0,
            userval2: 0,
            userval3: 0,
            userval4: 0,
            userval5: 0,
            userval6: 0,
            userval7: 0.0,
            userval8: 0.0,
            mo_fields: FieldSelection::from_words([0x0000_0F00, 0, 0]),
            flags1: Flags1::new(),
            flags2: Flags2::new(),
            dest: 0,
            hipress: 1084,
            lopress: 0,
            hitemp: 8500,
            lotemp: -4000,
            hihumid: 10000,
            lohumid: 0,
            geofnum: 0,
            geofences: [Geofence::default(); 4],
            wakeint: 60,
            alarmint: 5,
            tx_interval: AtomicU16::new(DEF_TXINT),
            lowbatt: 320,
            dyn_model: DynModel::Portable,
        }
    }
}

impl Clone for SettingsRecord {
    fn clone(&self) -> Self {
        Self {
            swver: self.swver,
            source: self.source,
            battv: self.battv,
            press: self.press,
            temp: self.temp,
            humid: self.humid,
            utc: self.utc,
            millis: self.millis,
            lat: self.lat,
            lon: self.lon,
            alt: self.alt,
            speed: self.speed,
            head: self.head,
            sats: self.sats,
            pdop: self.pdop,
            fix: self.fix,
            geofstat: self.geofstat,
            userval1: self.userval1,
            userval2: self.userval2,
            userval3: self.userval3,
            userval4: self.userval4,
            userval5: self.userval5,
            userval6: self.userval6,
            userval7: self.userval7,
            userval8: self.userval8,
            mo_fields: self.mo_fields,
            flags1: self.flags1,
            flags2: self.flags2,
            dest: self.dest,
            hipress: self.hipress,
            lopress: self.lopress,
            hitemp: self.hitemp,
            lotemp: self.lotemp,
            hihumid: self.hihumid,
            lohumid: self.lohumid,
            geofnum: self.geofnum,
            geofences: self.geofences,
            wakeint: self.wakeint,
            alarmint: self.alarmint,
            tx_interval: AtomicU16::new(self.txint()),
            lowbatt: self.lowbatt,
            dyn_model: self.dyn_model,
        }
    }
}

impl PartialEq for SettingsRecord {
    fn eq(&self, other: &Self) -> bool {
        self.swver == other.swver
            && self.source == other.source
            && self.battv == other.battv
            && self.press == other.press
            && self.temp == other.temp
            && self.humid == other.humid
            && self.utc == other.utc
            && self.millis == other.millis
            && self.lat == other.lat
            && self.lon == other.lon
            && self.alt == other.alt
            && self.speed == other.speed
            && self.head == other.head
            && self.sats == other.sats
            && self.pdop == other.pdop
            && self.fix == other.fix
            && self.geofstat == other.geofstat
            && self.userval1 == other.userval1
            && self.userval2 == other.userval2
            && self.userval3 == other.userval3
            && self.userval4 == other.userval4
            && self.userval5 == other.userval5
            && self.userval6 == other.userval6
            && self.userval7.to_bits() == other.userval7.to_bits()
            && self.userval8.to_bits() == other.userval8.to_bits()
            && self.mo_fields == other.mo_fields
            && self.flags1 == other.flags1
            && self.flags2 == other.flags2
            && self.dest == other.dest
            && self.hipress == other.hipress
            && self.lopress == other.lopress
            && self.hitemp == other.hitemp
            && self.lotemp == other.lotemp
            && self.hihumid == other.hihumid
            && self.lohumid == other.lohumid
            && self.geofnum == other.geofnum
            && self.geofences == other.geofences
            && self.wakeint == other.wakeint
            && self.alarmint == other.alarmint
            && self.txint() == other.txint()
            && self.lowbatt == other.lowbatt
            && self.dyn_model == other.dyn_model
    }
}

impl SettingsRecord {
    /// Current transmit interval in minutes.
    #[must_use]
    pub fn txint(&self) -> u16 {
        self.tx_interval.load(Ordering::Relaxed)
    }

    /// Set the transmit interval in minutes.
    ///
    /// Safe to call from the periodic tick handler through a shared
    /// reference; there is a single writer per direction and no ordering
    /// dependency, so relaxed ordering is sufficient.
    pub fn set_txint(&self, minutes: u16) {
        self.tx_interval.store(minutes, Ordering::Relaxed);
    }

    /// Read the current value of an encodable field.
    ///
    /// Markers, user-function triggers, and the gateway header have no value
    /// in the record and return `None`.
    #[must_use]
    pub fn value_of(&self, field: FieldId) -> Option<FieldValue> {
        match field {
            FieldId::Stx
            | FieldId::Etx
            | FieldId::RbHead
            | FieldId::UserFunc1
            | FieldId::UserFunc2
            | FieldId::UserFunc3
            | FieldId::UserFunc4
            | FieldId::UserFunc5
            | FieldId::UserFunc6
            | FieldId::UserFunc7
            | FieldId::UserFunc8 => None,
            FieldId::SwVer => Some(FieldValue::U8(self.swver)),
            FieldId::Source => Some(FieldValue::U32(self.source)),
            FieldId::BattV => Some(FieldValue::U16(self.battv)),
            FieldId::Press => Some(FieldValue::U16(self.press)),
            FieldId::Temp => Some(FieldValue::I16(self.temp)),
            FieldId::Humid => Some(FieldValue::U16(self.humid)),
            FieldId::Year => Some(FieldValue::U16(self.utc.year)),
            FieldId::Month => Some(FieldValue::U8(self.utc.month)),
            FieldId::Day => Some(FieldValue::U8(self.utc.day)),
            FieldId::Hour => Some(FieldValue::U8(self.utc.hour)),
            FieldId::Min => Some(FieldValue::U8(self.utc.minute)),
            FieldId::Sec => Some(FieldValue::U8(self.utc.second)),
            FieldId::Millis => Some(FieldValue::U16(self.millis)),
            FieldId::DateTime => Some(FieldValue::DateTime(self.utc)),
            FieldId::Lat => Some(FieldValue::I32(self.lat)),
            FieldId::Lon => Some(FieldValue::I32(self.lon)),
            FieldId::Alt => Some(FieldValue::I32(self.alt)),
            FieldId::Speed => Some(FieldValue::I32(self.speed)),
            FieldId::Head => Some(FieldValue::I32(self.head)),
            FieldId::Sats => Some(FieldValue::U8(self.sats)),
            FieldId::Pdop => Some(FieldValue::U16(self.pdop)),
            FieldId::Fix => Some(FieldValue::U8(self.fix)),
            FieldId::GeofStat => Some(FieldValue::GeofenceStatus(self.geofstat)),
            FieldId::UserVal1 => Some(FieldValue::U8(self.userval1)),
            FieldId::UserVal2 => Some(FieldValue::U8(self.userval2)),
            FieldId::UserVal3 => Some(FieldValue::U16(self.userval3)),
            FieldId::UserVal4 => Some(FieldValue::U16(self.userval4)),
            FieldId::UserVal5 => Some(FieldValue::U32(self.userval5)),
            FieldId::UserVal6 => Some(FieldValue::U32(self.userval6)),
            FieldId::UserVal7 => Some(FieldValue::F32(self.userval7)),
            FieldId::UserVal8 => Some(FieldValue::F32(self.userval8)),
            FieldId::MoFields => Some(FieldValue::Selection(self.mo_fields.words())),
            FieldId::Flags1 => Some(FieldValue::U8(self.flags1.as_u8())),
            FieldId::Flags2 => Some(FieldValue::U8(self.flags2.as_u8())),
            FieldId::Dest => Some(FieldValue::U32(self.dest)),
            FieldId::HiPress => Some(FieldValue::U16(self.hipress)),
            FieldId::LoPress => Some(FieldValue::U16(self.lopress)),
            FieldId::HiTemp => Some(FieldValue::I16(self.hitemp)),
            FieldId::LoTemp => Some(FieldValue::I16(self.lotemp)),
            FieldId::HiHumid => Some(FieldValue::U16(self.hihumid)),
            FieldId::LoHumid => Some(FieldValue::U16(self.lohumid)),
            FieldId::GeofNum => Some(FieldValue::U8(self.geofnum)),
            FieldId::Geof1Lat => Some(FieldValue::I32(self.geofences[0].lat)),
            FieldId::Geof1Lon => Some(FieldValue::I32(self.geofences[0].lon)),
            FieldId::Geof1Rad => Some(FieldValue::U32(self.geofences[0].radius)),
            FieldId::Geof2Lat => Some(FieldValue::I32(self.geofences[1].lat)),
            FieldId::Geof2Lon => Some(FieldValue::I32(self.geofences[1].lon)),
            FieldId::Geof2Rad => Some(FieldValue::U32(self.geofences[1].radius)),
            FieldId::Geof3Lat => Some(FieldValue::I32(self.geofences[2].lat)),
            FieldId::Geof3Lon => Some(FieldValue::I32(self.geofences[2].lon)),
            FieldId::Geof3Rad => Some(FieldValue::U32(self.geofences[2].radius)),
            FieldId::Geof4Lat => Some(FieldValue::I32(self.geofences[3].lat)),
            FieldId::Geof4Lon => Some(FieldValue::I32(self.geofences[3].lon)),
            FieldId::Geof4Rad => Some(FieldValue::U32(self.geofences[3].radius)),
            FieldId::WakeInt => Some(FieldValue::U32(self.wakeint)),
            FieldId::AlarmInt => Some(FieldValue::U16(self.alarmint)),
            FieldId::TxInt => Some(FieldValue::U16(self.txint())),
            FieldId::LowBatt => Some(FieldValue::U16(self.lowbatt)),
            FieldId::DynModel => Some(FieldValue::U8(self.dyn_model.as_u8())),
        }
    }

    /// Store a decoded value into the record.
    ///
    /// Validates value kinds and field-specific constraints (unknown dynamic
    /// platform models are rejected). Markers and user-function triggers are
    /// not settable.
    pub fn apply(&mut self, field: FieldId, value: FieldValue) -> Result<()> {
        match field {
            FieldId::Stx
            | FieldId::Etx
            | FieldId::RbHead
            | FieldId::UserFunc1
            | FieldId::UserFunc2
            | FieldId::UserFunc3
            | FieldId::UserFunc4
            | FieldId::UserFunc5
            | FieldId::UserFunc6
            | FieldId::UserFunc7
            | FieldId::UserFunc8 => {
                return Err(Error::InvalidValue {
                    field: field.name(),
                    reason: "not a settable field".to_string(),
                });
            }
            FieldId::SwVer => self.swver = value.expect_u8(field)?,
            FieldId::Source => self.source = value.expect_u32(field)?,
            FieldId::BattV => self.battv = value.expect_u16(field)?,
            FieldId::Press => self.press = value.expect_u16(field)?,
            FieldId::Temp => self.temp = value.expect_i16(field)?,
            FieldId::Humid => self.humid = value.expect_u16(field)?,
            FieldId::Year => self.utc.year = value.expect_u16(field)?,
            FieldId::Month => self.utc.month = value.expect_u8(field)?,
            FieldId::Day => self.utc.day = value.expect_u8(field)?,
            FieldId::Hour => self.utc.hour = value.expect_u8(field)?,
            FieldId::Min => self.utc.minute = value.expect_u8(field)?,
            FieldId::Sec => self.utc.second = value.expect_u8(field)?,
            FieldId::Millis => self.millis = value.expect_u16(field)?,
            FieldId::DateTime => match value {
                FieldValue::DateTime(t) => self.utc = t,
                other => {
                    return Err(Error::InvalidValue {
                        field: field.name(),
                        reason: format!("expected DateTime value, got {:?}", other.kind()),
                    });
                }
            },
            FieldId::Lat => self.lat = value.expect_i32(field)?,
            FieldId::Lon => self.lon = value.expect_i32(field)?,
            FieldId::Alt => self.alt = value.expect_i32(field)?,
            FieldId::Speed => self.speed = value.expect_i32(field)?,
            FieldId::Head => self.head = value.expect_i32(field)?,
            FieldId::Sats => self.sats = value.expect_u8(field)?,
            FieldId::Pdop => self.pdop = value.expect_u16(field)?,
            FieldId::Fix => self.fix = value.expect_u8(field)?,
            FieldId::GeofStat => match value {
                FieldValue::GeofenceStatus(s) => self.geofstat = s,
                other => {
                    return Err(Error::InvalidValue {
                        field: field.name(),
                        reason: format!("expected GeofenceStatus value, got {:?}", other.kind()),
                    });
                }
            },
            FieldId::UserVal1 => self.userval1 = value.expect_u8(field)?,
            FieldId::UserVal2 => self.userval2 = value.expect_u8(field)?,
            FieldId::UserVal3 => self.userval3 = value.expect_u16(field)?,
            FieldId::UserVal4 => self.userval4 = value.expect_u16(field)?,
            FieldId::UserVal5 => self.userval5 = value.expect_u32(field)?,
            FieldId::UserVal6 => self.userval6 = value.expect_u32(field)?,
            FieldId::UserVal7 => self.userval7 = value.expect_f32(field)?,
            FieldId::UserVal8 => self.userval8 = value.expect_f32(field)?,
            FieldId::MoFields => match value {
                FieldValue::Selection(words) => {
                    self.mo_fields = FieldSelection::from_words(words);
                }
                other => {
                    return Err(Error::InvalidValue {
                        field: field.name(),
                        reason: format!("expected Selection value, got {:?}", other.kind()),
                    });
                }
            },
            FieldId::Flags1 => self.flags1 = Flags1::from_u8(value.expect_u8(field)?),
            FieldId::Flags2 => self.flags2 = Flags2::from_u8(value.expect_u8(field)?),
            FieldId::Dest => self.dest = value.expect_u32(field)?,
            FieldId::HiPress => self.hipress = value.expect_u16(field)?,
            FieldId::LoPress => self.lopress = value.expect_u16(field)?,
            FieldId::HiTemp => self.hitemp = value.expect_i16(field)?,
            FieldId::LoTemp => self.lotemp = value.expect_i16(field)?,
            FieldId::HiHumid => self.hihumid = value.expect_u16(field)?,
            FieldId::LoHumid => self.lohumid = value.expect_u16(field)?,
            FieldId::GeofNum => self.geofnum = value.expect_u8(field)?,
            FieldId::Geof1Lat => self.geofences[0].lat = value.expect_i32(field)?,
            FieldId::Geof1Lon => self.geofences[0].lon = value.expect_i32(field)?,
            FieldId::Geof1Rad => self.geofences[0].radius = value.expect_u32(field)?,
            FieldId::Geof2Lat => self.geofences[1].lat = value.expect_i32(field)?,
            FieldId::Geof2Lon => self.geofences[1].lon = value.expect_i32(field)?,
            FieldId::Geof2Rad => self.geofences[1].radius = value.expect_u32(field)?,
            FieldId::Geof3Lat => self.geofences[2].lat = value.expect_i32(field)?,
            FieldId::Geof3Lon => self.geofences[2].lon = value.expect_i32(field)?,
            FieldId::Geof3Rad => self.geofences[2].radius = value.expect_u32(field)?,
            FieldId::Geof4Lat => self.geofences[3].lat = value.expect_i32(field)?,
            FieldId::Geof4Lon => self.geofences[3].lon = value.expect_i32(field)?,
            FieldId::Geof4Rad => self.geofences[3].radius = value.expect_u32(field)?,
            FieldId::WakeInt => self.wakeint = value.expect_u32(field)?,
            FieldId::AlarmInt => self.alarmint = value.expect_u16(field)?,
            FieldId::TxInt => self.set_txint(value.expect_u16(field)?),
            FieldId::LowBatt => self.lowbatt = value.expect_u16(field)?,
            FieldId::DynModel => {
                let raw = value.expect_u8(field)?;
                self.dyn_model = DynModel::from_u8(raw).ok_or_else(|| Error::InvalidValue {
                    field: field.name(),
                    reason: format!("unknown dynamic platform model {raw}"),
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod atomic_u16 {
    use std::sync::atomic::{AtomicU16, Ordering};

    pub fn serialize<S>(value: &AtomicU16, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(value.load(Ordering::Relaxed))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<AtomicU16, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <u16 as serde::Deserialize>::deserialize(deserializer).map(AtomicU16::new)
    }
}
