//! Persisted settings byte image
//!
//! The record is serialized at fixed offsets computed by cumulative summation
//! of the declared field widths, bracketed by the frame sentinels as guard
//! bytes, with a trailing two-byte checksum. The layout must stay stable
//! across firmware versions unless a migration is explicitly performed.

use tracing::{debug, warn};

use super::{FieldValue, SettingsRecord};
use crate::io::SettingsStore;
use crate::protocol::{Checksum, Error, ETX, FieldId, Result, STX};

/// Fields in image order. The UTC components are stored as the packed 7-byte
/// DATETIME composite, which occupies the same bytes as the individual
/// year/month/day/hour/minute/second fields would.
const IMAGE_FIELDS: &[FieldId] = &[
    FieldId::SwVer,
    FieldId::Source,
    FieldId::BattV,
    FieldId::Press,
    FieldId::Temp,
    FieldId::Humid,
    FieldId::DateTime,
    FieldId::Millis,
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
];

const fn field_bytes() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < IMAGE_FIELDS.len() {
        total += IMAGE_FIELDS[i].width();
        i += 1;
    }
    total
}

/// Total length of the persisted image: leading guard byte, every field at
/// its cumulative offset, trailing guard byte, two checksum bytes.
pub const IMAGE_LEN: usize = 1 + field_bytes() + 1 + 2;

impl SettingsRecord {
    /// Serialize the record to its fixed-offset byte image.
    ///
    /// The image starts with the frame-start guard byte, ends with the
    /// frame-end guard byte, and carries a two-byte checksum over everything
    /// before it.
    #[must_use]
    pub fn to_byte_image(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(IMAGE_LEN);
        image.push(STX);
        for &field in IMAGE_FIELDS {
            // Every image field is encodable by construction.
            if let Some(value) = self.value_of(field) {
                value.encode_into(&mut image);
            }
        }
        image.push(ETX);
        let cs = Checksum::over(&image);
        image.extend_from_slice(&cs.bytes());
        debug_assert_eq!(image.len(), IMAGE_LEN);
        image
    }

    /// Rebuild a record from a persisted byte image.
    ///
    /// Fails with [`Error::CorruptImage`] if the image has the wrong length,
    /// either guard byte does not hold its sentinel, the checksum does not
    /// verify, or a stored value fails field validation. The caller decides
    /// the fallback policy (normally: reset to `default()` and re-persist).
    pub fn from_byte_image(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != IMAGE_LEN {
            warn!(got = bytes.len(), expected = IMAGE_LEN, "settings image length mismatch");
            return Err(Error::CorruptImage {
                reason: "wrong image length",
            });
        }
        if bytes[0] != STX {
            return Err(Error::CorruptImage {
                reason: "leading guard byte mismatch",
            });
        }
        if bytes[IMAGE_LEN - 3] != ETX {
            return Err(Error::CorruptImage {
                reason: "trailing guard byte mismatch",
            });
        }
        let body = &bytes[..IMAGE_LEN - 2];
        let expected = [bytes[IMAGE_LEN - 2], bytes[IMAGE_LEN - 1]];
        if !Checksum::verify(body, expected) {
            warn!("settings image checksum mismatch");
            return Err(Error::CorruptImage {
                reason: "checksum mismatch",
            });
        }

        let mut record = Self::default();
        let mut offset = 1;
        for &field in IMAGE_FIELDS {
            let width = field.width();
            let value = FieldValue::decode(field.kind(), &bytes[offset..offset + width])
                .ok_or(Error::CorruptImage {
                    reason: "undecodable field value",
                })?;
            record.apply(field, value).map_err(|_| Error::CorruptImage {
                reason: "stored value failed field validation",
            })?;
            offset += width;
        }
        Ok(record)
    }
}

/// Load the settings record from the persistence collaborator.
pub fn load<S: SettingsStore>(store: &mut S) -> Result<SettingsRecord> {
    let bytes = store.read_persisted(0, IMAGE_LEN)?;
    let record = SettingsRecord::from_byte_image(&bytes)?;
    debug!("settings loaded from persisted image");
    Ok(record)
}

/// Persist the settings record through the persistence collaborator.
pub fn persist<S: SettingsStore>(record: &SettingsRecord, store: &mut S) -> Result<()> {
    store.write_persisted(0, &record.to_byte_image())?;
    debug!("settings persisted");
    Ok(())
}
