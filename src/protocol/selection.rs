//! Outbound field selection and option flags
//!
//! Which optional fields an MO message carries is controlled by three 32-bit
//! selection words (MOFIELDS0..2). Each defined bit is bound to exactly one
//! field; the binding below is an explicit ordered table, part of the wire
//! and configuration contract, and must not be renumbered.

use std::fmt;

use super::FieldId;

/// Message option flags, group 1.
///
/// Bit 7 selects binary (rather than text) MO messages; bit 6 enables
/// gateway forwarding to DEST; bits 5-0 enable the six environmental alarm
/// limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags1(u8);

impl Flags1 {
    /// Send MO messages in binary format
    pub const BINARY: u8 = 0x80;
    /// Forward MO messages to the DEST serial number
    pub const DEST: u8 = 0x40;
    /// Enable the high pressure alarm limit
    pub const HIPRESS: u8 = 0x20;
    /// Enable the low pressure alarm limit
    pub const LOPRESS: u8 = 0x10;
    /// Enable the high temperature alarm limit
    pub const HITEMP: u8 = 0x08;
    /// Enable the low temperature alarm limit
    pub const LOTEMP: u8 = 0x04;
    /// Enable the high humidity alarm limit
    pub const HIHUMID: u8 = 0x02;
    /// Enable the low humidity alarm limit
    pub const LOHUMID: u8 = 0x01;

    /// Create empty flags.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create from the wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        Self(value)
    }

    /// Convert to the wire byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Set a flag bit.
    #[must_use]
    pub const fn with(mut self, flag: u8) -> Self {
        self.0 |= flag;
        self
    }

    /// Clear a flag bit.
    #[must_use]
    pub const fn without(mut self, flag: u8) -> Self {
        self.0 &= !flag;
        self
    }

    /// Check whether a flag bit is set.
    #[must_use]
    pub const fn has(self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }
}

/// Message option flags, group 2.
///
/// Bit 7 enables geofence alerts, bit 6 selects inside (rather than outside)
/// as the alert condition, bit 5 enables the low-battery alert, bit 4 enables
/// ring-channel monitoring. Bits 3-0 are reserved and carried verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags2(u8);

impl Flags2 {
    /// Enable geofence alerts
    pub const GEOFENCE: u8 = 0x80;
    /// Alert when inside (rather than outside) the geofence
    pub const INSIDE: u8 = 0x40;
    /// Enable the low-battery alert
    pub const LOWBATT: u8 = 0x20;
    /// Monitor the ring channel for new MT messages
    pub const RING: u8 = 0x10;

    /// Create empty flags.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create from the wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        Self(value)
    }

    /// Convert to the wire byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Set a flag bit.
    #[must_use]
    pub const fn with(mut self, flag: u8) -> Self {
        self.0 |= flag;
        self
    }

    /// Clear a flag bit.
    #[must_use]
    pub const fn without(mut self, flag: u8) -> Self {
        self.0 &= !flag;
        self
    }

    /// Check whether a flag bit is set.
    #[must_use]
    pub const fn has(self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }
}

impl fmt::Display for Flags1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

impl fmt::Display for Flags2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Fixed binding of (selection word, bit mask) to the field it selects.
///
/// The encoder walks this table in order, so it also fixes the order fields
/// appear in an MO frame.
pub(crate) const BINDINGS: &[(usize, u32, FieldId)] = &[
    (0, 0x0800_0000, FieldId::SwVer),
    (0, 0x0080_0000, FieldId::Source),
    (0, 0x0040_0000, FieldId::BattV),
    (0, 0x0020_0000, FieldId::Press),
    (0, 0x0010_0000, FieldId::Temp),
    (0, 0x0008_0000, FieldId::Humid),
    (0, 0x0004_0000, FieldId::Year),
    (0, 0x0002_0000, FieldId::Month),
    (0, 0x0001_0000, FieldId::Day),
    (0, 0x0000_8000, FieldId::Hour),
    (0, 0x0000_4000, FieldId::Min),
    (0, 0x0000_2000, FieldId::Sec),
    (0, 0x0000_1000, FieldId::Millis),
    (0, 0x0000_0800, FieldId::DateTime),
    (0, 0x0000_0400, FieldId::Lat),
    (0, 0x0000_0200, FieldId::Lon),
    (0, 0x0000_0100, FieldId::Alt),
    (0, 0x0000_0080, FieldId::Speed),
    (0, 0x0000_0040, FieldId::Head),
    (0, 0x0000_0020, FieldId::Sats),
    (0, 0x0000_0010, FieldId::Pdop),
    (0, 0x0000_0008, FieldId::Fix),
    (0, 0x0000_0004, FieldId::GeofStat),
    (1, 0x8000_0000, FieldId::UserVal1),
    (1, 0x4000_0000, FieldId::UserVal2),
    (1, 0x2000_0000, FieldId::UserVal3),
    (1, 0x1000_0000, FieldId::UserVal4),
    (1, 0x0800_0000, FieldId::UserVal5),
    (1, 0x0400_0000, FieldId::UserVal6),
    (1, 0x0200_0000, FieldId::UserVal7),
    (1, 0x0100_0000, FieldId::UserVal8),
    (1, 0x0000_8000, FieldId::MoFields),
    (1, 0x0000_4000, FieldId::Flags1),
    (1, 0x0000_2000, FieldId::Flags2),
    (1, 0x0000_1000, FieldId::Dest),
    (1, 0x0000_0800, FieldId::HiPress),
    (1, 0x0000_0400, FieldId::LoPress),
    (1, 0x0000_0200, FieldId::HiTemp),
    (1, 0x0000_0100, FieldId::LoTemp),
    (1, 0x0000_0080, FieldId::HiHumid),
    (1, 0x0000_0040, FieldId::LoHumid),
    (1, 0x0000_0020, FieldId::GeofNum),
    (1, 0x0000_0010, FieldId::Geof1Lat),
    (1, 0x0000_0008, FieldId::Geof1Lon),
    (1, 0x0000_0004, FieldId::Geof1Rad),
    (1, 0x0000_0002, FieldId::Geof2Lat),
    (1, 0x0000_0001, FieldId::Geof2Lon),
    (2, 0x8000_0000, FieldId::Geof2Rad),
    (2, 0x4000_0000, FieldId::Geof3Lat),
    (2, 0x2000_0000, FieldId::Geof3Lon),
    (2, 0x1000_0000, FieldId::Geof3Rad),
    (2, 0x0800_0000, FieldId::Geof4Lat),
    (2, 0x0400_0000, FieldId::Geof4Lon),
    (2, 0x0200_0000, FieldId::Geof4Rad),
    (2, 0x0100_0000, FieldId::WakeInt),
    (2, 0x0080_0000, FieldId::AlarmInt),
    (2, 0x0040_0000, FieldId::TxInt),
    (2, 0x0020_0000, FieldId::LowBatt),
    (2, 0x0010_0000, FieldId::DynModel),
];

/// The MOFIELDS0..2 selection triplet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSelection {
    words: [u32; 3],
}

impl FieldSelection {
    /// Selection with no fields chosen.
    #[must_use]
    pub const fn empty() -> Self {
        Self { words: [0; 3] }
    }

    /// Build from raw MOFIELDS0..2 words.
    #[must_use]
    pub const fn from_words(words: [u32; 3]) -> Self {
        Self { words }
    }

    /// Raw MOFIELDS0..2 words.
    #[must_use]
    pub const fn words(self) -> [u32; 3] {
        self.words
    }

    /// Whether a field has a selection bit at all.
    #[must_use]
    pub fn is_selectable(field: FieldId) -> bool {
        Self::binding(field).is_some()
    }

    /// Add a field to the selection. Fields with no selection bit (markers,
    /// user function triggers, the gateway header) are ignored.
    #[must_use]
    pub fn with(mut self, field: FieldId) -> Self {
        if let Some((word, mask)) = Self::binding(field) {
            self.words[word] |= mask;
        }
        self
    }

    /// Remove a field from the selection.
    #[must_use]
    pub fn without(mut self, field: FieldId) -> Self {
        if let Some((word, mask)) = Self::binding(field) {
            self.words[word] &= !mask;
        }
        self
    }

    /// Check whether a field is selected.
    #[must_use]
    pub fn contains(self, field: FieldId) -> bool {
        match Self::binding(field) {
            Some((word, mask)) => (self.words[word] & mask) != 0,
            None => false,
        }
    }

    /// Iterate the selected fields in wire order.
    pub fn iter(self) -> impl Iterator<Item = FieldId> {
        BINDINGS
            .iter()
            .filter(move |&&(word, mask, _)| (self.words[word] & mask) != 0)
            .map(|&(_, _, field)| field)
    }

    /// Number of selected fields.
    #[must_use]
    pub fn len(self) -> usize {
        self.iter().count()
    }

    /// Whether the selection is empty.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.words == [0; 3]
    }

    fn binding(field: FieldId) -> Option<(usize, u32)> {
        BINDINGS
            .iter()
            .find(|&&(_, _, f)| f == field)
            .map(|&(word, mask, _)| (word, mask))
    }
}
