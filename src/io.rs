//! Collaborator interfaces
//!
//! The codec core is transport- and hardware-agnostic. Everything it needs
//! from the outside world comes in through these traits: persistent memory
//! primitives, the satellite modem frame channel, the inbound byte stream,
//! and a monotonic clock. Production code implements them over EEPROM, the
//! modem driver, and the RTC; tests implement them in memory.

use std::time::Duration;

/// Raw persistent-memory primitives (EEPROM or equivalent).
pub trait SettingsStore {
    /// Read `len` bytes starting at `offset`.
    fn read_persisted(&mut self, offset: usize, len: usize) -> std::io::Result<Vec<u8>>;

    /// Write `bytes` starting at `offset`.
    fn write_persisted(&mut self, offset: usize, bytes: &[u8]) -> std::io::Result<()>;
}

/// Outbound frame channel to the satellite modem.
pub trait FrameSink {
    /// Hand a complete framed message to the transport for transmission.
    fn send_frame(&mut self, frame: &[u8]) -> std::io::Result<()>;
}

/// Inbound byte stream from the modem or a local serial channel.
pub trait ByteSource {
    /// Take the next available byte, or `None` when nothing is pending.
    ///
    /// Must not block: the receive loop stays responsive by polling.
    fn poll_byte(&mut self) -> Option<u8>;
}

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed epoch (for example boot).
    fn now_elapsed(&self) -> Duration;
}
