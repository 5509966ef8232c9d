//! Frame checksum engine
//!
//! Two running sums in the style of the 8-bit Fletcher algorithm: for each
//! byte, A accumulates the byte and B accumulates A, both reduced modulo 255.
//! The frame carries A then B; that order is what the deployed ground tools
//! accept and is not a free choice.

/// Running two-byte frame checksum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum {
    a: u8,
    b: u8,
}

impl Checksum {
    /// Create a fresh checksum with both sums at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { a: 0, b: 0 }
    }

    /// Fold one byte into the running sums.
    pub fn push(&mut self, byte: u8) {
        self.a = ((u16::from(self.a) + u16::from(byte)) % 255) as u8;
        self.b = ((u16::from(self.b) + u16::from(self.a)) % 255) as u8;
    }

    /// Fold a byte slice into the running sums.
    pub fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    /// Compute the checksum of `bytes` in one shot.
    #[must_use]
    pub fn over(bytes: &[u8]) -> Self {
        let mut cs = Self::new();
        cs.extend(bytes);
        cs
    }

    /// The two checksum bytes in wire order: A then B.
    #[must_use]
    pub const fn bytes(self) -> [u8; 2] {
        [self.a, self.b]
    }

    /// Verify `expected` (wire order A, B) against the checksum of `bytes`.
    #[must_use]
    pub fn verify(bytes: &[u8], expected: [u8; 2]) -> bool {
        Self::over(bytes).bytes() == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_body() {
        // [STX][ETX]: A = 2 + 3 = 5, B = 2 + 5 = 7
        let cs = Checksum::over(&[0x02, 0x03]);
        assert_eq!(cs.bytes(), [0x05, 0x07]);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = [0x02, 0x15, 0xDE, 0xAD, 0xBE, 0xEF, 0x03];
        let mut cs = Checksum::new();
        for &b in &data {
            cs.push(b);
        }
        assert_eq!(cs, Checksum::over(&data));
    }

    #[test]
    fn modulo_255_reduction() {
        // 255 identical bytes of value 1: A walks 1..=254 then wraps to 0
        let data = [1u8; 255];
        let cs = Checksum::over(&data);
        assert_eq!(cs.bytes()[0], 0);
    }

    #[test]
    fn verify_detects_mismatch() {
        let data = [0x02, 0x04, 0x21, 0x03];
        let good = Checksum::over(&data).bytes();
        assert!(Checksum::verify(&data, good));
        assert!(!Checksum::verify(&data, [good[0] ^ 1, good[1]]));
        assert!(!Checksum::verify(&data, [good[0], good[1] ^ 1]));
    }
}
