//! Non-blocking inbound frame assembly
//!
//! Accumulates modem bytes into a frame buffer across repeated polls. The
//! link delivers a message as a burst: once bytes have been seen, a one
//! second gap means the burst is over. A session with no bytes at all gives
//! up after ten seconds. The receiver never blocks and never parses; the
//! assembled frame goes to [`decode_mt`](super::decode_mt) afterwards.

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::io::{ByteSource, Clock};

/// Idle gap after the last byte that ends a reception burst.
pub const RX_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Overall deadline for a reception session.
pub const RX_OVERALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Reception progress reported by [`FrameReceiver::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxStatus {
    /// No bytes yet, still waiting
    NotSeen,
    /// Bytes are arriving, burst not over
    Seen,
    /// The burst ended; a frame is ready to take
    Received,
    /// The overall deadline passed without a single byte
    TimedOut,
}

/// Accumulates a frame from a polled byte source.
///
/// Call [`poll`](Self::poll) from the main loop; it drains whatever the
/// source has pending and returns the session status. On
/// [`RxStatus::Received`], call [`take_frame`](Self::take_frame) to get the
/// bytes and rearm the receiver for the next session.
#[derive(Debug, Default)]
pub struct FrameReceiver {
    buf: BytesMut,
    started_at: Option<Duration>,
    last_byte_at: Option<Duration>,
}

impl FrameReceiver {
    /// A receiver with an empty buffer and no session running.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain pending bytes and report the session status.
    ///
    /// The first call starts the session clock. Safe to call again after a
    /// terminal status; the status is simply reported again until the
    /// receiver is rearmed by [`take_frame`](Self::take_frame) or
    /// [`reset`](Self::reset).
    pub fn poll<S: ByteSource, C: Clock>(&mut self, source: &mut S, clock: &C) -> RxStatus {
        let now = clock.now_elapsed();
        let started = *self.started_at.get_or_insert(now);

        while let Some(byte) = source.poll_byte() {
            self.buf.put_u8(byte);
            self.last_byte_at = Some(now);
            trace!(byte, buffered = self.buf.len(), "rx byte");
        }

        match self.last_byte_at {
            None => {
                if now.saturating_sub(started) >= RX_OVERALL_TIMEOUT {
                    debug!("rx session timed out with no data");
                    RxStatus::TimedOut
                } else {
                    RxStatus::NotSeen
                }
            }
            Some(last) => {
                if now.saturating_sub(last) >= RX_IDLE_TIMEOUT
                    || now.saturating_sub(started) >= RX_OVERALL_TIMEOUT
                {
                    debug!(bytes = self.buf.len(), "rx burst complete");
                    RxStatus::Received
                } else {
                    RxStatus::Seen
                }
            }
        }
    }

    /// Bytes accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been received yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the assembled frame and rearm for the next session.
    #[must_use]
    pub fn take_frame(&mut self) -> Bytes {
        let frame = self.buf.split().freeze();
        self.started_at = None;
        self.last_byte_at = None;
        frame
    }

    /// Discard any partial frame and rearm for the next session.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.started_at = None;
        self.last_byte_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::VecDeque;

    struct Pipe(VecDeque<u8>);
    impl ByteSource for Pipe {
        fn poll_byte(&mut self) -> Option<u8> {
            self.0.pop_front()
        }
    }

    struct TestClock(Cell<Duration>);
    impl TestClock {
        fn advance(&self, d: Duration) {
            self.0.set(self.0.get() + d);
        }
    }
    impl Clock for TestClock {
        fn now_elapsed(&self) -> Duration {
            self.0.get()
        }
    }

    #[test]
    fn silence_times_out_after_overall_deadline() {
        let mut rx = FrameReceiver::new();
        let mut pipe = Pipe(VecDeque::new());
        let clock = TestClock(Cell::new(Duration::ZERO));

        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::NotSeen);
        clock.advance(Duration::from_secs(9));
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::NotSeen);
        clock.advance(Duration::from_secs(1));
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::TimedOut);
        assert!(rx.is_empty());
    }

    #[test]
    fn burst_completes_on_idle_gap() {
        let mut rx = FrameReceiver::new();
        let mut pipe = Pipe(VecDeque::from(vec![0x02, 0x03]));
        let clock = TestClock(Cell::new(Duration::ZERO));

        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Seen);
        pipe.0.extend([0x05, 0x07]);
        clock.advance(Duration::from_millis(500));
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Seen);
        clock.advance(Duration::from_millis(999));
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Seen);
        clock.advance(Duration::from_millis(1));
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Received);

        let frame = rx.take_frame();
        assert_eq!(&frame[..], &[0x02, 0x03, 0x05, 0x07]);
        assert!(rx.is_empty());
    }

    #[test]
    fn slow_trickle_cut_off_by_overall_deadline() {
        let mut rx = FrameReceiver::new();
        let mut pipe = Pipe(VecDeque::new());
        let clock = TestClock(Cell::new(Duration::ZERO));

        // A byte every 900ms keeps resetting the idle gap.
        for _ in 0..11 {
            pipe.0.push_back(0xAA);
            let status = rx.poll(&mut pipe, &clock);
            assert_ne!(status, RxStatus::TimedOut);
            clock.advance(Duration::from_millis(900));
        }
        // 9.9s elapsed; the overall deadline lands before the next idle gap.
        clock.advance(Duration::from_millis(100));
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Received);
    }

    #[test]
    fn terminal_status_is_stable_until_rearmed() {
        let mut rx = FrameReceiver::new();
        let mut pipe = Pipe(VecDeque::from(vec![0x01]));
        let clock = TestClock(Cell::new(Duration::ZERO));

        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Seen);
        clock.advance(Duration::from_secs(2));
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Received);
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Received);

        rx.reset();
        assert!(rx.is_empty());
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::NotSeen);
    }

    #[test]
    fn received_frame_feeds_the_decoder() {
        use crate::protocol::decode_mt;
        use crate::settings::SettingsRecord;

        let mut rx = FrameReceiver::new();
        let mut body = vec![0x02, 0x20, 0x2A, 0x03]; // USERVAL1 = 42
        let cs = crate::protocol::Checksum::over(&body);
        body.extend_from_slice(&cs.bytes());
        let mut pipe = Pipe(VecDeque::from(body));
        let clock = TestClock(Cell::new(Duration::ZERO));

        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Seen);
        clock.advance(RX_IDLE_TIMEOUT);
        assert_eq!(rx.poll(&mut pipe, &clock), RxStatus::Received);

        let frame = rx.take_frame();
        let mut settings = SettingsRecord::default();
        decode_mt(&frame, &mut settings).unwrap();
        assert_eq!(settings.userval1, 42);
    }
}
