//! Per-device input decoders (C1-C4): debounced/decoded state machines that
//! turn raw lines into typed events on a bounded channel.
//!
//! Each decoder is split into a pure, synchronously-testable state machine
//! (`*Decoder`) and a thin `#[embassy_executor::task]` wrapper that drives it
//! from a [`crate::hw`] trait and a notification/poll loop, per spec §4 and
//! §5 ("Input decoders: wait on an ISR-posted notification; after
//! notification, poll their line with bounded yields").

pub mod button;
pub mod encoder;
pub mod switch;
pub mod touch;

pub use button::{ButtonDecoder, ButtonEvent};
pub use encoder::{EncoderDecoder, EncoderEvent};
pub use switch::{SwitchDecoder, SwitchEvent};
pub use touch::{TouchDecoder, TouchEvent};

/// Internal tick cadence used while a decoder is not idle (spec §4.1: "polls
/// the line with ~10 ms internal ticks while not idle").
pub const POLL_INTERVAL_MS: u64 = 10;
