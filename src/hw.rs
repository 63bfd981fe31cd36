//! External collaborator boundaries (spec §1, §6).
//!
//! Raw GPIO/capacitive/wireless peripheral access, the LED wire protocol,
//! the non-volatile blob store, and OTA upload are explicitly out of scope
//! for this crate; the spec only pins down the interfaces the core demands
//! of each. Those interfaces are the traits below. A concrete lamp board
//! implements them against its actual peripherals and passes the
//! implementations into the tasks in [`crate::input`], [`crate::led`],
//! [`crate::peer`], and [`crate::storage`].

use core::fmt::Debug;

use crate::color::PixelBuffer;

/// Mutex re-export under the path the rest of the crate's doc comments
/// refer to, matching the `hw::platform::RawMutex` convention used
/// throughout the wider embassy-firmware ecosystem this crate is part of.
pub mod platform {
    pub type RawMutex = crate::RawMutex;
}

/// Compile-time facts about a concrete lamp board: LED count, effect/param
/// table shape, master/slave role, and (optionally) overridden timing
/// constants. Every associated const has a default so a board only needs to
/// override what differs from spec §6.
pub trait LampDevice {
    /// Number of physically addressable LEDs.
    const N_LEDS: usize;
    /// Number of entries in the effect registry.
    const N_EFFECTS: usize;
    /// Upper bound on parameter slots per effect.
    const MAX_PARAMS: usize;
    /// `true` if this unit originates commands and mirrors them to peers;
    /// `false` if it only applies commands received from a master.
    const IS_MASTER: bool;

    const DEBOUNCE_PRESS_MS: u32 = crate::config::timing::DEBOUNCE_PRESS_MS;
    const DEBOUNCE_RELEASE_MS: u32 = crate::config::timing::DEBOUNCE_RELEASE_MS;
    const DOUBLE_CLICK_MS: u32 = crate::config::timing::DOUBLE_CLICK_MS;
    const LONG_CLICK_MS: u32 = crate::config::timing::LONG_CLICK_MS;
    const VERY_LONG_CLICK_MS: u32 = crate::config::timing::VERY_LONG_CLICK_MS;
    const BUTTON_TIMEOUT_MS: u32 = crate::config::timing::BUTTON_TIMEOUT_MS;

    const ENCODER_ACCEL_GAP_MS: u32 = crate::config::timing::ENCODER_ACCEL_GAP_MS;
    const ENCODER_ACCEL_MAX_MULTIPLIER: u32 = crate::config::timing::ENCODER_ACCEL_MAX_MULTIPLIER;
    const ENCODER_ACCELERATION_ENABLED: bool = true;
    const ENCODER_FLIP_DIRECTION: bool = false;
    const ENCODER_HALF_STEP: bool = false;

    const TOUCH_HOLD_TIME_MS: u32 = crate::config::timing::TOUCH_HOLD_TIME_MS;
    const TOUCH_HOLD_REPEAT_MS: u32 = crate::config::timing::TOUCH_HOLD_REPEAT_MS;
    const TOUCH_HOLD_REPEAT_ENABLED: bool = true;
    const TOUCH_RECALIBRATION_INTERVAL_MS: u32 =
        crate::config::timing::TOUCH_RECALIBRATION_INTERVAL_MS;
    const TOUCH_THRESHOLD_PERCENT: u32 = crate::config::timing::TOUCH_THRESHOLD_PERCENT;

    const SWITCH_DEBOUNCE_MS: u32 = crate::config::timing::SWITCH_DEBOUNCE_MS;
    const SWITCH_ACTIVE_LOW: bool = false;
}

/// A debounced binary input line with edge notification, as used by the
/// button decoder (C1) and the switch decoder (C4). Implementations
/// typically wait on a GPIO interrupt, then poll the line level directly.
pub trait DigitalLine {
    /// Suspend until the line's level changes (either edge).
    async fn wait_for_any_edge(&mut self);
    /// Read the current level. `true` means logic-high.
    fn is_high(&mut self) -> bool;
}

/// The two quadrature lines of a rotary encoder, plus its integrated push
/// button, per C2.
pub trait EncoderLines {
    /// Suspend until either quadrature line transitions.
    async fn wait_for_edge(&mut self);
    /// Read both quadrature lines as `(a, b)`.
    fn read_ab(&mut self) -> (bool, bool);
}

/// A filtered capacitance reading source for the touch pad, per C3.
pub trait TouchSensor {
    /// Suspend until a new capacitance sample is ready, then return it.
    async fn sample(&mut self) -> u16;
}

/// Error raised by a [`PeerTransport`] send/receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerTransportError<E> {
    Driver(E),
    WrongLength { expected: usize, actual: usize },
}

/// The wireless link used to mirror [`crate::command::LedCommand`]s from a
/// master to its slaves, per C9. Delivery is best-effort; the replicator
/// does not retry failed sends (spec §4.9).
pub trait PeerTransport {
    type DriverError: Debug;

    /// Broadcast a serialized command to every configured peer address.
    async fn broadcast(
        &mut self,
        frame: &[u8],
    ) -> Result<(), PeerTransportError<Self::DriverError>>;

    /// Receive the next serialized command from a peer (slave side).
    async fn receive(
        &mut self,
        buf: &mut [u8],
    ) -> Result<usize, PeerTransportError<Self::DriverError>>;
}

/// Error raised by a [`BlobStore`] read/write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobStoreError<E> {
    Driver(E),
    Missing,
    SizeMismatch { expected: usize, actual: usize },
}

/// The non-volatile key/value blob store, per C10. The store itself (flash
/// wear-levelling, the key/value format) is out of scope; the core only
/// needs to read and write opaque byte blobs by key.
pub trait BlobStore {
    type DriverError: Debug;

    async fn read(
        &mut self,
        key: &str,
        buf: &mut [u8],
    ) -> Result<usize, BlobStoreError<Self::DriverError>>;

    async fn write(
        &mut self,
        key: &str,
        data: &[u8],
    ) -> Result<(), BlobStoreError<Self::DriverError>>;
}

/// The downstream LED wire driver, consuming rendered frames from the
/// renderer's single-slot mailbox. Per spec §6, it is responsible for
/// HSV→RGB conversion and applying the static color-correction triple; both
/// are outside this crate's scope, so this trait only needs a `write`.
pub trait LedStrip<const N: usize> {
    type DriverError: Debug;

    async fn write(&mut self, frame: &PixelBuffer<N>) -> Result<(), Self::DriverError>;
}
