//! Peer replicator (C9): mirrors [`LedCommand`]s from a master to its
//! slaves over a short-range wireless link (spec §4.9, §6).
//!
//! The wire format is a fixed-layout 16 byte record (spec §6), not a
//! `postcard`-encoded one: the master's egress gate is keyed purely off
//! byte offsets (`cmd tag`, `timestamp_ms`, `value`, `param_idx`) with
//! natural alignment padding, so this module lays the bytes out by hand
//! the way [`vial's handlers`](https://docs.rs/rumcake) pack fixed HID
//! report fields, rather than pulling in a self-describing codec.

use defmt::warn;

use embassy_sync::channel::Receiver;

use crate::command::{LedCommand, LedCommandKind, PeerEvent, COMMAND_CHANNEL_DEPTH};
use crate::hw::platform::RawMutex;
use crate::hw::{PeerTransport, PeerTransportError};
use crate::mux::PeerChannel;

/// Size in bytes of the wire record described in spec §6.
pub const FRAME_SIZE: usize = 16;

/// Errors that can occur encoding/decoding a peer wire frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerCodecError {
    UnknownCommandKind(u8),
    WrongLength { expected: usize, actual: usize },
}

/// Serialize a [`LedCommand`] into the fixed 16 byte layout from spec §6:
/// `{cmd tag: u8 @0, timestamp_ms: u64 LE @4, value: i16 LE @12, param_idx:
/// u8 @14}`, with the two gaps left zeroed as natural-alignment padding.
pub fn encode(cmd: &LedCommand) -> [u8; FRAME_SIZE] {
    let mut frame = [0u8; FRAME_SIZE];
    frame[0] = cmd.kind as u8;
    frame[4..12].copy_from_slice(&cmd.timestamp_ms.to_le_bytes());
    frame[12..14].copy_from_slice(&cmd.value.to_le_bytes());
    frame[14] = cmd.param_idx;
    frame
}

/// Decode a received frame back into a [`LedCommand`]. Rejects any payload
/// whose length does not exactly match [`FRAME_SIZE`] (spec §6: "Any
/// received payload with a different length is rejected").
pub fn decode(bytes: &[u8]) -> Result<LedCommand, PeerCodecError> {
    if bytes.len() != FRAME_SIZE {
        return Err(PeerCodecError::WrongLength {
            expected: FRAME_SIZE,
            actual: bytes.len(),
        });
    }

    let kind = LedCommandKind::from_ordinal(bytes[0])
        .ok_or(PeerCodecError::UnknownCommandKind(bytes[0]))?;
    let timestamp_ms = u64::from_le_bytes(bytes[4..12].try_into().unwrap());
    let value = i16::from_le_bytes(bytes[12..14].try_into().unwrap());
    let param_idx = bytes[14];

    Ok(LedCommand {
        kind,
        timestamp_ms,
        value,
        param_idx,
    })
}

/// Master-side egress: when `true`, every command that passes through
/// [`egress_task`] is also broadcast on the wire. Toggled by the interaction
/// FSM in response to the mechanical switch (spec §4.6, §4.9).
pub struct EgressGate {
    enabled: core::sync::atomic::AtomicBool,
}

impl EgressGate {
    pub const fn new(initially_enabled: bool) -> Self {
        Self {
            enabled: core::sync::atomic::AtomicBool::new(initially_enabled),
        }
    }

    pub fn set(&self, enabled: bool) {
        self.enabled
            .store(enabled, core::sync::atomic::Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(core::sync::atomic::Ordering::Relaxed)
    }
}

impl Default for EgressGate {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Master egress loop: broadcasts every [`LedCommand`] received on `cmds`
/// while `gate` is enabled. Delivery is best-effort; a failed send is logged
/// and the replicator moves on to the next command rather than retrying
/// (spec §4.9: "Delivery is best-effort; failed sends are logged but not
/// retried").
///
/// Intended to run as the body of a single `#[embassy_executor::task]`; it
/// never returns.
pub async fn egress_task<T: PeerTransport>(
    cmds: Receiver<'_, RawMutex, LedCommand, COMMAND_CHANNEL_DEPTH>,
    gate: &EgressGate,
    mut transport: T,
) -> ! {
    loop {
        let cmd = cmds.receive().await;
        if !gate.is_enabled() {
            continue;
        }
        let frame = encode(&cmd);
        if let Err(err) = transport.broadcast(&frame).await {
            warn!(
                "[PEER] broadcast failed for {}: {}",
                defmt::Debug2Format(&cmd.kind),
                defmt::Debug2Format(&err)
            );
        }
    }
}

/// Slave-side ingress: receives frames from the transport, decodes them,
/// and forwards them to the event multiplexer as [`PeerEvent`]s. A frame of
/// the wrong length or an unrecognized command tag is rejected and logged,
/// not propagated (spec §4.9, §7).
///
/// Intended to run as the body of a single `#[embassy_executor::task]`; it
/// never returns.
pub async fn ingress_task<T: PeerTransport>(
    mut transport: T,
    out: &PeerChannel,
) -> ! {
    let mut buf = [0u8; FRAME_SIZE];
    loop {
        match transport.receive(&mut buf).await {
            Ok(len) => match decode(&buf[..len]) {
                Ok(cmd) => {
                    out.send(PeerEvent(cmd)).await;
                }
                Err(err) => {
                    warn!("[PEER] rejected frame: {}", defmt::Debug2Format(&err));
                }
            },
            Err(PeerTransportError::WrongLength { expected, actual }) => {
                warn!(
                    "[PEER] rejected frame of length {} (expected {})",
                    actual, expected
                );
            }
            Err(PeerTransportError::Driver(e)) => {
                warn!("[PEER] receive error: {}", defmt::Debug2Format(&e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips() {
        let cmd = LedCommand::set_effect_param(0x0102_0304_0506_0708, 3, -17);
        let frame = encode(&cmd);
        assert_eq!(frame.len(), FRAME_SIZE);
        let decoded = decode(&frame).unwrap();
        assert_eq!(decoded, cmd);
    }

    #[test]
    fn encode_matches_literal_offsets() {
        let cmd = LedCommand::set_brightness(1, 200);
        let frame = encode(&cmd);
        assert_eq!(frame[0], LedCommandKind::SetBrightness as u8);
        assert_eq!(u64::from_le_bytes(frame[4..12].try_into().unwrap()), 1);
        assert_eq!(i16::from_le_bytes(frame[12..14].try_into().unwrap()), 200);
        assert_eq!(frame[14], 0);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let short = [0u8; 10];
        assert_eq!(
            decode(&short),
            Err(PeerCodecError::WrongLength {
                expected: FRAME_SIZE,
                actual: 10
            })
        );
    }

    #[test]
    fn decode_rejects_unknown_command_kind() {
        let mut frame = [0u8; FRAME_SIZE];
        frame[0] = 200;
        assert_eq!(decode(&frame), Err(PeerCodecError::UnknownCommandKind(200)));
    }

    #[test]
    fn gate_defaults_disabled() {
        let gate = EgressGate::default();
        assert!(!gate.is_enabled());
        gate.set(true);
        assert!(gate.is_enabled());
    }
}
