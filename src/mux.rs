//! Event multiplexer (C5): fans the four local decoders and the peer
//! ingress queue into one timestamped [`IntegratedEvent`] stream (spec §3,
//! §4.5).
//!
//! Each source channel is bounded and backpressures its producer on send
//! (spec §4.5: "a full output channel blocks the producer; no coalescing").
//! Ordering between sources is defined purely by the multiplexer's receive
//! time, not by any priority between sources.

use embassy_futures::select::{select, select3, Either, Either3};
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::Instant;

use crate::command::{IntegratedEvent, IntegratedEventKind, PeerEvent};
use crate::hw::platform::RawMutex;
use crate::input::{ButtonEvent, EncoderEvent, SwitchEvent, TouchEvent};

/// Depth of every per-source input channel and the merged output channel.
pub const CHANNEL_DEPTH: usize = 8;

pub type ButtonChannel = Channel<RawMutex, ButtonEvent, CHANNEL_DEPTH>;
pub type EncoderChannel = Channel<RawMutex, EncoderEvent, CHANNEL_DEPTH>;
pub type TouchChannel = Channel<RawMutex, TouchEvent, CHANNEL_DEPTH>;
pub type SwitchChannel = Channel<RawMutex, SwitchEvent, CHANNEL_DEPTH>;
pub type PeerChannel = Channel<RawMutex, PeerEvent, CHANNEL_DEPTH>;
pub type IntegratedChannel = Channel<RawMutex, IntegratedEvent, CHANNEL_DEPTH>;

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

fn stamp(kind: IntegratedEventKind) -> IntegratedEvent {
    IntegratedEvent::new(now_ms(), kind)
}

/// Drives the fan-in loop, forwarding every event received on any source
/// channel onto `out`, stamped with the multiplexer's own receive time.
///
/// Intended to run as the body of a single `#[embassy_executor::task]`; it
/// never returns.
pub async fn run(
    buttons: Receiver<'_, RawMutex, ButtonEvent, CHANNEL_DEPTH>,
    encoders: Receiver<'_, RawMutex, EncoderEvent, CHANNEL_DEPTH>,
    touches: Receiver<'_, RawMutex, TouchEvent, CHANNEL_DEPTH>,
    switches: Receiver<'_, RawMutex, SwitchEvent, CHANNEL_DEPTH>,
    peers: Receiver<'_, RawMutex, PeerEvent, CHANNEL_DEPTH>,
    out: Sender<'_, RawMutex, IntegratedEvent, CHANNEL_DEPTH>,
) -> ! {
    loop {
        let local = select3(buttons.receive(), encoders.receive(), touches.receive());
        let event = match select(local, select(switches.receive(), peers.receive())).await {
            Either::First(Either3::First(e)) => stamp(IntegratedEventKind::Button(e)),
            Either::First(Either3::Second(e)) => stamp(IntegratedEventKind::Encoder(e)),
            Either::First(Either3::Third(e)) => stamp(IntegratedEventKind::Touch(e)),
            Either::Second(Either::First(e)) => stamp(IntegratedEventKind::Switch(e)),
            Either::Second(Either::Second(e)) => stamp(IntegratedEventKind::Peer(e)),
        };
        out.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_preserves_event_kind() {
        // now_ms() needs an embassy time driver, which isn't available on
        // the host test target; exercise the wrapping logic directly
        // instead of going through stamp().
        let ev = IntegratedEvent::new(123, IntegratedEventKind::Button(ButtonEvent::Single));
        match ev.kind {
            IntegratedEventKind::Button(ButtonEvent::Single) => {}
            _ => panic!("expected a button event"),
        }
        assert_eq!(ev.timestamp_ms, 123);
    }
}
