//! The closed sum types that flow through the pipeline: [`LedCommand`]
//! (FSM → LED controller, and master → peer wire), [`IntegratedEvent`]
//! (decoders → FSM via the multiplexer), [`InteractionMode`], and
//! [`FeedbackAnimation`] (spec §3).

use embassy_sync::channel::Channel;

use crate::hw::platform::RawMutex;
use crate::input::{ButtonEvent, EncoderEvent, SwitchEvent, TouchEvent};

/// Depth of the LED-command channel the FSM emits onto, consumed locally by
/// the LED controller and, on a master, mirrored by the peer replicator
/// (spec §4.6, §4.9).
pub const COMMAND_CHANNEL_DEPTH: usize = 16;

pub type CommandChannel = Channel<RawMutex, LedCommand, COMMAND_CHANNEL_DEPTH>;

/// The closed set of command kinds the FSM can emit. Deliberately a plain
/// ordinal tag rather than a Rust enum carrying payload data: the peer wire
/// format (spec §6) lays every command out as the same fixed-size record
/// `{kind, timestamp_ms, value, param_idx}`, so keeping [`LedCommand`] a
/// struct rather than a variant-sized enum makes the in-memory shape match
/// the wire shape directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedCommandKind {
    TurnOff = 0,
    TurnOn = 1,
    TurnOnFade = 2,
    SetEffect = 3,
    SetBrightness = 4,
    SetEffectParam = 5,
    NextEffectParam = 6,
    IncSystemParam = 7,
    NextSystemParam = 8,
    SaveConfig = 9,
    CancelConfig = 10,
    EnterEffectSetup = 11,
    EnterEffectSelect = 12,
    SetStripMode = 13,
    FeedbackGreen = 14,
    FeedbackRed = 15,
    FeedbackBlue = 16,
    FeedbackEffectColor = 17,
    FeedbackLimit = 18,
    ButtonError = 19,
}

impl LedCommandKind {
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        use LedCommandKind::*;
        Some(match ordinal {
            0 => TurnOff,
            1 => TurnOn,
            2 => TurnOnFade,
            3 => SetEffect,
            4 => SetBrightness,
            5 => SetEffectParam,
            6 => NextEffectParam,
            7 => IncSystemParam,
            8 => NextSystemParam,
            9 => SaveConfig,
            10 => CancelConfig,
            11 => EnterEffectSetup,
            12 => EnterEffectSelect,
            13 => SetStripMode,
            14 => FeedbackGreen,
            15 => FeedbackRed,
            16 => FeedbackBlue,
            17 => FeedbackEffectColor,
            18 => FeedbackLimit,
            19 => ButtonError,
            _ => return None,
        })
    }

    pub const fn is_feedback(self) -> bool {
        matches!(
            self,
            LedCommandKind::FeedbackGreen
                | LedCommandKind::FeedbackRed
                | LedCommandKind::FeedbackBlue
                | LedCommandKind::FeedbackEffectColor
                | LedCommandKind::FeedbackLimit
        )
    }
}

/// A command on the LED-command channel, consumed locally by the LED
/// controller and, on a master with egress enabled, mirrored onto the peer
/// wire (spec §3, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCommand {
    pub kind: LedCommandKind,
    pub timestamp_ms: u64,
    pub value: i16,
    pub param_idx: u8,
}

impl LedCommand {
    const fn bare(kind: LedCommandKind, timestamp_ms: u64) -> Self {
        Self {
            kind,
            timestamp_ms,
            value: 0,
            param_idx: 0,
        }
    }

    pub const fn turn_off(ts: u64) -> Self {
        Self::bare(LedCommandKind::TurnOff, ts)
    }
    pub const fn turn_on(ts: u64) -> Self {
        Self::bare(LedCommandKind::TurnOn, ts)
    }
    pub const fn turn_on_fade(ts: u64) -> Self {
        Self::bare(LedCommandKind::TurnOnFade, ts)
    }
    pub const fn set_effect(ts: u64, index: u8) -> Self {
        Self {
            value: index as i16,
            ..Self::bare(LedCommandKind::SetEffect, ts)
        }
    }
    pub const fn set_brightness(ts: u64, brightness: u8) -> Self {
        Self {
            value: brightness as i16,
            ..Self::bare(LedCommandKind::SetBrightness, ts)
        }
    }
    pub const fn set_effect_param(ts: u64, param_idx: u8, value: i16) -> Self {
        Self {
            value,
            param_idx,
            ..Self::bare(LedCommandKind::SetEffectParam, ts)
        }
    }
    pub const fn next_effect_param(ts: u64) -> Self {
        Self::bare(LedCommandKind::NextEffectParam, ts)
    }
    pub const fn inc_system_param(ts: u64, step: i16) -> Self {
        Self {
            value: step,
            ..Self::bare(LedCommandKind::IncSystemParam, ts)
        }
    }
    pub const fn next_system_param(ts: u64) -> Self {
        Self::bare(LedCommandKind::NextSystemParam, ts)
    }
    pub const fn save_config(ts: u64) -> Self {
        Self::bare(LedCommandKind::SaveConfig, ts)
    }
    pub const fn cancel_config(ts: u64) -> Self {
        Self::bare(LedCommandKind::CancelConfig, ts)
    }
    pub const fn enter_effect_setup(ts: u64) -> Self {
        Self::bare(LedCommandKind::EnterEffectSetup, ts)
    }
    pub const fn enter_effect_select(ts: u64) -> Self {
        Self::bare(LedCommandKind::EnterEffectSelect, ts)
    }
    pub const fn set_strip_mode(ts: u64, mode: u8) -> Self {
        Self {
            value: mode as i16,
            ..Self::bare(LedCommandKind::SetStripMode, ts)
        }
    }
    pub const fn feedback_green(ts: u64) -> Self {
        Self::bare(LedCommandKind::FeedbackGreen, ts)
    }
    pub const fn feedback_red(ts: u64) -> Self {
        Self::bare(LedCommandKind::FeedbackRed, ts)
    }
    pub const fn feedback_blue(ts: u64) -> Self {
        Self::bare(LedCommandKind::FeedbackBlue, ts)
    }
    pub const fn feedback_effect_color(ts: u64) -> Self {
        Self::bare(LedCommandKind::FeedbackEffectColor, ts)
    }
    pub const fn feedback_limit(ts: u64) -> Self {
        Self::bare(LedCommandKind::FeedbackLimit, ts)
    }
    pub const fn button_error(ts: u64) -> Self {
        Self::bare(LedCommandKind::ButtonError, ts)
    }
}

/// A decoded event received from a peer over the wireless link, carrying the
/// [`LedCommand`] the originating master produced (spec §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerEvent(pub LedCommand);

/// Tagged union of every input source the multiplexer fans in (spec §3, C5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratedEventKind {
    Button(ButtonEvent),
    Encoder(EncoderEvent),
    Touch(TouchEvent),
    Switch(SwitchEvent),
    Peer(PeerEvent),
}

/// An event on the integrated stream, stamped with the multiplexer's receive
/// time (spec §3, §4.5: "Event ordering between sources is defined by this
/// receive timestamp").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegratedEvent {
    pub timestamp_ms: u64,
    pub kind: IntegratedEventKind,
}

impl IntegratedEvent {
    pub fn new(timestamp_ms: u64, kind: IntegratedEventKind) -> Self {
        Self { timestamp_ms, kind }
    }
}

/// The FSM's current mode (spec §3, §4.6). Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Off,
    Display,
    EffectSelect,
    EffectSetup,
    SystemSetup,
}

/// Which acknowledgement color a [`FeedbackAnimation`] blinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    /// Confirm.
    Green,
    /// Cancel.
    Red,
    /// Info.
    Blue,
    /// Info, in an effect-related hue.
    EffectColor,
    /// Parameter saturation.
    Limit,
}

impl FeedbackKind {
    pub fn from_command_kind(kind: LedCommandKind) -> Option<Self> {
        Some(match kind {
            LedCommandKind::FeedbackGreen => FeedbackKind::Green,
            LedCommandKind::FeedbackRed => FeedbackKind::Red,
            LedCommandKind::FeedbackBlue => FeedbackKind::Blue,
            LedCommandKind::FeedbackEffectColor => FeedbackKind::EffectColor,
            LedCommandKind::FeedbackLimit => FeedbackKind::Limit,
            _ => return None,
        })
    }
}

/// A short full-buffer blink overlay preempting the current effect to
/// acknowledge a user action (spec §3, glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackAnimation {
    pub kind: FeedbackKind,
    pub start_time_ms: u64,
    pub blink_count: u8,
}

impl FeedbackAnimation {
    pub const DEFAULT_BLINK_COUNT: u8 = 2;

    pub fn new(kind: FeedbackKind, start_time_ms: u64) -> Self {
        Self {
            kind,
            start_time_ms,
            blink_count: Self::DEFAULT_BLINK_COUNT,
        }
    }

    /// Total duration of the overlay: `blink_count * 2 * half_period` (spec §8).
    pub fn duration_ms(&self, half_period_ms: u64) -> u64 {
        self.blink_count as u64 * 2 * half_period_ms
    }

    pub fn is_finished(&self, now_ms: u64, half_period_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_time_ms) >= self.duration_ms(half_period_ms)
    }

    /// `true` during the ON half-period of the current blink, `false` during
    /// the OFF half-period.
    pub fn is_on_phase(&self, now_ms: u64, half_period_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.start_time_ms);
        (elapsed / half_period_ms) % 2 == 0
    }
}
