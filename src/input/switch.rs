//! Toggle switch decoder (C4): edge-triggered debounce over a binary input
//! that gates master egress (spec §4.4).

use crate::hw::LampDevice;

/// A debounced level change on the switch line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchEvent {
    pub is_closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle { is_closed: bool },
    Debouncing { t0: u64, candidate: bool },
}

/// Pure debounce state machine for one switch line. Unlike the button
/// decoder this has no multi-click semantics: it reports plain level
/// changes once they've been stable for `debounce_ms`.
pub struct SwitchDecoder {
    state: State,
    debounce_ms: u32,
}

impl SwitchDecoder {
    pub const fn new(debounce_ms: u32, initial_is_closed: bool) -> Self {
        Self {
            state: State::Idle {
                is_closed: initial_is_closed,
            },
            debounce_ms,
        }
    }

    pub const fn from_device<D: LampDevice>(initial_is_closed: bool) -> Self {
        Self::new(D::SWITCH_DEBOUNCE_MS, initial_is_closed)
    }

    /// The switch's level at boot, to be published once so a master can
    /// initialize its egress gate before any edge occurs (spec §4.4).
    pub fn initial_event(&self) -> SwitchEvent {
        match self.state {
            State::Idle { is_closed } => SwitchEvent { is_closed },
            State::Debouncing { candidate, .. } => SwitchEvent {
                is_closed: candidate,
            },
        }
    }

    /// Feed a raw level change at time `now` (ms). Starts or restarts the
    /// debounce window; never emits directly.
    pub fn on_edge(&mut self, now: u64, is_high: bool) {
        self.state = State::Debouncing {
            t0: now,
            candidate: is_high,
        };
    }

    /// Advance time-driven transitions, re-sampling the line. Emits once the
    /// candidate level has survived the full debounce window.
    pub fn on_tick(&mut self, now: u64, is_high: bool) -> Option<SwitchEvent> {
        match self.state {
            State::Debouncing { t0, candidate } => {
                if is_high != candidate {
                    // Line bounced back before settling; restart the window.
                    self.state = State::Debouncing {
                        t0: now,
                        candidate: is_high,
                    };
                    None
                } else if now.saturating_sub(t0) >= self.debounce_ms as u64 {
                    self.state = State::Idle {
                        is_closed: candidate,
                    };
                    Some(SwitchEvent {
                        is_closed: candidate,
                    })
                } else {
                    None
                }
            }
            State::Idle { .. } => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle { .. })
    }
}
