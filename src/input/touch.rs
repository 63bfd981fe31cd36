//! Capacitive touch decoder (C3): baseline calibration, threshold press
//! detection, and press/hold detection (spec §4.3).

use crate::hw::LampDevice;

/// Events the touch decoder can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// A touch that released before `hold_time_ms` elapsed.
    Press,
    /// The touch has been held for at least `hold_time_ms`; repeats every
    /// `hold_repeat_ms` thereafter while `hold_repeat_enabled`.
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitPress,
    DebouncePress { t0: u64 },
    WaitReleaseOrHold {
        t0: u64,
        hold_emitted: bool,
        last_hold_ms: u64,
    },
    DebounceRelease { since: u64 },
}

/// Timing/behavior parameters for [`TouchDecoder`].
#[derive(Debug, Clone, Copy)]
pub struct TouchTiming {
    pub debounce_ms: u32,
    pub hold_time_ms: u32,
    pub hold_repeat_ms: u32,
    pub hold_repeat_enabled: bool,
    pub recalibration_interval_ms: u32,
    pub threshold_percent: u32,
}

impl TouchTiming {
    pub const fn from_device<D: LampDevice>() -> Self {
        Self {
            debounce_ms: crate::config::timing::DEBOUNCE_PRESS_MS,
            hold_time_ms: D::TOUCH_HOLD_TIME_MS,
            hold_repeat_ms: D::TOUCH_HOLD_REPEAT_MS,
            hold_repeat_enabled: D::TOUCH_HOLD_REPEAT_ENABLED,
            recalibration_interval_ms: D::TOUCH_RECALIBRATION_INTERVAL_MS,
            threshold_percent: D::TOUCH_THRESHOLD_PERCENT,
        }
    }
}

impl Default for TouchTiming {
    fn default() -> Self {
        Self {
            debounce_ms: crate::config::timing::DEBOUNCE_PRESS_MS,
            hold_time_ms: crate::config::timing::TOUCH_HOLD_TIME_MS,
            hold_repeat_ms: crate::config::timing::TOUCH_HOLD_REPEAT_MS,
            hold_repeat_enabled: true,
            recalibration_interval_ms: crate::config::timing::TOUCH_RECALIBRATION_INTERVAL_MS,
            threshold_percent: crate::config::timing::TOUCH_THRESHOLD_PERCENT,
        }
    }
}

/// Pure press/hold state machine driven by raw capacitance samples, matching
/// the spec §4.3 state table exactly: `Press` is emitted on a short,
/// debounced release (held less than `hold_time_ms`); `Hold` is emitted once
/// the touch has been held for at least `hold_time_ms`, and again every
/// `hold_repeat_ms` after that while `hold_repeat_enabled`. Baseline tracking
/// lives alongside it since the threshold is derived from the baseline (spec
/// §4.3: "press iff `baseline - sample > threshold`", threshold `= baseline *
/// threshold_percent / 100`).
pub struct TouchDecoder {
    state: State,
    timing: TouchTiming,
    baseline: u16,
}

impl TouchDecoder {
    /// Build a decoder with a baseline established from an initial batch of
    /// idle-state samples (spec §4.3: "averages N samples at startup").
    pub fn new(timing: TouchTiming, initial_samples: &[u16]) -> Self {
        let baseline = Self::average(initial_samples);
        Self {
            state: State::WaitPress,
            timing,
            baseline,
        }
    }

    fn average(samples: &[u16]) -> u16 {
        if samples.is_empty() {
            return 0;
        }
        let sum: u32 = samples.iter().map(|&s| s as u32).sum();
        (sum / samples.len() as u32) as u16
    }

    fn threshold(&self) -> u32 {
        self.baseline as u32 * self.timing.threshold_percent as u32 / 100
    }

    fn is_pressed(&self, sample: u16) -> bool {
        let delta = (self.baseline as i32) - (sample as i32);
        delta > self.threshold() as i32
    }

    /// Recalibrate the baseline from a fresh batch of samples. The caller is
    /// responsible for only invoking this while idle and with no read in
    /// flight (spec §4.3: recalibration "skips a cycle if a sample read is
    /// already in flight" and "disables the threshold interrupt while
    /// recalibrating").
    pub fn recalibrate(&mut self, samples: &[u16]) {
        if matches!(self.state, State::WaitPress) {
            self.baseline = Self::average(samples);
        }
    }

    /// Feed a new capacitance sample at time `now` (ms).
    pub fn on_sample(&mut self, now: u64, sample: u16) -> Option<TouchEvent> {
        let pressed = self.is_pressed(sample);
        match self.state {
            State::WaitPress => {
                if pressed {
                    self.state = State::DebouncePress { t0: now };
                }
                None
            }
            State::DebouncePress { t0 } => {
                if !pressed {
                    self.state = State::WaitPress;
                    None
                } else if now.saturating_sub(t0) >= self.timing.debounce_ms as u64 {
                    self.state = State::WaitReleaseOrHold {
                        t0,
                        hold_emitted: false,
                        last_hold_ms: t0,
                    };
                    None
                } else {
                    None
                }
            }
            State::WaitReleaseOrHold {
                t0,
                hold_emitted,
                last_hold_ms,
            } => {
                let duration = now.saturating_sub(t0);
                if !pressed {
                    self.state = State::DebounceRelease { since: now };
                    if duration < self.timing.hold_time_ms as u64 {
                        Some(TouchEvent::Press)
                    } else {
                        None
                    }
                } else if !hold_emitted && duration >= self.timing.hold_time_ms as u64 {
                    self.state = State::WaitReleaseOrHold {
                        t0,
                        hold_emitted: true,
                        last_hold_ms: now,
                    };
                    Some(TouchEvent::Hold)
                } else if hold_emitted
                    && self.timing.hold_repeat_enabled
                    && now.saturating_sub(last_hold_ms) >= self.timing.hold_repeat_ms as u64
                {
                    self.state = State::WaitReleaseOrHold {
                        t0,
                        hold_emitted: true,
                        last_hold_ms: now,
                    };
                    Some(TouchEvent::Hold)
                } else {
                    None
                }
            }
            State::DebounceRelease { since } => {
                if pressed {
                    self.state = State::WaitReleaseOrHold {
                        t0: now,
                        hold_emitted: false,
                        last_hold_ms: now,
                    };
                    None
                } else if now.saturating_sub(since) >= self.timing.debounce_ms as u64 {
                    self.state = State::WaitPress;
                    None
                } else {
                    None
                }
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::WaitPress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: TouchTiming = TouchTiming {
        debounce_ms: 30,
        hold_time_ms: 500,
        hold_repeat_ms: 300,
        hold_repeat_enabled: true,
        recalibration_interval_ms: 60_000,
        threshold_percent: 10,
    };

    fn baseline_decoder() -> TouchDecoder {
        TouchDecoder::new(T, &[1000, 1000, 1000, 1000])
    }

    #[test]
    fn short_release_emits_press() {
        let mut d = baseline_decoder();
        assert!(d.on_sample(0, 850).is_none()); // 150 delta > 100 threshold -> debouncing
        assert!(d.on_sample(10, 850).is_none());
        assert!(d.on_sample(30, 850).is_none()); // debounced into WaitReleaseOrHold, no event yet
        assert!(matches!(d.state, State::WaitReleaseOrHold { .. }));
        let ev = d.on_sample(60, 1000); // released well before hold_time_ms
        assert_eq!(ev, Some(TouchEvent::Press));
    }

    #[test]
    fn bounce_below_threshold_resets_debounce() {
        let mut d = baseline_decoder();
        d.on_sample(0, 850);
        assert!(d.on_sample(10, 1000).is_none()); // released before settling
        assert!(matches!(d.state, State::WaitPress));
    }

    #[test]
    fn hold_emits_at_threshold_then_repeats_at_interval() {
        let mut d = baseline_decoder();
        d.on_sample(0, 850);
        d.on_sample(30, 850); // debounced press at t0=0
        assert!(d.on_sample(400, 850).is_none());
        let first_hold = d.on_sample(500, 850); // held 500ms since press at t0=0
        assert_eq!(first_hold, Some(TouchEvent::Hold));
        assert!(d.on_sample(700, 850).is_none());
        let second_hold = d.on_sample(800, 850); // 300ms after first hold
        assert_eq!(second_hold, Some(TouchEvent::Hold));
    }

    #[test]
    fn release_after_hold_emits_no_press() {
        let mut d = baseline_decoder();
        d.on_sample(0, 850);
        d.on_sample(30, 850);
        d.on_sample(500, 850); // Hold fires
        let ev = d.on_sample(600, 1000); // released after a hold already fired
        assert_eq!(ev, None);
        assert!(matches!(d.state, State::DebounceRelease { .. }));
    }

    #[test]
    fn release_settles_back_to_wait_press_after_debounce() {
        let mut d = baseline_decoder();
        d.on_sample(0, 850);
        d.on_sample(30, 850);
        d.on_sample(40, 1000); // released, short press -> Press
        let ev = d.on_sample(40 + 30, 1000);
        assert_eq!(ev, None);
        assert!(d.is_idle());
    }

    #[test]
    fn recalibration_only_applies_while_idle() {
        let mut d = baseline_decoder();
        d.on_sample(0, 850);
        d.on_sample(30, 850); // now pressed, not idle
        d.recalibrate(&[900, 900, 900]);
        assert_eq!(d.baseline, 1000); // unchanged while pressed
    }
}
