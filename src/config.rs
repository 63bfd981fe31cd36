//! Timing constants, effect parameter slots, and the persisted configuration
//! structs (spec §3, §6).

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

/// Default timing constants (spec §6). A concrete lamp board may override
/// these through [`crate::hw::LampDevice`]'s associated consts; these are
/// simply the defaults used if it doesn't.
pub mod timing {
    pub const DEBOUNCE_PRESS_MS: u32 = 50;
    pub const DEBOUNCE_RELEASE_MS: u32 = 30;
    pub const DOUBLE_CLICK_MS: u32 = 180;
    pub const LONG_CLICK_MS: u32 = 1_000;
    pub const VERY_LONG_CLICK_MS: u32 = 3_000;
    pub const BUTTON_TIMEOUT_MS: u32 = 2 * VERY_LONG_CLICK_MS;

    pub const ENCODER_ACCEL_GAP_MS: u32 = 50;
    pub const ENCODER_ACCEL_MAX_MULTIPLIER: u32 = 5;

    pub const IDLE_TIMEOUT_EFFECT_SELECT_MS: u32 = 10_000;
    pub const IDLE_TIMEOUT_EFFECT_SETUP_MS: u32 = 15_000;
    pub const IDLE_TIMEOUT_SYSTEM_SETUP_MS: u32 = 30_000;

    pub const RENDER_TICK_MS: u32 = 33;
    pub const FEEDBACK_HALF_PERIOD_MS: u32 = 200;
    pub const FADE_DURATION_MS: u32 = 1_000;

    pub const TOUCH_HOLD_TIME_MS: u32 = 500;
    pub const TOUCH_HOLD_REPEAT_MS: u32 = 300;
    pub const TOUCH_RECALIBRATION_INTERVAL_MS: u32 = 60_000;
    pub const TOUCH_THRESHOLD_PERCENT: u32 = 10;

    pub const SWITCH_DEBOUNCE_MS: u32 = 30;
}

/// What an [`EffectParam`]'s value represents. Mirrors the closed tag set
/// from spec §3 so a UI or via-like protocol can render an appropriate
/// widget/unit for each slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ParamKind {
    Value = 0,
    Hue = 1,
    Saturation = 2,
    Brightness = 3,
    Speed = 4,
    Boolean = 5,
}

/// A single named, typed, bounded parameter slot owned by an [`crate::effects::Effect`]
/// descriptor (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectParam {
    pub kind: ParamKind,
    pub value: i16,
    pub min: i16,
    pub max: i16,
    pub step: i16,
    /// `true`: incrementing past `max` snaps to `min` (and vice versa).
    /// `false`: clamps at the bound and reports a limit hit.
    ///
    /// Hue parameters that are meant to wrap across the 0/360 degree
    /// boundary should set `min = 0`, `max = 359`, `wrap = true` — this is
    /// the resolution adopted for the open question in spec §9 about
    /// degree-space vs. 16-bit slot width: wrapping is a property of the
    /// param's own declared range, not of its `kind`.
    pub wrap: bool,
    pub default: i16,
}

impl EffectParam {
    pub const fn new(kind: ParamKind, default: i16, min: i16, max: i16, step: i16, wrap: bool) -> Self {
        Self {
            kind,
            value: default,
            min,
            max,
            step,
            wrap,
            default,
        }
    }

    /// Apply `steps` units of this param's `step` size to the current value.
    /// Returns `true` if the edit saturated against a non-wrapping bound
    /// (the caller should raise a `FeedbackLimit`).
    pub fn apply_steps(&mut self, steps: i32) -> bool {
        let span = (self.max as i32 - self.min as i32) + 1;
        let delta = steps * self.step as i32;
        let unclamped = self.value as i32 + delta;

        if self.wrap {
            let offset = unclamped - self.min as i32;
            let wrapped = offset.rem_euclid(span) + self.min as i32;
            self.value = wrapped as i16;
            false
        } else {
            let clamped = unclamped.clamp(self.min as i32, self.max as i32);
            let limit_hit = clamped != unclamped;
            self.value = clamped as i16;
            limit_hit
        }
    }

    /// Set an absolute value, clamping to the param's range. Used when
    /// applying a value that arrived over the peer wire or from storage.
    pub fn set_clamped(&mut self, value: i16) {
        self.value = value.clamp(self.min, self.max);
    }

    pub fn restore_default(&mut self) {
        self.value = self.default;
    }
}

/// Hot, frequently-written configuration slice (spec §3). Saved by the FSM
/// periodically and on mode-returning transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
pub struct VolatileConfig {
    pub is_on: bool,
    pub master_brightness: u8,
    pub effect_index: u8,
}

impl VolatileConfig {
    pub const fn default() -> Self {
        Self {
            is_on: false,
            master_brightness: 255,
            effect_index: 0,
        }
    }
}

impl Default for VolatileConfig {
    fn default() -> Self {
        Self::default()
    }
}

/// Cold, user-edited configuration slice (spec §3), saved only on explicit
/// user save of `EffectSetup`/`SystemSetup`.
///
/// `EFFECTS` and `PARAMS` are `N_EFFECTS` and `MAX_PARAMS` from
/// [`crate::hw::LampDevice`]; only the current value of each parameter slot
/// is persisted here; each slot's kind/min/max/step/wrap live on the
/// immutable [`crate::effects::Effect`] descriptor and are not duplicated in
/// storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticConfig<const EFFECTS: usize, const PARAMS: usize> {
    pub min_brightness: u8,
    pub led_offset_begin: u8,
    pub led_offset_end: u8,
    pub color_correction_rgb: [u8; 3],
    pub effect_params: [[i16; PARAMS]; EFFECTS],
}

impl<const EFFECTS: usize, const PARAMS: usize> StaticConfig<EFFECTS, PARAMS> {
    pub const fn default_with(effect_params: [[i16; PARAMS]; EFFECTS]) -> Self {
        Self {
            min_brightness: 10,
            led_offset_begin: 0,
            led_offset_end: 0,
            color_correction_rgb: [255, 255, 255],
            effect_params,
        }
    }

    /// Conservative upper bound on this config's postcard-encoded size, used
    /// to size the storage buffer (spec §4.10). The `u8` fields encode to
    /// one byte each; each `i16` parameter value encodes as a postcard
    /// zigzag varint, at most 3 bytes wide. `EFFECTS`/`PARAMS` are const
    /// generics, so [`postcard::experimental::max_size::MaxSize`]'s derive
    /// (which only covers fixed-size arrays, not ones sized by a generic
    /// struct's own const parameters) doesn't apply here; this is computed
    /// by hand instead.
    pub const fn max_encoded_size() -> usize {
        const FIXED_U8_FIELDS: usize = 1 + 1 + 1 + 3;
        const MAX_VARINT_BYTES_PER_PARAM: usize = 3;
        FIXED_U8_FIELDS + EFFECTS * PARAMS * MAX_VARINT_BYTES_PER_PARAM
    }
}
