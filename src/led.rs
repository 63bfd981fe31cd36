//! LED controller (C8): owns the pixel buffer and the master knobs, and
//! exposes the command handler and fixed-cadence renderer (spec §4.8).

use defmt::{debug, warn};
use embassy_sync::signal::Signal;
use rand::SeedableRng;
use rand_core::RngCore as _;

use crate::color::{Hsv, PixelBuffer, RGB8};
use crate::command::{FeedbackAnimation, FeedbackKind, LedCommand, LedCommandKind};
use crate::config::{EffectParam, ParamKind, StaticConfig, VolatileConfig};
use crate::effects::{library, EffectContext, EffectRegistry, Scratch};
use crate::fsm::LedController;
use crate::hw::platform::RawMutex;

/// Number of editable system-setup parameters (spec §6's StaticConfig
/// fields, minus the per-effect parameter grid which belongs to C7):
/// min_brightness, led_offset_begin, led_offset_end, and the three
/// color-correction channels.
pub const SYSTEM_PARAM_COUNT: u8 = 6;

mod system_param_idx {
    pub const MIN_BRIGHTNESS: u8 = 0;
    pub const OFFSET_BEGIN: u8 = 1;
    pub const OFFSET_END: u8 = 2;
    pub const COLOR_R: u8 = 3;
    pub const COLOR_G: u8 = 4;
    pub const COLOR_B: u8 = 5;
}

const FADE_SEED: u64 = 0xD1CE_D1CE_D1CE_D1CE;

/// The LED controller's complete runtime state (spec §3, §4.8).
///
/// `N` is the physical LED count, `E` the number of registered effects.
pub struct LedRuntime<'a, const N: usize, const E: usize> {
    registry: EffectRegistry<N, E>,
    is_on: bool,
    effect_index: u8,
    master_brightness: u8,
    needs_render: bool,
    is_fading: bool,
    fade_start_ms: u64,
    fade_target: u8,
    feedback: Option<FeedbackAnimation>,
    scratch: Scratch<N>,
    rng: rand::rngs::SmallRng,
    last_frame: PixelBuffer<N>,
    strip_mode: u8,

    min_brightness: u8,
    led_offset_begin: u8,
    led_offset_end: u8,
    color_correction_rgb: [u8; 3],
    system_param_idx: u8,
    system_snapshot: Option<SystemSnapshot>,

    save_requested: &'a Signal<RawMutex, ()>,
}

#[derive(Clone, Copy)]
struct SystemSnapshot {
    min_brightness: u8,
    led_offset_begin: u8,
    led_offset_end: u8,
    color_correction_rgb: [u8; 3],
}

impl<'a, const N: usize, const E: usize> LedRuntime<'a, N, E> {
    pub fn new(registry: EffectRegistry<N, E>, save_requested: &'a Signal<RawMutex, ()>) -> Self {
        Self {
            registry,
            is_on: false,
            effect_index: 0,
            master_brightness: 255,
            needs_render: true,
            is_fading: false,
            fade_start_ms: 0,
            fade_target: 255,
            feedback: None,
            scratch: Scratch::empty(),
            rng: rand::rngs::SmallRng::seed_from_u64(FADE_SEED),
            last_frame: PixelBuffer::black(),
            strip_mode: 0,
            min_brightness: 10,
            led_offset_begin: 0,
            led_offset_end: 0,
            color_correction_rgb: [255, 255, 255],
            system_param_idx: 0,
            system_snapshot: None,
            save_requested,
        }
    }

    /// Install both loaded configuration structs into runtime state (spec
    /// §4.10, "Apply").
    pub fn apply_configs<const PARAMS: usize>(
        &mut self,
        volatile: &VolatileConfig,
        static_cfg: &StaticConfig<E, PARAMS>,
    ) {
        self.is_on = volatile.is_on;
        self.master_brightness = volatile.master_brightness;
        self.effect_index = volatile.effect_index.min(E.saturating_sub(1) as u8);
        self.min_brightness = static_cfg.min_brightness;
        self.led_offset_begin = static_cfg.led_offset_begin;
        self.led_offset_end = static_cfg.led_offset_end;
        self.color_correction_rgb = static_cfg.color_correction_rgb;
        for effect in 0..E as u8 {
            for param in 0..self.registry.n_params(effect).min(PARAMS as u8) {
                let value = static_cfg.effect_params[effect as usize][param as usize];
                self.registry.param_mut(effect, param).set_clamped(value);
            }
        }
        self.needs_render = true;
    }

    pub fn export_volatile_config(&self) -> VolatileConfig {
        VolatileConfig {
            is_on: self.is_on,
            master_brightness: self.master_brightness,
            effect_index: self.effect_index,
        }
    }

    pub fn export_static_config<const PARAMS: usize>(&self) -> StaticConfig<E, PARAMS> {
        let mut effect_params = [[0i16; PARAMS]; E];
        for effect in 0..E as u8 {
            for param in 0..self.registry.n_params(effect).min(PARAMS as u8) {
                effect_params[effect as usize][param as usize] =
                    self.registry.param(effect, param).value;
            }
        }
        StaticConfig {
            min_brightness: self.min_brightness,
            led_offset_begin: self.led_offset_begin,
            led_offset_end: self.led_offset_end,
            color_correction_rgb: self.color_correction_rgb,
            effect_params,
        }
    }

    fn start_fade(&mut self, now_ms: u64) {
        self.is_fading = true;
        self.fade_start_ms = now_ms;
        self.fade_target = self.master_brightness;
        self.needs_render = true;
    }

    fn feedback_color(&self, kind: FeedbackKind) -> Hsv {
        match kind {
            FeedbackKind::Green => Hsv::new(120, 255, 255),
            FeedbackKind::Red => Hsv::new(0, 255, 255),
            FeedbackKind::Blue => Hsv::new(220, 255, 255),
            FeedbackKind::Limit => Hsv::new(0, 255, 255),
            FeedbackKind::EffectColor => {
                let hue = self.registry.param(self.effect_index, 0).value as u16;
                Hsv::new(hue, 255, 255)
            }
        }
    }

    /// Apply one command, updating state and marking "needs render" (spec
    /// §4.8: "cannot block longer than the outbound mailbox allows" — this
    /// is a plain synchronous update, never itself suspends).
    pub fn handle_command(&mut self, cmd: LedCommand) {
        use LedCommandKind::*;

        if let Some(kind) = FeedbackKind::from_command_kind(cmd.kind) {
            // A new feedback preempts whatever overlay was previously active.
            self.feedback = Some(FeedbackAnimation::new(kind, cmd.timestamp_ms));
            return;
        }

        match cmd.kind {
            TurnOn => {
                if !self.is_on {
                    self.is_on = true;
                    self.start_fade(cmd.timestamp_ms);
                }
            }
            TurnOnFade => {
                self.is_on = true;
                self.start_fade(cmd.timestamp_ms);
            }
            TurnOff => {
                self.is_on = false;
                self.is_fading = false;
                self.needs_render = true;
            }
            SetEffect => {
                let idx = (cmd.value as u8).min(E.saturating_sub(1) as u8);
                if idx != self.effect_index {
                    self.effect_index = idx;
                    library::reset_scratch(&mut self.scratch);
                }
                self.needs_render = true;
            }
            SetBrightness => {
                self.master_brightness = (cmd.value as u8).clamp(self.min_brightness, 255);
                self.needs_render = true;
            }
            SetEffectParam => {
                self.registry
                    .param_mut(self.effect_index, cmd.param_idx)
                    .set_clamped(cmd.value);
                self.needs_render = true;
            }
            NextEffectParam => {
                // Purely a UI cursor concept the FSM owns; no controller state.
            }
            IncSystemParam => {
                self.apply_system_param_steps(self.system_param_idx, cmd.value as i32);
            }
            NextSystemParam => {
                self.system_param_idx = (self.system_param_idx + 1) % SYSTEM_PARAM_COUNT;
            }
            SaveConfig => {
                self.save_requested.signal(());
            }
            CancelConfig => {
                // Restoration already happened via the preceding SetEffect /
                // SetEffectParam commands the FSM emits before this one.
            }
            EnterEffectSetup | EnterEffectSelect => {}
            SetStripMode => {
                self.strip_mode = cmd.value as u8;
                self.needs_render = true;
            }
            ButtonError => {
                warn!("[LED] button decoder reported a stuck-press error");
            }
            FeedbackGreen | FeedbackRed | FeedbackBlue | FeedbackEffectColor | FeedbackLimit => {
                unreachable!("handled above via FeedbackKind::from_command_kind")
            }
        }
    }

    /// Render one frame at the current time (spec §4.8, the renderer's
    /// 6-step tick). Does not publish to the mailbox; the caller does that.
    pub fn render(&mut self, now_ms: u64) -> PixelBuffer<N> {
        const HALF_PERIOD_MS: u64 = crate::config::timing::FEEDBACK_HALF_PERIOD_MS as u64;
        const FADE_DURATION_MS: u64 = crate::config::timing::FADE_DURATION_MS as u64;

        if let Some(fb) = self.feedback {
            if fb.is_finished(now_ms, HALF_PERIOD_MS) {
                self.feedback = None;
                self.needs_render = true;
            } else {
                let mut frame = PixelBuffer::black();
                if fb.is_on_phase(now_ms, HALF_PERIOD_MS) {
                    frame.fill_hsv(self.feedback_color(fb.kind));
                } else {
                    frame.fill_hsv(Hsv::new(0, 0, 0));
                }
                return frame;
            }
        }

        if !self.is_on {
            let mut frame = PixelBuffer::black();
            frame.fill_rgb(RGB8::new(0, 0, 0));
            self.last_frame = frame;
            return frame;
        }

        let effective_brightness = if self.is_fading {
            let elapsed = now_ms.saturating_sub(self.fade_start_ms);
            self.needs_render = true;
            if elapsed >= FADE_DURATION_MS {
                self.is_fading = false;
                self.fade_target
            } else {
                ((self.fade_target as u64 * elapsed) / FADE_DURATION_MS.max(1)) as u8
            }
        } else {
            self.master_brightness
        };

        if self.needs_render || self.registry.is_dynamic(self.effect_index) {
            let params = self.registry.params(self.effect_index);
            let mut ctx = EffectContext {
                params,
                brightness: effective_brightness,
                t_ms: now_ms,
                rng: &mut self.rng,
                scratch: &mut self.scratch,
            };
            let mut frame = PixelBuffer::black();
            self.registry.eval(self.effect_index, &mut ctx, &mut frame);
            frame.apply_master_brightness(effective_brightness);
            self.last_frame = frame;
            self.needs_render = false;
        }

        self.last_frame
    }

    fn system_param_spec(idx: u8) -> (i16, i16, i16) {
        // (min, max, step)
        match idx {
            system_param_idx::MIN_BRIGHTNESS => (0, 255, 5),
            system_param_idx::OFFSET_BEGIN | system_param_idx::OFFSET_END => (0, 64, 1),
            _ => (0, 255, 5), // color channels
        }
    }

    fn system_param_value(&self, idx: u8) -> i16 {
        match idx {
            system_param_idx::MIN_BRIGHTNESS => self.min_brightness as i16,
            system_param_idx::OFFSET_BEGIN => self.led_offset_begin as i16,
            system_param_idx::OFFSET_END => self.led_offset_end as i16,
            system_param_idx::COLOR_R => self.color_correction_rgb[0] as i16,
            system_param_idx::COLOR_G => self.color_correction_rgb[1] as i16,
            _ => self.color_correction_rgb[2] as i16,
        }
    }

    fn set_system_param_value(&mut self, idx: u8, value: i16) {
        match idx {
            system_param_idx::MIN_BRIGHTNESS => self.min_brightness = value as u8,
            system_param_idx::OFFSET_BEGIN => self.led_offset_begin = value as u8,
            system_param_idx::OFFSET_END => self.led_offset_end = value as u8,
            system_param_idx::COLOR_R => self.color_correction_rgb[0] = value as u8,
            system_param_idx::COLOR_G => self.color_correction_rgb[1] = value as u8,
            _ => self.color_correction_rgb[2] = value as u8,
        }
    }

    fn apply_system_param_steps(&mut self, idx: u8, steps: i32) -> bool {
        let (min, max, step) = Self::system_param_spec(idx);
        let mut param = EffectParam::new(ParamKind::Value, self.system_param_value(idx), min, max, step, false);
        let limit_hit = param.apply_steps(steps);
        self.set_system_param_value(idx, param.value);
        limit_hit
    }
}

impl<'a, const N: usize, const E: usize> LedController for LedRuntime<'a, N, E> {
    fn is_on(&self) -> bool {
        self.is_on
    }

    fn master_brightness(&self) -> u8 {
        self.master_brightness
    }

    fn min_brightness(&self) -> u8 {
        self.min_brightness
    }

    fn effect_index(&self) -> u8 {
        self.effect_index
    }

    fn n_effects(&self) -> u8 {
        E as u8
    }

    fn n_params(&self, effect_index: u8) -> u8 {
        self.registry.n_params(effect_index)
    }

    fn param(&self, effect_index: u8, param_idx: u8) -> EffectParam {
        self.registry.param(effect_index, param_idx)
    }

    fn current_system_param(&self) -> EffectParam {
        let (min, max, step) = Self::system_param_spec(self.system_param_idx);
        EffectParam::new(
            ParamKind::Value,
            self.system_param_value(self.system_param_idx),
            min,
            max,
            step,
            false,
        )
    }

    fn enter_system_setup(&mut self) {
        self.system_param_idx = 0;
        self.system_snapshot = Some(SystemSnapshot {
            min_brightness: self.min_brightness,
            led_offset_begin: self.led_offset_begin,
            led_offset_end: self.led_offset_end,
            color_correction_rgb: self.color_correction_rgb,
        });
    }

    fn save_system_config(&mut self) {
        self.system_snapshot = None;
        self.save_requested.signal(());
    }

    fn cancel_system_config(&mut self) {
        if let Some(snap) = self.system_snapshot.take() {
            self.min_brightness = snap.min_brightness;
            self.led_offset_begin = snap.led_offset_begin;
            self.led_offset_end = snap.led_offset_end;
            self.color_correction_rgb = snap.color_correction_rgb;
        }
    }

    fn factory_reset(&mut self) {
        debug!("[LED] factory reset requested from system setup");
        self.min_brightness = 10;
        self.led_offset_begin = 0;
        self.led_offset_end = 0;
        self.color_correction_rgb = [255, 255, 255];
        for effect in 0..E as u8 {
            for param in 0..self.registry.n_params(effect) {
                self.registry.param_mut(effect, param).restore_default();
            }
        }
        self.save_requested.signal(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::library::default_registry;

    fn runtime(signal: &Signal<RawMutex, ()>) -> LedRuntime<'_, 4, 7> {
        LedRuntime::new(default_registry::<4>(), signal)
    }

    #[test]
    fn turn_on_starts_a_fade_from_off() {
        let sig = Signal::new();
        let mut rt = runtime(&sig);
        rt.handle_command(LedCommand::turn_on(0));
        assert!(rt.is_on());
        let frame = rt.render(0);
        // at t=0 the fade has not progressed: brightness should be near zero.
        if let PixelBuffer::Hsv(pixels) = frame {
            assert!(pixels.iter().all(|p| p.val < 10));
        } else {
            panic!("expected hsv frame");
        }
    }

    #[test]
    fn turn_on_is_idempotent_while_already_on() {
        let sig = Signal::new();
        let mut rt = runtime(&sig);
        rt.handle_command(LedCommand::turn_on(0));
        rt.render(2_000); // let the fade complete
        rt.handle_command(LedCommand::turn_on(5_000));
        assert!(!rt.is_fading);
    }

    #[test]
    fn set_brightness_clamps_to_min_brightness() {
        let sig = Signal::new();
        let mut rt = runtime(&sig);
        rt.min_brightness = 10;
        rt.handle_command(LedCommand::set_brightness(0, 0));
        assert_eq!(rt.master_brightness(), 10);
    }

    #[test]
    fn set_effect_resets_scratch() {
        let sig = Signal::new();
        let mut rt = runtime(&sig);
        rt.handle_command(LedCommand::turn_on(0));
        rt.render(2_000);
        rt.handle_command(LedCommand::set_effect(2_000, 5)); // Twinkle
        rt.render(2_010);
        assert!(matches!(rt.scratch, Scratch::Twinkle(_)));
        rt.handle_command(LedCommand::set_effect(2_010, 0)); // Solid
        assert!(matches!(rt.scratch, Scratch::None));
    }

    #[test]
    fn feedback_preempts_effect_output_then_expires() {
        let sig = Signal::new();
        let mut rt = runtime(&sig);
        rt.handle_command(LedCommand::turn_on(0));
        rt.render(2_000);
        rt.handle_command(LedCommand::feedback_green(2_000));
        let during = rt.render(2_050);
        if let PixelBuffer::Hsv(pixels) = during {
            assert_eq!(pixels[0].hue, 120);
        } else {
            panic!("expected hsv feedback frame");
        }
        // 2 blinks * 2 * 200ms = 800ms total.
        let after = rt.render(2_900);
        assert!(rt.feedback.is_none());
        let _ = after;
    }

    #[test]
    fn system_setup_cancel_restores_snapshot() {
        let sig = Signal::new();
        let mut rt = runtime(&sig);
        rt.enter_system_setup();
        let original = rt.min_brightness;
        rt.apply_system_param_steps(system_param_idx::MIN_BRIGHTNESS, 4); // +20
        assert_ne!(rt.min_brightness, original);
        rt.cancel_system_config();
        assert_eq!(rt.min_brightness, original);
    }

    #[test]
    fn factory_reset_restores_effect_param_defaults() {
        let sig = Signal::new();
        let mut rt = runtime(&sig);
        rt.handle_command(LedCommand::set_effect_param(0, 0, 42));
        assert_eq!(rt.param(rt.effect_index(), 0).value, 42);
        rt.factory_reset();
        let default = rt.registry.param(0, 0).default;
        assert_eq!(rt.param(0, 0).value, default);
    }

    #[test]
    fn save_config_signals_persistence() {
        let sig = Signal::new();
        let mut rt = runtime(&sig);
        assert!(!sig.signaled());
        rt.handle_command(LedCommand::save_config(0));
        assert!(sig.signaled());
    }
}
