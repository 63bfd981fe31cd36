//! Interaction FSM (C6): translates the integrated event stream into LED
//! commands, owning interaction mode, idle timeouts, and feedback dispatch
//! (spec §4.6).
//!
//! The transition logic itself is a pure function of `(mode, event,
//! read-only LED state)` so it can be driven synchronously in tests; the
//! async task in this module only supplies the event source and clock.

use heapless::Vec;

use crate::command::{
    IntegratedEvent, IntegratedEventKind, InteractionMode, LedCommand,
};
use crate::config::EffectParam;
use crate::input::{ButtonEvent, EncoderEvent, SwitchEvent, TouchEvent};
use crate::input::encoder::Direction;

/// Upper bound on parameter slots snapshotted for an EffectSetup
/// cancel-restore, and on commands a single processed event can emit (the
/// switch-on state-sync burst: TurnOn/TurnOff, SetEffect, SetBrightness,
/// one SetEffectParam per parameter, plus a trailing feedback command).
pub const MAX_SNAPSHOT_PARAMS: usize = 8;
const MAX_COMMANDS_PER_STEP: usize = MAX_SNAPSHOT_PARAMS + 4;

pub type CommandBuf = Vec<LedCommand, MAX_COMMANDS_PER_STEP>;

/// Read/write access to the LED controller's (C8) runtime state that the
/// FSM needs in order to compute absolute command payloads and drive
/// system-setup's structural entry points. Everything that can be expressed
/// as a plain [`LedCommand`] instead flows through the command channel, not
/// this trait.
pub trait LedController {
    fn is_on(&self) -> bool;
    fn master_brightness(&self) -> u8;
    fn min_brightness(&self) -> u8;
    fn effect_index(&self) -> u8;
    fn n_effects(&self) -> u8;
    fn n_params(&self, effect_index: u8) -> u8;
    fn param(&self, effect_index: u8, param_idx: u8) -> EffectParam;

    /// The system-setup parameter slot currently selected by
    /// [`InteractionFsm::handle_button`]'s `NextSystemParam` cursor, with its
    /// bounds/step filled in so the FSM can preview a limit hit the same way
    /// it does for effect parameters (spec §4.6: `SystemSetup` encoder edits
    /// "optional FeedbackLimit").
    fn current_system_param(&self) -> EffectParam;

    /// Enter system-setup mode. Structural (not a generic [`LedCommand`]):
    /// system parameters are per-board calibration, not mirrored generically.
    fn enter_system_setup(&mut self);
    fn save_system_config(&mut self);
    fn cancel_system_config(&mut self);
    fn factory_reset(&mut self);
}

/// Idle-timeout durations per setup mode (spec §4.6, §6).
#[derive(Debug, Clone, Copy)]
pub struct FsmTiming {
    pub t_sel_ms: u32,
    pub t_set_ms: u32,
    pub t_sys_ms: u32,
}

impl Default for FsmTiming {
    fn default() -> Self {
        Self {
            t_sel_ms: crate::config::timing::IDLE_TIMEOUT_EFFECT_SELECT_MS,
            t_set_ms: crate::config::timing::IDLE_TIMEOUT_EFFECT_SETUP_MS,
            t_sys_ms: crate::config::timing::IDLE_TIMEOUT_SYSTEM_SETUP_MS,
        }
    }
}

/// The interaction state machine (spec §3, §4.6).
pub struct InteractionFsm {
    mode: InteractionMode,
    last_event_ms: u64,
    timing: FsmTiming,
    is_master: bool,
    egress_enabled: bool,
    entry_effect_index: u8,
    entry_params: Vec<i16, MAX_SNAPSHOT_PARAMS>,
    current_param_idx: u8,
}

impl InteractionFsm {
    pub fn new(timing: FsmTiming, is_master: bool) -> Self {
        Self {
            mode: InteractionMode::Off,
            last_event_ms: 0,
            timing,
            is_master,
            egress_enabled: false,
            entry_effect_index: 0,
            entry_params: Vec::new(),
            current_param_idx: 0,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Whether a master should currently mirror commands onto the peer wire
    /// (spec §4.6, §4.9): the board's own task wiring reads this after every
    /// [`step`](Self::step) to keep [`crate::peer::EgressGate`] in sync.
    pub fn egress_enabled(&self) -> bool {
        self.egress_enabled
    }

    fn snapshot_effect_params(&mut self, ctrl: &dyn LedController) {
        self.entry_params.clear();
        let effect = ctrl.effect_index();
        for idx in 0..ctrl.n_params(effect) {
            let _ = self.entry_params.push(ctrl.param(effect, idx).value);
        }
    }

    fn clamp_brightness(&self, ctrl: &dyn LedController, steps: i32) -> (u8, bool) {
        let min = ctrl.min_brightness() as i32;
        let max = 255i32;
        let unclamped = ctrl.master_brightness() as i32 + steps;
        let clamped = unclamped.clamp(min, max);
        (clamped as u8, clamped != unclamped)
    }

    /// Process one event, returning the (possibly empty) sequence of
    /// commands it produces. Also resets the idle timer.
    pub fn step(
        &mut self,
        event: IntegratedEvent,
        ctrl: &mut dyn LedController,
    ) -> CommandBuf {
        let ts = event.timestamp_ms;
        self.last_event_ms = ts;
        let mut out = CommandBuf::new();

        match event.kind {
            IntegratedEventKind::Switch(SwitchEvent { is_closed }) => {
                self.handle_switch(ts, is_closed, ctrl, &mut out);
                return out;
            }
            IntegratedEventKind::Peer(peer) => {
                if !self.is_master {
                    if matches!(
                        self.mode,
                        InteractionMode::EffectSelect
                            | InteractionMode::EffectSetup
                            | InteractionMode::SystemSetup
                    ) {
                        self.mode = InteractionMode::Display;
                    }
                    let _ = out.push(peer.0);
                }
                return out;
            }
            IntegratedEventKind::Button(b) => self.handle_button(ts, b, ctrl, &mut out),
            IntegratedEventKind::Encoder(e) => self.handle_encoder(ts, e, ctrl, &mut out),
            IntegratedEventKind::Touch(t) => self.handle_touch(ts, t, ctrl, &mut out),
        }

        out
    }

    fn handle_switch(
        &mut self,
        ts: u64,
        is_closed: bool,
        ctrl: &mut dyn LedController,
        out: &mut CommandBuf,
    ) {
        if self.is_master {
            let was_enabled = self.egress_enabled;
            self.egress_enabled = is_closed;
            if is_closed && !was_enabled {
                self.emit_state_sync_burst(ts, ctrl, out);
            }
        } else {
            let _ = out.push(LedCommand::set_strip_mode(ts, is_closed as u8));
        }
    }

    fn emit_state_sync_burst(&self, ts: u64, ctrl: &dyn LedController, out: &mut CommandBuf) {
        let _ = out.push(if ctrl.is_on() {
            LedCommand::turn_on(ts)
        } else {
            LedCommand::turn_off(ts)
        });
        let effect = ctrl.effect_index();
        let _ = out.push(LedCommand::set_effect(ts, effect));
        let _ = out.push(LedCommand::set_brightness(ts, ctrl.master_brightness()));
        for idx in 0..ctrl.n_params(effect) {
            let value = ctrl.param(effect, idx).value;
            let _ = out.push(LedCommand::set_effect_param(ts, idx, value));
        }
    }

    fn handle_button(
        &mut self,
        ts: u64,
        b: ButtonEvent,
        ctrl: &mut dyn LedController,
        out: &mut CommandBuf,
    ) {
        match self.mode {
            InteractionMode::Off => {
                if matches!(b, ButtonEvent::Single | ButtonEvent::Long | ButtonEvent::Double) {
                    self.mode = InteractionMode::Display;
                    let _ = out.push(LedCommand::turn_on(ts));
                } else if matches!(b, ButtonEvent::Timeout | ButtonEvent::Error) {
                    let _ = out.push(LedCommand::button_error(ts));
                }
            }
            InteractionMode::Display => match b {
                ButtonEvent::Single => {
                    self.mode = InteractionMode::Off;
                    let _ = out.push(LedCommand::turn_off(ts));
                }
                ButtonEvent::Double => {
                    self.mode = InteractionMode::EffectSelect;
                    self.entry_effect_index = ctrl.effect_index();
                    let _ = out.push(LedCommand::enter_effect_select(ts));
                    let _ = out.push(LedCommand::feedback_effect_color(ts));
                }
                ButtonEvent::Long => {
                    self.mode = InteractionMode::EffectSetup;
                    self.current_param_idx = 0;
                    self.snapshot_effect_params(ctrl);
                    let _ = out.push(LedCommand::enter_effect_setup(ts));
                    let _ = out.push(LedCommand::feedback_blue(ts));
                }
                ButtonEvent::VeryLong => {
                    self.mode = InteractionMode::SystemSetup;
                    ctrl.enter_system_setup();
                    let _ = out.push(LedCommand::feedback_blue(ts));
                }
                ButtonEvent::Timeout | ButtonEvent::Error => {
                    let _ = out.push(LedCommand::button_error(ts));
                }
            },
            InteractionMode::EffectSelect => match b {
                ButtonEvent::Single => {
                    self.mode = InteractionMode::Display;
                    let _ = out.push(LedCommand::set_effect(ts, ctrl.effect_index()));
                    let _ = out.push(LedCommand::feedback_green(ts));
                }
                ButtonEvent::Double => {
                    self.mode = InteractionMode::Display;
                    let _ = out.push(LedCommand::set_effect(ts, self.entry_effect_index));
                    let _ = out.push(LedCommand::cancel_config(ts));
                    let _ = out.push(LedCommand::feedback_red(ts));
                }
                _ => {}
            },
            InteractionMode::EffectSetup => match b {
                ButtonEvent::Single => {
                    let n = ctrl.n_params(ctrl.effect_index()).max(1);
                    self.current_param_idx = (self.current_param_idx + 1) % n;
                    let _ = out.push(LedCommand::next_effect_param(ts));
                    let _ = out.push(LedCommand::feedback_effect_color(ts));
                }
                ButtonEvent::Long => {
                    self.mode = InteractionMode::Display;
                    let _ = out.push(LedCommand::save_config(ts));
                    let _ = out.push(LedCommand::feedback_green(ts));
                }
                ButtonEvent::Double => {
                    self.mode = InteractionMode::Display;
                    self.restore_snapshotted_params(ts, out);
                    let _ = out.push(LedCommand::cancel_config(ts));
                    let _ = out.push(LedCommand::feedback_red(ts));
                }
                ButtonEvent::VeryLong => {
                    self.restore_default_params(ts, ctrl, out);
                    let _ = out.push(LedCommand::feedback_green(ts));
                }
                _ => {}
            },
            InteractionMode::SystemSetup => match b {
                ButtonEvent::Single => {
                    let _ = out.push(LedCommand::next_system_param(ts));
                    let _ = out.push(LedCommand::feedback_blue(ts));
                }
                ButtonEvent::Long => {
                    self.mode = InteractionMode::Display;
                    ctrl.save_system_config();
                    let _ = out.push(LedCommand::feedback_green(ts));
                }
                ButtonEvent::Double => {
                    self.mode = InteractionMode::Display;
                    ctrl.cancel_system_config();
                    let _ = out.push(LedCommand::feedback_red(ts));
                }
                ButtonEvent::VeryLong => {
                    ctrl.factory_reset();
                    let _ = out.push(LedCommand::feedback_green(ts));
                }
                _ => {}
            },
        }
    }

    fn restore_snapshotted_params(&self, ts: u64, out: &mut CommandBuf) {
        for (idx, &value) in self.entry_params.iter().enumerate() {
            let _ = out.push(LedCommand::set_effect_param(ts, idx as u8, value));
        }
    }

    fn restore_default_params(&self, ts: u64, ctrl: &dyn LedController, out: &mut CommandBuf) {
        let effect = ctrl.effect_index();
        for idx in 0..ctrl.n_params(effect) {
            let default = ctrl.param(effect, idx).default;
            let _ = out.push(LedCommand::set_effect_param(ts, idx, default));
        }
    }

    fn handle_encoder(
        &mut self,
        ts: u64,
        e: EncoderEvent,
        ctrl: &mut dyn LedController,
        out: &mut CommandBuf,
    ) {
        let steps: i32 = match e.direction {
            Direction::Clockwise => e.multiplier as i32,
            Direction::CounterClockwise => -(e.multiplier as i32),
        };

        match self.mode {
            InteractionMode::Display => {
                let (new_brightness, limit_hit) = self.clamp_brightness(ctrl, steps);
                let _ = out.push(LedCommand::set_brightness(ts, new_brightness));
                if limit_hit {
                    let _ = out.push(LedCommand::feedback_limit(ts));
                }
            }
            InteractionMode::EffectSelect => {
                let n = ctrl.n_effects().max(1) as i32;
                let new_idx =
                    (ctrl.effect_index() as i32 + steps).rem_euclid(n) as u8;
                let _ = out.push(LedCommand::set_effect(ts, new_idx));
            }
            InteractionMode::EffectSetup => {
                let effect = ctrl.effect_index();
                let mut param = ctrl.param(effect, self.current_param_idx);
                let limit_hit = param.apply_steps(steps);
                let _ = out.push(LedCommand::set_effect_param(
                    ts,
                    self.current_param_idx,
                    param.value,
                ));
                if limit_hit {
                    let _ = out.push(LedCommand::feedback_limit(ts));
                }
            }
            InteractionMode::SystemSetup => {
                let mut preview = ctrl.current_system_param();
                let limit_hit = preview.apply_steps(steps);
                let _ = out.push(LedCommand::inc_system_param(ts, steps as i16));
                if limit_hit {
                    let _ = out.push(LedCommand::feedback_limit(ts));
                }
            }
            InteractionMode::Off => {}
        }
    }

    fn handle_touch(
        &mut self,
        ts: u64,
        t: TouchEvent,
        ctrl: &mut dyn LedController,
        out: &mut CommandBuf,
    ) {
        if self.mode == InteractionMode::Display && t == TouchEvent::Press {
            let n = ctrl.n_effects().max(1) as i32;
            let next = ((ctrl.effect_index() as i32 + 1).rem_euclid(n)) as u8;
            let _ = out.push(LedCommand::set_effect(ts, next));
        }
    }

    /// Check whether the current setup mode's idle timeout has elapsed,
    /// emitting the auto-save/return-to-Display commands if so. Intended to
    /// be called periodically (spec §5: "FSM blocks on the integrated
    /// channel with a short timeout ~100ms so it can service idle-timeout
    /// checks").
    pub fn check_idle_timeout(&mut self, now_ms: u64, ctrl: &mut dyn LedController) -> CommandBuf {
        let mut out = CommandBuf::new();
        let idle = now_ms.saturating_sub(self.last_event_ms);

        match self.mode {
            InteractionMode::EffectSelect if idle as u32 > self.timing.t_sel_ms => {
                self.mode = InteractionMode::Display;
                let _ = out.push(LedCommand::save_config(now_ms));
                self.last_event_ms = now_ms;
            }
            InteractionMode::EffectSetup if idle as u32 > self.timing.t_set_ms => {
                self.mode = InteractionMode::Display;
                let _ = out.push(LedCommand::save_config(now_ms));
                let _ = out.push(LedCommand::feedback_green(now_ms));
                self.last_event_ms = now_ms;
            }
            InteractionMode::SystemSetup if idle as u32 > self.timing.t_sys_ms => {
                self.mode = InteractionMode::Display;
                ctrl.save_system_config();
                let _ = out.push(LedCommand::feedback_green(now_ms));
                self.last_event_ms = now_ms;
            }
            _ => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::IntegratedEvent;
    use crate::config::ParamKind;

    struct MockLed {
        is_on: bool,
        brightness: u8,
        min_brightness: u8,
        effect_index: u8,
        params: [[EffectParam; 2]; 4],
        system_param: EffectParam,
        system_setup_entered: bool,
        system_saved: bool,
        system_canceled: bool,
        factory_reset_called: bool,
    }

    impl MockLed {
        fn new() -> Self {
            let param_a = EffectParam::new(ParamKind::Value, 100, 0, 255, 5, false);
            let param_b = EffectParam::new(ParamKind::Speed, 20, 0, 100, 1, false);
            Self {
                is_on: true,
                brightness: 128,
                min_brightness: 10,
                effect_index: 3,
                params: [[param_a, param_b]; 4],
                system_param: EffectParam::new(ParamKind::Value, 50, 0, 100, 10, false),
                system_setup_entered: false,
                system_saved: false,
                system_canceled: false,
                factory_reset_called: false,
            }
        }

        /// Simulate C8's command handler applying a command, the way the
        /// real system would between FSM steps.
        fn apply(&mut self, cmd: &LedCommand) {
            use crate::command::LedCommandKind::*;
            match cmd.kind {
                TurnOn => self.is_on = true,
                TurnOff => self.is_on = false,
                SetEffect => self.effect_index = cmd.value as u8,
                SetBrightness => self.brightness = cmd.value as u8,
                SetEffectParam => {
                    self.params[self.effect_index as usize][cmd.param_idx as usize].value =
                        cmd.value;
                }
                _ => {}
            }
        }
    }

    impl LedController for MockLed {
        fn is_on(&self) -> bool {
            self.is_on
        }
        fn master_brightness(&self) -> u8 {
            self.brightness
        }
        fn min_brightness(&self) -> u8 {
            self.min_brightness
        }
        fn effect_index(&self) -> u8 {
            self.effect_index
        }
        fn n_effects(&self) -> u8 {
            4
        }
        fn n_params(&self, _effect_index: u8) -> u8 {
            2
        }
        fn param(&self, effect_index: u8, param_idx: u8) -> EffectParam {
            self.params[effect_index as usize][param_idx as usize]
        }
        fn current_system_param(&self) -> EffectParam {
            self.system_param
        }
        fn enter_system_setup(&mut self) {
            self.system_setup_entered = true;
        }
        fn save_system_config(&mut self) {
            self.system_saved = true;
        }
        fn cancel_system_config(&mut self) {
            self.system_canceled = true;
        }
        fn factory_reset(&mut self) {
            self.factory_reset_called = true;
        }
    }

    fn button(ts: u64, ev: ButtonEvent) -> IntegratedEvent {
        IntegratedEvent::new(ts, IntegratedEventKind::Button(ev))
    }

    fn encoder(ts: u64, direction: Direction, multiplier: u32) -> IntegratedEvent {
        IntegratedEvent::new(
            ts,
            IntegratedEventKind::Encoder(EncoderEvent {
                direction,
                multiplier,
            }),
        )
    }

    #[test]
    fn power_cycle_turns_on_from_off() {
        let mut fsm = InteractionFsm::new(FsmTiming::default(), true);
        let mut led = MockLed::new();
        let cmds = fsm.step(button(0, ButtonEvent::Single), &mut led);
        assert_eq!(fsm.mode(), InteractionMode::Display);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].kind, crate::command::LedCommandKind::TurnOn);
    }

    #[test]
    fn brightness_clamps_and_signals_limit() {
        let mut fsm = InteractionFsm::new(FsmTiming::default(), true);
        fsm.mode = InteractionMode::Display;
        let mut led = MockLed::new();
        led.brightness = 250;
        led.min_brightness = 10;
        let cmds = fsm.step(encoder(0, Direction::Clockwise, 20), &mut led);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].value, 255);
        assert_eq!(cmds[1].kind, crate::command::LedCommandKind::FeedbackLimit);
    }

    #[test]
    fn system_setup_encoder_clamps_and_signals_limit() {
        let mut fsm = InteractionFsm::new(FsmTiming::default(), true);
        fsm.mode = InteractionMode::SystemSetup;
        let mut led = MockLed::new();
        led.system_param = EffectParam::new(ParamKind::Value, 95, 0, 100, 10, false);
        let cmds = fsm.step(encoder(0, Direction::Clockwise, 1), &mut led);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].kind, crate::command::LedCommandKind::IncSystemParam);
        assert_eq!(cmds[1].kind, crate::command::LedCommandKind::FeedbackLimit);
    }

    #[test]
    fn system_setup_encoder_no_limit_when_within_range() {
        let mut fsm = InteractionFsm::new(FsmTiming::default(), true);
        fsm.mode = InteractionMode::SystemSetup;
        let mut led = MockLed::new();
        led.system_param = EffectParam::new(ParamKind::Value, 50, 0, 100, 10, false);
        let cmds = fsm.step(encoder(0, Direction::Clockwise, 1), &mut led);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].kind, crate::command::LedCommandKind::IncSystemParam);
    }

    #[test]
    fn cancel_effect_setup_restores_original_param_value() {
        let mut fsm = InteractionFsm::new(FsmTiming::default(), true);
        let mut led = MockLed::new();
        fsm.mode = InteractionMode::Display;

        let enter = fsm.step(button(0, ButtonEvent::Long), &mut led);
        for c in enter.iter() {
            led.apply(c);
        }
        assert_eq!(fsm.mode(), InteractionMode::EffectSetup);
        assert_eq!(led.param(3, 0).value, 100);

        // steps=+3, step size 5: 100 + 15 = 115
        let edit = fsm.step(encoder(0, Direction::Clockwise, 3), &mut led);
        for c in edit.iter() {
            led.apply(c);
        }
        assert_eq!(led.param(3, 0).value, 115);

        let cancel = fsm.step(button(0, ButtonEvent::Double), &mut led);
        for c in cancel.iter() {
            led.apply(c);
        }
        assert_eq!(led.param(3, 0).value, 100);
        assert_eq!(fsm.mode(), InteractionMode::Display);
        assert!(cancel
            .iter()
            .any(|c| c.kind == crate::command::LedCommandKind::CancelConfig));
        assert!(cancel
            .iter()
            .any(|c| c.kind == crate::command::LedCommandKind::FeedbackRed));
    }

    #[test]
    fn master_sync_burst_on_switch_close_matches_literal_scenario() {
        let mut fsm = InteractionFsm::new(FsmTiming::default(), true);
        let mut led = MockLed::new();
        led.is_on = true;
        led.effect_index = 3;
        led.brightness = 128;
        led.params[3][0].value = 10;
        led.params[3][1].value = 20;

        let ev = IntegratedEvent::new(
            0,
            IntegratedEventKind::Switch(SwitchEvent { is_closed: true }),
        );
        let cmds = fsm.step(ev, &mut led);

        use crate::command::LedCommandKind::*;
        let kinds: Vec<_, MAX_COMMANDS_PER_STEP> = cmds.iter().map(|c| c.kind).collect();
        assert_eq!(
            &kinds[..],
            &[TurnOn, SetEffect, SetBrightness, SetEffectParam, SetEffectParam][..]
        );
        assert_eq!(cmds[1].value, 3);
        assert_eq!(cmds[2].value, 128);
        assert_eq!(cmds[3].value, 10);
        assert_eq!(cmds[4].value, 20);
    }

    #[test]
    fn slave_snaps_to_display_before_applying_peer_event() {
        let mut fsm = InteractionFsm::new(FsmTiming::default(), false);
        let mut led = MockLed::new();
        fsm.mode = InteractionMode::EffectSetup;

        let peer_cmd = LedCommand::set_effect(0, 5);
        let ev = IntegratedEvent::new(
            0,
            IntegratedEventKind::Peer(crate::command::PeerEvent(peer_cmd)),
        );
        let cmds = fsm.step(ev, &mut led);

        assert_eq!(fsm.mode(), InteractionMode::Display);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0], peer_cmd);
    }

    #[test]
    fn touch_press_in_display_advances_to_next_effect() {
        let mut fsm = InteractionFsm::new(FsmTiming::default(), true);
        let mut led = MockLed::new();
        fsm.mode = InteractionMode::Display;
        led.effect_index = 3; // last of 4 effects, should wrap to 0

        let ev = IntegratedEvent::new(0, IntegratedEventKind::Touch(TouchEvent::Press));
        let cmds = fsm.step(ev, &mut led);

        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].kind, crate::command::LedCommandKind::SetEffect);
        assert_eq!(cmds[0].value, 0);
    }

    #[test]
    fn setup_mode_idle_timeout_auto_saves() {
        let mut fsm = InteractionFsm::new(FsmTiming::default(), true);
        let mut led = MockLed::new();
        fsm.mode = InteractionMode::EffectSelect;
        fsm.last_event_ms = 0;

        let cmds = fsm.check_idle_timeout(10_001, &mut led);
        assert_eq!(fsm.mode(), InteractionMode::Display);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].kind, crate::command::LedCommandKind::SaveConfig);
    }
}
