//! Effects engine (C7): the effect descriptor, its scratch state, and the
//! registry C8 renders from (spec §3, §4.7).

pub mod library;

use rand::rngs::SmallRng;

use crate::color::{ColorRepr, Hsv, PixelBuffer};
use crate::config::EffectParam;

/// Upper bound on parameter slots per effect (spec §3: `MAX_PARAMS`).
pub const MAX_PARAMS: usize = 4;

/// Per-pixel scratch cell for the randomized twinkle effect: the color it
/// twinkled to and how many ticks it has left to live.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwinkleCell {
    pub hsv: Hsv,
    pub life: u8,
}

/// Private, effect-owned working state that must persist between render
/// ticks. Re-initialized whenever the LED count changes (spec §4.7): since
/// `N` is fixed at compile time per board here, that reallocation reduces to
/// re-zeroing on effect selection, which [`library::reset_scratch`] does.
#[derive(Debug, Clone, Copy)]
pub enum Scratch<const N: usize> {
    None,
    Twinkle([TwinkleCell; N]),
    Candle([u8; N]),
}

impl<const N: usize> Scratch<N> {
    pub const fn empty() -> Self {
        Scratch::None
    }
}

/// Everything an effect's evaluator needs for one tick.
pub struct EffectContext<'a, const N: usize> {
    pub params: &'a [EffectParam],
    pub brightness: u8,
    pub t_ms: u64,
    pub rng: &'a mut SmallRng,
    pub scratch: &'a mut Scratch<N>,
}

pub type EvalFn<const N: usize> = fn(&mut EffectContext<'_, N>, &mut PixelBuffer<N>);

/// Immutable (save for its parameter values) descriptor for one effect
/// (spec §3). `params`/`n_params` holds the live, user-editable slots;
/// `eval` is the pure-ish evaluator function.
pub struct Effect<const N: usize> {
    pub name: &'static str,
    pub eval: EvalFn<N>,
    pub params: [EffectParam; MAX_PARAMS],
    pub n_params: u8,
    pub color_repr: ColorRepr,
    pub is_dynamic: bool,
    pub uses_scratch: bool,
}

impl<const N: usize> Effect<N> {
    pub fn param(&self, idx: u8) -> EffectParam {
        self.params[idx as usize]
    }

    /// All `MAX_PARAMS` slots, including ones beyond this effect's `n_params`
    /// (evaluators index fixed slot positions like hue/sat/speed directly,
    /// so the renderer always hands over the full array).
    pub fn params(&self) -> &[EffectParam] {
        &self.params
    }

    pub fn param_mut(&mut self, idx: u8) -> &mut EffectParam {
        &mut self.params[idx as usize]
    }
}

/// The ordered table of effects C6/C8 borrow by index (spec §4.7: "the
/// engine holds an ordered table of effects").
pub struct EffectRegistry<const N: usize, const E: usize> {
    effects: [Effect<N>; E],
}

impl<const N: usize, const E: usize> EffectRegistry<N, E> {
    pub const fn new(effects: [Effect<N>; E]) -> Self {
        Self { effects }
    }

    pub const fn len(&self) -> usize {
        E
    }

    pub fn is_empty(&self) -> bool {
        E == 0
    }

    pub fn name(&self, index: u8) -> &'static str {
        self.effects[index as usize].name
    }

    pub fn is_dynamic(&self, index: u8) -> bool {
        self.effects[index as usize].is_dynamic
    }

    pub fn color_repr(&self, index: u8) -> ColorRepr {
        self.effects[index as usize].color_repr
    }

    pub fn n_params(&self, index: u8) -> u8 {
        self.effects[index as usize].n_params
    }

    pub fn param(&self, index: u8, param_idx: u8) -> EffectParam {
        self.effects[index as usize].param(param_idx)
    }

    /// All of effect `index`'s parameter slots, for handing to its evaluator
    /// as [`EffectContext::params`].
    pub fn params(&self, index: u8) -> &[EffectParam] {
        self.effects[index as usize].params()
    }

    pub fn param_mut(&mut self, index: u8, param_idx: u8) -> &mut EffectParam {
        self.effects[index as usize].param_mut(param_idx)
    }

    pub fn uses_scratch(&self, index: u8) -> bool {
        self.effects[index as usize].uses_scratch
    }

    /// Invoke effect `index`'s evaluator, writing a frame into `out`.
    pub fn eval(&self, index: u8, ctx: &mut EffectContext<'_, N>, out: &mut PixelBuffer<N>) {
        (self.effects[index as usize].eval)(ctx, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParamKind;

    fn flat_red<const N: usize>(_ctx: &mut EffectContext<'_, N>, out: &mut PixelBuffer<N>) {
        out.fill_rgb(crate::color::RGB8::new(255, 0, 0));
    }

    #[test]
    fn registry_exposes_descriptor_fields() {
        let effect = Effect::<4> {
            name: "Solid Red",
            eval: flat_red,
            params: [EffectParam::new(ParamKind::Value, 0, 0, 0, 1, false); MAX_PARAMS],
            n_params: 0,
            color_repr: ColorRepr::Rgb,
            is_dynamic: false,
            uses_scratch: false,
        };
        let registry = EffectRegistry::<4, 1>::new([effect]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.name(0), "Solid Red");
        assert!(!registry.is_dynamic(0));
        assert_eq!(registry.color_repr(0), ColorRepr::Rgb);
    }
}
