//! Concrete effect functions and the default registry (spec §4.7).
//!
//! Ported from the animation styles common to this kind of addressable-LED
//! firmware (solid/breathing/rainbow/chase/twinkle), re-expressed against
//! this crate's [`Hsv`]/[`PixelBuffer`] and per-effect [`Scratch`].

use rand_core::RngCore;

use crate::color::{ColorRepr, Hsv, PixelBuffer, RGB8};
use crate::config::{EffectParam, ParamKind};
use crate::math::sin;

use super::{Effect, EffectContext, EffectRegistry, Scratch, TwinkleCell, MAX_PARAMS};

const HUE_PARAM: usize = 0;
const SAT_PARAM: usize = 1;
const SPEED_PARAM: usize = 2;

fn seconds(ctx_t_ms: u64, speed: i16) -> f32 {
    // speed is 0..=255; 128 is "1x". Matches the teacher's
    // `speed * 1.5 / u8::MAX + 0.5` shaping so low settings are still brisk.
    let rate = (speed.clamp(0, 255) as f32) * 1.5 / 255.0 + 0.5;
    (ctx_t_ms as f32 / 1000.0) * rate
}

fn solid<const N: usize>(ctx: &mut EffectContext<'_, N>, out: &mut PixelBuffer<N>) {
    let hsv = Hsv::new(
        ctx.params[HUE_PARAM].value as u16,
        ctx.params[SAT_PARAM].value as u8,
        255,
    );
    out.fill_hsv(hsv);
}

fn breathing<const N: usize>(ctx: &mut EffectContext<'_, N>, out: &mut PixelBuffer<N>) {
    let t = seconds(ctx.t_ms, ctx.params[SPEED_PARAM].value);
    let val = (sin(t) * 127.5 + 127.5) as u8;
    let hsv = Hsv::new(
        ctx.params[HUE_PARAM].value as u16,
        ctx.params[SAT_PARAM].value as u8,
        val,
    );
    out.fill_hsv(hsv);
}

fn rainbow_swirl<const N: usize>(ctx: &mut EffectContext<'_, N>, out: &mut PixelBuffer<N>) {
    let t = seconds(ctx.t_ms, ctx.params[SPEED_PARAM].value);
    let sat = ctx.params[SAT_PARAM].value as u8;
    let buf = out.ensure_hsv();
    for (i, pixel) in buf.iter_mut().enumerate() {
        let hue = (i as u32 * 360 / N.max(1) as u32 + (t * 90.0) as u32) % 360;
        *pixel = Hsv::new(hue as u16, sat, 255);
    }
}

fn chase<const N: usize>(ctx: &mut EffectContext<'_, N>, out: &mut PixelBuffer<N>) {
    const LENGTH: i32 = 4;
    let t = seconds(ctx.t_ms, ctx.params[SPEED_PARAM].value);
    let hue = ctx.params[HUE_PARAM].value as u16;
    let sat = ctx.params[SAT_PARAM].value as u8;
    let pos = (t * N.max(1) as f32) as i32;

    let buf = out.ensure_hsv();
    for (i, pixel) in buf.iter_mut().enumerate() {
        let mut val = 0u8;
        for j in 0..LENGTH {
            let lit = (pos + j).rem_euclid(N.max(1) as i32);
            if i as i32 == lit {
                val = (255 * (j + 1) / LENGTH) as u8;
            }
        }
        *pixel = Hsv::new(hue, sat, val);
    }
}

/// A slow hue wave with alternating-pixel phase, in the spirit of a
/// two-tone color-cycling effect.
fn color_wave<const N: usize>(ctx: &mut EffectContext<'_, N>, out: &mut PixelBuffer<N>) {
    let t = seconds(ctx.t_ms, ctx.params[SPEED_PARAM].value);
    let sat = ctx.params[SAT_PARAM].value as u8;
    let base_hue = ctx.params[HUE_PARAM].value as i32;
    let pos = ((t * 32.0) as i32 % 64 - 32).abs();
    let swing = 60 * pos.pow(3) / (pos.pow(3) + (32 - pos).pow(3)).max(1);

    let buf = out.ensure_hsv();
    for (i, pixel) in buf.iter_mut().enumerate() {
        let hue = if i % 2 == 0 {
            base_hue + swing
        } else {
            base_hue - swing
        }
        .rem_euclid(360);
        *pixel = Hsv::new(hue as u16, sat, 255);
    }
}

fn twinkle<const N: usize>(ctx: &mut EffectContext<'_, N>, out: &mut PixelBuffer<N>) {
    let sat = ctx.params[SAT_PARAM].value as u8;
    let spawn_chance = ctx.params[SPEED_PARAM].value.clamp(0, 255) as u32;

    let Scratch::Twinkle(cells) = ctx.scratch else {
        *ctx.scratch = Scratch::Twinkle([TwinkleCell::default(); N]);
        let Scratch::Twinkle(cells) = ctx.scratch else {
            unreachable!()
        };
        return render_twinkle(cells, ctx.rng, sat, spawn_chance, out);
    };
    render_twinkle(cells, ctx.rng, sat, spawn_chance, out);
}

fn render_twinkle<const N: usize>(
    cells: &mut [TwinkleCell; N],
    rng: &mut rand::rngs::SmallRng,
    sat: u8,
    spawn_chance: u32,
    out: &mut PixelBuffer<N>,
) {
    let buf = out.ensure_hsv();
    for (cell, pixel) in cells.iter_mut().zip(buf.iter_mut()) {
        if cell.life > 0 {
            cell.life -= 1;
            *pixel = Hsv::new(cell.hsv.hue, sat, (cell.life as u16 * 255 / 255) as u8);
        } else if rng.next_u32() % 256 < spawn_chance {
            let hue = (rng.next_u32() % 360) as u16;
            *cell = TwinkleCell {
                hsv: Hsv::new(hue, sat, 255),
                life: 255,
            };
            *pixel = Hsv::new(hue, sat, 255);
        } else {
            *pixel = Hsv::new(0, 0, 0);
        }
    }
}

fn candle<const N: usize>(ctx: &mut EffectContext<'_, N>, out: &mut PixelBuffer<N>) {
    let hue = ctx.params[HUE_PARAM].value as u16;
    let sat = ctx.params[SAT_PARAM].value as u8;
    let flicker = ctx.params[SPEED_PARAM].value.clamp(0, 255) as i32;

    let Scratch::Candle(levels) = ctx.scratch else {
        *ctx.scratch = Scratch::Candle([200u8; N]);
        let Scratch::Candle(levels) = ctx.scratch else {
            unreachable!()
        };
        return render_candle(levels, ctx.rng, hue, sat, flicker, out);
    };
    render_candle(levels, ctx.rng, hue, sat, flicker, out);
}

fn render_candle<const N: usize>(
    levels: &mut [u8; N],
    rng: &mut rand::rngs::SmallRng,
    hue: u16,
    sat: u8,
    flicker: i32,
    out: &mut PixelBuffer<N>,
) {
    let buf = out.ensure_hsv();
    for (level, pixel) in levels.iter_mut().zip(buf.iter_mut()) {
        let jitter = (rng.next_u32() % (flicker.max(1) as u32 * 2 + 1)) as i32 - flicker;
        *level = (*level as i32 + jitter).clamp(120, 255) as u8;
        *pixel = Hsv::new(hue, sat, *level);
    }
}

const fn param(kind: ParamKind, default: i16, min: i16, max: i16, step: i16, wrap: bool) -> EffectParam {
    EffectParam::new(kind, default, min, max, step, wrap)
}

const fn hue_sat_speed_params(hue: i16, sat: i16, speed: i16) -> [EffectParam; MAX_PARAMS] {
    [
        param(ParamKind::Hue, hue, 0, 359, 5, true),
        param(ParamKind::Saturation, sat, 0, 255, 5, false),
        param(ParamKind::Speed, speed, 0, 255, 5, false),
        param(ParamKind::Value, 0, 0, 0, 1, false),
    ]
}

/// Build the default 7-effect registry for an `N`-pixel strip (spec §4.7).
pub const fn default_registry<const N: usize>() -> EffectRegistry<N, 7> {
    EffectRegistry::new([
        Effect {
            name: "Solid",
            eval: solid,
            params: hue_sat_speed_params(0, 255, 128),
            n_params: 2,
            color_repr: ColorRepr::Hsv,
            is_dynamic: false,
            uses_scratch: false,
        },
        Effect {
            name: "Breathing",
            eval: breathing,
            params: hue_sat_speed_params(0, 255, 86),
            n_params: 3,
            color_repr: ColorRepr::Hsv,
            is_dynamic: true,
            uses_scratch: false,
        },
        Effect {
            name: "Rainbow Swirl",
            eval: rainbow_swirl,
            params: hue_sat_speed_params(0, 255, 86),
            n_params: 3,
            color_repr: ColorRepr::Hsv,
            is_dynamic: true,
            uses_scratch: false,
        },
        Effect {
            name: "Chase",
            eval: chase,
            params: hue_sat_speed_params(0, 255, 128),
            n_params: 3,
            color_repr: ColorRepr::Hsv,
            is_dynamic: true,
            uses_scratch: false,
        },
        Effect {
            name: "Color Wave",
            eval: color_wave,
            params: hue_sat_speed_params(0, 255, 64),
            n_params: 3,
            color_repr: ColorRepr::Hsv,
            is_dynamic: true,
            uses_scratch: false,
        },
        Effect {
            name: "Twinkle",
            eval: twinkle,
            params: hue_sat_speed_params(0, 255, 24),
            n_params: 3,
            color_repr: ColorRepr::Hsv,
            is_dynamic: true,
            uses_scratch: true,
        },
        Effect {
            name: "Candle",
            eval: candle,
            params: hue_sat_speed_params(30, 220, 40),
            n_params: 3,
            color_repr: ColorRepr::Hsv,
            is_dynamic: true,
            uses_scratch: true,
        },
    ])
}

/// Reset an effect's scratch to empty, e.g. on effect selection change (spec
/// §4.7: scratch is "re-allocated whenever the LED count or a structural
/// parameter changes"; on these fixed-`N` boards that's a re-zero).
pub fn reset_scratch<const N: usize>(scratch: &mut Scratch<N>) {
    *scratch = Scratch::empty();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectContext;
    use rand::SeedableRng;

    fn ctx<'a, const N: usize>(
        params: &'a [EffectParam],
        t_ms: u64,
        rng: &'a mut rand::rngs::SmallRng,
        scratch: &'a mut Scratch<N>,
    ) -> EffectContext<'a, N> {
        EffectContext {
            params,
            brightness: 255,
            t_ms,
            rng,
            scratch,
        }
    }

    #[test]
    fn solid_fills_flat_color() {
        let registry = default_registry::<4>();
        let params = [registry.param(0, 0), registry.param(0, 1), registry.param(0, 2), registry.param(0, 3)];
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
        let mut scratch = Scratch::<4>::empty();
        let mut c = ctx(&params, 0, &mut rng, &mut scratch);
        let mut buf = PixelBuffer::<4>::black();
        registry.eval(0, &mut c, &mut buf);
        if let PixelBuffer::Hsv(pixels) = buf {
            assert!(pixels.iter().all(|p| p.val == 255));
        } else {
            panic!("expected hsv buffer");
        }
    }

    #[test]
    fn twinkle_allocates_scratch_on_first_call() {
        let registry = default_registry::<8>();
        let idx = 5; // Twinkle
        let params = [
            registry.param(idx, 0),
            registry.param(idx, 1),
            registry.param(idx, 2),
            registry.param(idx, 3),
        ];
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let mut scratch = Scratch::<8>::empty();
        assert!(matches!(scratch, Scratch::None));
        let mut c = ctx(&params, 0, &mut rng, &mut scratch);
        let mut buf = PixelBuffer::<8>::black();
        registry.eval(idx, &mut c, &mut buf);
        assert!(matches!(scratch, Scratch::Twinkle(_)));
    }

    #[test]
    fn rainbow_swirl_varies_hue_across_pixels() {
        let registry = default_registry::<6>();
        let idx = 2;
        let params = [
            registry.param(idx, 0),
            registry.param(idx, 1),
            registry.param(idx, 2),
            registry.param(idx, 3),
        ];
        let mut rng = rand::rngs::SmallRng::seed_from_u64(2);
        let mut scratch = Scratch::<6>::empty();
        let mut c = ctx(&params, 500, &mut rng, &mut scratch);
        let mut buf = PixelBuffer::<6>::black();
        registry.eval(idx, &mut c, &mut buf);
        if let PixelBuffer::Hsv(pixels) = buf {
            let hues: heapless::Vec<u16, 6> = pixels.iter().map(|p| p.hue).collect();
            assert!(hues.windows(2).any(|w| w[0] != w[1]));
        } else {
            panic!("expected hsv buffer");
        }
    }
}
