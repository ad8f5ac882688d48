//! Porter-Duff "over" compositing on straight-alpha ARGB pixels.
//!
//! Drawing a foreground `A` over a background `B`:
//! `a = (255*aA + (255-aA)*aB) / 255`
//! `c = (255*aA*cA + (255-aA)*aB*cB) / (255*a)`
//!
//! All divisions truncate. A zero result alpha yields a fully transparent
//! pixel instead of dividing by zero.

use crate::pixel::Argb;

/// Composite `fg` over `bg`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn blend_over(fg: Argb, bg: Argb) -> Argb {
    let a_fg = u32::from(fg.alpha());
    let a_bg = u32::from(bg.alpha());
    let inv = 255 - a_fg;

    let alpha = (255 * a_fg + inv * a_bg) / 255;
    if alpha == 0 {
        return Argb::TRANSPARENT;
    }

    let denom = 255 * alpha;
    let channel = |c_fg: u8, c_bg: u8| -> u8 {
        let num = 255 * a_fg * u32::from(c_fg) + inv * a_bg * u32::from(c_bg);
        // truncating `alpha` can push the quotient past 255 for faint pixels
        (num / denom).min(255) as u8
    };

    Argb::from_channels(
        alpha as u8,
        channel(fg.red(), bg.red()),
        channel(fg.green(), bg.green()),
        channel(fg.blue(), bg.blue()),
    )
}

/// Composite a row of foreground pixels over the matching background pixels,
/// writing into `out`. All three slices are walked in lockstep; the shortest
/// one bounds the span.
pub fn blend_row(fg: &[Argb], bg: &[Argb], out: &mut [Argb]) {
    for ((dst, &a), &b) in out.iter_mut().zip(fg).zip(bg) {
        *dst = blend_over(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [u32; 6] = [
        0xFFFF_0000,
        0xFF00_0000,
        0xFF12_3456,
        0x7F55_5555,
        0x01FF_FFFF,
        0x0000_0000,
    ];

    #[test]
    fn transparent_over_transparent_is_transparent() {
        assert_eq!(blend_over(Argb(0), Argb(0)), Argb(0));
    }

    #[test]
    fn transparent_foreground_is_identity_on_opaque() {
        for bg in [0xFFFF_0000, 0xFF00_0000, 0xFF12_3456, 0xFFFF_FFFF] {
            assert_eq!(blend_over(Argb::TRANSPARENT, Argb(bg)), Argb(bg));
        }
    }

    #[test]
    fn opaque_foreground_overrides() {
        for &bg in &SAMPLES {
            for fg in [0xFF00_0000, 0xFFAB_CDEF, 0xFFFF_FFFF] {
                assert_eq!(blend_over(Argb(fg), Argb(bg)), Argb(fg));
            }
        }
    }

    #[test]
    fn half_black_over_red() {
        let out = blend_over(Argb(0x7F00_0000), Argb(0xFFFF_0000));
        assert_eq!(out.alpha(), 0xFF);
        assert!((i32::from(out.red()) - 0x80).abs() <= 1);
        assert_eq!(out.green(), 0);
        assert_eq!(out.blue(), 0);
    }

    #[test]
    fn translucent_over_transparent_keeps_foreground() {
        assert_eq!(
            blend_over(Argb(0x7F55_5555), Argb::TRANSPARENT),
            Argb(0x7F55_5555)
        );
    }

    #[test]
    fn faint_pixels_saturate_instead_of_overflowing() {
        // a = (255 + 254) / 255 = 1, red = 509 * 255 / 255 before clamping
        let out = blend_over(Argb(0x01FF_FFFF), Argb(0x01FF_FFFF));
        assert_eq!(out, Argb(0x01FF_FFFF));
    }

    #[test]
    fn row_blend_matches_pixelwise() {
        let fg: Vec<Argb> = SAMPLES.iter().copied().map(Argb).collect();
        let bg: Vec<Argb> = SAMPLES.iter().rev().copied().map(Argb).collect();
        let mut out = vec![Argb::TRANSPARENT; fg.len()];
        blend_row(&fg, &bg, &mut out);
        for ((&o, &a), &b) in out.iter().zip(&fg).zip(&bg) {
            assert_eq!(o, blend_over(a, b));
        }
    }
}
