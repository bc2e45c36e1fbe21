//! UNORM/SNORM to float conversion.
//!
//! These build the IEEE-754 bit pattern directly, the way texture samplers do,
//! rather than dividing. The results are the correctly rounded quotients
//! `x / 65535` and `x / 127`.
//!
//! See <https://fgiesen.wordpress.com/2024/12/24/unorm-and-snorm-to-float-hardware-edition/>.

/// Mantissa and biased exponent (with sign in bit 8) of a normalized value.
#[derive(Debug, Clone, Copy)]
struct Normalized {
    mantissa: u32,
    exp_sign: u32,
}

/// Shift `x` left until bit 15 is set, tracking the exponent, then drop
/// the leading bit. `x` must be non-zero and below `0x10000`.
fn normalize(x: u32) -> Normalized {
    debug_assert!(x != 0 && x < 0x1_0000);
    let shift = x.leading_zeros() - 16;
    Normalized {
        mantissa: (x << shift) - 0x8000,
        exp_sign: 126 - shift,
    }
}

/// Decode a 16-bit UNORM value to `[0, 1]`.
#[must_use]
pub fn decode_u16(x: u16) -> f32 {
    match x {
        0 => 0.0,
        u16::MAX => 1.0,
        _ => {
            let n = normalize(u32::from(x));
            let m = n.mantissa;
            f32::from_bits((n.exp_sign << 23) + (m << 8) + 0x80 + (m >> 8) + ((m >> 7) & 1))
        }
    }
}

/// Decode an 8-bit SNORM value to `[-1, 1]`. Both -128 and -127 map to -1.
#[must_use]
pub fn decode_s8(x: i8) -> f32 {
    match x {
        i8::MIN..=-127 => -1.0,
        127 => 1.0,
        0 => 0.0,
        _ => {
            let mut n = normalize(u32::from(x.unsigned_abs()) << 9);
            if x < 0 {
                n.exp_sign |= 256;
            }
            let m = n.mantissa >> 9;
            f32::from_bits(
                (n.exp_sign << 23)
                    + (m << 17)
                    + 0x1_0000
                    + (m << 10)
                    + 0x200
                    + (m << 3)
                    + 4
                    + (m >> 4)
                    + ((m >> 3) & 1),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn u16_saturates_at_the_ends() {
        assert_eq!(decode_u16(0).to_bits(), 0.0f32.to_bits());
        assert_eq!(decode_u16(0xFFFF).to_bits(), 1.0f32.to_bits());
    }

    #[test]
    fn u16_midpoint_bits() {
        // 0x8000 / 65535 = 0.500007629..., one ulp pattern 0x80 above 0.5.
        assert_eq!(decode_u16(0x8000).to_bits(), 0x3F00_0080);
    }

    #[test]
    fn u16_matches_rounded_quotient_everywhere() {
        for x in 0..=u16::MAX {
            let expected = (f64::from(x) / 65535.0) as f32;
            assert_eq!(
                decode_u16(x).to_bits(),
                expected.to_bits(),
                "decode_u16({x:#06x})"
            );
        }
    }

    #[test]
    fn u16_is_monotonic() {
        let mut prev = decode_u16(0);
        for x in 1..=u16::MAX {
            let next = decode_u16(x);
            assert!(next >= prev, "decode_u16 decreased at {x:#06x}");
            prev = next;
        }
    }

    #[test]
    fn s8_saturates() {
        assert_eq!(decode_s8(-128).to_bits(), (-1.0f32).to_bits());
        assert_eq!(decode_s8(-127).to_bits(), (-1.0f32).to_bits());
        assert_eq!(decode_s8(127).to_bits(), 1.0f32.to_bits());
        assert_eq!(decode_s8(0).to_bits(), 0.0f32.to_bits());
    }

    #[test]
    fn s8_matches_rounded_quotient_everywhere() {
        for x in -126i8..=126 {
            let expected = (f64::from(x) / 127.0) as f32;
            assert_eq!(decode_s8(x).to_bits(), expected.to_bits(), "decode_s8({x})");
        }
    }

    proptest! {
        #[test]
        fn s8_is_odd(x in -126i8..=126) {
            prop_assert_eq!(decode_s8(-x).to_bits(), (-decode_s8(x)).to_bits());
        }

        #[test]
        fn u16_stays_in_unit_range(x: u16) {
            let v = decode_u16(x);
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }
}
