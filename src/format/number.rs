use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// The exponent marker used in scientific output. A small-caps glyph rather
/// than ASCII `E`, so redisplayed results cannot be confused with Euler's
/// number when fed back into the parser.
pub const EXPONENT_MARK: char = 'ᴇ';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberFormat {
    Automatic,
    Scientific,
    Plain,
}

/// Display settings threaded explicitly into every formatting call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Fixed-point decimal places and scientific mantissa digits, 0–16.
    pub precision: u8,
    pub number_format: NumberFormat,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            precision: 6,
            number_format: NumberFormat::Automatic,
        }
    }
}

/// Magnitude bounds beyond which automatic mode switches to scientific form.
#[derive(Clone, Copy, Debug)]
pub struct SciThresholds {
    pub upper: f64,
    pub lower: f64,
}

impl SciThresholds {
    /// Wide bounds for the main engine, sized so physical constants such as
    /// c₀ still render in fixed point.
    pub const EXTENDED: SciThresholds = SciThresholds {
        upper: 1e12,
        lower: 1e-4,
    };
    /// Narrow bounds for plain arithmetic displays.
    pub const SIMPLE: SciThresholds = SciThresholds {
        upper: 1e6,
        lower: 1e-6,
    };
}

pub fn format_f64(x: f64, opts: &FormatOptions) -> String {
    format_f64_with(x, opts, SciThresholds::EXTENDED)
}

pub fn format_f64_with(x: f64, opts: &FormatOptions, bounds: SciThresholds) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }
    let precision = opts.precision.min(16) as usize;
    match opts.number_format {
        NumberFormat::Automatic => {
            if x == x.trunc() && x.abs() < bounds.upper {
                return format!("{}", x as i64);
            }
            if x != 0.0 && (x.abs() >= bounds.upper || x.abs() <= bounds.lower) {
                scientific(x, precision)
            } else {
                fixed_trimmed(x, precision)
            }
        }
        NumberFormat::Scientific => scientific(x, precision),
        NumberFormat::Plain => plain(x, precision),
    }
}

fn fixed_trimmed(x: f64, precision: usize) -> String {
    let mut s = format!("{x:.precision$}");
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

fn scientific(x: f64, precision: usize) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let mut exp = x.abs().log10().floor() as i32;
    let mut mantissa = x / 10f64.powi(exp);
    if mantissa.abs() >= 10.0 {
        mantissa /= 10.0;
        exp += 1;
    } else if mantissa.abs() < 1.0 {
        mantissa *= 10.0;
        exp -= 1;
    }
    let mut s = fixed_trimmed(mantissa, precision);
    // rounding at the mantissa boundary bumps the exponent
    if s.trim_start_matches('-').starts_with("10") {
        exp += 1;
        s = fixed_trimmed(mantissa / 10.0, precision);
    }
    if exp == 0 {
        s
    } else {
        format!("{s}{EXPONENT_MARK}{exp}")
    }
}

fn plain(x: f64, precision: usize) -> String {
    let s = fixed_trimmed(x, precision);
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (s, None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part.as_str()),
    };
    let mut grouped = String::new();
    let chars: Vec<char> = digits.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    let mut out = format!("{sign}{grouped}");
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(&f);
    }
    out
}

pub fn format_complex(z: Complex64, opts: &FormatOptions) -> String {
    if z.im == 0.0 {
        return format_f64(z.re, opts);
    }
    let magnitude = z.im.abs();
    let im_part = if magnitude == 1.0 {
        "i".to_string()
    } else {
        format!("{}i", format_f64(magnitude, opts))
    };
    if z.re == 0.0 {
        return if z.im < 0.0 {
            format!("-{im_part}")
        } else {
            im_part
        };
    }
    format!(
        "{}{}{}",
        format_f64(z.re, opts),
        if z.im < 0.0 { "-" } else { "+" },
        im_part
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auto(precision: u8) -> FormatOptions {
        FormatOptions {
            precision,
            number_format: NumberFormat::Automatic,
        }
    }

    #[test]
    fn integers_render_bare() {
        assert_eq!(format_f64(14.0, &auto(6)), "14");
        assert_eq!(format_f64(-3.0, &auto(6)), "-3");
    }

    #[test]
    fn fixed_point_strips_trailing_zeros() {
        assert_eq!(format_f64(0.25, &auto(6)), "0.25");
        assert_eq!(format_f64(1.0 / 3.0, &auto(6)), "0.333333");
    }

    #[test]
    fn magnitude_bounds_switch_to_scientific() {
        assert_eq!(format_f64(2f64.powi(50), &auto(6)), "1.1259ᴇ15");
        assert_eq!(format_f64(0.0000001, &auto(6)), "1ᴇ-7");
    }

    #[test]
    fn simple_bounds_flip_earlier() {
        assert_eq!(
            format_f64_with(1234567.0, &auto(6), SciThresholds::SIMPLE),
            "1.234567ᴇ6"
        );
    }

    #[test]
    fn scientific_mode_always_uses_mantissa() {
        let opts = FormatOptions {
            precision: 6,
            number_format: NumberFormat::Scientific,
        };
        assert_eq!(format_f64(14.0, &opts), "1.4ᴇ1");
        assert_eq!(format_f64(2.0, &opts), "2");
        assert_eq!(format_f64(0.0, &opts), "0");
    }

    #[test]
    fn plain_mode_groups_thousands() {
        let opts = FormatOptions {
            precision: 2,
            number_format: NumberFormat::Plain,
        };
        assert_eq!(format_f64(1234567.5, &opts), "1,234,567.5");
        assert_eq!(format_f64(-1000.0, &opts), "-1,000");
    }

    #[test]
    fn infinities_use_glyphs() {
        assert_eq!(format_f64(f64::INFINITY, &auto(6)), "∞");
        assert_eq!(format_f64(f64::NEG_INFINITY, &auto(6)), "-∞");
    }

    #[test]
    fn complex_values_pair_real_and_imaginary() {
        let opts = auto(6);
        assert_eq!(format_complex(Complex64::new(1.0, 2.0), &opts), "1+2i");
        assert_eq!(format_complex(Complex64::new(0.0, -1.0), &opts), "-i");
        assert_eq!(format_complex(Complex64::new(3.0, -0.5), &opts), "3-0.5i");
    }
}
