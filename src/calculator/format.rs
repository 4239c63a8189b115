//! Number rendering for the email prompt
//!
//! Matches what the calculator front-end shows: Argentine-peso amounts
//! without decimals, and JavaScript-style plain numbers.

/// Placeholder for amounts that are absent or not a number
pub const NOT_AVAILABLE: &str = "N/A";

/// Format an amount as es-AR peso currency with zero decimals.
///
/// ```
/// use roi_email_edge::calculator::format::format_currency;
/// assert_eq!(format_currency(Some(1_234_567.0)), "$\u{a0}1.234.567");
/// assert_eq!(format_currency(Some(-5000.0)), "-$\u{a0}5.000");
/// assert_eq!(format_currency(None), "N/A");
/// ```
pub fn format_currency(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };

    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_thousands(&digits);

    // Negative inputs keep their sign even when they round to zero ("-$ 0")
    if value.is_sign_negative() {
        format!("-$\u{a0}{grouped}")
    } else {
        format!("$\u{a0}{grouped}")
    }
}

/// Insert `.` between groups of three digits
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Render a number the way string interpolation does in the browser
/// (`100`, `12.5`, `-0.25`, `1e+21`, `1e-7`).
pub fn plain_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // -0 interpolates as "0"
        return "0".to_string();
    }
    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{value}");
    }
    exponential(value)
}

/// Shortest round-trip mantissa with a signed exponent (`1.5e-7`, `1e+21`)
fn exponential(value: f64) -> String {
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

/// Fixed-point rendering with `Number.prototype.toFixed` semantics:
/// exact halves round away from zero instead of to even.
pub fn to_fixed(value: f64, fraction_digits: u8) -> String {
    if !value.is_finite() {
        return plain_number(value);
    }

    let digits = usize::from(fraction_digits);
    let magnitude = value.abs();
    let scale = 10_f64.powi(i32::from(fraction_digits));
    let scaled = magnitude * scale;
    // A tie only when the scaling was exact and lands on .5
    let exact = magnitude.mul_add(scale, -scaled) == 0.0;

    let rendered = if exact && scaled.fract() == 0.5 {
        format!("{:.*}", digits, scaled.round() / scale)
    } else {
        format!("{magnitude:.digits$}")
    };

    if value < 0.0 {
        format!("-{rendered}")
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_absent() {
        assert_eq!(format_currency(None), "N/A");
        assert_eq!(format_currency(Some(f64::NAN)), "N/A");
        assert_eq!(format_currency(Some(f64::INFINITY)), "N/A");
    }

    #[test]
    fn test_format_currency_zero_is_a_currency() {
        assert_eq!(format_currency(Some(0.0)), "$\u{a0}0");
    }

    #[test]
    fn test_format_currency_small_negatives_keep_sign() {
        assert_eq!(format_currency(Some(-0.4)), "-$\u{a0}0");
        assert_eq!(format_currency(Some(-0.5)), "-$\u{a0}1");
    }

    #[test]
    fn test_format_currency_grouping_and_rounding() {
        assert_eq!(format_currency(Some(5000.0)), "$\u{a0}5.000");
        assert_eq!(format_currency(Some(999.5)), "$\u{a0}1.000");
        assert_eq!(format_currency(Some(123.49)), "$\u{a0}123");
        assert_eq!(format_currency(Some(2_402_000.0)), "$\u{a0}2.402.000");
        assert_eq!(format_currency(Some(-1_500.6)), "-$\u{a0}1.501");
    }

    #[test]
    fn test_plain_number() {
        assert_eq!(plain_number(100.0), "100");
        assert_eq!(plain_number(12.5), "12.5");
        assert_eq!(plain_number(-0.0), "0");
        assert_eq!(plain_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_plain_number_switches_to_exponent_at_js_thresholds() {
        assert_eq!(plain_number(1e20), "100000000000000000000");
        assert_eq!(plain_number(1e21), "1e+21");
        assert_eq!(plain_number(-2.5e22), "-2.5e+22");
        assert_eq!(plain_number(0.000_001), "0.000001");
        assert_eq!(plain_number(1e-7), "1e-7");
        assert_eq!(plain_number(1.5e-7), "1.5e-7");
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(480.4, 0), "480");
        assert_eq!(to_fixed(480.5, 0), "481");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(5.09, 1), "5.1");
        assert_eq!(to_fixed(0.25, 1), "0.3");
        assert_eq!(to_fixed(104.96, 1), "105.0");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(-0.04, 1), "-0.0");
        assert_eq!(to_fixed(-0.0, 1), "0.0");
        assert_eq!(to_fixed(f64::NAN, 1), "NaN");
    }
}
