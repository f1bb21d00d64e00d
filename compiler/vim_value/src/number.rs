//! Number parsing and float formatting.
//!
//! Strings are read as Numbers the way Vim does it: leading whitespace is
//! skipped, then an optional sign and the longest run of digits. `0x` selects
//! hex, `0b` binary, and a leading `0` selects octal unless an `8` or `9`
//! follows. Anything unparseable reads as 0. Values that do not fit clamp to
//! the Number range.

/// Base for [`parse_number_radix`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Radix {
    /// Detect from the prefix (`0x`, `0b`, leading `0`).
    Auto,
    Binary,
    Octal,
    Decimal,
    Hex,
}

impl Radix {
    /// The radix `str2nr()` uses for its base argument.
    pub fn from_base(base: i64) -> Option<Self> {
        match base {
            2 => Some(Radix::Binary),
            8 => Some(Radix::Octal),
            10 => Some(Radix::Decimal),
            16 => Some(Radix::Hex),
            _ => None,
        }
    }
}

/// Leading integer of `text`, detecting the base from its prefix.
pub fn parse_number(text: &str) -> i64 {
    parse_number_radix(text, Radix::Auto)
}

/// Leading integer of `text` in the given base.
///
/// An explicit hex or binary base still accepts the matching `0x`/`0b`
/// prefix.
pub fn parse_number_radix(text: &str, radix: Radix) -> i64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let bytes = rest.as_bytes();
    let (digits, base) = match radix {
        Radix::Auto => detect_base(bytes),
        Radix::Binary => (strip_base_prefix(bytes, b'b', 2), 2),
        Radix::Octal => (bytes, 8),
        Radix::Decimal => (bytes, 10),
        Radix::Hex => (strip_base_prefix(bytes, b'x', 16), 16),
    };
    let magnitude = i128::from(accumulate(digits, base));
    let signed = if negative { -magnitude } else { magnitude };
    let clamped = signed.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
    i64::try_from(clamped).unwrap_or(if negative { i64::MIN } else { i64::MAX })
}

fn detect_base(bytes: &[u8]) -> (&[u8], u32) {
    match bytes {
        [b'0', x, d, ..] if x.eq_ignore_ascii_case(&b'x') && d.is_ascii_hexdigit() => {
            (&bytes[2..], 16)
        }
        [b'0', b, d, ..] if b.eq_ignore_ascii_case(&b'b') && matches!(*d, b'0' | b'1') => {
            (&bytes[2..], 2)
        }
        [b'0', d, ..] if d.is_ascii_digit() => {
            let run = bytes.iter().take_while(|b| b.is_ascii_digit());
            if run.clone().all(|b| *b < b'8') {
                (&bytes[1..], 8)
            } else {
                (bytes, 10)
            }
        }
        _ => (bytes, 10),
    }
}

fn strip_base_prefix(bytes: &[u8], marker: u8, base: u32) -> &[u8] {
    match bytes {
        [b'0', m, d, ..]
            if m.eq_ignore_ascii_case(&marker) && char::from(*d).is_digit(base) =>
        {
            &bytes[2..]
        }
        _ => bytes,
    }
}

fn accumulate(digits: &[u8], base: u32) -> u64 {
    digits
        .iter()
        .map_while(|b| char::from(*b).to_digit(base))
        .fold(0u64, |acc, d| {
            acc.saturating_mul(u64::from(base))
                .saturating_add(u64::from(d))
        })
}

/// Leading floating point number of `text`, as read by `str2float()`.
///
/// Accepts `inf`, `infinity` and `nan` in any case. Unparseable text reads
/// as 0.0.
pub fn parse_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let lower = rest.get(..3).map(str::to_ascii_lowercase);
    let magnitude = match lower.as_deref() {
        Some("inf") => f64::INFINITY,
        Some("nan") => return f64::NAN,
        _ => rest[..float_prefix_len(rest.as_bytes())]
            .parse::<f64>()
            .unwrap_or(0.0),
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Length of the `digits[.digits][e[+-]digits]` prefix.
fn float_prefix_len(bytes: &[u8]) -> usize {
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };
    let mut end = digits_from(0);
    if end == 0 {
        return 0;
    }
    if bytes.get(end) == Some(&b'.') {
        let fraction = digits_from(end + 1);
        if fraction > 0 {
            end += 1 + fraction;
        }
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }
    end
}

/// Significant digits kept when printing a Float.
const FLOAT_PRECISION: i32 = 6;

/// Render a Float the way `:echo` and `string()` show it.
///
/// Six significant digits, trailing zeros dropped but at least one digit
/// after the point. Very large or very small magnitudes switch to exponent
/// form (`1.0e20`, `1.0e-5`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // Rounding to the kept precision can carry into the next decade, so the
    // exponent is read back from the rounded scientific form.
    let scientific = format!("{:.*e}", (FLOAT_PRECISION - 1) as usize, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .map_or((scientific.as_str(), 0), |(m, e)| (m, e.parse().unwrap_or(0)));

    if exponent < -4 || exponent >= FLOAT_PRECISION {
        format!("{}e{exponent}", trim_fraction(mantissa.to_string()))
    } else {
        let decimals = usize::try_from(FLOAT_PRECISION - 1 - exponent).unwrap_or(0);
        trim_fraction(format!("{value:.decimals$}"))
    }
}

fn trim_fraction(mut text: String) -> String {
    if !text.contains('.') {
        text.push_str(".0");
        return text;
    }
    while text.ends_with('0') && !text.ends_with(".0") {
        text.pop();
    }
    if text.ends_with('.') {
        text.push('0');
    }
    text
}
