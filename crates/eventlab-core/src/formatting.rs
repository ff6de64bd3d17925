//! Number and money formatting for reports.

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// A value that rounds to zero is never printed with a minus sign.
///
/// # Examples
///
/// ```
/// use eventlab_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format an amount as US dollars with two decimal places, in the
/// `en-US` style (`-$9.99` for negatives).
///
/// # Examples
///
/// ```
/// use eventlab_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56), "$1,234.56");
/// assert_eq!(format_currency(0.0), "$0.00");
/// assert_eq!(format_currency(-9.99), "-$9.99");
/// ```
pub fn format_currency(amount: f64) -> String {
    let formatted = format_number(amount, 2);
    match formatted.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", formatted),
    }
}

/// Format an integer count with thousands separators.
pub fn format_count(count: u64) -> String {
    group_thousands(&count.to_string())
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
///
/// # Examples
///
/// ```
/// use eventlab_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of a digit string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
