//! Purpose: Permissive integer coercion for integer-valued API parameters.
//! Exports: `IntArg` trait and implementations for integers and strings.
//! Role: Mirrors the remote API's lenient numeric handling, made explicit.
//! Invariants: String coercion reads an optional sign plus leading decimal
//! digits and yields 0 for non-numeric input; it never fails.

/// A value usable where the API expects an integer parameter.
///
/// Integer types convert losslessly (saturating at the `i64` bounds for
/// `u64`/`u128`). String types use a deliberately lenient rule: leading
/// whitespace is skipped, an optional `+`/`-` sign is honored, and decimal
/// digits are read until the first non-digit; anything non-numeric coerces
/// to 0. Callers that need strict parsing should parse and validate before
/// handing the value to a setter.
pub trait IntArg {
    fn into_int(self) -> i64;
}

macro_rules! impl_int_arg_lossless {
    ($($ty:ty),*) => {
        $(impl IntArg for $ty {
            fn into_int(self) -> i64 {
                i64::from(self)
            }
        })*
    };
}

impl_int_arg_lossless!(i8, i16, i32, i64, u8, u16, u32);

impl IntArg for u64 {
    fn into_int(self) -> i64 {
        i64::try_from(self).unwrap_or(i64::MAX)
    }
}

impl IntArg for usize {
    fn into_int(self) -> i64 {
        i64::try_from(self).unwrap_or(i64::MAX)
    }
}

impl IntArg for &str {
    fn into_int(self) -> i64 {
        coerce_str(self)
    }
}

impl IntArg for String {
    fn into_int(self) -> i64 {
        coerce_str(&self)
    }
}

impl IntArg for &String {
    fn into_int(self) -> i64 {
        coerce_str(self)
    }
}

fn coerce_str(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    let leading = &digits[..end];
    if leading.is_empty() {
        return 0;
    }
    // Saturate rather than wrap when the digit run exceeds i64.
    let magnitude = leading.parse::<i64>().unwrap_or(i64::MAX);
    if negative { -magnitude } else { magnitude }
}
