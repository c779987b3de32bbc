//! IDR amount formatting.
//!
//! The form stores amounts as a canonical digit string; the `IDR 100.000`
//! display form is derived on demand and never written back.

/// Literal prefix put in front of every rendered amount.
pub const CURRENCY_PREFIX: &str = "IDR ";

/// Renders a non-negative integer, given as normalized digits (no leading
/// zeros), with locale-specific thousands grouping.
pub trait DigitGrouping {
    fn group(&self, digits: &str) -> String;
}

/// Indonesian convention: period as the thousands separator.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndonesianGrouping;

impl DigitGrouping for IndonesianGrouping {
    fn group(&self, digits: &str) -> String {
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(ch);
        }
        out
    }
}

/// Normalize a digit string: leading zeros dropped, all-zero input becomes
/// `"0"`. Empty or non-numeric input yields `None`. Any length is accepted.
pub fn normalize(canonical: &str) -> Option<&str> {
    if canonical.is_empty() || !canonical.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match canonical.trim_start_matches('0') {
        "" => Some("0"),
        digits => Some(digits),
    }
}

/// True iff `canonical` is a number strictly greater than zero.
pub fn is_positive(canonical: &str) -> bool {
    normalize(canonical).is_some_and(|digits| digits != "0")
}

/// Render canonical digits as `IDR <grouped>`; unparseable input renders as
/// the empty string.
pub fn to_display(canonical: &str) -> String {
    to_display_with(&IndonesianGrouping, canonical)
}

/// [`to_display`] with an explicit grouping locale.
pub fn to_display_with<G: DigitGrouping + ?Sized>(grouping: &G, canonical: &str) -> String {
    match normalize(canonical) {
        Some(digits) => format!("{CURRENCY_PREFIX}{}", grouping.group(digits)),
        None => String::new(),
    }
}

/// Strip everything that is not an ASCII digit.
///
/// Applied to the raw field content on every keystroke, so pasted
/// separators and currency symbols are dropped rather than rejected.
pub fn to_canonical(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_groups_with_periods() {
        assert_eq!(to_display("100000"), "IDR 100.000");
        assert_eq!(to_display("1234567"), "IDR 1.234.567");
        assert_eq!(to_display("999"), "IDR 999");
        assert_eq!(to_display("1000"), "IDR 1.000");
    }

    #[test]
    fn display_of_unparseable_is_empty() {
        assert_eq!(to_display(""), "");
        assert_eq!(to_display("abc"), "");
        assert_eq!(to_display("12a"), "");
    }

    #[test]
    fn display_handles_amounts_beyond_u64() {
        assert_eq!(
            to_display("1234567890123456789012345"),
            "IDR 1.234.567.890.123.456.789.012.345"
        );
        assert_eq!(to_display("100000000000000000000"), "IDR 100.000.000.000.000.000.000");
        assert!(is_positive("1234567890123456789012345"));
    }

    #[test]
    fn positivity() {
        assert!(is_positive("1"));
        assert!(is_positive("0001"));
        assert!(!is_positive("0"));
        assert!(!is_positive("000"));
        assert!(!is_positive(""));
        assert!(!is_positive("abc"));
    }

    #[test]
    fn display_drops_leading_zeros() {
        assert_eq!(to_display("0100"), "IDR 100");
        assert_eq!(to_display("0"), "IDR 0");
    }

    #[test]
    fn canonical_keeps_only_digits() {
        assert_eq!(to_canonical("IDR 100.000"), "100000");
        assert_eq!(to_canonical("Rp. 1,500"), "1500");
        assert_eq!(to_canonical("abc"), "");
        assert_eq!(to_canonical(""), "");
    }

    #[test]
    fn canonical_of_display_preserves_value() {
        for s in ["0", "7", "0100", "100000", "1234567890123456789012345"] {
            let back = to_canonical(&to_display(s));
            assert_eq!(normalize(&back), normalize(s), "value changed for {s}");
            assert!(normalize(&back).is_some());
        }
    }

    #[test]
    fn custom_grouping_is_used() {
        struct Plain;
        impl DigitGrouping for Plain {
            fn group(&self, digits: &str) -> String {
                digits.to_string()
            }
        }
        assert_eq!(to_display_with(&Plain, "100000"), "IDR 100000");
    }
}
