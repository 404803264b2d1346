//! Chilean RUT handling: cleaning, check-digit computation, validation and
//! canonical formatting.
//!
//! A RUT is a 7-8 digit body plus one verification character (a digit or
//! 'K'). The verification character is a weighted modulo-11 checksum over the
//! body. All functions here are pure and deterministic.

/// Strips every character that is not a decimal digit or the letter K and
/// uppercases the result. Empty input yields empty output.
pub fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, 'k' | 'K'))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Computes the verification character for a RUT body.
///
/// Digits are weighted 2,3,4,5,6,7,2,3,... from the least significant digit;
/// the products are summed and `11 - (sum mod 11)` maps to the verification
/// character (11 -> '0', 10 -> 'K', otherwise the decimal digit). Returns
/// `None` when the body contains no digits.
pub fn compute_check_digit(body: &str) -> Option<char> {
    let digits: Vec<u32> = body.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.is_empty() {
        return None;
    }

    let mut sum = 0u32;
    let mut multiplier = 2u32;
    for digit in digits.iter().rev() {
        sum += digit * multiplier;
        multiplier = if multiplier == 7 { 2 } else { multiplier + 1 };
    }

    let verification = 11 - (sum % 11);
    Some(match verification {
        11 => '0',
        10 => 'K',
        n => (b'0' + n as u8) as char,
    })
}

/// Returns true iff the input, once cleaned, is a 7-8 digit body followed by
/// its correct verification character.
pub fn validate(raw: &str) -> bool {
    let cleaned = clean(raw);
    // Shape: 7 or 8 digits followed by exactly one digit-or-K.
    if !(8..=9).contains(&cleaned.len()) {
        return false;
    }
    let (body, dv) = cleaned.split_at(cleaned.len() - 1);
    if !body.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let dv = dv.chars().next();
    dv.is_some() && compute_check_digit(body) == dv
}

/// Renders the cleaned input in canonical form: thousands-separated body,
/// dash, verification character (e.g. `12.345.678-5`). Inputs of length <= 1
/// are returned as-is after cleaning.
pub fn format(raw: &str) -> String {
    let cleaned = clean(raw);
    if cleaned.len() <= 1 {
        return cleaned;
    }

    let (body, dv) = cleaned.split_at(cleaned.len() - 1);
    let mut grouped = String::with_capacity(body.len() + body.len() / 3 + 2);
    for (i, c) in body.chars().enumerate() {
        if i > 0 && (body.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{grouped}-{dv}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_separators_and_uppercases() {
        assert_eq!(clean("12.345.678-k"), "12345678K");
        assert_eq!(clean(" 1a2b3c "), "123");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn clean_is_idempotent() {
        for input in ["12.345.678-5", "1112111k", "garbage!!", ""] {
            assert_eq!(clean(&clean(input)), clean(input));
        }
    }

    #[test]
    fn check_digit_known_mapping() {
        // 8,7,6,5,4,3,2,1 against weights 2,3,4,5,6,7,2,3 sums to 138;
        // 138 % 11 = 6; 11 - 6 = 5.
        assert_eq!(compute_check_digit("12345678"), Some('5'));
    }

    #[test]
    fn check_digit_is_stable() {
        let first = compute_check_digit("11111111");
        for _ in 0..10 {
            assert_eq!(compute_check_digit("11111111"), first);
        }
    }

    #[test]
    fn check_digit_edge_mappings() {
        // Sum 34 -> remainder 1 -> 10 -> 'K'.
        assert_eq!(compute_check_digit("1112111"), Some('K'));
        // Sum 33 -> remainder 0 -> 11 -> '0'.
        assert_eq!(compute_check_digit("1111211"), Some('0'));
        assert_eq!(compute_check_digit(""), None);
    }

    #[test]
    fn validate_accepts_correct_ruts() {
        assert!(validate("12345678-5"));
        assert!(validate("12.345.678-5"));
        assert!(validate("1234567-4"));
        assert!(validate("1112111-k"));
        assert!(validate("1111211-0"));
    }

    #[test]
    fn validate_rejects_wrong_check_digit() {
        assert!(!validate("12345678-4"));
        assert!(!validate("1112111-1"));
    }

    #[test]
    fn validate_enforces_body_length() {
        // 7 and 8 digit bodies are accepted; 6 and 9 are not.
        assert!(validate("1234567-4"));
        assert!(validate("12345678-5"));
        assert!(!validate("123456-0"));
        assert!(!validate("123456789-5"));
        assert!(!validate(""));
    }

    #[test]
    fn format_groups_thousands() {
        assert_eq!(format("123456785"), "12.345.678-5");
        assert_eq!(format("12345674"), "1.234.567-4");
        assert_eq!(format("1112111K"), "1.112.111-K");
    }

    #[test]
    fn format_short_inputs_pass_through() {
        assert_eq!(format(""), "");
        assert_eq!(format("5"), "5");
        assert_eq!(format("k"), "K");
    }

    #[test]
    fn formatting_preserves_validity() {
        for raw in ["12345678-5", "1234567-4", "1112111K", "11111111"] {
            if validate(raw) {
                assert!(validate(&format(raw)), "format broke validity of {raw}");
            }
        }
        // And a formatted RUT re-formats to itself.
        assert_eq!(format(&format("123456785")), "12.345.678-5");
    }
}
