//! CNPJ (Brazilian company tax id) validation and formatting.

/// Validate a CNPJ using the check-digit algorithm.
///
/// CNPJ format: 14 digits where the last two are check digits.
/// First digit weights: 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2.
/// Second digit weights: 6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2.
pub fn validate_cnpj(cnpj: &str) -> bool {
    let digits: Vec<u32> = cnpj
        .chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 14 {
        return false;
    }

    // Sequences of one repeated digit carry valid check digits but are
    // not assignable CNPJs.
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let first = check_digit(&digits[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&digits[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);

    first == digits[12] && second == digits[13]
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights.iter()).map(|(d, w)| d * w).sum();

    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

/// Format a CNPJ with the standard mask (XX.XXX.XXX/XXXX-XX).
pub fn format_cnpj(cnpj: &str) -> String {
    let digits: String = cnpj.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 14 {
        return cnpj.to_string();
    }

    format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cnpj_valid() {
        assert!(validate_cnpj("11222333000181"));
        assert!(validate_cnpj("11.222.333/0001-81")); // with punctuation
    }

    #[test]
    fn test_validate_cnpj_invalid() {
        assert!(!validate_cnpj("11222333000182")); // bad check digit
        assert!(!validate_cnpj("12345678901234")); // bad check digits
        assert!(!validate_cnpj("1122233300018")); // too short
        assert!(!validate_cnpj("00000000000000")); // repeated digits
    }

    #[test]
    fn test_format_cnpj() {
        assert_eq!(format_cnpj("11222333000181"), "11.222.333/0001-81");
        assert_eq!(format_cnpj("11.222.333/0001-81"), "11.222.333/0001-81");
        assert_eq!(format_cnpj("123"), "123"); // unformattable, returned as-is
    }
}
