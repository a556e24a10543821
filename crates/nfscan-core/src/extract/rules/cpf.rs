//! CPF (Brazilian individual tax id) validation and formatting.

/// Validate a CPF using the check-digit algorithm.
///
/// CPF format: 11 digits where the last two are check digits,
/// computed with descending weights 10..2 and 11..2.
pub fn validate_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf
        .chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return false;
    }

    // Repeated-digit sequences (e.g. 111.111.111-11) pass the checksum
    // but are not assignable CPFs.
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let first = check_digit(&digits[..9]);
    let second = check_digit(&digits[..10]);

    first == digits[9] && second == digits[10]
}

fn check_digit(digits: &[u32]) -> u32 {
    let start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (start - i as u32))
        .sum();

    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

/// Format a CPF with the standard mask (XXX.XXX.XXX-XX).
pub fn format_cpf(cpf: &str) -> String {
    let digits: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 11 {
        return cpf.to_string();
    }

    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}
