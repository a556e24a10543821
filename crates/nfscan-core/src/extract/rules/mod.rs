//! Rule helpers for Brazilian receipt token classification.

pub mod cnpj;
pub mod cpf;
pub mod dates;
pub mod patterns;

pub use cnpj::{format_cnpj, validate_cnpj};
pub use cpf::{format_cpf, validate_cpf};
pub use dates::parse_issue_datetime;

/// Keep only the ASCII digits of a token.
pub fn strip_non_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}
