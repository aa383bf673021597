//! Common validation utilities and input normalizers.
//!
//! The custom functions plug into `validator` derive attributes on request
//! payloads; the normalizers produce the canonical stored forms (CEP as bare
//! digits, UF uppercase).

use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// CEP in `00000-000` or `00000000` form.
    static ref CEP_RE: Regex = Regex::new(r"^\d{5}-?\d{3}$").unwrap();
}

/// The 27 Brazilian federative unit codes.
pub const UF_CODES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Validates a CEP in `00000-000` or `00000000` form.
pub fn validate_cep(cep: &str) -> Result<(), ValidationError> {
    if CEP_RE.is_match(cep) {
        Ok(())
    } else {
        let mut err = ValidationError::new("cep_format");
        err.message = Some("CEP deve estar no formato 00000-000".into());
        Err(err)
    }
}

/// Validates a two-letter UF code (case-insensitive).
pub fn validate_uf(uf: &str) -> Result<(), ValidationError> {
    let upper = uf.to_uppercase();
    if UF_CODES.contains(&upper.as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("uf_invalid");
        err.message = Some("UF inválida".into());
        Err(err)
    }
}

/// Validates that a birth date lies in the past.
pub fn validate_past_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date < Utc::now().date_naive() {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_past");
        err.message = Some("não pode ser uma data futura".into());
        Err(err)
    }
}

/// Validates that an activity date is today or later.
pub fn validate_not_past_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date >= Utc::now().date_naive() {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_future_or_present");
        err.message = Some("não pode ser uma data passada".into());
        Err(err)
    }
}

/// Strips a CEP down to its digits.
pub fn normalize_cep(cep: &str) -> String {
    cep.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Canonical uppercase UF.
pub fn normalize_uf(uf: &str) -> String {
    uf.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cep_accepts_both_forms() {
        assert!(validate_cep("01001-000").is_ok());
        assert!(validate_cep("01001000").is_ok());
    }

    #[test]
    fn test_validate_cep_rejects_malformed() {
        assert!(validate_cep("1001-000").is_err());
        assert!(validate_cep("01001-00").is_err());
        assert!(validate_cep("abcde-fgh").is_err());
        assert!(validate_cep("").is_err());
        assert!(validate_cep("01001--000").is_err());
    }

    #[test]
    fn test_validate_uf() {
        assert!(validate_uf("SP").is_ok());
        assert!(validate_uf("rj").is_ok());
        assert!(validate_uf("TO").is_ok());
        assert!(validate_uf("XX").is_err());
        assert!(validate_uf("").is_err());
        assert!(validate_uf("SPP").is_err());
    }

    #[test]
    fn test_validate_past_date() {
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let tomorrow = Utc::now().date_naive().succ_opt().unwrap();

        assert!(validate_past_date(&yesterday).is_ok());
        assert!(validate_past_date(&Utc::now().date_naive()).is_err());
        assert!(validate_past_date(&tomorrow).is_err());
    }

    #[test]
    fn test_validate_not_past_date() {
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let tomorrow = Utc::now().date_naive().succ_opt().unwrap();

        assert!(validate_not_past_date(&Utc::now().date_naive()).is_ok());
        assert!(validate_not_past_date(&tomorrow).is_ok());
        assert!(validate_not_past_date(&yesterday).is_err());
    }

    #[test]
    fn test_normalize_cep() {
        assert_eq!(normalize_cep("01001-000"), "01001000");
        assert_eq!(normalize_cep("01001000"), "01001000");
        assert_eq!(normalize_cep(" 01.001-000 "), "01001000");
    }

    #[test]
    fn test_normalize_uf() {
        assert_eq!(normalize_uf("sp"), "SP");
        assert_eq!(normalize_uf(" mg "), "MG");
    }
}
