//! Precondition helpers shared by every grnet crate.
//!
//! Shape checks ([`ensure_len`]) report [`GrnetError::Contract`]; value checks
//! ([`ensure`]) report [`GrnetError::Invariant`]. Callers run shape checks
//! before value checks so the first reported failure is reproducible.

use crate::{GrnetError, Result};

/// Fail with an invariant violation built from `msg` unless `condition` holds.
///
/// The message closure only runs on failure.
pub fn ensure<F, S>(condition: bool, msg: F) -> Result<()>
where
    F: FnOnce() -> S,
    S: Into<String>,
{
    if condition {
        Ok(())
    } else {
        Err(GrnetError::Invariant(msg().into()))
    }
}

/// Fail with a contract violation unless `actual == expected`.
pub fn ensure_len(field: &str, expected: usize, actual: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(GrnetError::contract(
            field,
            format!("length {expected}"),
            format!("length {actual}"),
        ))
    }
}

/// Fail with an invariant violation if `labels` contains a repeated entry.
pub fn ensure_unique(field: &str, labels: &[String]) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(GrnetError::Invariant(format!(
                "{field} should be unique, got duplicate {label:?}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn ensure_passes_and_fails() {
        assert!(ensure(true, || "never built").is_ok());
        let err = ensure(1 > 2, || "x should exceed 2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
        assert!(err.to_string().contains("x should exceed 2"));
    }

    #[test]
    fn ensure_len_is_contract() {
        assert!(ensure_len("names", 3, 3).is_ok());
        let err = ensure_len("names", 3, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Contract);
        assert!(err.to_string().contains("names"));
    }

    #[test]
    fn ensure_unique_reports_duplicate() {
        let ok = vec!["a".to_string(), "b".to_string()];
        assert!(ensure_unique("genes", &ok).is_ok());
        let dup = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let err = ensure_unique("genes", &dup).unwrap_err();
        assert!(err.to_string().contains("\"a\""));
    }
}
