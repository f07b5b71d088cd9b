// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit with an internal error (exit code >1)
/// Internal errors are for unexpected system failures, database corruption, etc.
pub fn internal_error(message: &str) -> ! {
    eprintln!("Internal error: {}", message);
    process::exit(2);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that a candidate ID is valid (positive integer)
pub fn validate_candidate_id(id_str: &str) -> Result<i64, String> {
    id_str
        .parse::<i64>()
        .map_err(|_| format!("Invalid candidate ID: '{}'. Candidate ID must be a number.", id_str))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("Invalid candidate ID: {}. Candidate ID must be positive.", id))
            }
        })
}

/// Validate a screening score (0-100)
pub fn validate_score(score: i64) -> Result<i64, String> {
    if (0..=100).contains(&score) {
        Ok(score)
    } else {
        Err(format!("Invalid score: {}. Score must be between 0 and 100.", score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty("test", "field").is_ok());
        assert!(validate_non_empty("", "field").is_err());
        assert!(validate_non_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_candidate_id() {
        assert_eq!(validate_candidate_id("1"), Ok(1));
        assert_eq!(validate_candidate_id("42"), Ok(42));
        assert!(validate_candidate_id("0").is_err());
        assert!(validate_candidate_id("-1").is_err());
        assert!(validate_candidate_id("abc").is_err());
        assert!(validate_candidate_id("").is_err());
    }

    #[test]
    fn test_validate_score() {
        assert_eq!(validate_score(0), Ok(0));
        assert_eq!(validate_score(100), Ok(100));
        assert!(validate_score(-1).is_err());
        assert!(validate_score(101).is_err());
    }
}
