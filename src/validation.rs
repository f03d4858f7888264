use thiserror::Error;

/// Rejected client input, raised before anything touches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

pub fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Missing { field })
}

pub fn non_empty(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

// zero is as good as absent for ids and difficulty
pub fn non_zero(value: i64, field: &'static str) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::Missing { field: "category" };
        assert_eq!(err.to_string(), "category is required");
    }

    #[test]
    fn falsy_values_are_rejected() {
        assert_eq!(
            non_empty("", "answer"),
            Err(ValidationError::Empty { field: "answer" })
        );
        assert!(non_empty("42", "answer").is_ok());
        assert!(non_zero(0, "difficulty").is_err());
        assert!(non_zero(-1, "difficulty").is_ok());
        assert_eq!(require(Some(3), "category"), Ok(3));
        assert_eq!(
            require::<i64>(None, "category"),
            Err(ValidationError::Missing { field: "category" })
        );
    }
}
