use lazy_static::lazy_static;
use regex::Regex;
use validator::{Validate, ValidationError};

lazy_static! {
    /// Allowed username characters: word characters plus @/./+/-
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
}

/// Signup form validation: username charset and length, password length.
#[derive(Debug, Validate)]
pub struct SignupValidation {
    #[validate(
        length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"),
        custom(
            function = "validate_username_chars",
            message = "Username may only contain letters, digits and @/./+/-/_"
        )
    )]
    pub username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    if USERNAME_REGEX.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username_chars"))
    }
}

impl SignupValidation {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Runs validation, flattening field errors into displayable messages.
    pub fn validate_form(&self) -> Result<(), Vec<String>> {
        match self.validate() {
            Ok(_) => Ok(()),
            Err(errors) => {
                let mut messages = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        let msg = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field));
                        messages.push(msg);
                    }
                }
                Err(messages)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_username() {
        let form = SignupValidation::new("valid_user123", "password123");
        assert!(form.validate_form().is_ok());
    }

    #[test]
    fn test_username_with_email_chars() {
        let form = SignupValidation::new("user@example.com", "password123");
        assert!(form.validate_form().is_ok());
    }

    #[test]
    fn test_empty_username() {
        let form = SignupValidation::new("", "password123");
        assert!(form.validate_form().is_err());
    }

    #[test]
    fn test_username_too_long() {
        let long_username = "a".repeat(151);
        let form = SignupValidation::new(&long_username, "password123");
        assert!(form.validate_form().is_err());
    }

    #[test]
    fn test_username_with_spaces() {
        let form = SignupValidation::new("one two", "password123");
        assert!(form.validate_form().is_err());
    }

    #[test]
    fn test_password_too_short() {
        let form = SignupValidation::new("validuser", "short");
        assert!(form.validate_form().is_err());
    }
}
