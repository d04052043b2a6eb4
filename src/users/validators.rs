// src/users/validators.rs

use super::models::RegisterRequest;
use super::password::MAX_PASSWORD_BYTES;
use crate::common::validation::is_plausible_email;
use crate::common::{ValidationResult, Validator};

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub struct RegistrationValidator;

impl Validator<RegisterRequest> for RegistrationValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        for (field, value) in [("first_name", &data.first_name), ("last_name", &data.last_name)] {
            if value.trim().is_empty() {
                result.add_error(field, "Name is required");
            } else if value.chars().count() > MAX_NAME_LENGTH {
                result.add_error(field, "Name must be at most 50 characters");
            }
        }

        let email = data.email.trim();
        if email.is_empty() {
            result.add_error("email", "Email is required");
        } else if email.len() > MAX_EMAIL_LENGTH || !is_plausible_email(email) {
            result.add_error("email", "Email must be a valid address");
        }

        let password_length = data.password.chars().count();
        if password_length < MIN_PASSWORD_LENGTH {
            result.add_error("password", "Password must be at least 8 characters");
        } else if data.password.len() > MAX_PASSWORD_BYTES {
            result.add_error("password", "Password must be at most 72 bytes");
        }

        result
    }
}
