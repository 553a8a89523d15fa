pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use password::PasswordHasher;
pub use token::{Claims, TokenIssuer};

lazy_static! {
    // Alphanumeric plus underscores and hyphens.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username. 3 to 32 characters, alphanumeric with underscores
    /// or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Password, at least 6 characters.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Payload for a login request.
///
/// Not validated: input that would fail registration checks is just a failed
/// login, and yields the same rejection as any other wrong credential.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of a successful login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "test_user-123".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_characters = RegisterRequest {
            username: "test user!".to_string(),
            password: "password123".to_string(),
        };
        assert!(bad_characters.validate().is_err());

        let too_short = RegisterRequest {
            username: "ab".to_string(),
            password: "password123".to_string(),
        };
        assert!(too_short.validate().is_err());

        let too_long = RegisterRequest {
            username: "a".repeat(33),
            password: "password123".to_string(),
        };
        assert!(too_long.validate().is_err());

        let short_password = RegisterRequest {
            username: "testuser".to_string(),
            password: "12345".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_register_request_boundary_lengths() {
        let three_chars = RegisterRequest {
            username: "abc".to_string(),
            password: "123456".to_string(),
        };
        assert!(three_chars.validate().is_ok());

        let thirty_two_chars = RegisterRequest {
            username: "a".repeat(32),
            password: "123456".to_string(),
        };
        assert!(thirty_two_chars.validate().is_ok());
    }
}
