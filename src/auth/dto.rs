use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    validation::{is_valid_email, non_blank},
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register input after trimming and validation.
#[derive(Debug, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, AppError> {
        let (Some(username), Some(email), Some(password)) = (
            non_blank(self.username),
            non_blank(self.email).map(|e| e.to_lowercase()),
            self.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::invalid("username, email and password are required"));
        };
        if !(3..=32).contains(&username.chars().count()) {
            return Err(AppError::invalid("username must be 3 to 32 characters"));
        }
        if !is_valid_email(&email) {
            return Err(AppError::invalid("invalid email"));
        }
        if password.chars().count() < 6 {
            return Err(AppError::invalid("password must be at least 6 characters"));
        }
        Ok(NewUser { username, email, password })
    }
}

/// `username` may hold either a username or an email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn credentials(self) -> Result<(String, String), AppError> {
        let login = non_blank(self.username).or_else(|| non_blank(self.email));
        match (login, self.password.filter(|p| !p.is_empty())) {
            (Some(login), Some(password)) => Ok((login, password)),
            _ => Err(AppError::invalid("username and password are required")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// The part of a user that is safe to return to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[test]
    fn register_normalises_email() {
        let user = register(" alice ", " Alice@Example.COM", "secret1").validate().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn register_rejects_bad_input() {
        assert!(register("al", "a@b.co", "secret1").validate().is_err());
        assert!(register("alice", "not-an-email", "secret1").validate().is_err());
        assert!(register("alice", "a@b.co", "12345").validate().is_err());
        let missing = RegisterRequest { username: None, email: None, password: None };
        assert!(missing.validate().is_err());
    }

    #[test]
    fn login_falls_back_to_email() {
        let req = LoginRequest {
            username: Some("  ".into()),
            email: Some("a@b.co".into()),
            password: Some("pw".into()),
        };
        assert_eq!(req.credentials().unwrap(), ("a@b.co".into(), "pw".into()));
    }

    #[test]
    fn public_user_has_no_secret_fields() {
        let json = serde_json::to_value(PublicUser {
            id: 1,
            username: "alice".into(),
            email: "a@b.co".into(),
        })
        .unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
