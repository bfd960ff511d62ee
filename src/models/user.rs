use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::require_non_empty;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ApiError::validation(
                "invalid gender: must be male, female, or other",
            )),
        }
    }
}

/// Persisted account. `password` holds the argon2 hash, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub profile_image: Option<String>,
    pub password: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(request: &SignupRequest, gender: Gender, password_hash: String) -> Self {
        let now = Utc::now();
        User {
            id: super::new_id(),
            username: request.username.trim().to_string(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email: request.email.trim().to_string(),
            gender,
            profile_image: request.profile_image.clone(),
            password: password_hash,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The user as returned to clients and cached: everything but the hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub profile_image: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            gender: user.gender,
            profile_image: user.profile_image.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile::from(&user)
    }
}

/// Subset of the profile cached under the login session key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
}

impl From<&User> for SessionSnapshot {
    fn from(user: &User) -> Self {
        SessionSnapshot {
            user_id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub gender: String,
    pub profile_image: Option<String>,
}

impl SignupRequest {
    /// Checks required fields and returns the parsed gender.
    pub fn validate(&self) -> Result<Gender, ApiError> {
        let gender = self.gender.parse::<Gender>()?;
        for (value, field) in [
            (&self.username, "username"),
            (&self.first_name, "firstName"),
            (&self.last_name, "lastName"),
            (&self.email, "email"),
            (&self.password, "password"),
        ] {
            require_non_empty(value, field)?;
        }
        if !self.email.contains('@') {
            return Err(ApiError::validation("email is malformed"));
        }
        if self.password.len() < 4 {
            return Err(ApiError::validation(
                "password must be at least 4 characters",
            ));
        }
        Ok(gender)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Only the fields that are present are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<Option<Gender>, ApiError> {
        for (value, field) in [
            (&self.username, "username"),
            (&self.first_name, "firstName"),
            (&self.last_name, "lastName"),
            (&self.email, "email"),
        ] {
            if let Some(value) = value {
                require_non_empty(value, field)?;
            }
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(ApiError::validation("email is malformed"));
            }
        }
        self.gender.as_deref().map(str::parse::<Gender>).transpose()
    }

    /// Apply present fields to `user` and bump `updated_at`.
    pub fn apply(&self, user: &mut User, gender: Option<Gender>) {
        if let Some(username) = &self.username {
            user.username = username.trim().to_string();
        }
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(email) = &self.email {
            user.email = email.trim().to_string();
        }
        if let Some(gender) = gender {
            user.gender = gender;
        }
        if let Some(image) = &self.profile_image {
            user.profile_image = Some(image.clone());
        }
        user.updated_at = Utc::now();
    }
}
