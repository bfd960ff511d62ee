use std::sync::Arc;

use crate::cache::{self, CacheClient};
use crate::config::Deadlines;
use crate::credentials::{hash_password, verify_password, TokenSigner};
use crate::db::UserStore;
use crate::error::ApiError;
use crate::models::{LoginRequest, SessionSnapshot, SignupRequest, User, UserProfile};

use super::within;

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Signup, login and logout.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    cache: CacheClient,
    signer: TokenSigner,
    deadlines: Deadlines,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        cache: CacheClient,
        signer: TokenSigner,
        deadlines: Deadlines,
    ) -> Self {
        AuthService {
            users,
            cache,
            signer,
            deadlines,
        }
    }

    /// Create an account and issue a token for it.
    ///
    /// The email and username checks are two separate reads, so concurrent
    /// signups with the same identifiers can both pass them.
    pub async fn sign_up(&self, request: &SignupRequest) -> Result<(UserProfile, String), ApiError> {
        let gender = request.validate()?;

        within(self.deadlines.standard, async {
            if self.users.find_by_email(request.email.trim()).await?.is_some() {
                return Err(ApiError::conflict("user with this email already exists"));
            }
            if self
                .users
                .find_by_username(request.username.trim())
                .await?
                .is_some()
            {
                return Err(ApiError::conflict("user with this username already exists"));
            }

            let user = User::new(request, gender, hash_password(&request.password)?);
            self.users.insert(&user).await?;
            let token = self.signer.issue(&user.id, &user.username, user.is_admin)?;

            log::info!("registered user {} ({})", user.username, user.id);
            Ok((UserProfile::from(&user), token))
        })
        .await
    }

    /// Check credentials, cache the session snapshot and issue a token.
    pub async fn login(&self, request: &LoginRequest) -> Result<(UserProfile, String), ApiError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.trim().is_empty() {
            return Err(ApiError::validation("username and password are required"));
        }

        within(self.deadlines.standard, async {
            let user = self
                .users
                .find_by_username(username)
                .await?
                .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

            if !verify_password(&request.password, &user.password)? {
                return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
            }

            self.cache
                .set(
                    &cache::session_key(&user.id),
                    &SessionSnapshot::from(&user),
                    cache::SESSION_TTL,
                )
                .await?;
            let token = self.signer.issue(&user.id, &user.username, user.is_admin)?;

            log::info!("user {} logged in", user.id);
            Ok((UserProfile::from(&user), token))
        })
        .await
    }

    /// Drop the cached session for whoever holds `token`. The token itself
    /// stays valid until it expires.
    pub async fn logout(&self, token: Option<&str>) {
        let Some(claims) = token.and_then(|t| self.signer.verify(t).ok()) else {
            return;
        };
        self.cache.delete(&[cache::session_key(&claims.id)]).await;
        log::info!("user {} logged out", claims.id);
    }
}
