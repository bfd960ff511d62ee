use std::sync::Arc;

use crate::cache::{self, CacheClient};
use crate::config::Deadlines;
use crate::db::UserStore;
use crate::error::ApiError;
use crate::models::{parse_id, SessionSnapshot, UpdateProfileRequest, User, UserProfile};

use super::within;

pub struct UserService {
    users: Arc<dyn UserStore>,
    cache: CacheClient,
    deadlines: Deadlines,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, cache: CacheClient, deadlines: Deadlines) -> Self {
        UserService {
            users,
            cache,
            deadlines,
        }
    }

    pub async fn get_my_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        within(
            self.deadlines.standard,
            self.cached_profile(&cache::my_profile_key(user_id), user_id),
        )
        .await
    }

    pub async fn get_user_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        let user_id = parse_id(user_id, "user")?;
        within(
            self.deadlines.standard,
            self.cached_profile(&cache::user_info_key(&user_id), &user_id),
        )
        .await
    }

    /// Apply the present fields, persist, then refresh the cached session.
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: &UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        let gender = request.validate()?;

        within(self.deadlines.standard, async {
            let mut user = self
                .users
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("user not found"))?;

            if let Some(username) = request.username.as_deref().map(str::trim) {
                if username != user.username {
                    if let Some(owner) = self.users.find_by_username(username).await? {
                        if owner.id != user.id {
                            return Err(ApiError::conflict("username is already taken"));
                        }
                    }
                }
            }
            if let Some(email) = request.email.as_deref().map(str::trim) {
                if email != user.email {
                    if let Some(owner) = self.users.find_by_email(email).await? {
                        if owner.id != user.id {
                            return Err(ApiError::conflict("email is already taken"));
                        }
                    }
                }
            }

            request.apply(&mut user, gender);
            if !self.users.replace(&user).await? {
                return Err(ApiError::not_found("user not found"));
            }

            self.refresh_cached_session(&user).await;
            Ok(UserProfile::from(&user))
        })
        .await
    }

    /// Delete the account and return its last state.
    ///
    /// The persistent delete goes first; cached copies are only dropped once
    /// it has succeeded.
    pub async fn delete_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        within(self.deadlines.short, async {
            let user = self
                .users
                .delete(user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("user not found"))?;

            self.cache
                .delete(&[
                    cache::session_key(user_id),
                    cache::my_profile_key(user_id),
                    cache::user_info_key(user_id),
                ])
                .await;

            log::info!("deleted user {}", user_id);
            Ok(UserProfile::from(user))
        })
        .await
    }

    pub async fn search_users(
        &self,
        query: &str,
        exclude_user_id: &str,
    ) -> Result<Vec<UserProfile>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::validation("query must not be empty"));
        }

        within(self.deadlines.standard, async {
            let users = self.users.search(query, exclude_user_id).await?;
            Ok(users.iter().map(UserProfile::from).collect())
        })
        .await
    }

    pub async fn get_random_users(&self, count: usize) -> Result<Vec<UserProfile>, ApiError> {
        within(self.deadlines.short, async {
            // A shorter cached sample than requested is resampled
            let cached = self
                .cached_list(cache::RANDOM_USERS_KEY)
                .await
                .filter(|users| users.len() >= count);
            if let Some(cached) = cached {
                return Ok(cached.into_iter().take(count).collect());
            }

            let users: Vec<UserProfile> = self
                .users
                .sample(count)
                .await?
                .iter()
                .map(UserProfile::from)
                .collect();
            self.cache
                .set(cache::RANDOM_USERS_KEY, &users, cache::RANDOM_USERS_TTL)
                .await?;
            Ok(users)
        })
        .await
    }

    pub async fn get_recently_joined_users(
        &self,
        count: usize,
        exclude_user_id: &str,
    ) -> Result<Vec<UserProfile>, ApiError> {
        let key = cache::recent_users_key(exclude_user_id);

        within(self.deadlines.short, async {
            let cached = self
                .cached_list(&key)
                .await
                .filter(|users| users.len() >= count);
            if let Some(cached) = cached {
                return Ok(cached.into_iter().take(count).collect());
            }

            let users: Vec<UserProfile> = self
                .users
                .recent(count, exclude_user_id)
                .await?
                .iter()
                .map(UserProfile::from)
                .collect();
            self.cache
                .set(&key, &users, cache::RECENT_USERS_TTL)
                .await?;
            Ok(users)
        })
        .await
    }

    /// Cache-aside read of a single profile.
    async fn cached_profile(&self, key: &str, user_id: &str) -> Result<UserProfile, ApiError> {
        match self.cache.get::<UserProfile>(key).await {
            Ok(Some(profile)) => {
                log::debug!("cache hit for {}", key);
                return Ok(profile);
            }
            Ok(None) => log::debug!("cache miss for {}", key),
            Err(e) => log::warn!("discarding unreadable cache entry {}: {}", key, e),
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("user not found"))?;
        let profile = UserProfile::from(&user);
        self.cache.set(key, &profile, cache::PROFILE_TTL).await?;
        Ok(profile)
    }

    /// A non-empty cached list, if there is one.
    async fn cached_list(&self, key: &str) -> Option<Vec<UserProfile>> {
        match self.cache.get::<Vec<UserProfile>>(key).await {
            Ok(Some(users)) if !users.is_empty() => Some(users),
            Ok(_) => None,
            Err(e) => {
                log::warn!("discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Best effort: failures are logged, never surfaced.
    async fn refresh_cached_session(&self, user: &User) {
        let key = cache::session_key(&user.id);
        if self.cache.exists(&key).await {
            if let Err(e) = self
                .cache
                .set(&key, &SessionSnapshot::from(user), cache::SESSION_TTL)
                .await
            {
                log::warn!("could not refresh session for {}: {}", user.id, e);
            }
        }
        self.cache
            .delete(&[
                cache::my_profile_key(&user.id),
                cache::user_info_key(&user.id),
            ])
            .await;
    }
}
