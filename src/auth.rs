//! Login, signup and the persisted session.
//!
//! The credential model is deliberately weak and preserved as-is: the
//! plaintext password is the only identity, login is a linear scan over
//! the whole users table, and a session restored from disk is trusted
//! without re-validating against the table. `SessionStore` is the one
//! seam where a stricter policy could be substituted.

use crate::errors::AppError;
use crate::models::User;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::error;
use uuid::Uuid;

/// The two persisted session fields. Both present means authenticated;
/// anything else means logged out. No expiry, no revocation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Session {
    pub user_id: Option<String>,
    pub user_password: Option<String>,
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: Session,
}

impl SessionStore {
    pub async fn load(path: &Path) -> Self {
        let current = match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                error!("failed to parse session file: {err}");
                Session::default()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Session::default(),
            Err(err) => {
                error!("failed to read session file: {err}");
                Session::default()
            }
        };
        Self {
            path: path.to_path_buf(),
            current,
        }
    }

    /// The restored identity, trusted straight from disk.
    pub fn credentials(&self) -> Option<(Uuid, &str)> {
        let id = self.current.user_id.as_deref()?.parse().ok()?;
        let password = self.current.user_password.as_deref()?;
        Some((id, password))
    }

    pub async fn persist(&mut self, user: &User) -> Result<(), AppError> {
        self.current = Session {
            user_id: Some(user.id.to_string()),
            user_password: Some(user.password.clone()),
        };
        self.write().await
    }

    pub async fn clear(&mut self) -> Result<(), AppError> {
        self.current = Session::default();
        self.write().await
    }

    async fn write(&self) -> Result<(), AppError> {
        let payload = serde_json::to_vec_pretty(&self.current)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}

/// First row whose password matches exactly, full-table scan.
pub fn find_by_password<'a>(users: &'a [User], password: &str) -> Option<&'a User> {
    users.iter().find(|u| u.password == password)
}

pub fn login(users: &[User], password: &str) -> Result<User, AppError> {
    find_by_password(users, password)
        .cloned()
        .ok_or_else(|| AppError::auth("invalid credentials"))
}

/// Builds the new user row; the caller inserts it and persists the
/// session on success.
pub fn signup(users: &[User], password: &str) -> Result<User, AppError> {
    if password.is_empty() {
        return Err(AppError::validation("password is required"));
    }
    if find_by_password(users, password).is_some() {
        return Err(AppError::Conflict("password already in use".into()));
    }
    Ok(User {
        id: Uuid::new_v4(),
        password: password.to_string(),
        created_at: Utc::now(),
    })
}
