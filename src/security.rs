//! Accounts and roles for the control layer.
//!
//! The directory only answers "who is this" and "may they add users". The
//! currently logged-in user is held by the caller as an `Option<User>` and
//! checked with [`User::is_admin`] before admin-only engine operations.

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Guest,
    User,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UserRole::Guest => "Guest",
            UserRole::User => "User",
            UserRole::Admin => "Admin",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "guest" => Ok(UserRole::Guest),
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    password_digest: [u8; 32],
    pub role: UserRole,
}

impl User {
    fn new(username: &str, password: &str, role: UserRole) -> Self {
        User {
            username: username.to_string(),
            password_digest: digest(password),
            role,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    fn password_matches(&self, password: &str) -> bool {
        self.password_digest == digest(password)
    }
}

fn digest(password: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(password.as_bytes()));
    out
}

/// Registered accounts, seeded with one administrator
#[derive(Debug)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(admin_username: &str, admin_password: &str) -> Self {
        UserDirectory {
            users: vec![User::new(admin_username, admin_password, UserRole::Admin)],
        }
    }

    /// Look up a user by credentials
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        match self
            .users
            .iter()
            .find(|u| u.username == username && u.password_matches(password))
        {
            Some(user) => {
                info!(username, role = %user.role, "login succeeded");
                Ok(user.clone())
            }
            None => {
                warn!(username, "login failed");
                Err(SimError::InvalidCredentials)
            }
        }
    }

    /// Register a new account. Only an administrator may do this.
    pub fn add_user(&mut self, actor: Option<&User>, username: &str, password: &str, role: UserRole) -> Result<()> {
        if !actor.is_some_and(User::is_admin) {
            warn!(username, "user creation denied");
            return Err(SimError::AccessDenied { required: UserRole::Admin });
        }
        if self.users.iter().any(|u| u.username == username) {
            return Err(SimError::DuplicateUser(username.to_string()));
        }

        self.users.push(User::new(username, password, role));
        info!(username, %role, "user added");
        Ok(())
    }

    /// (username, role) for every account in registration order
    pub fn users(&self) -> Vec<(&str, UserRole)> {
        self.users.iter().map(|u| (u.username.as_str(), u.role)).collect()
    }
}
