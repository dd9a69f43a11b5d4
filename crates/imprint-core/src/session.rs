//! Logged-in session and role gating.
//!
//! The role is resolved once at login from the role identifier the auth
//! service returns and is carried on the [`Session`] from then on. Admin-only
//! operations check it with [`Session::require_admin`].

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{AuthConfig, Config};
use crate::error::{ApiError, Result};

/// Access level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Customer => "Customer",
        }
    }

    /// Role name as the REST API spells it.
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Customer => "CUSTOMER",
        }
    }

    /// Parse an API role name. Anything but `ADMIN` is a customer.
    pub fn from_api_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("ADMIN") {
            Self::Admin
        } else {
            Self::Customer
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            other => Err(format!("unknown role: {other} (expected admin or customer)")),
        }
    }
}

/// Maps role identifiers to roles and back.
#[derive(Debug, Clone)]
pub struct RoleResolver {
    admin_role_id: String,
    customer_role_id: String,
}

impl RoleResolver {
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            admin_role_id: auth.admin_role_id.clone(),
            customer_role_id: auth.customer_role_id.clone(),
        }
    }

    /// Resolve a role identifier. Missing or unknown identifiers are customers.
    pub fn resolve(&self, role_id: Option<&str>) -> Role {
        match role_id {
            Some(id) if id == self.admin_role_id => Role::Admin,
            _ => Role::Customer,
        }
    }

    /// Identifier the API expects for `role`.
    pub fn role_id(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin_role_id,
            Role::Customer => &self.customer_role_id,
        }
    }
}

impl Default for RoleResolver {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

/// Authenticated context passed to every API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token issued at login
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    /// Fail with [`ApiError::Forbidden`] unless this session is an admin.
    pub fn require_admin(&self) -> std::result::Result<(), ApiError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "{} is signed in as {}; administrator access required",
                self.email, self.role
            )))
        }
    }
}

/// Persists the session as JSON beside the config file.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location in the config directory.
    pub fn open_default() -> Self {
        Self::new(Config::config_dir().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the session, replacing any previous one.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // An existing file keeps its old mode on open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(json.as_bytes())?;

        tracing::debug!("Saved session for {} to {:?}", session.email, self.path);
        Ok(())
    }

    /// Read the saved session, if any.
    pub fn load(&self) -> Result<Option<Session>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the saved session or fail with [`ApiError::NoSession`].
    pub fn require(&self) -> Result<Session> {
        self.load()?.ok_or_else(|| ApiError::NoSession.into())
    }

    /// Remove the saved session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
