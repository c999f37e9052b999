//! User and role models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Access level granted by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Vendor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "vendor" => Ok(Role::Vendor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role '{}'. Use: user, vendor, admin", other)),
        }
    }
}

/// Anything the API sends that is not a known role is treated as a plain user
impl From<String> for Role {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Role::User)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub photo: Option<String>,
}

fn default_role() -> Role {
    Role::User
}

/// Profile registered with the API after the identity provider signs a user up
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleResponse {
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleUpdate {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" vendor ".parse::<Role>(), Ok(Role::Vendor));
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::from("moderator".to_string()), Role::User);
    }

    #[test]
    fn test_account_role_defaults() {
        let account: UserAccount =
            serde_json::from_str(r#"{"_id": "u1", "email": "a@b.c"}"#).unwrap();
        assert_eq!(account.role, Role::User);

        let account: UserAccount =
            serde_json::from_str(r#"{"_id": "u2", "email": "x@y.z", "role": "vendor"}"#).unwrap();
        assert_eq!(account.role, Role::Vendor);
        assert_eq!(serde_json::to_value(RoleUpdate { role: Role::Admin }).unwrap()["role"], "admin");
    }
}
