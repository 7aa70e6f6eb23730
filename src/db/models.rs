use serde::{Deserialize, Serialize};

/// Account role. `Admin` exists in the schema but is never self-assignable
/// through the registration endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Adopter,
    Shelter,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Adopter => "Adopter",
            Role::Shelter => "Shelter",
            Role::Admin => "Admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Adopter" => Some(Role::Adopter),
            "Shelter" => Some(Role::Shelter),
            "Admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Full account row. Not serializable: the hash and reset token must never
/// leave the process. Use `PublicAccount` for responses.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            phone_number: account.phone_number,
            address: account.address,
            created_at: account.created_at,
        }
    }
}

/// The public identity of a shelter, attached to listings and applications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelterRef {
    pub id: String,
    pub name: String,
}
