use bolero::generator::TypeGenerator;
use std::fmt;

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account role, sent over the wire as its integer discriminant
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    Admin,
    Alumni,
    Teacher,
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(v: u8) -> Result<Role, String> {
        match v {
            0 => Ok(Role::Admin),
            1 => Ok(Role::Alumni),
            2 => Ok(Role::Teacher),
            _ => Err(format!("unknown user role {v}")),
        }
    }
}

impl From<Role> for u8 {
    fn from(r: Role) -> u8 {
        match r {
            Role::Admin => 0,
            Role::Alumni => 1,
            Role::Teacher => 2,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,

    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,

    /// Avatar reference, possibly carrying the storage prefix
    #[serde(default)]
    pub avatar: Option<String>,

    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Name shown next to the user's comments. Accounts without any name
    /// set are the administration's.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        match name.trim() {
            "" => String::from("Administrator"),
            name => String::from(name),
        }
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar.as_deref().map(crate::normalize_image_ref)
    }
}
