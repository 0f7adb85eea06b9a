use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct RegisterDescriptor {
    pub email: lettre::Address,
    pub name: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RegisterResult {
    pub account_id: u64,
}

#[derive(Serialize, Deserialize)]
pub struct LoginDescriptor {
    pub email: lettre::Address,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResult {
    pub account_id: u64,
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ViewAccountResult {
    pub id: u64,
    pub metadata: super::UserMetadata,
    pub role: super::Role,
    pub active: bool,
    pub registration_time: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize)]
pub struct EditAccountDescriptor {
    pub variants: Vec<EditAccountVariant>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum EditAccountVariant {
    Name(String),
    /// Sets or clears the phone number.
    Phone(Option<String>),
    Bio(Option<String>),
    Password { old: String, new: String },
    RemoveAvatar,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AvatarResult {
    /// The resized avatar as a JPEG data URL.
    pub avatar: String,
}

pub mod manage {
    use crate::account;
    use serde::{Deserialize, Serialize};

    /// Lists accounts, filtered by role and a case-insensitive
    /// name or email search.
    #[derive(Serialize, Deserialize, Default)]
    pub struct ListAccountsDescriptor {
        #[serde(default)]
        pub role: Option<account::Role>,
        #[serde(default)]
        pub search: String,
        #[serde(default)]
        pub page: usize,
    }

    #[derive(Serialize, Deserialize, Debug)]
    pub struct ListAccountsResult {
        pub accounts: Vec<super::ViewAccountResult>,
        pub page_count: usize,
    }

    #[derive(Serialize, Deserialize)]
    pub struct TargetAccountDescriptor {
        pub account_id: u64,
    }

    #[derive(Serialize, Deserialize, Debug)]
    pub struct ViewAccountResult {
        #[serde(flatten)]
        pub account: super::ViewAccountResult,
        pub certificates: usize,
    }

    #[derive(Serialize, Deserialize)]
    pub struct SetRoleDescriptor {
        pub account_id: u64,
        pub role: account::Role,
    }

    #[derive(Serialize, Deserialize)]
    pub struct SetActiveDescriptor {
        pub account_id: u64,
        pub active: bool,
    }
}
