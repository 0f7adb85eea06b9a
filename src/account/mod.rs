pub mod handle;
pub mod verify;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::DerefMut;

use crate::config;
use certportal_shared::account::handle::{RegisterDescriptor, ViewAccountResult};

pub use certportal_shared::account::*;

/// The static instance of accounts.
pub static INSTANCE: Lazy<AccountManager> = Lazy::new(AccountManager::new);

/// Minimum length of an account name, in characters.
pub const NAME_MIN_LEN: usize = 2;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("email domain \"{0}\" is not allowed")]
    EmailDomain(String),
    #[error("account with email {0} already registered")]
    Registered(lettre::Address),
    #[error("name should have at least {NAME_MIN_LEN} characters")]
    NameTooShort,
    #[error("password couldn't be empty")]
    EmptyPassword,
    #[error("invalid phone number \"{0}\"")]
    InvalidPhone(String),
    #[error("password incorrect")]
    PasswordIncorrect,
    #[error("token incorrect")]
    TokenIncorrect,
    #[error("account is inactive")]
    Inactive,
    #[error("administrators couldn't demote or deactivate themselves")]
    SelfModification,
    #[error("unsupported avatar format")]
    AvatarFormat,
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::EmailDomain(_)
            | Error::NameTooShort
            | Error::EmptyPassword
            | Error::InvalidPhone(_)
            | Error::AvatarFormat => StatusCode::BAD_REQUEST,
            Error::Registered(_) => StatusCode::CONFLICT,
            Error::TokenIncorrect => StatusCode::UNAUTHORIZED,
            Error::PasswordIncorrect | Error::Inactive | Error::SelfModification => {
                StatusCode::FORBIDDEN
            }
        }
    }
}

/// A registered account.
#[derive(Serialize, Deserialize, Debug)]
pub struct Account {
    /// Identifier of this account.
    pub id: u64,
    pub metadata: UserMetadata,
    #[serde(default)]
    pub role: Role,
    /// Inactive accounts couldn't log in.
    pub active: bool,
    /// The registration time of this account.
    pub registration_time: DateTime<Utc>,
    /// Digest of this account's password.
    pub password_sha: String,
    /// This account's token manager.
    #[serde(default)]
    pub tokens: verify::Tokens,
}

impl Account {
    /// Creates an account from a registration.
    ///
    /// The account is an admin if its email is listed in the config,
    /// a guest otherwise.
    pub fn new(descriptor: &RegisterDescriptor) -> Result<Self, Error> {
        let config = &*config::INSTANCE;
        if !config.is_allowed_email(&descriptor.email) {
            return Err(Error::EmailDomain(descriptor.email.domain().to_owned()));
        }
        let name = descriptor.name.trim();
        if name.chars().count() < NAME_MIN_LEN {
            return Err(Error::NameTooShort);
        }
        if descriptor.password.is_empty() {
            return Err(Error::EmptyPassword);
        }

        Ok(Self {
            // Ids stay below 2^53 so they survive TOML and JSON numbers.
            id: rand::thread_rng().gen_range(1..(1 << 53)),
            metadata: UserMetadata {
                email: descriptor.email.clone(),
                name: name.to_owned(),
                phone: None,
                bio: None,
                avatar: None,
            },
            role: if config.admins.contains(&descriptor.email) {
                Role::Admin
            } else {
                Role::default()
            },
            active: true,
            registration_time: Utc::now(),
            password_sha: verify::digest_password(&descriptor.password),
            tokens: verify::Tokens::new(),
        })
    }

    #[inline]
    pub fn email(&self) -> &lettre::Address {
        &self.metadata.email
    }

    /// Login into the account and return back a token in a `Result`.
    pub fn login(&mut self, password: &str) -> Result<String, Error> {
        if verify::digest_password(password) != self.password_sha {
            return Err(Error::PasswordIncorrect);
        }
        if !self.active {
            return Err(Error::Inactive);
        }
        Ok(self
            .tokens
            .new_token(self.id, config::INSTANCE.token_expire_days))
    }

    /// Logout this account with the target token.
    pub fn logout(&mut self, token: &str) -> Result<(), Error> {
        if self.tokens.remove(token) {
            Ok(())
        } else {
            Err(Error::TokenIncorrect)
        }
    }

    /// Describes this account for the wire.
    pub fn view(&self) -> ViewAccountResult {
        ViewAccountResult {
            id: self.id,
            metadata: self.metadata.clone(),
            role: self.role,
            active: self.active,
            registration_time: self.registration_time,
        }
    }

    /// Whether the name or email contains `needle`, which should be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.metadata.name.to_lowercase().contains(needle)
            || self.email().to_string().to_lowercase().contains(needle)
    }

    /// Save this account in the background.
    pub fn save(&self) {
        #[cfg(not(test))]
        {
            let id = self.id;
            let data = match toml::to_string(self) {
                Ok(data) => data,
                Err(err) => {
                    tracing::error!("failed to serialize account {id}: {err}");
                    return;
                }
            };

            tokio::spawn(async move {
                if let Err(err) = tokio::fs::write(format!("./data/accounts/{id}.toml"), data).await
                {
                    tracing::error!("failed to save account {id}: {err}");
                }
            });
        }
    }

    /// Remove this account from filesystem in the background.
    pub fn remove(&self) {
        #[cfg(not(test))]
        {
            let id = self.id;
            tokio::spawn(async move {
                if let Err(err) = tokio::fs::remove_file(format!("./data/accounts/{id}.toml")).await
                {
                    tracing::error!("failed to remove account {id}: {err}");
                }
            });
        }
    }
}

/// Cover-crops an uploaded image into a square JPEG data url.
pub fn resize_avatar(bytes: &[u8], size: u32) -> Result<String, crate::Error> {
    use image::ImageFormat;

    let format = image::guess_format(bytes).map_err(|_| Error::AvatarFormat)?;
    if !matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP
    ) {
        return Err(Error::AvatarFormat.into());
    }

    let image = image::load_from_memory_with_format(bytes, format)?
        .resize_to_fill(size, size, image::imageops::FilterType::Lanczos3);
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image.to_rgb8())
        .write_to(&mut buf, image::ImageOutputFormat::Jpeg(80))?;

    Ok(crate::certificate::file::encode(
        mime::IMAGE_JPEG.as_ref(),
        buf.get_ref(),
    ))
}

/// A simple account manager.
pub struct AccountManager {
    accounts: RwLock<Vec<RwLock<Account>>>,
    /// An index cache for getting index from an id.
    index: DashMap<u64, usize>,
}

impl AccountManager {
    /// Read and create an account manager from `./data/accounts`.
    pub fn new() -> Self {
        #[cfg(not(test))]
        {
            let this = Self {
                accounts: RwLock::new(load_accounts()),
                index: DashMap::new(),
            };
            this.update_index();
            this
        }

        #[cfg(test)]
        Self {
            accounts: RwLock::new(Vec::new()),
            index: DashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Update index cache of this instance.
    pub fn update_index(&self) {
        let accounts = self.accounts.read();
        self.index.clear();
        for (i, account) in accounts.iter().enumerate() {
            self.index.insert(account.read().id, i);
        }
    }

    /// Runs `f` on the target account.
    pub fn get<R>(&self, id: u64, f: impl FnOnce(&Account) -> R) -> Option<R> {
        // The index only changes under the write lock of `accounts`.
        let accounts = self.accounts.read();
        let index = *self.index.get(&id)?;
        let account = accounts.get(index)?.read();
        (account.id == id).then(|| f(&account))
    }

    /// Runs `f` on the target account mutably.
    pub fn get_mut<R>(&self, id: u64, f: impl FnOnce(&mut Account) -> R) -> Option<R> {
        let accounts = self.accounts.read();
        let index = *self.index.get(&id)?;
        let mut account = accounts.get(index)?.write();
        if account.id != id {
            return None;
        }
        Some(f(account.deref_mut()))
    }

    /// Finds the id of the account with the given email.
    pub fn find_by_email(&self, email: &lettre::Address) -> Option<u64> {
        self.accounts
            .read()
            .iter()
            .map(|a| a.read())
            .find(|a| a.email() == email)
            .map(|a| a.id)
    }

    /// Views every account passing `filter`, in registration order.
    pub fn views(&self, mut filter: impl FnMut(&Account) -> bool) -> Vec<ViewAccountResult> {
        let mut views: Vec<_> = self
            .accounts
            .read()
            .iter()
            .map(|a| a.read())
            .filter(|a| filter(a))
            .map(|a| a.view())
            .collect();
        views.sort_by_key(|v| (v.registration_time, v.id));
        views
    }

    /// Adds an account to this instance.
    ///
    /// # Errors
    ///
    /// - Errors if the email is already registered.
    pub fn push(&self, account: Account) -> Result<(), Error> {
        let mut accounts = self.accounts.write();
        if accounts.iter().any(|a| a.read().email() == account.email()) {
            return Err(Error::Registered(account.email().clone()));
        }
        self.index.insert(account.id, accounts.len());
        account.save();
        accounts.push(RwLock::new(account));
        Ok(())
    }

    /// Remove expired tokens of every account.
    pub fn refresh_all(&self) {
        for account in self.accounts.read().iter() {
            account.write().tokens.refresh();
        }
    }

    /// Remove target account, returning whether it existed.
    ///
    /// Only the index entries of the accounts after the removed one
    /// are rewritten.
    pub fn remove(&self, id: u64) -> bool {
        let mut accounts = self.accounts.write();
        let Some(index) = self.index.get(&id).map(|e| *e) else {
            return false;
        };
        if accounts.get(index).map_or(true, |a| a.read().id != id) {
            return false;
        }

        accounts.remove(index).read().remove();
        self.index.remove(&id);
        for (i, account) in accounts.iter().enumerate().skip(index) {
            self.index.insert(account.read().id, i);
        }
        true
    }

    #[cfg(test)]
    pub fn reset(&self) {
        *self.accounts.write().deref_mut() = Vec::new();
        self.index.clear()
    }
}

impl Default for AccountManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(test))]
fn load_accounts() -> Vec<RwLock<Account>> {
    const DIR: &str = "./data/accounts";

    let dir = match std::fs::read_dir(DIR) {
        Ok(dir) => dir,
        Err(err) => {
            tracing::warn!("failed to read {DIR}: {err}");
            if let Err(err) = std::fs::create_dir_all(DIR) {
                tracing::error!("failed to create {DIR}: {err}");
            }
            return Vec::new();
        }
    };

    dir.filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            match std::fs::read_to_string(&path)
                .map_err(|err| err.to_string())
                .and_then(|s| toml::from_str::<Account>(&s).map_err(|err| err.to_string()))
            {
                Ok(account) => Some(RwLock::new(account)),
                Err(err) => {
                    tracing::error!("failed to load account from {}: {err}", path.display());
                    None
                }
            }
        })
        .collect()
}
