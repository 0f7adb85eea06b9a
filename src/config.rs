use once_cell::sync::Lazy;
use serde::Deserialize;
use std::net::SocketAddr;

/// The static config instance.
pub static INSTANCE: Lazy<Config> = Lazy::new(|| {
    #[cfg(not(test))]
    {
        const PATH: &str = "./data/config.toml";

        match std::fs::read_to_string(PATH)
            .map_err(|err| err.to_string())
            .and_then(|s| toml::from_str(&s).map_err(|err| err.to_string()))
        {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("failed to load {PATH}, falling back to defaults: {err}");
                Config::default()
            }
        }
    }

    #[cfg(test)]
    Config::default()
});

/// Describing the server configuration.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,
    /// Email domains allowed to register.
    pub email_domains: Vec<String>,
    /// Emails registering as administrators.
    pub admins: Vec<lettre::Address>,
    /// Maximum decoded size of a certificate file in bytes.
    pub max_file_size: u64,
    /// Maximum decoded size of a supporting upload in bytes.
    pub max_upload_size: u64,
    /// Maximum size of an uploaded avatar before resizing.
    pub max_avatar_upload: usize,
    /// Edge length of stored avatars in pixels.
    pub avatar_size: u32,
    /// Rows per page of report tables and account lists.
    pub page_size: usize,
    /// The expiration time of a token in days.
    /// `0` means never expire.
    pub token_expire_days: u16,
}

impl Config {
    /// Whether the email belongs to an allowed domain.
    pub fn is_allowed_email(&self, email: &lettre::Address) -> bool {
        self.email_domains
            .iter()
            .any(|domain| email.domain().eq_ignore_ascii_case(domain))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            email_domains: vec!["uabc.edu.mx".to_owned(), "uabc.mx".to_owned()],
            admins: Vec::new(),
            max_file_size: 943_718,
            max_upload_size: 1024 * 1024,
            max_avatar_upload: 5 * 1024 * 1024,
            avatar_size: 256,
            page_size: certportal_shared::report::Paginator::DEFAULT_PAGE_SIZE,
            token_expire_days: 0,
        }
    }
}
