//! Typed calls to the certificate portal backend.
//!
//! Every endpoint is a [`Request`] sent with [`call`]:
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use certportal_client::{call, raw::account::Login, Context};
//!
//! let cx = Context::new("http://127.0.0.1:8080");
//! let session = call(
//!     Login {
//!         email: "laura@uabc.mx".to_owned(),
//!         password: "password".to_owned(),
//!     },
//!     &cx,
//! )
//! .await?;
//! # let _ = session;
//! # Ok(())
//! # }
//! ```

pub mod raw;

pub use certportal_shared as shared;
pub use raw::{call, Request, ResponseError};

/// Where requests are sent to.
#[derive(Debug, Clone)]
pub struct Context {
    pub req_client: reqwest::Client,
    /// Scheme and authority of the backend, without a trailing slash.
    pub url_prefix: String,
}

impl Context {
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            req_client: reqwest::Client::new(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_owned(),
        }
    }
}

/// A logged in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_id: u64,
    pub token: String,
}

impl Session {
    /// Auth headers of this session.
    pub fn headers(&self) -> anyhow::Result<reqwest::header::HeaderMap> {
        let mut map = reqwest::header::HeaderMap::new();
        map.insert("Token", self.token.parse()?);
        map.insert("AccountId", self.account_id.into());
        Ok(map)
    }
}
