use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use certportal_shared::certificate::InvalidCertificate;
use serde::Serialize;

pub mod config;

pub mod account;
pub mod certificate;
pub mod report;
pub mod upload;

#[cfg(test)]
mod tests;

/// Upper bound of any request body, avatars and file payloads included.
const BODY_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("account error: {0}")]
    Account(account::Error),
    #[error("invalid certificate: {0}")]
    InvalidCertificate(InvalidCertificate),
    #[error("file error: {0}")]
    File(certificate::file::Error),
    #[error("image error: {0}")]
    Image(image::ImageError),

    #[error("permission denied")]
    PermissionDenied,
    #[error("username or password incorrect")]
    UsernameOrPasswordIncorrect,
    #[error("target account {0} not found")]
    TargetAccountNotFound(u64),
    #[error("certificate {0} not found")]
    CertificateNotFound(u64),
    #[error("upload {0} not found")]
    UploadNotFound(u64),
    #[error("payload too large: {size} bytes, max {max}")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("not logged in")]
    NotLoggedIn,
    #[error("non-ascii header value: {0}")]
    HeaderNonAscii(axum::http::header::ToStrError),
    #[error("auth headers are missing or malformed")]
    InvalidAuthHeader,
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::Account(err) => err.to_status_code(),
            Error::InvalidCertificate(InvalidCertificate::FileTooLarge { .. })
            | Error::File(certificate::file::Error::TooLarge { .. })
            | Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::InvalidCertificate(_) | Error::File(_) | Error::Image(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::TargetAccountNotFound(_)
            | Error::CertificateNotFound(_)
            | Error::UploadNotFound(_) => StatusCode::NOT_FOUND,
            Error::NotLoggedIn | Error::UsernameOrPasswordIncorrect => StatusCode::UNAUTHORIZED,
            Error::HeaderNonAscii(_) | Error::InvalidAuthHeader => StatusCode::BAD_REQUEST,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for Error {
    #[inline]
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorInfo {
            error: String,
        }
        (
            self.to_status_code(),
            axum::Json(ErrorInfo {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Implements `From<T>` for [`Error`].
macro_rules! impl_from {
    ($($t:ty => $v:ident),* $(,)?) => {
        $(
            impl From<$t> for $crate::Error {
                #[inline]
                fn from(err: $t) -> Self {
                    Self::$v(err)
                }
            }
        )*
    };
}

impl_from! {
    account::Error => Account,
    InvalidCertificate => InvalidCertificate,
    certificate::file::Error => File,
    image::ImageError => Image,
    axum::http::header::ToStrError => HeaderNonAscii,
}

/// Builds the router serving every endpoint.
pub fn router() -> Router {
    use account::handle as acc;
    use certificate::handle as cert;

    Router::new()
        .route("/api/account/register", post(acc::register))
        .route("/api/account/login", post(acc::login))
        .route("/api/account/logout", post(acc::logout))
        .route("/api/account/view", post(acc::view))
        .route("/api/account/edit", post(acc::edit))
        .route("/api/account/avatar", post(acc::upload_avatar))
        .route("/api/account/manage/list", post(acc::manage::list))
        .route("/api/account/manage/view", post(acc::manage::view))
        .route("/api/account/manage/set-role", post(acc::manage::set_role))
        .route(
            "/api/account/manage/set-active",
            post(acc::manage::set_active),
        )
        .route("/api/account/manage/remove", post(acc::manage::remove))
        .route("/api/account/manage/export", post(acc::manage::export))
        .route("/api/certificate/create", post(cert::create))
        .route("/api/certificate/get", post(cert::get))
        .route("/api/certificate/get-file", post(cert::get_file))
        .route("/api/certificate/edit", post(cert::edit))
        .route("/api/certificate/remove", post(cert::remove))
        .route("/api/report/get", post(report::handle::get))
        .route("/api/report/export", post(report::handle::export))
        .route("/api/upload/create", post(upload::handle::create))
        .route("/api/upload/get", post(upload::handle::get))
        .route("/api/upload/get-file", post(upload::handle::get_file))
        .route("/api/upload/remove", post(upload::handle::remove))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

/// An authenticated account, read from the `AccountId` and `Token` headers.
#[derive(Debug, Clone)]
pub struct Auth {
    /// The only id of the account.
    pub account: u64,
    /// The access token of the account.
    pub token: String,
}

impl Auth {
    /// Checks the token against the account manager,
    /// returning the role of the account.
    ///
    /// # Errors
    ///
    /// - Errors if the account doesn't exist or the token is unusable.
    /// - Errors if the account is inactive.
    pub fn validate(&self) -> Result<certportal_shared::account::Role, Error> {
        account::INSTANCE
            .get_mut(self.account, |account| {
                account.tokens.refresh();
                if !account.tokens.token_usable(&self.token) {
                    return Err(Error::NotLoggedIn);
                }
                if !account.active {
                    return Err(account::Error::Inactive.into());
                }
                Ok(account.role)
            })
            .unwrap_or(Err(Error::NotLoggedIn))
    }

    /// Like [`Self::validate`], but also requires the account to be an admin.
    pub fn validate_admin(&self) -> Result<(), Error> {
        if self.validate()?.is_admin() {
            Ok(())
        } else {
            Err(Error::PermissionDenied)
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = parts
            .headers
            .get("AccountId")
            .ok_or(Error::NotLoggedIn)?
            .to_str()?
            .parse()
            .map_err(|_| Error::InvalidAuthHeader)?;
        let token = parts
            .headers
            .get("Token")
            .ok_or(Error::NotLoggedIn)?
            .to_str()?
            .to_owned();

        let this = Self { account, token };
        this.validate()?;
        Ok(this)
    }
}
