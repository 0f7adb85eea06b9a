use axum::{body::Bytes, Json};
use tracing::{info, warn};

use super::{verify, Account, Error as AccountError};
use crate::{config, Auth, Error};

use certportal_shared::account::handle::*;

/// Register an account.
///
/// Url: `/api/account/register`
///
/// Response body: `{ "account_id": _ }`.
pub async fn register(
    Json(descriptor): Json<RegisterDescriptor>,
) -> Result<Json<RegisterResult>, Error> {
    let account = Account::new(&descriptor)?;
    let account_id = account.id;
    let role = account.role;
    super::INSTANCE.push(account)?;

    info!(
        "account registered: {} (id: {account_id}, role: {})",
        descriptor.email,
        role.label()
    );
    Ok(Json(RegisterResult { account_id }))
}

/// Login to an account.
///
/// Url: `/api/account/login`
pub async fn login(Json(descriptor): Json<LoginDescriptor>) -> Result<Json<LoginResult>, Error> {
    let account_id = super::INSTANCE
        .find_by_email(&descriptor.email)
        .ok_or(Error::UsernameOrPasswordIncorrect)?;

    let token = super::INSTANCE
        .get_mut(account_id, |account| {
            let token = account.login(&descriptor.password)?;
            account.save();
            Ok::<_, AccountError>(token)
        })
        .ok_or(Error::UsernameOrPasswordIncorrect)?
        .map_err(|err| {
            warn!("rejected login of {}: {err}", descriptor.email);
            match err {
                AccountError::PasswordIncorrect => Error::UsernameOrPasswordIncorrect,
                err => err.into(),
            }
        })?;

    info!("account {} (id: {account_id}) logged in", descriptor.email);
    Ok(Json(LoginResult { account_id, token }))
}

/// Logout from an account with the requesting token.
///
/// Url: `/api/account/logout`
pub async fn logout(auth: Auth) -> Result<(), Error> {
    super::INSTANCE
        .get_mut(auth.account, |account| {
            account.logout(&auth.token)?;
            account.save();
            Ok::<_, AccountError>(())
        })
        .ok_or(Error::TargetAccountNotFound(auth.account))??;
    Ok(())
}

/// Get details of the requesting account.
///
/// Url: `/api/account/view`
pub async fn view(auth: Auth) -> Result<Json<ViewAccountResult>, Error> {
    super::INSTANCE
        .get(auth.account, Account::view)
        .map(Json)
        .ok_or(Error::TargetAccountNotFound(auth.account))
}

/// Edit metadata of the requesting account.
///
/// Either every variant applies or none does.
///
/// Url: `/api/account/edit`
pub async fn edit(
    auth: Auth,
    Json(descriptor): Json<EditAccountDescriptor>,
) -> Result<(), Error> {
    super::INSTANCE
        .get_mut(auth.account, |account| {
            let mut metadata = account.metadata.clone();
            let mut password_sha = account.password_sha.clone();
            for variant in descriptor.variants {
                apply_edit_variant(variant, &mut metadata, &mut password_sha)?;
            }
            account.metadata = metadata;
            account.password_sha = password_sha;
            account.save();
            Ok::<_, AccountError>(())
        })
        .ok_or(Error::TargetAccountNotFound(auth.account))??;
    Ok(())
}

fn apply_edit_variant(
    variant: EditAccountVariant,
    metadata: &mut super::UserMetadata,
    password_sha: &mut String,
) -> Result<(), AccountError> {
    match variant {
        EditAccountVariant::Name(name) => {
            let name = name.trim();
            if name.chars().count() < super::NAME_MIN_LEN {
                return Err(AccountError::NameTooShort);
            }
            metadata.name = name.to_owned();
        }
        EditAccountVariant::Phone(phone) => {
            metadata.phone = match phone.map(|p| p.trim().to_owned()) {
                Some(p) if p.is_empty() => None,
                Some(p) if !super::is_valid_phone(&p) => return Err(AccountError::InvalidPhone(p)),
                p => p,
            }
        }
        EditAccountVariant::Bio(bio) => {
            metadata.bio = bio.map(|b| b.trim().to_owned()).filter(|b| !b.is_empty())
        }
        EditAccountVariant::Password { old, new } => {
            if verify::digest_password(&old) != *password_sha {
                return Err(AccountError::PasswordIncorrect);
            }
            if new.is_empty() {
                return Err(AccountError::EmptyPassword);
            }
            *password_sha = verify::digest_password(&new);
        }
        EditAccountVariant::RemoveAvatar => metadata.avatar = None,
    }
    Ok(())
}

/// Upload an avatar, stored cover-cropped as a square JPEG.
///
/// Url: `/api/account/avatar`
///
/// Request body: Image bytes, JPEG, PNG or WebP.
pub async fn upload_avatar(auth: Auth, body: Bytes) -> Result<Json<AvatarResult>, Error> {
    let config = &*config::INSTANCE;
    if body.len() > config.max_avatar_upload {
        return Err(Error::PayloadTooLarge {
            size: body.len(),
            max: config.max_avatar_upload,
        });
    }

    let size = config.avatar_size;
    let avatar = tokio::task::spawn_blocking(move || super::resize_avatar(&body, size))
        .await
        .map_err(|err| {
            tracing::error!("avatar resizing task failed: {err}");
            Error::Account(AccountError::AvatarFormat)
        })??;

    super::INSTANCE
        .get_mut(auth.account, |account| {
            account.metadata.avatar = Some(avatar.clone());
            account.save();
        })
        .ok_or(Error::TargetAccountNotFound(auth.account))?;

    Ok(Json(AvatarResult { avatar }))
}

/// Manage accounts for admins.
pub mod manage {
    use axum::{response::Response, Json};
    use certportal_shared::report::{csv, Paginator};
    use tracing::info;

    use crate::account::{Account, Error as AccountError, INSTANCE};
    use crate::{config, Auth, Error};

    use certportal_shared::account::handle::manage::*;

    /// Views accounts passing the role and search filters, in registration order.
    fn filtered(descriptor: &ListAccountsDescriptor) -> Vec<super::ViewAccountResult> {
        let needle = descriptor.search.trim().to_lowercase();
        INSTANCE.views(|account| {
            descriptor.role.map_or(true, |role| account.role == role)
                && (needle.is_empty() || account.matches(&needle))
        })
    }

    /// List accounts page by page.
    ///
    /// Url: `/api/account/manage/list`
    pub async fn list(
        auth: Auth,
        Json(descriptor): Json<ListAccountsDescriptor>,
    ) -> Result<Json<ListAccountsResult>, Error> {
        auth.validate_admin()?;

        let accounts = filtered(&descriptor);
        let paginator = Paginator::new(config::INSTANCE.page_size);
        let page = paginator.clamp(descriptor.page, accounts.len());
        Ok(Json(ListAccountsResult {
            page_count: paginator.page_count(accounts.len()),
            accounts: paginator.page(&accounts, page).to_vec(),
        }))
    }

    /// View an account with its certificate count.
    ///
    /// Url: `/api/account/manage/view`
    pub async fn view(
        auth: Auth,
        Json(TargetAccountDescriptor { account_id }): Json<TargetAccountDescriptor>,
    ) -> Result<Json<ViewAccountResult>, Error> {
        auth.validate_admin()?;

        let account = INSTANCE
            .get(account_id, Account::view)
            .ok_or(Error::TargetAccountNotFound(account_id))?;
        Ok(Json(ViewAccountResult {
            account,
            certificates: crate::certificate::INSTANCE.count(account_id),
        }))
    }

    /// Change the role of an account.
    ///
    /// Url: `/api/account/manage/set-role`
    pub async fn set_role(
        auth: Auth,
        Json(SetRoleDescriptor { account_id, role }): Json<SetRoleDescriptor>,
    ) -> Result<(), Error> {
        auth.validate_admin()?;
        if account_id == auth.account && !role.is_admin() {
            return Err(AccountError::SelfModification.into());
        }

        INSTANCE
            .get_mut(account_id, |account| {
                account.role = role;
                account.save();
            })
            .ok_or(Error::TargetAccountNotFound(account_id))?;

        info!(
            "role of account {account_id} set to {} by {}",
            role.label(),
            auth.account
        );
        Ok(())
    }

    /// Activate or deactivate an account.
    /// Deactivating drops every token of the account.
    ///
    /// Url: `/api/account/manage/set-active`
    pub async fn set_active(
        auth: Auth,
        Json(SetActiveDescriptor { account_id, active }): Json<SetActiveDescriptor>,
    ) -> Result<(), Error> {
        auth.validate_admin()?;
        if account_id == auth.account && !active {
            return Err(AccountError::SelfModification.into());
        }

        INSTANCE
            .get_mut(account_id, |account| {
                account.active = active;
                if !active {
                    account.tokens.clear();
                }
                account.save();
            })
            .ok_or(Error::TargetAccountNotFound(account_id))?;

        info!(
            "account {account_id} {} by {}",
            if active { "activated" } else { "deactivated" },
            auth.account
        );
        Ok(())
    }

    /// Remove an account along with its certificates and uploads.
    ///
    /// Url: `/api/account/manage/remove`
    pub async fn remove(
        auth: Auth,
        Json(TargetAccountDescriptor { account_id }): Json<TargetAccountDescriptor>,
    ) -> Result<(), Error> {
        auth.validate_admin()?;
        if account_id == auth.account {
            return Err(AccountError::SelfModification.into());
        }

        if !INSTANCE.remove(account_id) {
            return Err(Error::TargetAccountNotFound(account_id));
        }
        let certificates = crate::certificate::INSTANCE.remove_owner(account_id);
        let uploads = crate::upload::INSTANCE.remove_owner(account_id);

        info!(
            "account {account_id} removed by {} with {certificates} certificates and {uploads} uploads",
            auth.account
        );
        Ok(())
    }

    /// Export accounts passing the filters as CSV, ignoring the page.
    ///
    /// Url: `/api/account/manage/export`
    pub async fn export(
        auth: Auth,
        Json(descriptor): Json<ListAccountsDescriptor>,
    ) -> Result<Response, Error> {
        auth.validate_admin()?;
        Ok(crate::report::handle::csv_response(
            &csv::account_table(&filtered(&descriptor)),
            "usuarios.csv",
        ))
    }
}
