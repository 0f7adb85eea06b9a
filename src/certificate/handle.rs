use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use certportal_shared::{
    account::Role,
    certificate::{handle::*, Certificate},
    report,
};
use tracing::info;

use crate::{config, Auth, Error};

/// Validates the requester as the owner of the target or an admin,
/// returning the requester's role.
fn authorize(auth: &Auth, owner: u64) -> Result<Role, Error> {
    let role = auth.validate()?;
    if owner == auth.account || role.is_admin() {
        Ok(role)
    } else {
        Err(Error::PermissionDenied)
    }
}

/// Create a certificate owned by the requesting account.
///
/// Url: `/api/certificate/create`
///
/// Request body: See [`CertificateDescriptor`].
///
/// Response body: `{ "certificate_id": _ }`.
pub async fn create(
    auth: Auth,
    Json(descriptor): Json<CertificateDescriptor>,
) -> Result<Json<CreateCertificateResult>, Error> {
    let certificate = super::build(auth.account, descriptor)?;
    let certificate_id = certificate.id;

    info!(
        "certificate {certificate_id} ({}) created by {}",
        certificate.file.file_name, auth.account
    );
    super::INSTANCE.insert(certificate);
    Ok(Json(CreateCertificateResult { certificate_id }))
}

/// List certificates without their files, filtered by a selection.
///
/// Url: `/api/certificate/get`
pub async fn get(
    auth: Auth,
    Json(descriptor): Json<GetCertificatesDescriptor>,
) -> Result<Json<GetCertificatesResult>, Error> {
    let owner = match descriptor.owner {
        None => Some(auth.account),
        Some(OwnerScope::Account(owner)) => {
            authorize(&auth, owner)?;
            Some(owner)
        }
        Some(OwnerScope::All) => {
            auth.validate_admin()?;
            None
        }
    };

    let infos = super::INSTANCE.infos(owner);
    Ok(Json(GetCertificatesResult {
        certificates: report::filter(&infos, &descriptor.selection)
            .into_iter()
            .cloned()
            .collect(),
    }))
}

/// Get the file of a certificate as raw bytes, with its content type.
///
/// Url: `/api/certificate/get-file`
pub async fn get_file(
    auth: Auth,
    Json(TargetCertificateDescriptor { owner, id }): Json<TargetCertificateDescriptor>,
) -> Result<Response, Error> {
    authorize(&auth, owner)?;

    let (content_type, data) = super::INSTANCE
        .get(owner, id, |c| (c.file.content_type.clone(), c.file.data.clone()))
        .ok_or(Error::CertificateNotFound(id))?;
    let (_, bytes) = super::file::decode(&data, u64::MAX)?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Edit a certificate.
///
/// Owners may edit metadata, admins may also replace the file.
/// Either every variant applies or none does.
///
/// Url: `/api/certificate/edit`
pub async fn edit(
    auth: Auth,
    Json(EditCertificateDescriptor {
        owner,
        id,
        variants,
    }): Json<EditCertificateDescriptor>,
) -> Result<(), Error> {
    let role = authorize(&auth, owner)?;

    super::INSTANCE
        .get_mut(owner, id, |certificate| {
            let mut edited = certificate.clone();
            for variant in variants {
                apply_edit_variant(variant, &mut edited, role)?;
            }
            edited.meta.normalize();
            edited.validate(config::INSTANCE.max_file_size)?;
            edited.updated_at = chrono::Utc::now();

            *certificate = edited;
            // Saved while the owner's certificates are locked, so a
            // concurrent removal is always written after this.
            super::save_certificate(certificate);
            Ok::<_, Error>(())
        })
        .ok_or(Error::CertificateNotFound(id))??;

    info!("certificate {id} of {owner} edited by {}", auth.account);
    Ok(())
}

fn apply_edit_variant(
    variant: EditCertificateVariant,
    certificate: &mut Certificate,
    role: Role,
) -> Result<(), Error> {
    match variant {
        EditCertificateVariant::Meta(meta) => certificate.meta = meta,
        EditCertificateVariant::Title(title) => certificate.meta.title = title,
        EditCertificateVariant::Description(description) => {
            certificate.meta.description = description
        }
        EditCertificateVariant::Issuer(issuer) => certificate.meta.issuer = issuer,
        EditCertificateVariant::File(descriptor) => {
            if !role.is_admin() {
                return Err(Error::PermissionDenied);
            }
            certificate.file = super::file::load(descriptor, config::INSTANCE.max_file_size)?;
        }
    }
    Ok(())
}

/// Remove a certificate.
///
/// Url: `/api/certificate/remove`
pub async fn remove(
    auth: Auth,
    Json(TargetCertificateDescriptor { owner, id }): Json<TargetCertificateDescriptor>,
) -> Result<(), Error> {
    authorize(&auth, owner)?;
    super::INSTANCE
        .remove(owner, id)
        .ok_or(Error::CertificateNotFound(id))?;

    info!("certificate {id} of {owner} removed by {}", auth.account);
    Ok(())
}
