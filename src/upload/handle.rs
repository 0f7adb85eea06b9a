use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use certportal_shared::upload::{self, handle::*};
use tracing::info;

use crate::{Auth, Error};

/// Upload a file owned by the requesting account.
///
/// Url: `/api/upload/create`
///
/// Request body: See [`UploadDescriptor`].
///
/// Response body: `{ "upload_id": _ }`.
pub async fn create(
    auth: Auth,
    Json(descriptor): Json<UploadDescriptor>,
) -> Result<Json<CreateUploadResult>, Error> {
    let upload = super::build(auth.account, descriptor)?;
    let upload_id = upload.id;
    info!(
        "upload {upload_id} ({}, {}) created by {}",
        upload.file.file_name,
        upload.category.label(),
        auth.account
    );
    super::INSTANCE.insert(upload);
    Ok(Json(CreateUploadResult { upload_id }))
}

/// List uploads of the requesting account, newest first.
///
/// Url: `/api/upload/get`
pub async fn get(
    auth: Auth,
    Json(GetUploadsDescriptor { filter }): Json<GetUploadsDescriptor>,
) -> Result<Json<GetUploadsResult>, Error> {
    let infos = super::INSTANCE.infos(auth.account);
    Ok(Json(GetUploadsResult {
        uploads: upload::filter(&infos, &filter)
            .into_iter()
            .cloned()
            .collect(),
    }))
}

/// Get an uploaded file as raw bytes, with its content type.
///
/// Url: `/api/upload/get-file`
pub async fn get_file(
    auth: Auth,
    Json(TargetUploadDescriptor { id }): Json<TargetUploadDescriptor>,
) -> Result<Response, Error> {
    let (content_type, data) = super::INSTANCE
        .get(auth.account, id, |u| {
            (u.file.content_type.clone(), u.file.data.clone())
        })
        .ok_or(Error::UploadNotFound(id))?;
    let (_, bytes) = crate::certificate::file::decode(&data, u64::MAX)?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Remove an upload of the requesting account.
///
/// Url: `/api/upload/remove`
pub async fn remove(
    auth: Auth,
    Json(TargetUploadDescriptor { id }): Json<TargetUploadDescriptor>,
) -> Result<(), Error> {
    super::INSTANCE
        .remove(auth.account, id)
        .ok_or(Error::UploadNotFound(id))?;

    info!("upload {id} removed by {}", auth.account);
    Ok(())
}
