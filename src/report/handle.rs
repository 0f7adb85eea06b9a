use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use certportal_shared::report::{
    self,
    csv::{self, CsvTable},
    handle::{ReportDescriptor, ReportResult, ReportRow},
    Paginator,
};

use crate::{certificate, config, Auth, Error};

/// Wraps a table into a CSV download.
pub(crate) fn csv_response(table: &CsvTable, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        table.render(),
    )
        .into_response()
}

/// Build a report page over every certificate.
///
/// Url: `/api/report/get`
///
/// Request body: See [`ReportDescriptor`].
///
/// Response body: KPIs, both groupings and the requested table page,
/// all computed from the filtered certificates.
pub async fn get(
    auth: Auth,
    Json(ReportDescriptor { selection, page }): Json<ReportDescriptor>,
) -> Result<Json<ReportResult>, Error> {
    auth.validate()?;

    let infos = certificate::INSTANCE.infos(None);
    let paginator = Paginator::new(config::INSTANCE.page_size);
    Ok(Json(
        report::build(&infos, &selection, paginator, page).map_rows(ReportRow::from),
    ))
}

/// Export every filtered certificate as CSV, ignoring the page.
///
/// Url: `/api/report/export`
pub async fn export(
    auth: Auth,
    Json(ReportDescriptor { selection, .. }): Json<ReportDescriptor>,
) -> Result<Response, Error> {
    auth.validate()?;

    let infos = certificate::INSTANCE.infos(None);
    let filtered = report::filter(&infos, &selection);
    tracing::debug!(
        "exporting {} of {} certificates",
        filtered.len(),
        infos.len()
    );
    Ok(csv_response(
        &csv::certificate_table(&filtered),
        "certificados.csv",
    ))
}
