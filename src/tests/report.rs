use super::*;

use axum::http::StatusCode;
use certportal_shared::{
    certificate::{CertificateKind, Department, SemesterTerm},
    report::{handle::ReportResult, LabelCount},
};
use serde_json::json;
use serial_test::serial;

/// Inserts certificate A, B and C: two engineering ones in 2023 and one of
/// a free-text department in 2024.
fn insert_example(owner: u64) {
    let mut a = super::certificate::descriptor("A");
    a.meta.kind = CertificateKind::Diploma;
    a.meta.department = Department::Engineering;

    let mut b = super::certificate::descriptor("B");
    b.meta.kind = CertificateKind::RefresherCourse;
    b.meta.department = Department::Engineering;
    b.meta.semester_term = SemesterTerm::SecondHalf;
    b.meta.issuer = Some("Facultad de Ingeniería".to_owned());

    let mut c = super::certificate::descriptor("C");
    c.meta.kind = CertificateKind::Diploma;
    c.meta.department = Department::Other;
    c.meta.department_other = Some("Biología".to_owned());
    c.meta.year = 2024;

    for descriptor in [a, b, c] {
        let certificate = crate::certificate::build(owner, descriptor).unwrap();
        crate::certificate::INSTANCE.insert(certificate);
    }
}

fn count(label: &str, count: usize) -> LabelCount {
    LabelCount {
        label: label.to_owned(),
        count,
    }
}

#[serial]
#[tokio::test]
async fn report_over_every_certificate() {
    reset_all();

    let owner = push_account("laura", Role::Faculty, "password");
    let viewer = push_account("pedro", Role::Student, "password");
    insert_example(owner.account_id);

    let response = post_json("/api/report/get", Some(&viewer), &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report: ReportResult = body_json(response).await;

    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.departments, 2);
    assert_eq!(report.summary.year_range, "2023–2024");
    assert_eq!(
        report.by_department,
        vec![count("Ingeniería", 2), count("Biología", 1)]
    );
    assert_eq!(
        report.by_type,
        vec![count("Diplomado", 2), count("Curso de actualización", 1)]
    );
    assert_eq!(report.table.page_count, 1);
    assert_eq!(report.table.items.len(), 3);

    let c = report.table.items.iter().find(|r| r.title == "C").unwrap();
    assert_eq!(c.department, "Otro (Biología)");
    assert_eq!(c.issuer, "—");
    let b = report.table.items.iter().find(|r| r.title == "B").unwrap();
    assert_eq!(b.semester, "Jul–Dic");
    assert_eq!(b.issuer, "Facultad de Ingeniería");
    assert_eq!(b.owner, owner.account_id);

    assert_eq!(
        post_json("/api/report/get", None, &json!({}))
            .await
            .status(),
        StatusCode::UNAUTHORIZED
    );
}

#[serial]
#[tokio::test]
async fn report_facets() {
    reset_all();

    let owner = push_account("laura", Role::Faculty, "password");
    insert_example(owner.account_id);

    let response = post_json(
        "/api/report/get",
        Some(&owner),
        &json!({
            "selection": {
                "department": "ingenieria",
                "year": "2023",
                "type": "all",
                "semesterTerm": "",
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report: ReportResult = body_json(response).await;
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.departments, 1);
    assert_eq!(report.summary.year_range, "2023–2023");

    let response = post_json(
        "/api/report/get",
        Some(&owner),
        &json!({ "selection": { "year": 2030 } }),
    )
    .await;
    let report: ReportResult = body_json(response).await;
    assert_eq!(report.summary.total, 0);
    assert_eq!(report.summary.departments, 0);
    assert_eq!(report.summary.year_range, "—");
    assert!(report.by_department.is_empty());
    assert_eq!(report.table.page_count, 0);
    assert!(report.table.items.is_empty());

    assert_eq!(
        post_json(
            "/api/report/get",
            Some(&owner),
            &json!({ "selection": { "department": "astronomia" } }),
        )
        .await
        .status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[serial]
#[tokio::test]
async fn report_pages() {
    reset_all();

    let owner = push_account("laura", Role::Faculty, "password");
    let page_size = crate::config::INSTANCE.page_size;
    for i in 0..page_size + 5 {
        let certificate = crate::certificate::build(
            owner.account_id,
            super::certificate::descriptor(&format!("Constancia {i}")),
        )
        .unwrap();
        crate::certificate::INSTANCE.insert(certificate);
    }

    let response = post_json("/api/report/get", Some(&owner), &json!({ "page": 1 })).await;
    let report: ReportResult = body_json(response).await;
    assert_eq!(report.table.index, 1);
    assert_eq!(report.table.page_count, 2);
    assert_eq!(report.table.total, page_size + 5);
    assert_eq!(report.table.items.len(), 5);
    assert_eq!(report.summary.total, page_size + 5);

    // Out of range pages are clamped to the last one
    let response = post_json("/api/report/get", Some(&owner), &json!({ "page": 9 })).await;
    let report: ReportResult = body_json(response).await;
    assert_eq!(report.table.index, 1);
    assert_eq!(report.table.items.len(), 5);
}

#[serial]
#[tokio::test]
async fn export_certificates() {
    reset_all();

    let owner = push_account("laura", Role::Faculty, "password");
    insert_example(owner.account_id);

    let response = post_json(
        "/api/report/export",
        Some(&owner),
        &json!({ "selection": { "year": 2024 }, "page": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[http::header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[http::header::CONTENT_DISPOSITION],
        "attachment; filename=\"certificados.csv\""
    );

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.starts_with('\u{FEFF}'));
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(r#""Título","Tipo","Departamento""#));
    assert!(lines[1].starts_with(r#""C","Diplomado","Biología","2024","Ene–Jun""#));

    // Nothing matches
    let response = post_json(
        "/api/report/export",
        Some(&owner),
        &json!({ "selection": { "year": 2001 } }),
    )
    .await;
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body.lines().count(), 1);
}
