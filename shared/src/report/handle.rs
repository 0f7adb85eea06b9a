use serde::{Deserialize, Serialize};

use super::{FacetSelection, LabelCount, Page, Record, Summary};
use crate::certificate::{CertificateInfo, CertificateKind, Department};

#[derive(Serialize, Deserialize, Default)]
pub struct ReportDescriptor {
    #[serde(default)]
    pub selection: FacetSelection,
    /// Zero-based, clamped into the available pages.
    #[serde(default)]
    pub page: usize,
}

/// One line of the report table, with display labels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: u64,
    pub owner: u64,
    pub title: String,
    pub kind: String,
    pub department: String,
    pub year: i32,
    pub semester: String,
    /// `—` when the certificate has no issuer.
    pub issuer: String,
}

impl From<&CertificateInfo> for ReportRow {
    fn from(info: &CertificateInfo) -> Self {
        let meta = info.meta();
        Self {
            id: info.id,
            owner: info.owner,
            title: meta.title.clone(),
            kind: display(
                meta.kind.label(),
                meta.type_other
                    .as_deref()
                    .filter(|_| meta.kind == CertificateKind::Other),
            ),
            department: display(
                meta.department.label(),
                meta.department_other
                    .as_deref()
                    .filter(|_| meta.department == Department::Other),
            ),
            year: meta.year,
            semester: meta.semester_term.label().to_owned(),
            issuer: meta.issuer.clone().unwrap_or_else(|| "—".to_owned()),
        }
    }
}

/// `"Otro (texto)"` for free-text categories, the bare label otherwise.
fn display(label: &str, other: Option<&str>) -> String {
    match other {
        Some(other) if !other.is_empty() => format!("{label} ({other})"),
        _ => label.to_owned(),
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReportResult<R = ReportRow> {
    pub summary: Summary,
    pub by_department: Vec<LabelCount>,
    pub by_type: Vec<LabelCount>,
    pub table: Page<R>,
}

impl<R> ReportResult<R> {
    pub fn map_rows<U>(self, f: impl FnMut(R) -> U) -> ReportResult<U> {
        ReportResult {
            summary: self.summary,
            by_department: self.by_department,
            by_type: self.by_type,
            table: self.table.map(f),
        }
    }
}
