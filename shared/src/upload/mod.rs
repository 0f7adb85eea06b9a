//! Supporting files uploaded by an account, kept apart from certificates.

pub mod handle;

use serde::{Deserialize, Serialize};

use crate::certificate::{labeled_enum, CertificateFile, SemesterTerm};

labeled_enum! {
    /// What an upload is filed as.
    #[derive(Default)]
    UploadCategory {
        #[default]
        General => "general", "General",
        Certificate => "certificate", "Certificado",
    }
}

labeled_enum! {
    /// A tab of the upload listing.
    #[derive(Default)]
    UploadView {
        #[default]
        All => "all", "Todos",
        Certificate => "certificate", "Certificados",
        Images => "images", "Imágenes",
        Pdfs => "pdfs", "PDFs",
    }
}

impl UploadView {
    /// Whether an upload of the category and content type shows in this view.
    pub fn matches(self, category: UploadCategory, content_type: &str) -> bool {
        match self {
            UploadView::All => true,
            UploadView::Certificate => category == UploadCategory::Certificate,
            UploadView::Images => content_type.starts_with("image/"),
            UploadView::Pdfs => content_type == "application/pdf",
        }
    }
}

/// An uploaded file with its optional academic details.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadItem {
    pub id: u64,
    pub owner: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub category: UploadCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester_term: Option<SemesterTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_on: Option<chrono::NaiveDate>,
    #[serde(flatten)]
    pub file: CertificateFile,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl UploadItem {
    /// Describes this upload without its file payload.
    pub fn info(&self) -> UploadInfo {
        UploadInfo {
            id: self.id,
            owner: self.owner,
            title: self.title.clone(),
            category: self.category,
            semester_term: self.semester_term,
            issued_on: self.issued_on,
            file_name: self.file.file_name.clone(),
            content_type: self.file.content_type.clone(),
            size: self.file.size,
            created_at: self.created_at,
        }
    }
}

/// An upload without its file payload, for listings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadInfo {
    pub id: u64,
    pub owner: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub category: UploadCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester_term: Option<SemesterTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_on: Option<chrono::NaiveDate>,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The view tab and name search of an upload listing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UploadFilter {
    pub view: UploadView,
    /// Case-insensitive part of the file name, blank matches everything.
    pub search: String,
}

impl UploadFilter {
    /// Whether the upload passes both the view and the search.
    pub fn matches(&self, info: &UploadInfo) -> bool {
        let needle = self.search.trim().to_lowercase();
        self.view.matches(info.category, &info.content_type)
            && (needle.is_empty() || info.file_name.to_lowercase().contains(&needle))
    }
}

/// Uploads passing the filter, in their original order.
pub fn filter<'a>(uploads: &'a [UploadInfo], filter: &UploadFilter) -> Vec<&'a UploadInfo> {
    uploads.iter().filter(|info| filter.matches(info)).collect()
}
