use serde::{Deserialize, Serialize};

use super::{UploadCategory, UploadFilter, UploadInfo};
use crate::certificate::{handle::FileDescriptor, SemesterTerm};

/// A file to upload with its optional details.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub category: UploadCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester_term: Option<SemesterTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_on: Option<chrono::NaiveDate>,
    pub file: FileDescriptor,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateUploadResult {
    pub upload_id: u64,
}

/// Lists uploads of the requesting account, newest first.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct GetUploadsDescriptor {
    #[serde(flatten)]
    pub filter: UploadFilter,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GetUploadsResult {
    pub uploads: Vec<UploadInfo>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct TargetUploadDescriptor {
    pub id: u64,
}
