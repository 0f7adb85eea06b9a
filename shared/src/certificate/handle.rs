use serde::{Deserialize, Serialize};

use crate::report::FacetSelection;

/// A file to attach to a certificate.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub file_name: String,
    /// Must match the media type of `data` when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// The file as a `data:<mime>;base64,<payload>` URL.
    pub data: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CertificateDescriptor {
    #[serde(flatten)]
    pub meta: super::CertificateMeta,
    pub file: FileDescriptor,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateCertificateResult {
    pub certificate_id: u64,
}

/// Lists certificates of an account, or of every account
/// when `owner` is `None` (admin only).
#[derive(Serialize, Deserialize, Default)]
pub struct GetCertificatesDescriptor {
    /// Defaults to the requesting account.
    #[serde(default)]
    pub owner: Option<OwnerScope>,
    #[serde(default)]
    pub selection: FacetSelection,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerScope {
    Account(u64),
    All,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct GetCertificatesResult {
    pub certificates: Vec<super::CertificateInfo>,
}

#[derive(Serialize, Deserialize, Clone, Copy)]
pub struct TargetCertificateDescriptor {
    pub owner: u64,
    pub id: u64,
}

#[derive(Serialize, Deserialize)]
pub struct EditCertificateDescriptor {
    pub owner: u64,
    pub id: u64,
    pub variants: Vec<EditCertificateVariant>,
}

#[derive(Serialize, Deserialize, Clone)]
pub enum EditCertificateVariant {
    /// Replaces the whole metadata.
    Meta(super::CertificateMeta),
    Title(String),
    Description(Option<String>),
    Issuer(Option<String>),
    /// Replaces the attached file, admins only.
    File(FileDescriptor),
}
