//! Certificate records and their closed enumerations.
//!
//! Every enumeration carries its wire key and an exhaustive display label,
//! so no raw identifier ever reaches a chart, a table or an export.

pub mod handle;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Content types a certificate file may have.
pub const ALLOWED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "application/pdf",
];

/// Accepted range of certificate years.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

/// Minimum length of a free-text department.
pub const DEPARTMENT_OTHER_MIN_LEN: usize = 3;

/// A string didn't match any key of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} \"{}\"", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Declares a closed enumeration with wire keys and display labels.
macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $key:literal, $label:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, ::serde::Serialize, ::serde::Deserialize, Debug, PartialEq, Eq, Hash,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $key)]
                $variant,
            )*
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// The wire key of this value.
            pub fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)*
                }
            }

            /// The human readable label of this value.
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::certificate::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok(Self::$variant),)*
                    _ => Err($crate::certificate::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_owned(),
                    }),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}

pub(crate) use labeled_enum;

labeled_enum! {
    /// Category of a certificate.
    CertificateKind {
        Diploma => "diplomado", "Diplomado",
        RefresherCourse => "curso-actualizacion", "Curso de actualización",
        Workshop => "taller-didactico", "Taller didáctico",
        ResearchSeminar => "seminario-investigacion", "Seminario de investigación",
        Conference => "congreso", "Congreso/Simposio",
        Talk => "ponencia", "Ponencia/Cartel",
        Publication => "publicacion", "Publicación",
        CompetencyCertification => "certificacion-competencias", "Certificación de competencias",
        Mooc => "mooc", "Curso en línea (MOOC)",
        ThesisAdvisory => "asesoria-tesis", "Asesoría/Comité de tesis",
        InstitutionalRecognition => "reconocimiento-uabc", "Reconocimiento UABC",
        /// Described by the free-text `typeOther` field.
        Other => "otro", "Otro",
    }
}

labeled_enum! {
    /// Academic department a certificate is registered under.
    Department {
        EducationSciences => "ciencias-educacion", "Ciencias de la Educación",
        Engineering => "ingenieria", "Ingeniería",
        Humanities => "humanidades", "Humanidades",
        HealthSciences => "ciencias-salud", "Ciencias de la Salud",
        Arts => "artes", "Artes",
        Sports => "deportes", "Deportes",
        Administration => "administracion", "Administración",
        Economics => "economia", "Economía",
        Law => "juridicas", "Jurídicas",
        /// Described by the free-text `departmentOther` field.
        Other => "otro", "Otro",
    }
}

labeled_enum! {
    /// Half of the academic year.
    SemesterTerm {
        /// January to June.
        FirstHalf => "ene-jun", "Ene–Jun",
        /// July to December.
        SecondHalf => "jul-dic", "Jul–Dic",
    }
}

labeled_enum! {
    Modality {
        InPerson => "presencial", "Presencial",
        Online => "en-linea", "En línea",
        Hybrid => "mixta", "Mixta",
    }
}

/// Descriptive metadata of a certificate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateMeta {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: CertificateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_other: Option<String>,
    pub department: Department,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_other: Option<String>,
    pub semester_term: SemesterTerm,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<Modality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_on: Option<chrono::NaiveDate>,
}

impl CertificateMeta {
    /// Creates metadata with every optional field unset.
    pub fn new(
        title: impl Into<String>,
        kind: CertificateKind,
        department: Department,
        semester_term: SemesterTerm,
        year: i32,
    ) -> Self {
        Self {
            title: title.into(),
            kind,
            type_other: None,
            department,
            department_other: None,
            semester_term,
            year,
            description: None,
            issuer: None,
            modality: None,
            hours: None,
            issued_on: None,
        }
    }

    /// Trims every text field and drops the ones left empty,
    /// including free-text fields of non-`otro` categories.
    pub fn normalize(&mut self) {
        fn tidy(field: &mut Option<String>) {
            *field = field
                .take()
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty());
        }

        self.title = self.title.trim().to_owned();
        tidy(&mut self.type_other);
        tidy(&mut self.department_other);
        tidy(&mut self.description);
        tidy(&mut self.issuer);

        if self.kind != CertificateKind::Other {
            self.type_other = None;
        }
        if self.department != Department::Other {
            self.department_other = None;
        }
    }

    /// Validates invariants of the metadata.
    pub fn validate(&self) -> Result<(), InvalidCertificate> {
        if self.title.trim().is_empty() {
            return Err(InvalidCertificate::EmptyTitle);
        }
        if self.kind == CertificateKind::Other
            && self.type_other.as_deref().map_or(true, |s| s.trim().is_empty())
        {
            return Err(InvalidCertificate::MissingTypeOther);
        }
        if self.department == Department::Other
            && self
                .department_other
                .as_deref()
                .map_or(true, |s| s.trim().chars().count() < DEPARTMENT_OTHER_MIN_LEN)
        {
            return Err(InvalidCertificate::DepartmentOtherTooShort);
        }
        if !YEAR_RANGE.contains(&self.year) {
            return Err(InvalidCertificate::YearOutOfRange(self.year));
        }
        if self.hours == Some(0) {
            return Err(InvalidCertificate::ZeroHours);
        }
        Ok(())
    }

    /// Label for grouping by department: the free text of an `otro`
    /// department when given, the department label otherwise.
    pub fn department_label(&self) -> &str {
        match (self.department, self.department_other.as_deref()) {
            (Department::Other, Some(other)) if !other.is_empty() => other,
            (department, _) => department.label(),
        }
    }

    /// Label for grouping by type, see [`Self::department_label`].
    pub fn kind_label(&self) -> &str {
        match (self.kind, self.type_other.as_deref()) {
            (CertificateKind::Other, Some(other)) if !other.is_empty() => other,
            (kind, _) => kind.label(),
        }
    }
}

/// File attached to a certificate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateFile {
    pub file_name: String,
    pub content_type: String,
    /// Size of the decoded file in bytes.
    pub size: u64,
    /// The file as a `data:<mime>;base64,<payload>` URL.
    pub data: String,
}

impl CertificateFile {
    /// Validates the declared content type and size of this file.
    pub fn validate(&self, max_size: u64) -> Result<(), InvalidCertificate> {
        if self.file_name.trim().is_empty() {
            return Err(InvalidCertificate::EmptyFileName);
        }
        if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(InvalidCertificate::ContentType(self.content_type.clone()));
        }
        if self.size > max_size {
            return Err(InvalidCertificate::FileTooLarge {
                size: self.size,
                max: max_size,
            });
        }
        Ok(())
    }
}

/// A certificate owned by an account.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// The only id of this certificate.
    pub id: u64,
    /// Id of the owning account.
    pub owner: u64,
    #[serde(flatten)]
    pub meta: CertificateMeta,
    #[serde(flatten)]
    pub file: CertificateFile,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Certificate {
    /// Validates both the metadata and the file of this certificate.
    pub fn validate(&self, max_file_size: u64) -> Result<(), InvalidCertificate> {
        self.meta.validate()?;
        self.file.validate(max_file_size)
    }

    /// Describes this certificate without its file payload.
    pub fn info(&self) -> CertificateInfo {
        CertificateInfo {
            id: self.id,
            owner: self.owner,
            meta: self.meta.clone(),
            file_name: self.file.file_name.clone(),
            content_type: self.file.content_type.clone(),
            size: self.file.size,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A certificate without its file payload, for listings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub id: u64,
    pub owner: u64,
    #[serde(flatten)]
    pub meta: CertificateMeta,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A violated certificate invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidCertificate {
    EmptyTitle,
    MissingTypeOther,
    DepartmentOtherTooShort,
    YearOutOfRange(i32),
    ZeroHours,
    EmptyFileName,
    ContentType(String),
    FileTooLarge { size: u64, max: u64 },
}

impl Display for InvalidCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidCertificate::EmptyTitle => f.write_str("title couldn't be empty"),
            InvalidCertificate::MissingTypeOther => {
                f.write_str("type \"otro\" requires a description")
            }
            InvalidCertificate::DepartmentOtherTooShort => write!(
                f,
                "department \"otro\" requires at least {DEPARTMENT_OTHER_MIN_LEN} characters"
            ),
            InvalidCertificate::YearOutOfRange(year) => write!(
                f,
                "year {year} out of range {}..={}",
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            ),
            InvalidCertificate::ZeroHours => f.write_str("hours should be positive"),
            InvalidCertificate::EmptyFileName => f.write_str("file name couldn't be empty"),
            InvalidCertificate::ContentType(ty) => write!(f, "content type {ty} not allowed"),
            InvalidCertificate::FileTooLarge { size, max } => {
                write!(f, "file too large: {size} bytes, max {max}")
            }
        }
    }
}

impl std::error::Error for InvalidCertificate {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_round_trips_through_from_str() {
        for kind in CertificateKind::ALL {
            assert_eq!(kind.key().parse::<CertificateKind>().unwrap(), *kind);
            assert!(!kind.label().is_empty());
        }
        for department in Department::ALL {
            assert_eq!(department.key().parse::<Department>().unwrap(), *department);
            assert!(!department.label().is_empty());
        }
        assert_eq!(CertificateKind::ALL.len(), 12);
        assert_eq!(Department::ALL.len(), 10);
    }

    #[test]
    fn labels_never_expose_wire_keys() {
        for kind in CertificateKind::ALL {
            assert_ne!(kind.label(), kind.key());
        }
        for department in Department::ALL {
            assert_ne!(department.label(), department.key());
        }
    }

    #[test]
    fn legacy_semester_names_are_rejected() {
        assert!("spring".parse::<SemesterTerm>().is_err());
        assert!(serde_json::from_str::<SemesterTerm>("\"fall\"").is_err());
        assert_eq!(
            serde_json::from_str::<SemesterTerm>("\"jul-dic\"").unwrap(),
            SemesterTerm::SecondHalf
        );
    }

    #[test]
    fn other_categories_need_free_text() {
        let mut meta = CertificateMeta::new(
            "Taller",
            CertificateKind::Other,
            Department::Arts,
            SemesterTerm::FirstHalf,
            2023,
        );
        assert_eq!(meta.validate(), Err(InvalidCertificate::MissingTypeOther));
        meta.type_other = Some("Estancia".to_owned());
        assert_eq!(meta.validate(), Ok(()));

        meta.department = Department::Other;
        meta.department_other = Some(" Bi ".to_owned());
        assert_eq!(
            meta.validate(),
            Err(InvalidCertificate::DepartmentOtherTooShort)
        );
        meta.department_other = Some("Bio".to_owned());
        assert_eq!(meta.validate(), Ok(()));

        meta.year = 1999;
        assert_eq!(meta.validate(), Err(InvalidCertificate::YearOutOfRange(1999)));
    }

    #[test]
    fn normalize_drops_stale_free_text() {
        let mut meta = CertificateMeta::new(
            "  Curso  ",
            CertificateKind::Mooc,
            Department::Law,
            SemesterTerm::SecondHalf,
            2022,
        );
        meta.type_other = Some("ignored".to_owned());
        meta.issuer = Some("   ".to_owned());
        meta.normalize();
        assert_eq!(meta.title, "Curso");
        assert_eq!(meta.type_other, None);
        assert_eq!(meta.issuer, None);
    }

    #[test]
    fn file_limits() {
        let file = CertificateFile {
            file_name: "a.pdf".to_owned(),
            content_type: "application/pdf".to_owned(),
            size: 10,
            data: String::new(),
        };
        assert_eq!(file.validate(10), Ok(()));
        assert!(matches!(
            file.validate(9),
            Err(InvalidCertificate::FileTooLarge { size: 10, max: 9 })
        ));
        let file = CertificateFile {
            content_type: "text/plain".to_owned(),
            ..file
        };
        assert!(matches!(
            file.validate(10),
            Err(InvalidCertificate::ContentType(_))
        ));
    }

    #[test]
    fn wire_format_uses_camel_case_keys() {
        let mut meta = CertificateMeta::new(
            "A",
            CertificateKind::Diploma,
            Department::Other,
            SemesterTerm::FirstHalf,
            2023,
        );
        meta.department_other = Some("Biología".to_owned());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "diplomado");
        assert_eq!(json["departmentOther"], "Biología");
        assert_eq!(json["semesterTerm"], "ene-jun");
        assert!(json.get("description").is_none());
    }
}
