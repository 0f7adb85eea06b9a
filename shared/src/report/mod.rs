//! Filtering, aggregation and pagination of certificate collections.
//!
//! Everything here is a pure function of its arguments: callers pass the
//! collection and the selection in explicitly and recompute on change.

mod aggregate;
pub mod csv;
pub mod handle;
mod paginate;

pub use aggregate::{
    distinct_department_count, group_by_department, group_by_type, summarize, total_count,
    year_range, LabelCount, Summary,
};
pub use paginate::{Page, Paginator};

use serde::{Deserialize, Serialize};

use crate::certificate::{
    Certificate, CertificateInfo, CertificateKind, CertificateMeta, Department, SemesterTerm,
};

/// Anything carrying certificate metadata.
pub trait Record {
    fn meta(&self) -> &CertificateMeta;
}

impl Record for CertificateMeta {
    #[inline]
    fn meta(&self) -> &CertificateMeta {
        self
    }
}

impl Record for Certificate {
    #[inline]
    fn meta(&self) -> &CertificateMeta {
        &self.meta
    }
}

impl Record for CertificateInfo {
    #[inline]
    fn meta(&self) -> &CertificateMeta {
        &self.meta
    }
}

impl<T: Record + ?Sized> Record for &T {
    #[inline]
    fn meta(&self) -> &CertificateMeta {
        (**self).meta()
    }
}

/// Facets a collection is filtered by, `None` matching everything.
///
/// On the wire, `""` and `"all"` both mean an unset facet and a year may be
/// given as a string.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FacetSelection {
    #[serde(default, rename = "type", deserialize_with = "facet::deserialize")]
    pub kind: Option<CertificateKind>,
    #[serde(default, deserialize_with = "facet::deserialize")]
    pub department: Option<Department>,
    #[serde(default, deserialize_with = "facet::deserialize")]
    pub semester_term: Option<SemesterTerm>,
    #[serde(default, deserialize_with = "facet::deserialize")]
    pub year: Option<i32>,
    #[serde(default)]
    pub search: String,
}

impl FacetSelection {
    /// The normalized search text, `None` if it's blank.
    pub fn needle(&self) -> Option<String> {
        let search = self.search.trim();
        (!search.is_empty()).then(|| search.to_lowercase())
    }

    /// Whether the metadata passes every facet of this selection.
    pub fn matches(&self, meta: &CertificateMeta) -> bool {
        self.matches_needle(meta, self.needle().as_deref())
    }

    fn matches_needle(&self, meta: &CertificateMeta, needle: Option<&str>) -> bool {
        self.kind.map_or(true, |kind| meta.kind == kind)
            && self
                .department
                .map_or(true, |department| meta.department == department)
            && self
                .semester_term
                .map_or(true, |term| meta.semester_term == term)
            && self.year.map_or(true, |year| meta.year == year)
            && needle.map_or(true, |needle| {
                [
                    Some(meta.title.as_str()),
                    meta.description.as_deref(),
                    meta.issuer.as_deref(),
                ]
                .into_iter()
                .any(|field| field.unwrap_or_default().to_lowercase().contains(needle))
            })
    }
}

/// Returns the records matching every facet of `selection`,
/// in their original order.
pub fn filter<'a, T: Record>(records: &'a [T], selection: &FacetSelection) -> Vec<&'a T> {
    let needle = selection.needle();
    records
        .iter()
        .filter(|record| selection.matches_needle(record.meta(), needle.as_deref()))
        .collect()
}

/// Filters `records` and builds every view of a report page from the
/// filtered set. `page` is clamped into the available pages.
pub fn build<'a, T: Record>(
    records: &'a [T],
    selection: &FacetSelection,
    paginator: Paginator,
    page: usize,
) -> handle::ReportResult<&'a T> {
    let filtered = filter(records, selection);
    let index = paginator.clamp(page, filtered.len());

    handle::ReportResult {
        summary: summarize(&filtered),
        by_department: group_by_department(&filtered),
        by_type: group_by_type(&filtered),
        table: Page {
            index,
            page_count: paginator.page_count(filtered.len()),
            total: filtered.len(),
            items: paginator.page(&filtered, index).to_vec(),
        },
    }
}

mod facet {
    use serde::{Deserialize, Deserializer};
    use std::{fmt::Display, str::FromStr};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Value(T),
        Text(String),
        Null(()),
    }

    /// Deserializes an optional facet, treating `""` and `"all"` as unset.
    pub(super) fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        match Raw::<T>::deserialize(deserializer)? {
            Raw::Value(value) => Ok(Some(value)),
            Raw::Null(()) => Ok(None),
            Raw::Text(text) => match text.trim() {
                "" | "all" => Ok(None),
                text => text.parse().map(Some).map_err(serde::de::Error::custom),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds metadata with the given facets and title.
    pub(crate) fn meta(
        title: &str,
        kind: CertificateKind,
        department: Department,
        semester_term: SemesterTerm,
        year: i32,
    ) -> CertificateMeta {
        CertificateMeta::new(title, kind, department, semester_term, year)
    }

    /// The three certificates of the reference example.
    pub(crate) fn example() -> Vec<CertificateMeta> {
        let mut c = meta(
            "C",
            CertificateKind::Diploma,
            Department::Other,
            SemesterTerm::FirstHalf,
            2024,
        );
        c.department_other = Some("Biología".to_owned());
        vec![
            meta(
                "A",
                CertificateKind::Diploma,
                Department::Engineering,
                SemesterTerm::FirstHalf,
                2023,
            ),
            meta(
                "B",
                CertificateKind::RefresherCourse,
                Department::Engineering,
                SemesterTerm::SecondHalf,
                2023,
            ),
            c,
        ]
    }

    /// A deterministic collection covering every facet value.
    pub(crate) fn generated(len: usize) -> Vec<CertificateMeta> {
        (0..len)
            .map(|i| {
                let kind = CertificateKind::ALL[i % CertificateKind::ALL.len()];
                let department = Department::ALL[(i * 7) % Department::ALL.len()];
                let term = SemesterTerm::ALL[(i / 3) % 2];
                let mut m = meta(
                    &format!("Certificado {i}"),
                    kind,
                    department,
                    term,
                    2015 + (i % 9) as i32,
                );
                if kind == CertificateKind::Other {
                    m.type_other = Some(format!("Tipo {}", i % 4));
                }
                if department == Department::Other {
                    m.department_other = Some(format!("Depto {}", i % 3));
                }
                if i % 4 == 0 {
                    m.issuer = Some("SEP".to_owned());
                }
                if i % 5 == 0 {
                    m.description = Some("Didáctica de las ciencias".to_owned());
                }
                m
            })
            .collect()
    }

    fn titles<T: Record>(records: &[T]) -> Vec<&str> {
        records.iter().map(|r| r.meta().title.as_str()).collect()
    }

    fn selections() -> Vec<FacetSelection> {
        vec![
            FacetSelection::default(),
            FacetSelection {
                kind: Some(CertificateKind::Mooc),
                ..Default::default()
            },
            FacetSelection {
                department: Some(Department::Engineering),
                year: Some(2018),
                ..Default::default()
            },
            FacetSelection {
                semester_term: Some(SemesterTerm::SecondHalf),
                search: "  sep ".to_owned(),
                ..Default::default()
            },
            FacetSelection {
                kind: Some(CertificateKind::Other),
                department: Some(Department::Other),
                semester_term: Some(SemesterTerm::FirstHalf),
                year: Some(2020),
                search: "didáctica".to_owned(),
            },
        ]
    }

    #[test]
    fn example_department_filter() {
        let certs = example();
        let selection = FacetSelection {
            department: Some(Department::Engineering),
            ..Default::default()
        };
        assert_eq!(titles(&filter(&certs, &selection)), ["A", "B"]);
    }

    #[test]
    fn example_year_then_search() {
        let certs = example();
        let by_year = filter(
            &certs,
            &FacetSelection {
                year: Some(2024),
                ..Default::default()
            },
        );
        assert_eq!(titles(&by_year), ["C"]);
        let by_search = filter(
            &by_year,
            &FacetSelection {
                search: "bio".to_owned(),
                ..Default::default()
            },
        );
        assert!(by_search.is_empty());
    }

    #[test]
    fn blank_search_matches_everything() {
        let certs = example();
        let selection = FacetSelection {
            search: "  ".to_owned(),
            ..Default::default()
        };
        assert_eq!(titles(&filter(&certs, &selection)), ["A", "B", "C"]);
    }

    #[test]
    fn search_is_case_insensitive_over_optional_fields() {
        let mut certs = example();
        certs[1].issuer = Some("Universidad Autónoma".to_owned());
        certs[2].description = Some("Taller de BIOÉTICA".to_owned());
        let search = |text: &str| {
            titles(&filter(
                &certs,
                &FacetSelection {
                    search: text.to_owned(),
                    ..Default::default()
                },
            ))
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>()
        };
        assert_eq!(search("AUTÓNOMA"), ["B"]);
        assert_eq!(search("bioética"), ["C"]);
        assert_eq!(search("  taller "), ["C"]);
    }

    #[test]
    fn filter_is_a_stable_subset_and_idempotent() {
        let certs = generated(120);
        for selection in selections() {
            let once = filter(&certs, &selection);
            assert!(once.iter().all(|m| selection.matches(m)));

            let positions: Vec<usize> = once
                .iter()
                .map(|m| certs.iter().position(|c| std::ptr::eq(c, *m)).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));

            let twice = filter(&once, &selection);
            assert_eq!(titles(&once), titles(&twice));
        }
    }

    #[test]
    fn dropping_a_facet_never_shrinks_the_result() {
        let certs = generated(200);
        let all = selections();
        let full = &all[4];
        let relaxed = [
            FacetSelection {
                kind: None,
                ..full.clone()
            },
            FacetSelection {
                department: None,
                ..full.clone()
            },
            FacetSelection {
                semester_term: None,
                ..full.clone()
            },
            FacetSelection {
                year: None,
                ..full.clone()
            },
            FacetSelection {
                search: String::new(),
                ..full.clone()
            },
        ];
        let base = filter(&certs, full).len();
        for selection in relaxed {
            assert!(filter(&certs, &selection).len() >= base);
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let certs: Vec<CertificateMeta> = Vec::new();
        for selection in selections() {
            assert!(filter(&certs, &selection).is_empty());
        }
    }

    #[test]
    fn selection_wire_format() {
        let selection: FacetSelection = serde_json::from_str(
            r#"{"type":"all","department":"ingenieria","semesterTerm":"","year":"2024","search":"x"}"#,
        )
        .unwrap();
        assert_eq!(
            selection,
            FacetSelection {
                kind: None,
                department: Some(Department::Engineering),
                semester_term: None,
                year: Some(2024),
                search: "x".to_owned(),
            }
        );

        let selection: FacetSelection =
            serde_json::from_str(r#"{"year":2023,"type":null}"#).unwrap();
        assert_eq!(selection.year, Some(2023));
        assert_eq!(selection.kind, None);

        assert!(serde_json::from_str::<FacetSelection>(r#"{"semesterTerm":"spring"}"#).is_err());
        assert!(serde_json::from_str::<FacetSelection>(r#"{"year":"soon"}"#).is_err());
    }

    #[test]
    fn report_rows_outlive_the_selection() {
        let certs = example();
        let report = {
            let selection = FacetSelection {
                department: Some(Department::Engineering),
                ..Default::default()
            };
            build(&certs, &selection, Paginator::default(), 0)
        };
        assert_eq!(titles(&report.table.items), ["A", "B"]);
        assert_eq!(report.summary.total, 2);
    }

    #[test]
    fn build_clamps_the_requested_page() {
        let certs = generated(45);
        let report = build(&certs, &FacetSelection::default(), Paginator::new(20), 9);
        assert_eq!(report.table.index, 2);
        assert_eq!(report.table.page_count, 3);
        assert_eq!(report.table.total, 45);
        assert_eq!(report.table.items.len(), 5);
        assert_eq!(report.summary.total, 45);
    }
}
