//! CSV documents for spreadsheet software.
//!
//! Every field is double-quoted with inner quotes doubled, lines are joined
//! by `\n` and the document starts with a byte order mark so that
//! spreadsheets pick up UTF-8.

use super::Record;
use crate::account::handle::ViewAccountResult;

pub const BOM: char = '\u{FEFF}';

pub const CERTIFICATE_HEADERS: [&str; 10] = [
    "Título",
    "Tipo",
    "Departamento",
    "Año",
    "Semestre",
    "Emisor",
    "Descripción",
    "Horas",
    "Modalidad",
    "Fecha de emisión",
];

pub const ACCOUNT_HEADERS: [&str; 5] = ["UID", "Nombre", "Email", "Rol", "Estado"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Renders the whole document.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push(BOM);
        push_line(&mut out, &self.headers);
        for row in &self.rows {
            out.push('\n');
            push_line(&mut out, row);
        }
        out
    }
}

fn push_line(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
}

/// Certificates as a table with display labels in place of wire keys.
pub fn certificate_table<T: Record>(records: &[T]) -> CsvTable {
    let mut table = CsvTable::new(CERTIFICATE_HEADERS);
    for record in records {
        let meta = record.meta();
        table.push_row(vec![
            meta.title.clone(),
            meta.kind_label().to_owned(),
            meta.department_label().to_owned(),
            meta.year.to_string(),
            meta.semester_term.label().to_owned(),
            meta.issuer.clone().unwrap_or_default(),
            meta.description.clone().unwrap_or_default(),
            meta.hours.map(|h| h.to_string()).unwrap_or_default(),
            meta.modality
                .map(|m| m.label().to_owned())
                .unwrap_or_default(),
            meta.issued_on
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ]);
    }
    table
}

pub fn account_table(accounts: &[ViewAccountResult]) -> CsvTable {
    let mut table = CsvTable::new(ACCOUNT_HEADERS);
    for account in accounts {
        table.push_row(vec![
            account.id.to_string(),
            account.metadata.name.clone(),
            account.metadata.email.to_string(),
            account.role.label().to_owned(),
            if account.active { "Activo" } else { "Inactivo" }.to_owned(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Role, UserMetadata};
    use crate::certificate::Modality;
    use crate::report::tests::example;

    #[test]
    fn quoting_and_bom() {
        let mut table = CsvTable::new(["a", "b"]);
        table.push_row(vec!["say \"hi\"".to_owned(), "x,y\nz".to_owned()]);
        assert_eq!(
            table.render(),
            "\u{FEFF}\"a\",\"b\"\n\"say \"\"hi\"\"\",\"x,y\nz\""
        );
    }

    #[test]
    fn header_only_when_empty() {
        let records: Vec<crate::certificate::CertificateMeta> = Vec::new();
        let rendered = certificate_table(&records).render();
        assert!(rendered.starts_with(BOM));
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.contains("\"Fecha de emisión\""));
    }

    #[test]
    fn certificate_rows_use_labels() {
        let mut certs = example();
        certs[0].modality = Some(Modality::Online);
        certs[0].hours = Some(40);
        certs[0].issued_on = chrono::NaiveDate::from_ymd_opt(2023, 5, 2);
        certs[0].issuer = Some("UABC".to_owned());
        let table = certificate_table(&certs);

        assert_eq!(
            table.rows[0],
            [
                "A",
                "Diplomado",
                "Ingeniería",
                "2023",
                "Ene–Jun",
                "UABC",
                "",
                "40",
                "En línea",
                "2023-05-02"
            ]
        );
        assert_eq!(table.rows[1][1], "Curso de actualización");
        assert_eq!(table.rows[1][4], "Jul–Dic");
        assert_eq!(table.rows[2][2], "Biología");
    }

    #[test]
    fn account_rows() {
        let accounts = [ViewAccountResult {
            id: 7,
            metadata: UserMetadata {
                email: "ana@uabc.edu.mx".parse().unwrap(),
                name: "Ana \"La Profe\"".to_owned(),
                phone: None,
                bio: None,
                avatar: None,
            },
            role: Role::Faculty,
            active: false,
            registration_time: chrono::Utc::now(),
        }];
        let rendered = account_table(&accounts).render();
        assert_eq!(
            rendered,
            "\u{FEFF}\"UID\",\"Nombre\",\"Email\",\"Rol\",\"Estado\"\n\
             \"7\",\"Ana \"\"La Profe\"\"\",\"ana@uabc.edu.mx\",\"Docente\",\"Inactivo\""
        );
    }
}
