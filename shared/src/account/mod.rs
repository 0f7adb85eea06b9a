pub mod handle;

use serde::{Deserialize, Serialize};

/// Role of an account inside the portal.
///
/// Wire values are the portal's own identifiers, English names are accepted
/// as aliases when deserializing.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[serde(rename = "estudiante", alias = "student")]
    Student,
    #[serde(rename = "docente", alias = "faculty")]
    Faculty,
    /// Role given to newly registered accounts.
    #[default]
    #[serde(rename = "invitado", alias = "guest")]
    Guest,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Student, Self::Faculty, Self::Guest, Self::Admin];

    /// Human readable label of this role.
    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Estudiante",
            Role::Faculty => "Docente",
            Role::Guest => "Invitado",
            Role::Admin => "Administrador",
        }
    }

    #[inline]
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Represents a user's metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserMetadata {
    pub email: lettre::Address,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Avatar image as a JPEG data URL.
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Whether the given phone number is a valid mexican phone number,
/// spaces and dashes ignored.
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = compact
        .strip_prefix("+52")
        .or_else(|| compact.strip_prefix("52").filter(|r| r.len() == 10))
        .unwrap_or(&compact);
    digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Faculty).unwrap(), "\"docente\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"faculty\"").unwrap(),
            Role::Faculty
        );
        assert_eq!(serde_json::from_str::<Role>("\"invitado\"").unwrap(), Role::Guest);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn phone_numbers() {
        assert!(is_valid_phone("6641234567"));
        assert!(is_valid_phone("+52 664-123-4567"));
        assert!(is_valid_phone("52 6641234567"));
        assert!(!is_valid_phone("664123456"));
        assert!(!is_valid_phone("66412345ab"));
    }
}
