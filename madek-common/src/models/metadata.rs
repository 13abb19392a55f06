use serde::{Deserialize, Serialize};

/// Metadata compiled for a collection or media entry.
///
/// Every field is optional: what is present depends on which supported meta
/// keys exist on the source resource. Entity lists keep the order in which
/// the API reported the referenced ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default)]
    pub copyright: Copyright,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affiliation: Vec<Group>,
}

impl Metadata {
    /// True when no supported meta key contributed a value
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Copyright block of a metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copyright {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// License labels, in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<String>,
}

/// A person referenced by People-typed metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

/// An institutional group (affiliation), stored by the API as a person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub pseudonym: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_metadata_serializes_copyright_only() {
        let value = serde_json::to_value(Metadata::default()).unwrap();
        assert_eq!(value, json!({ "copyright": {} }));
    }

    #[test]
    fn test_metadata_serializes_present_fields() {
        let metadata = Metadata {
            title: Some("Meduza".to_string()),
            genres: vec!["Design".to_string()],
            copyright: Copyright {
                holder: Some("Interaction Design".to_string()),
                usage: None,
                licenses: vec!["Alle Rechte vorbehalten".to_string()],
            },
            ..Default::default()
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Meduza",
                "genres": ["Design"],
                "copyright": {
                    "holder": "Interaction Design",
                    "licenses": ["Alle Rechte vorbehalten"]
                }
            })
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(Metadata::default().is_empty());
        let metadata = Metadata {
            year: Some("2016".to_string()),
            ..Default::default()
        };
        assert!(!metadata.is_empty());
    }
}
