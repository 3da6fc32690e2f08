use std::fmt;

use super::cli_error::CliError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// An environment or collection id. These are pushed into URL paths,
/// so anything outside the characters Discovery issues is rejected up front.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn parse(kind: &str, id: &str) -> Result<ResourceId, CliError> {
        if ID_PATTERN.is_match(id) {
            Ok(ResourceId(id.to_owned()))
        } else {
            Err(CliError::InputError(format!(
                "{} id must only contain letters, digits, '-' or '_'. Provided '{}'",
                kind, id
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The collection every document of a run is sent to.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub environment_id: ResourceId,
    pub collection_id: ResourceId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid_collection_id() {
        let id = "4c2b8c1e-3f1a-4c8b-9d65-2f0f4a2b7e11";
        let parsed = ResourceId::parse("collection", id);
        assert!(
            matches!(parsed, Ok(_)),
            "Checking if '{}' parsing is Ok(()), was {:?} ",
            id,
            parsed
        );
    }

    #[test]
    fn accepts_system_environment_id() {
        let parsed = ResourceId::parse("environment", "system");
        assert_eq!(parsed.unwrap().as_str(), "system");
    }

    #[test]
    fn rejects_path_traversal() {
        let id = "../collections";
        let parsed = ResourceId::parse("collection", id);
        assert!(
            matches!(parsed, Err(CliError::InputError(_))),
            "Checking if '{}' parsing is Err, was {:?} ",
            id,
            parsed
        );
    }

    #[test]
    fn rejects_empty_id() {
        assert!(ResourceId::parse("collection", "").is_err());
    }
}
