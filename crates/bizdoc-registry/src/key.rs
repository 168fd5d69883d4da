//! # IDoc Type Keys
//!
//! An IDoc message type is identified by five parts: the repository it was
//! read from, the basic type, the extension, and the system and application
//! releases. The key's `id()` form is used in segment keys and in XML
//! namespace URIs, so each part is name-escaped before joining.

use serde::{Deserialize, Serialize};

use bizdoc_core::name;

use crate::error::RegistryError;

/// Compound identifier of an IDoc message type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IDocTypeKey {
    /// Repository (destination) the metadata was read from.
    pub repository: String,
    /// Basic IDoc type.
    pub idoc_type: String,
    /// IDoc type extension; empty when none.
    #[serde(default)]
    pub idoc_type_extension: String,
    /// System release; empty when unspecified.
    #[serde(default)]
    pub system_release: String,
    /// Application release; empty when unspecified.
    #[serde(default)]
    pub application_release: String,
}

impl IDocTypeKey {
    /// Create a key from its five parts.
    pub fn new(
        repository: impl Into<String>,
        idoc_type: impl Into<String>,
        idoc_type_extension: impl Into<String>,
        system_release: impl Into<String>,
        application_release: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            idoc_type: idoc_type.into(),
            idoc_type_extension: idoc_type_extension.into(),
            system_release: system_release.into(),
            application_release: application_release.into(),
        }
    }

    fn parts(&self) -> [&str; 5] {
        [
            &self.repository,
            &self.idoc_type,
            &self.idoc_type_extension,
            &self.system_release,
            &self.application_release,
        ]
    }

    /// The message-type id: the five escaped parts joined with `/`.
    pub fn id(&self) -> String {
        self.parts()
            .iter()
            .map(|p| name::escape_xml(p))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Parse a key from its [`id`](Self::id) form.
    pub fn from_id(id: &str) -> Result<Self, RegistryError> {
        let parts: Vec<&str> = id.split('/').collect();
        let [repo, idoc_type, ext, sys, app] = parts.as_slice() else {
            return Err(RegistryError::InvalidKey(id.to_string()));
        };
        if repo.is_empty() || idoc_type.is_empty() {
            return Err(RegistryError::InvalidKey(id.to_string()));
        }
        Ok(Self::new(
            name::unescape_xml(repo),
            name::unescape_xml(idoc_type),
            name::unescape_xml(ext),
            name::unescape_xml(sys),
            name::unescape_xml(app),
        ))
    }

    /// The unique key of a segment type within this IDoc type.
    pub fn segment_key(&self, segment_type: &str) -> String {
        format!("{}:{}", self.id(), segment_type)
    }
}

impl std::fmt::Display for IDocTypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrip() {
        let key = IDocTypeKey::new("REPO", "/BIZ/ORDERS", "", "700", "701");
        assert_eq!(key.id(), "REPO/_-BIZ_-ORDERS//700/701");
        assert_eq!(IDocTypeKey::from_id(&key.id()).unwrap(), key);
    }

    #[test]
    fn from_id_rejects_wrong_arity() {
        assert!(IDocTypeKey::from_id("A/B/C").is_err());
        assert!(IDocTypeKey::from_id("A/B/C/D/E/F").is_err());
        assert!(IDocTypeKey::from_id("/B/C/D/E").is_err());
    }

    #[test]
    fn segment_keys_are_unique_per_type() {
        let a = IDocTypeKey::new("R", "A", "", "", "");
        let b = IDocTypeKey::new("R", "B", "", "", "");
        assert_ne!(a.segment_key("SEG"), b.segment_key("SEG"));
    }
}
