//! # Codec Options and Namespaces
//!
//! Every encoded message declares two namespaces: a fixed model-kind
//! namespace (`{base}/idoc` or `{base}/rfc`) bound to the `idoc`/`rfc`
//! prefix, and one per-message namespace that identifies the IDoc type or
//! function and qualifies its segment and member elements:
//!
//! ```text
//! {base}/idoc/{repository}/{type}/{extension}/{system}/{application}
//! {base}/rfc/{function}
//! ```
//!
//! Path parts are name-escaped (`/` becomes `_-`). Decoding recovers the
//! message type from that URI alone.

use serde::{Deserialize, Serialize};

use bizdoc_core::name;
use bizdoc_registry::IDocTypeKey;

/// Default namespace base URI.
pub const DEFAULT_NAMESPACE_BASE: &str = "http://schemas.bizdoc.org";

/// Prefix of the IDoc model-kind namespace.
pub const IDOC_PREFIX: &str = "idoc";

/// Prefix of the function-call model-kind namespace.
pub const RFC_PREFIX: &str = "rfc";

/// Codec configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Base URI of all generated namespaces.
    pub namespace_base: String,
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
    /// Whether to emit `<?xml version="1.0" encoding="UTF-8"?>`.
    pub xml_declaration: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            namespace_base: DEFAULT_NAMESPACE_BASE.to_string(),
            indent: 2,
            xml_declaration: true,
        }
    }
}

impl CodecOptions {
    fn base(&self) -> &str {
        self.namespace_base.trim_end_matches('/')
    }

    /// `{base}/idoc`
    pub fn idoc_namespace(&self) -> String {
        format!("{}/{IDOC_PREFIX}", self.base())
    }

    /// `{base}/rfc`
    pub fn rfc_namespace(&self) -> String {
        format!("{}/{RFC_PREFIX}", self.base())
    }

    /// Namespace of one IDoc type.
    pub fn message_namespace(&self, key: &IDocTypeKey) -> String {
        format!("{}/{}", self.idoc_namespace(), key.id())
    }

    /// Namespace of one function.
    pub fn function_namespace(&self, function: &str) -> String {
        format!("{}/{}", self.rfc_namespace(), name::escape_xml(function))
    }

    /// The message-type id encoded in an IDoc message namespace.
    pub fn message_id<'u>(&self, uri: &'u str) -> Option<&'u str> {
        let prefix = self.idoc_namespace();
        uri.strip_prefix(prefix.as_str())?.strip_prefix('/')
    }

    /// The function name encoded in a function namespace.
    pub fn function_name(&self, uri: &str) -> Option<String> {
        let prefix = self.rfc_namespace();
        let escaped = uri.strip_prefix(prefix.as_str())?.strip_prefix('/')?;
        (!escaped.is_empty() && !escaped.contains('/'))
            .then(|| name::unescape_xml(escaped).into_owned())
    }
}

/// The prefix bound to a message namespace: the escaped IDoc type or
/// function name, made a legal prefix that differs from the model-kind
/// prefixes.
///
/// Characters outside `[A-Za-z0-9_.-]` become `_`. A leading `_` is added
/// when the name does not start with a letter or `_`, starts with `xml`
/// (reserved), or equals [`IDOC_PREFIX`] or [`RFC_PREFIX`]. Decoding
/// resolves namespaces by URI, so the prefix is free to differ from the name.
pub(crate) fn message_prefix(name: &str) -> String {
    let escaped: String = name::escape_xml(name)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let starts_ok = escaped
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let reserved = escaped.len() >= 3 && escaped[..3].eq_ignore_ascii_case("xml");
    if !starts_ok || reserved || escaped == IDOC_PREFIX || escaped == RFC_PREFIX {
        format!("_{escaped}")
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_roundtrip() {
        let options = CodecOptions::default();
        let key = IDocTypeKey::new("R", "/BIZ/ORDERS", "", "740", "");
        let uri = options.message_namespace(&key);
        assert_eq!(uri, "http://schemas.bizdoc.org/idoc/R/_-BIZ_-ORDERS//740/");
        assert_eq!(options.message_id(&uri), Some(key.id().as_str()));

        let uri = options.function_namespace("/BIZ/ORDER_GET");
        assert_eq!(uri, "http://schemas.bizdoc.org/rfc/_-BIZ_-ORDER_GET");
        assert_eq!(options.function_name(&uri).as_deref(), Some("/BIZ/ORDER_GET"));
    }

    #[test]
    fn kind_namespaces_are_not_message_namespaces() {
        let options = CodecOptions::default();
        assert_eq!(options.message_id(&options.idoc_namespace()), None);
        assert_eq!(options.function_name(&options.rfc_namespace()), None);
        assert_eq!(options.function_name(&options.message_namespace(
            &IDocTypeKey::new("R", "T", "", "", "")
        )), None);
    }

    #[test]
    fn message_prefix_is_a_distinct_legal_prefix() {
        assert_eq!(message_prefix("ORDERS05"), "ORDERS05");
        assert_eq!(message_prefix("/BIZ/ORDERS"), "_-BIZ_-ORDERS");
        assert_eq!(message_prefix("idoc"), "_idoc");
        assert_eq!(message_prefix("rfc"), "_rfc");
        assert_eq!(message_prefix("IDOC"), "IDOC");
        assert_eq!(message_prefix("9LIVES"), "_9LIVES");
        assert_eq!(message_prefix("XMLDOC"), "_XMLDOC");
        assert_eq!(message_prefix("A B:C"), "A_B_C");
        assert_eq!(message_prefix(""), "_");
    }

    #[test]
    fn trailing_slash_in_base_ignored() {
        let options = CodecOptions {
            namespace_base: "urn:test/".into(),
            ..CodecOptions::default()
        };
        assert_eq!(options.idoc_namespace(), "urn:test/idoc");
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: CodecOptions = serde_json::from_str(r#"{"indent": 0}"#).unwrap();
        assert_eq!(options.indent, 0);
        assert!(options.xml_declaration);
        assert_eq!(options.namespace_base, DEFAULT_NAMESPACE_BASE);
    }
}
