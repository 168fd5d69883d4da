//! # Qualified Names
//!
//! Segment types, field names, and function names may carry an owning
//! namespace in the `/NS/LOCAL` form. A name without that prefix is local to
//! the message that declares it.
//!
//! ## Resolution Rule
//!
//! A requested name matches a declared name when both have the same local
//! part and the same *effective* namespace, where a local name's effective
//! namespace is the message's own namespace. Consequently:
//!
//! - a name declared in the message's own namespace is reachable both as
//!   `LOCAL` and as `/NS/LOCAL`;
//! - a name declared in a foreign namespace is reachable only as `/OTHER/LOCAL`.
//!
//! ## XML Escaping
//!
//! `/` is not legal in XML names, so qualified names are written with each
//! `/` replaced by `_-` (`/NS/LOCAL` becomes `_-NS_-LOCAL`).

use std::borrow::Cow;

const XML_SLASH: &str = "_-";

/// Split a name into its namespace and local part.
///
/// `"/NS/LOCAL"` yields `(Some("NS"), "LOCAL")`; anything not of that exact
/// shape is treated as a local name.
pub fn split(name: &str) -> (Option<&str>, &str) {
    if let Some(rest) = name.strip_prefix('/') {
        if let Some((ns, local)) = rest.split_once('/') {
            if !ns.is_empty() && !local.is_empty() && !local.contains('/') {
                return (Some(ns), local);
            }
        }
    }
    (None, name)
}

/// The namespace of a qualified name, if any.
pub fn namespace_of(name: &str) -> Option<&str> {
    split(name).0
}

/// Whether `name` carries a namespace prefix.
pub fn is_qualified(name: &str) -> bool {
    namespace_of(name).is_some()
}

/// Build the qualified form `/NS/LOCAL`.
pub fn qualify(namespace: &str, local: &str) -> String {
    format!("/{namespace}/{local}")
}

/// Whether a requested name resolves to a declared name within a message
/// whose own namespace is `own_namespace`.
pub fn matches(declared: &str, requested: &str, own_namespace: Option<&str>) -> bool {
    if declared == requested {
        return true;
    }
    let (declared_ns, declared_local) = split(declared);
    let (requested_ns, requested_local) = split(requested);
    if declared_local != requested_local {
        return false;
    }
    declared_ns.or(own_namespace) == requested_ns.or(own_namespace)
}

/// Find the first declared name that `requested` resolves to.
pub fn resolve<'a, I>(declared: I, requested: &str, own_namespace: Option<&str>) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fallback = None;
    for name in declared {
        if name == requested {
            return Some(name);
        }
        if fallback.is_none() && matches(name, requested, own_namespace) {
            fallback = Some(name);
        }
    }
    fallback
}

/// Escape a name for use as an XML element or attribute name.
pub fn escape_xml(name: &str) -> Cow<'_, str> {
    if name.contains('/') {
        Cow::Owned(name.replace('/', XML_SLASH))
    } else {
        Cow::Borrowed(name)
    }
}

/// Reverse [`escape_xml`].
pub fn unescape_xml(name: &str) -> Cow<'_, str> {
    if name.contains(XML_SLASH) {
        Cow::Owned(name.replace(XML_SLASH, "/"))
    } else {
        Cow::Borrowed(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_forms() {
        assert_eq!(split("/BIZ/HEAD"), (Some("BIZ"), "HEAD"));
        assert_eq!(split("HEAD"), (None, "HEAD"));
        assert_eq!(split("/HEAD"), (None, "/HEAD"));
        assert_eq!(split("//HEAD"), (None, "//HEAD"));
        assert_eq!(split("/A/B/C"), (None, "/A/B/C"));
    }

    #[test]
    fn own_namespace_reachable_both_ways() {
        assert!(matches("HEAD", "/BIZ/HEAD", Some("BIZ")));
        assert!(matches("/BIZ/HEAD", "HEAD", Some("BIZ")));
        assert!(matches("/BIZ/HEAD", "/BIZ/HEAD", Some("BIZ")));
    }

    #[test]
    fn foreign_namespace_only_qualified() {
        assert!(matches("/OTH/EXT", "/OTH/EXT", Some("BIZ")));
        assert!(!matches("/OTH/EXT", "EXT", Some("BIZ")));
        assert!(!matches("/OTH/EXT", "/BIZ/EXT", Some("BIZ")));
        assert!(!matches("/OTH/EXT", "EXT", None));
    }

    #[test]
    fn no_own_namespace() {
        assert!(matches("HEAD", "HEAD", None));
        assert!(!matches("HEAD", "/BIZ/HEAD", None));
    }

    #[test]
    fn resolve_prefers_exact() {
        let declared = ["HEAD", "/BIZ/HEAD"];
        assert_eq!(resolve(declared, "/BIZ/HEAD", Some("BIZ")), Some("/BIZ/HEAD"));
        assert_eq!(resolve(declared, "HEAD", Some("BIZ")), Some("HEAD"));
        assert_eq!(resolve(["/BIZ/HEAD"], "HEAD", Some("BIZ")), Some("/BIZ/HEAD"));
        assert_eq!(resolve(["/OTH/HEAD"], "HEAD", Some("BIZ")), None);
    }

    #[test]
    fn xml_escaping_roundtrip() {
        assert_eq!(escape_xml("/BIZ/HEAD"), "_-BIZ_-HEAD");
        assert_eq!(unescape_xml("_-BIZ_-HEAD"), "/BIZ/HEAD");
        assert!(matches!(escape_xml("LEVEL1"), Cow::Borrowed(_)));
    }
}
