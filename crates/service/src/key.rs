//! Entity keys: `<namespace>/<name>`.
//!
//! Names never contain `/`, so the mapping from `(namespace, name)` to a key
//! is injective even when namespaces themselves contain `/`.

use crate::errors::ServiceError;

const MAX_NAME_LEN: usize = 256;

/// Logical grouping of entities sharing a key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
    marker: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>) -> Result<Self, ServiceError> {
        let prefix = prefix.into();
        if prefix.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("namespace must not be empty".into()));
        }
        if prefix.starts_with('/') || prefix.ends_with('/') || prefix.contains('*') || prefix.contains("//") {
            return Err(ServiceError::InvalidArgument(format!("invalid namespace '{prefix}'")));
        }
        let marker = format!("{prefix}/");
        Ok(Self { prefix, marker })
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Key for a validated name.
    pub fn key(&self, name: &str) -> Result<String, ServiceError> {
        validate_name(name)?;
        Ok(format!("{}{}", self.marker, name))
    }

    /// Pattern matching every entity in this namespace.
    pub fn pattern(&self) -> String {
        format!("{}**", self.marker)
    }

    /// Recover the entity name from a key returned by the backend.
    ///
    /// Anything in front of the namespace (a backend root such as
    /// `kv_store/`) is ignored. Returns `None` when the key does not belong to
    /// this namespace or the remainder is not a valid name.
    pub fn name_of<'a>(&self, key: &'a str) -> Option<&'a str> {
        let rest = if let Some(rest) = key.strip_prefix(&self.marker) {
            rest
        } else {
            let idx = key.find(&format!("/{}", self.marker))?;
            &key[idx + 1 + self.marker.len()..]
        };
        validate_name(rest).ok().map(|_| rest)
    }
}

pub fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.is_empty() {
        return Err(ServiceError::InvalidArgument("name must not be empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ServiceError::InvalidArgument(format!("name longer than {MAX_NAME_LEN} bytes")));
    }
    if let Some(c) = name.chars().find(|c| *c == '/' || *c == '*' || c.is_ascii_control()) {
        return Err(ServiceError::InvalidArgument(format!("name '{}' contains invalid character {c:?}", name.escape_debug())));
    }
    Ok(())
}
