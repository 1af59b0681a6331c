//! Path segment matching.
//!
//! # Responsibilities
//! - Validate the identifier captured from an item path
//! - Validate and normalize the path a resource is mounted at
//!
//! # Design Decisions
//! - Identifiers are ASCII alphanumeric; an empty capture is the collection
//! - No regex to guarantee O(n) matching
//! - Mount paths are case-sensitive and never end in `/` (except the root)

use thiserror::Error;

/// A path segment that cannot address a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid resource identifier: {0:?}")]
pub struct InvalidIdentifier(pub String);

/// A mount path that cannot host a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid mount path {path:?}: {reason}")]
pub struct InvalidMountPath {
    pub path: String,
    pub reason: &'static str,
}

/// Turn a captured path segment into an identifier.
///
/// `Ok(None)` means the collection was addressed.
pub fn capture_identifier(segment: &str) -> Result<Option<String>, InvalidIdentifier> {
    if segment.is_empty() {
        return Ok(None);
    }
    if segment.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(Some(segment.to_string()))
    } else {
        Err(InvalidIdentifier(segment.to_string()))
    }
}

/// Normalize a mount path: leading `/`, no trailing `/`, segments made of
/// ASCII alphanumerics, `-` and `_`.
pub fn normalize_mount_path(path: &str) -> Result<String, InvalidMountPath> {
    let invalid = |reason| InvalidMountPath {
        path: path.to_string(),
        reason,
    };

    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok("/".to_string());
    }

    for segment in trimmed[1..].split('/') {
        if segment.is_empty() {
            return Err(invalid("empty path segment"));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid("segments may only contain alphanumerics, '-' and '_'"));
        }
    }

    Ok(trimmed.to_string())
}

/// Join a mount path and an identifier into the item's path.
pub fn item_path(mount: &str, id: &str) -> String {
    format!("{}/{}", mount.trim_end_matches('/'), id)
}
