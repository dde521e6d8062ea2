//! Identifiers, timestamps and storage scope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier used for surveys, categories, prompts and runs.
pub type Id = String;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Generates a fresh run id of the form `r_<base36 millis>_<random>`.
///
/// The millisecond prefix keeps ids roughly sortable by creation time;
/// the random suffix keeps them unique within the same millisecond.
pub fn new_run_id(now: Timestamp) -> Id {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("r_{}_{}", to_base36(now), &suffix[..8])
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

/// Which owner's bucket a repository call reads from and writes to.
///
/// Passed explicitly into every repository call; there is no process-wide
/// "active user".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "uid")]
pub enum OwnerScope {
    /// Signed out, or identity still loading.
    #[default]
    Anonymous,
    /// A specific authenticated identity.
    User(String),
}

impl OwnerScope {
    /// Build a scope from an optional uid. Blank uids map to [`OwnerScope::Anonymous`].
    pub fn from_uid(uid: Option<&str>) -> Self {
        match uid.map(str::trim) {
            Some(uid) if !uid.is_empty() => OwnerScope::User(uid.to_string()),
            _ => OwnerScope::Anonymous,
        }
    }

    /// The uid, if this is an authenticated scope.
    pub fn uid(&self) -> Option<&str> {
        match self {
            OwnerScope::Anonymous => None,
            OwnerScope::User(uid) => Some(uid),
        }
    }

    /// Key naming this scope's storage bucket (`anon` or the trimmed uid).
    pub fn bucket_key(&self) -> &str {
        match self {
            OwnerScope::User(uid) if !uid.trim().is_empty() => uid.trim(),
            _ => "anon",
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.uid().is_none_or(|uid| uid.trim().is_empty())
    }
}

impl fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerScope::Anonymous => write!(f, "anonymous"),
            OwnerScope::User(uid) => write!(f, "user:{}", uid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_format() {
        let id = new_run_id(1_700_000_000_000);
        assert!(id.starts_with("r_"));
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_run_ids_are_unique() {
        let a = new_run_id(42);
        let b = new_run_id(42);
        assert_ne!(a, b);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_scope_from_uid() {
        assert_eq!(OwnerScope::from_uid(None), OwnerScope::Anonymous);
        assert_eq!(OwnerScope::from_uid(Some("  ")), OwnerScope::Anonymous);
        assert_eq!(
            OwnerScope::from_uid(Some(" u1 ")),
            OwnerScope::User("u1".to_string())
        );
    }

    #[test]
    fn test_bucket_key() {
        assert_eq!(OwnerScope::Anonymous.bucket_key(), "anon");
        assert_eq!(OwnerScope::User("abc".to_string()).bucket_key(), "abc");
        assert_eq!(OwnerScope::User("   ".to_string()).bucket_key(), "anon");
        assert!(OwnerScope::User(" ".to_string()).is_anonymous());
    }
}
