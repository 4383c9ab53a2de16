//! Admin token storage and claim inspection.
//!
//! The token is kept in a plain file that plays the part of browser local
//! storage. Claims are decoded without verifying the signature: the result is
//! only used to decide what to *show*, and the service authorizes every
//! mutating call on its own.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Claims carried in an admin token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Login name of the token holder.
    #[serde(default)]
    pub username: Option<String>,
    /// Role assigned at login.
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_type: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub exp: Option<i64>,
}

/// Accept any JSON scalar for a text claim; other shapes become `None`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
        _ => None,
    })
}

/// Accept integer or fractional seconds; fractions are truncated.
#[allow(clippy::cast_possible_truncation)]
fn lenient_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|secs| secs as i64)),
        _ => None,
    })
}

/// Decode one base64url token segment as JSON.
fn decode_segment(segment: &str) -> Result<Value> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| Error::token_payload(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::token_payload(e.to_string()))
}

impl Claims {
    /// Decode the payload segment of a dotted token without verifying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not have three segments, or if the
    /// payload is not base64url-encoded JSON.
    pub fn decode_unverified(token: &str) -> Result<Self> {
        let segments: Vec<&str> = token.trim().split('.').collect();
        let [_, payload, _] = segments.as_slice() else {
            return Err(Error::token_format(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };

        serde_json::from_value(decode_segment(payload)?)
            .map_err(|e| Error::token_payload(e.to_string()))
    }

    /// Expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Whether the token expired before `now`. Tokens without `exp` never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    /// Whether these claims belong to `privileged_username`.
    #[must_use]
    pub fn is_user(&self, privileged_username: &str) -> bool {
        self.username.as_deref() == Some(privileged_username)
    }
}

/// Decide whether `token` belongs to the privileged user.
///
/// Only the `username` field of the second segment is consulted; the
/// signature and every other claim are ignored. Any decoding problem yields
/// `false`.
#[must_use]
pub fn is_privileged(token: Option<&str>, privileged_username: &str) -> bool {
    let Some(payload) = token.and_then(|t| t.trim().split('.').nth(1)) else {
        return false;
    };
    match decode_segment(payload) {
        Ok(value) => value.get("username").and_then(Value::as_str) == Some(privileged_username),
        Err(e) => {
            debug!("Treating undecodable token as unprivileged: {e}");
            false
        }
    }
}

/// File-backed store for the admin token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token. A missing or blank file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or file cannot be written.
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        std::fs::write(&self.path, token.trim())?;
        restrict_permissions(&self.path)?;
        debug!("Saved admin token to {}", self.path.display());
        Ok(())
    }

    /// Remove the stored token. Returns whether a token was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Build an unsigned token carrying `claims`. Test helper.
#[cfg(test)]
pub(crate) fn unsigned_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_decode_claims() {
        let token = unsigned_token(&json!({
            "username": "Paul",
            "user_type": "Paul",
            "exp": 1_700_000_000
        }));
        let claims = Claims::decode_unverified(&token).unwrap();

        assert_eq!(claims.username.as_deref(), Some("Paul"));
        assert_eq!(claims.user_type.as_deref(), Some("Paul"));
        assert_eq!(claims.exp, Some(1_700_000_000));
    }

    #[test]
    fn test_decode_tolerates_padding() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"username":"Al"}"#);
        assert!(payload.ends_with('='));
        let token = format!("h.{payload}.s");

        let claims = Claims::decode_unverified(&token).unwrap();
        assert_eq!(claims.username.as_deref(), Some("Al"));
    }

    #[test]
    fn test_decode_wrong_segment_count() {
        let err = Claims::decode_unverified("onlyone").unwrap_err();
        assert!(matches!(err, Error::TokenFormat(_)));

        let err = Claims::decode_unverified("a.b.c.d").unwrap_err();
        assert!(matches!(err, Error::TokenFormat(_)));
    }

    #[test]
    fn test_decode_bad_payload() {
        let err = Claims::decode_unverified("a.!!!.c").unwrap_err();
        assert!(matches!(err, Error::TokenPayload(_)));

        let not_json = URL_SAFE_NO_PAD.encode("plain text");
        let err = Claims::decode_unverified(&format!("a.{not_json}.c")).unwrap_err();
        assert!(matches!(err, Error::TokenPayload(_)));
    }

    #[test]
    fn test_is_privileged() {
        let paul = unsigned_token(&json!({"username": "Paul"}));
        let other = unsigned_token(&json!({"username": "Meera"}));

        assert!(is_privileged(Some(&paul), "Paul"));
        assert!(!is_privileged(Some(&other), "Paul"));
        assert!(!is_privileged(Some(&paul), "paul"));
        assert!(!is_privileged(None, "Paul"));
        assert!(!is_privileged(Some("garbage"), "Paul"));
    }

    #[test]
    fn test_is_privileged_ignores_other_claims() {
        let fractional_exp = unsigned_token(&json!({"username": "Paul", "exp": 1_700_000_000.5}));
        let numeric_role = unsigned_token(&json!({"username": "Paul", "user_type": 3}));
        let nested_role = unsigned_token(&json!({"username": "Paul", "user_type": {"a": 1}}));

        assert!(is_privileged(Some(&fractional_exp), "Paul"));
        assert!(is_privileged(Some(&numeric_role), "Paul"));
        assert!(is_privileged(Some(&nested_role), "Paul"));
    }

    #[test]
    fn test_is_privileged_two_segment_token() {
        let token = unsigned_token(&json!({"username": "Paul"}));
        let (header_and_payload, _signature) = token.rsplit_once('.').unwrap();

        assert!(is_privileged(Some(header_and_payload), "Paul"));
        assert!(!is_privileged(Some("header-only"), "Paul"));
    }

    #[test]
    fn test_is_privileged_non_string_username() {
        let token = unsigned_token(&json!({"username": 7}));
        assert!(!is_privileged(Some(&token), "7"));
    }

    #[test]
    fn test_decode_lenient_claim_types() {
        let token = unsigned_token(&json!({
            "username": "Paul",
            "user_type": 3,
            "exp": 1_700_000_000.5
        }));
        let claims = Claims::decode_unverified(&token).unwrap();

        assert_eq!(claims.username.as_deref(), Some("Paul"));
        assert_eq!(claims.user_type.as_deref(), Some("3"));
        assert_eq!(claims.exp, Some(1_700_000_000));
    }

    #[test]
    fn test_is_privileged_without_username_claim() {
        let token = unsigned_token(&json!({"user_type": "admin"}));
        assert!(!is_privileged(Some(&token), "Paul"));
    }

    #[test]
    fn test_expiry() {
        let claims = Claims {
            exp: Some(1_700_000_000),
            ..Claims::default()
        };
        let before = Utc.timestamp_opt(1_699_999_999, 0).unwrap();
        let after = Utc.timestamp_opt(1_700_000_001, 0).unwrap();

        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_000_000);
        assert!(!claims.is_expired_at(before));
        assert!(claims.is_expired_at(after));
        assert!(!Claims::default().is_expired_at(after));
    }

    #[test]
    fn test_store_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("admin_token"));

        assert_eq!(store.load().unwrap(), None);
        store.save("abc.def.ghi\n").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def.ghi"));

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_store_blank_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("admin_token");
        std::fs::write(&path, "  \n").unwrap();

        assert_eq!(TokenStore::new(&path).load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("admin_token"));
        store.save("a.b.c").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
