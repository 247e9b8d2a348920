//! Persisted OAuth tokens.
//!
//! One JSON file per account holds the access token, the refresh token and
//! the granted scopes. The file is rewritten through a temporary sibling and
//! restricted to the owner on Unix.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PeopleError, PeopleResult};

/// Access tokens are treated as expired this long before Google says so.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A stored OAuth token set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scopes: Vec<String>,
    pub last_refresh: DateTime<Utc>,
}

fn expiry_from(expires_in_secs: Option<i64>) -> Option<DateTime<Utc>> {
    expires_in_secs
        .map(|secs| Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_MARGIN_SECS))
}

impl TokenInfo {
    /// Builds a token set from a token endpoint answer.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expiry_from(expires_in_secs),
            scopes,
            last_refresh: Utc::now(),
        }
    }

    /// Returns true once the access token should no longer be used.
    ///
    /// A token without a known expiry never expires.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    /// Returns true if every scope in `required` was granted.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Replaces the access token after a refresh.
    ///
    /// Google sometimes rotates the refresh token too; a new one replaces the
    /// stored one, an absent one keeps it.
    pub fn refreshed(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        self.expires_at = expiry_from(expires_in_secs);
        self.last_refresh = Utc::now();
    }
}

/// File-backed token store with an in-memory copy.
#[derive(Debug)]
pub struct TokenStorage {
    path: PathBuf,
    tokens: RwLock<Option<TokenInfo>>,
}

impl TokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tokens: RwLock::new(None),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<TokenInfo>> {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<TokenInfo>> {
        self.tokens.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the token file into memory.
    ///
    /// Returns `Ok(false)` when there is no file yet.
    pub fn load(&self) -> PeopleResult<bool> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no token file");
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            PeopleError::configuration(format!(
                "failed to read token file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let tokens: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            PeopleError::configuration(format!(
                "failed to parse token file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), "loaded tokens");
        *self.write() = Some(tokens);
        Ok(true)
    }

    fn persist(&self, tokens: &TokenInfo) -> PeopleResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PeopleError::configuration(format!("failed to create token directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| PeopleError::internal(format!("failed to serialize tokens: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        if let Err(e) = write_private(&temp_path, content.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(PeopleError::configuration(format!(
                "failed to write token file: {}",
                e
            )));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(PeopleError::configuration(format!(
                "failed to replace token file: {}",
                e
            )));
        }

        debug!(path = %self.path.display(), "saved tokens");
        Ok(())
    }

    /// Returns a copy of the current tokens.
    pub fn get(&self) -> Option<TokenInfo> {
        self.read().clone()
    }

    /// Replaces the tokens and writes them to disk.
    pub fn set(&self, tokens: TokenInfo) -> PeopleResult<()> {
        self.persist(&tokens)?;
        *self.write() = Some(tokens);
        Ok(())
    }

    /// Records a refreshed access token and writes the result to disk.
    pub fn update_access_token(
        &self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> PeopleResult<TokenInfo> {
        let mut guard = self.write();
        let tokens = guard
            .as_mut()
            .ok_or_else(|| PeopleError::internal("no tokens to update"))?;
        tokens.refreshed(access_token, refresh_token, expires_in_secs);
        let updated = tokens.clone();
        drop(guard);

        self.persist(&updated)?;
        Ok(updated)
    }

    /// Forgets the tokens and removes the file.
    pub fn clear(&self) -> PeopleResult<()> {
        *self.write() = None;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                PeopleError::configuration(format!("failed to remove token file: {}", e))
            })?;
            info!(path = %self.path.display(), "removed stored tokens");
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if an unexpired access token is loaded.
    pub fn has_valid_tokens(&self) -> bool {
        self.read().as_ref().is_some_and(|t| !t.is_expired())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|t| t.refresh_token.as_deref().is_some_and(|r| !r.is_empty()))
    }

    /// Returns true if there are no tokens, or they lack a required scope.
    pub fn needs_reauth(&self, required_scopes: &[String]) -> bool {
        self.read()
            .as_ref()
            .is_none_or(|t| !t.has_scopes(required_scopes))
    }
}

/// Writes `content` to a fresh file readable only by the owner on Unix.
///
/// A leftover file at `path` is removed first, since the mode only applies
/// when the file is created.
fn write_private(path: &Path, content: &[u8]) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCOPE: &str = "https://www.googleapis.com/auth/contacts";

    fn storage() -> (TempDir, TokenStorage) {
        let dir = TempDir::new().unwrap();
        let storage = TokenStorage::new(dir.path().join("tokens/google-tokens-default.json"));
        (dir, storage)
    }

    #[test]
    fn fresh_token_is_not_expired() {
        let token = TokenInfo::new("access", Some("refresh".into()), Some(3600), vec![]);
        assert!(token.expires_at.is_some());
        assert!(!token.is_expired());
    }

    #[test]
    fn short_lived_token_counts_as_expired() {
        let token = TokenInfo::new("access", None, Some(30), vec![]);
        assert!(token.is_expired());
    }

    #[test]
    fn token_without_expiry_never_expires() {
        let token = TokenInfo::new("access", None, None, vec![]);
        assert!(!token.is_expired());
    }

    #[test]
    fn refresh_keeps_refresh_token_unless_rotated() {
        let mut token = TokenInfo::new("old", Some("r1".into()), Some(3600), vec![]);
        token.refreshed("new", None, Some(3600));
        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("r1"));

        token.refreshed("newer", Some("r2".into()), Some(3600));
        assert_eq!(token.refresh_token.as_deref(), Some("r2"));
    }

    #[test]
    fn save_and_reload() {
        let (_dir, storage) = storage();
        storage
            .set(TokenInfo::new(
                "access",
                Some("refresh".into()),
                Some(3600),
                vec![SCOPE.into()],
            ))
            .unwrap();
        assert!(storage.path().exists());

        let reloaded = TokenStorage::new(storage.path());
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.get().unwrap().access_token, "access");
        assert!(reloaded.has_valid_tokens());
        assert!(reloaded.has_refresh_token());
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, storage) = storage();
        storage
            .set(TokenInfo::new("access", None, None, vec![]))
            .unwrap();
        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn stale_temp_file_does_not_leak_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, storage) = storage();
        let temp = storage.path().with_extension("json.tmp");
        fs::create_dir_all(temp.parent().unwrap()).unwrap();
        fs::write(&temp, "old").unwrap();
        fs::set_permissions(&temp, fs::Permissions::from_mode(0o644)).unwrap();

        storage
            .set(TokenInfo::new("access", None, None, vec![]))
            .unwrap();
        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!temp.exists());
    }

    #[test]
    fn failed_replace_removes_temp_file() {
        let (_dir, storage) = storage();
        fs::create_dir_all(storage.path().join("occupied")).unwrap();

        let err = storage
            .set(TokenInfo::new("access", None, None, vec![]))
            .unwrap_err();
        assert!(matches!(err, PeopleError::Configuration(_)));
        assert!(!storage.path().with_extension("json.tmp").exists());
        assert!(storage.get().is_none());
    }

    #[test]
    fn missing_file_loads_nothing() {
        let (_dir, storage) = storage();
        assert!(!storage.load().unwrap());
        assert!(storage.get().is_none());
        assert!(!storage.has_valid_tokens());
    }

    #[test]
    fn corrupt_file_is_configuration_error() {
        let (_dir, storage) = storage();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "not json").unwrap();
        assert!(matches!(
            storage.load(),
            Err(PeopleError::Configuration(_))
        ));
    }

    #[test]
    fn update_requires_tokens() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage.update_access_token("a", None, None),
            Err(PeopleError::Internal(_))
        ));
    }

    #[test]
    fn update_persists() {
        let (_dir, storage) = storage();
        storage
            .set(TokenInfo::new("old", Some("refresh".into()), Some(3600), vec![]))
            .unwrap();
        let updated = storage.update_access_token("new", None, Some(3600)).unwrap();
        assert_eq!(updated.access_token, "new");

        let reloaded = TokenStorage::new(storage.path());
        reloaded.load().unwrap();
        assert_eq!(reloaded.get().unwrap().access_token, "new");
    }

    #[test]
    fn clear_removes_file() {
        let (_dir, storage) = storage();
        storage
            .set(TokenInfo::new("access", None, None, vec![]))
            .unwrap();
        storage.clear().unwrap();
        assert!(!storage.path().exists());
        assert!(storage.get().is_none());
        storage.clear().unwrap();
    }

    #[test]
    fn reauth_when_scope_missing() {
        let (_dir, storage) = storage();
        let required = vec![SCOPE.to_string()];
        assert!(storage.needs_reauth(&required));

        storage
            .set(TokenInfo::new("access", None, None, vec![SCOPE.into()]))
            .unwrap();
        assert!(!storage.needs_reauth(&required));
        assert!(storage.needs_reauth(&["https://www.googleapis.com/auth/contacts.readonly".into()]));
    }
}
