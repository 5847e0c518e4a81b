//! Admin session context: the bearer token in memory plus its on-disk copy.
//! Read once at startup, written on login, removed on logout or a 401.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use util::paths::ensure_parent_dir;

#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Persists the admin token in a single file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// A missing or blank file means "no token".
    pub fn load(&self) -> Result<Option<AuthToken>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| AuthToken::new(token)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    pub fn save(&self, token: &AuthToken) -> Result<(), SessionError> {
        ensure_parent_dir(&self.path).map_err(|e| self.io_err(e))?;
        fs::write(&self.path, token.as_str()).map_err(|e| self.io_err(e))
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    store: TokenStore,
    token: Option<AuthToken>,
}

impl Session {
    /// Starts from whatever token the store holds.
    pub fn init(store: TokenStore) -> Result<Self, SessionError> {
        let token = store.load()?;
        Ok(Self { store, token })
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    pub fn begin(&mut self, token: AuthToken) -> Result<(), SessionError> {
        self.store.save(&token)?;
        self.token = Some(token);
        Ok(())
    }

    /// Forgets the token. Memory is cleared even if removing the file fails.
    pub fn end(&mut self) -> Result<(), SessionError> {
        self.token = None;
        self.store.clear()
    }
}
