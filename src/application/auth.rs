use std::path::PathBuf;

use super::AppError;

/// Credential verification seam. The shipped implementation is a fixed
/// username/password pair; a real provider can slot in behind the same trait
/// without touching anything else.
pub trait CredentialCheck {
    fn verify(&self, username: &str, password: &str) -> bool;
}

pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new("Admin", "123456")
    }
}

impl CredentialCheck for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Process-wide login flag, persisted as a marker file so it survives between
/// CLI invocations.
pub struct Session {
    path: PathBuf,
}

impl Session {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn state(&self) -> SessionState {
        if self.path.exists() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Verify the credentials and mark the session authenticated.
    pub fn login(
        &self,
        check: &impl CredentialCheck,
        username: &str,
        password: &str,
    ) -> Result<(), AppError> {
        if !check.verify(username, password) {
            return Err(AppError::InvalidCredentials);
        }
        std::fs::write(&self.path, "authenticated\n")?;
        Ok(())
    }

    pub fn logout(&self) -> Result<(), AppError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (Session, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        (Session::at(dir.path().join("saldo.session")), dir)
    }

    #[test]
    fn test_login_logout_cycle() {
        let (session, _dir) = session();
        let check = StaticCredentials::default();

        assert_eq!(session.state(), SessionState::Unauthenticated);
        session.login(&check, "Admin", "123456").unwrap();
        assert_eq!(session.state(), SessionState::Authenticated);
        session.logout().unwrap();
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_wrong_credentials_rejected() {
        let (session, _dir) = session();
        let check = StaticCredentials::default();

        let result = session.login(&check, "Admin", "wrong");
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_logout_without_login_is_fine() {
        let (session, _dir) = session();
        session.logout().unwrap();
    }
}
