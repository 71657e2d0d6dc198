//! Test auth service: an in-memory `AuthService`.

use std::sync::Mutex;

use academy_core::error::DomainError;
use academy_core::repository::AuthService;
use academy_core::user::{AuthOutcome, Credentials, User};
use async_trait::async_trait;

/// Accepts a fixed set of `(user, secret)` accounts. Registration appends to
/// the set; reset replaces a secret.
#[derive(Debug, Default)]
pub struct StaticAuthService {
    accounts: Mutex<Vec<(User, String)>>,
}

impl StaticAuthService {
    /// Create a service knowing `accounts`.
    #[must_use]
    pub fn new(accounts: Vec<(User, String)>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
        }
    }
}

#[async_trait]
impl AuthService for StaticAuthService {
    async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome, DomainError> {
        let accounts = self.accounts.lock().unwrap();
        let found = accounts.iter().find(|(user, secret)| {
            user.email == credentials.identifier
                && *secret == credentials.secret
                && user.role == credentials.role
        });
        Ok(match found {
            Some((user, _)) => AuthOutcome::accepted(Some(user.clone())),
            None => AuthOutcome::rejected("invalid credentials"),
        })
    }

    async fn register(
        &self,
        name: &str,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, DomainError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts
            .iter()
            .any(|(user, _)| user.email == credentials.identifier)
        {
            return Ok(AuthOutcome::rejected("account already exists"));
        }
        let user = User {
            id: format!("user-{}", accounts.len() + 1),
            name: name.to_owned(),
            email: credentials.identifier.clone(),
            role: credentials.role,
        };
        accounts.push((user.clone(), credentials.secret.clone()));
        Ok(AuthOutcome::accepted(Some(user)))
    }

    async fn reset_password(&self, credentials: &Credentials) -> Result<AuthOutcome, DomainError> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts
            .iter_mut()
            .find(|(user, _)| user.email == credentials.identifier)
        {
            Some((_, secret)) => {
                secret.clone_from(&credentials.secret);
                Ok(AuthOutcome::accepted(None))
            }
            None => Ok(AuthOutcome::rejected("no such account")),
        }
    }
}
