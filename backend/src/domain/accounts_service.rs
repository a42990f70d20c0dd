//! Account registration and login flows.

use std::sync::Arc;

use super::error::DomainError;
use super::ports::{Loaded, PasswordHasher, StorageError, UserRepository};
use super::user::{self, UserRecord, Username};

/// Single generic failure message for unknown user or wrong password, so
/// login responses do not reveal which half was wrong.
pub const LOGIN_FAILED: &str = "Login failed, please check your username or password.";

/// Registration request as collected by the inbound adapter.
#[derive(Debug, Clone)]
pub struct RegisterAccount {
    /// Requested username, any case.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Confirmation field; must match the password exactly.
    pub confirm_password: String,
}

/// Outcome of a successful registration or login.
#[derive(Debug, Clone)]
pub struct AccountSession {
    /// Normalised username.
    pub username: Username,
    /// Degradation notice from the users-table read, if any.
    pub warning: Option<String>,
}

/// Account service owning the users dataset flows.
pub struct AccountsService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountsService {
    /// Create a service over the given repository and hasher.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Register a new account. Password policy and confirmation run before
    /// any read; the username conflict check is case-insensitive.
    pub fn register(&self, request: RegisterAccount) -> Result<AccountSession, DomainError> {
        user::check_password(&request.password, &request.confirm_password)
            .map_err(|err| DomainError::validation(err.to_string()))?;
        let username =
            Username::new(&request.username).map_err(|err| DomainError::validation(err.to_string()))?;

        let Loaded { rows, warning } = self.users.load();
        if rows.iter().any(|row| row.username == username) {
            return Err(DomainError::conflict("The username is already taken."));
        }

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(|err| DomainError::internal(err.to_string()))?;
        let record = UserRecord {
            username: username.clone(),
            password_hash,
        };
        self.users.append(&record).map_err(map_storage)?;
        Ok(AccountSession { username, warning })
    }

    /// Authenticate a username/password pair, returning the normalised
    /// username on success.
    pub fn login(&self, username: &str, password: &str) -> Result<AccountSession, DomainError> {
        let Ok(username) = Username::new(username) else {
            return Err(DomainError::unauthorized(LOGIN_FAILED));
        };

        let Loaded { rows, warning } = self.users.load();
        let known = rows
            .iter()
            .find(|row| row.username == username)
            .ok_or_else(|| DomainError::unauthorized(LOGIN_FAILED))?;
        if self.hasher.verify(password, &known.password_hash) {
            Ok(AccountSession { username, warning })
        } else {
            Err(DomainError::unauthorized(LOGIN_FAILED))
        }
    }
}

pub(crate) fn map_storage(err: StorageError) -> DomainError {
    DomainError::storage(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::test_support::{MemoryUserRepository, PlainHasher};
    use rstest::rstest;

    fn service() -> AccountsService {
        AccountsService::new(Arc::new(MemoryUserRepository::default()), Arc::new(PlainHasher))
    }

    fn register_request(username: &str, password: &str) -> RegisterAccount {
        RegisterAccount {
            username: username.to_owned(),
            password: password.to_owned(),
            confirm_password: password.to_owned(),
        }
    }

    #[test]
    fn registration_then_login_round_trips() {
        let accounts = service();
        let registered = accounts
            .register(register_request("Alice", "Abcde1"))
            .expect("registration succeeds");
        assert_eq!(registered.username.as_str(), "alice");
        assert_eq!(registered.warning, None);

        let logged_in = accounts.login("ALICE", "Abcde1").expect("login succeeds");
        assert_eq!(logged_in.username.as_str(), "alice");
        assert_eq!(logged_in.warning, None);
    }

    #[test]
    fn degraded_users_read_is_reported_to_the_caller() {
        let mut repo = MemoryUserRepository::default();
        repo.warning = Some("users dataset could not be read; starting empty".to_owned());
        let accounts = AccountsService::new(Arc::new(repo), Arc::new(PlainHasher));

        let registered = accounts
            .register(register_request("alice", "Abcde1"))
            .expect("registration succeeds");
        assert_eq!(
            registered.warning.as_deref(),
            Some("users dataset could not be read; starting empty")
        );

        let logged_in = accounts.login("alice", "Abcde1").expect("login succeeds");
        assert_eq!(
            logged_in.warning.as_deref(),
            Some("users dataset could not be read; starting empty")
        );
    }

    #[test]
    fn username_conflict_is_case_insensitive() {
        let accounts = service();
        accounts
            .register(register_request("Alice", "Abcde1"))
            .expect("first registration succeeds");
        let err = accounts
            .register(register_request("alice", "Fghij2"))
            .expect_err("second registration conflicts");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case("abcdef")]
    #[case("ABCDE1")]
    #[case("Ab1")]
    fn weak_password_rejected_before_any_write(#[case] password: &str) {
        let repo = Arc::new(MemoryUserRepository::default());
        let accounts = AccountsService::new(repo.clone(), Arc::new(PlainHasher));
        let err = accounts
            .register(register_request("alice", password))
            .expect_err("weak password rejected");
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(repo.load().rows.is_empty(), "no user row written");
    }

    #[test]
    fn wrong_password_and_unknown_user_share_one_message() {
        let accounts = service();
        accounts
            .register(register_request("alice", "Abcde1"))
            .expect("registration succeeds");

        let wrong = accounts.login("alice", "Xyzzy9").expect_err("wrong password");
        let unknown = accounts.login("nobody", "Abcde1").expect_err("unknown user");
        assert_eq!(wrong.message(), LOGIN_FAILED);
        assert_eq!(unknown.message(), LOGIN_FAILED);
        assert_eq!(wrong.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn mismatched_confirmation_is_a_validation_error() {
        let accounts = service();
        let err = accounts
            .register(RegisterAccount {
                username: "alice".to_owned(),
                password: "Abcde1".to_owned(),
                confirm_password: "Abcde2".to_owned(),
            })
            .expect_err("mismatch rejected");
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }
}
