//! User service for member management

use std::sync::Arc;

use chrono::Utc;

use crate::domain::user::{User, UserDetails, UserId, UserRepository};
use crate::domain::{DomainError, ResultExt};

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Request for replacing a user's fields
#[derive(Clone)]
pub struct UpdateUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

impl std::fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

/// User service for member management
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Validate, hash and store a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserId, DomainError> {
        let details = UserDetails::new(request.username, request.password, request.email)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let password_hash = self.hasher.hash(details.password())?;

        self.repository
            .create(&details.into_new_user(password_hash))
            .await
            .context("create user")
    }

    /// Get a user by ID
    pub async fn get(&self, id: UserId) -> Result<User, DomainError> {
        self.repository
            .get(id)
            .await
            .context("get user")?
            .ok_or_else(|| DomainError::user_not_found(format!("user {} not found", id)))
    }

    /// Replace username, password and email
    ///
    /// The new password goes through the same rules and hashing as on create.
    pub async fn update(&self, id: UserId, request: UpdateUserRequest) -> Result<(), DomainError> {
        let details = UserDetails::new(request.username, request.password, request.email)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let password_hash = self.hasher.hash(details.password())?;

        let updated = self
            .repository
            .update(id, &details.into_new_user(password_hash), Utc::now())
            .await
            .context("update user")?;

        if !updated {
            return Err(DomainError::user_not_found(format!("user {} not found", id)));
        }

        Ok(())
    }

    /// Delete a user
    pub async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        let deleted = self.repository.delete(id).await.context("delete user")?;

        if !deleted {
            return Err(DomainError::user_not_found(format!("user {} not found", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::MockUserRepository;
    use crate::domain::ErrorKind;
    use crate::infrastructure::in_memory::InMemoryLibraryStore;
    use crate::infrastructure::user::password::Argon2Hasher;

    fn create_service() -> UserService<InMemoryLibraryStore, Argon2Hasher> {
        let repository = Arc::new(InMemoryLibraryStore::new());
        let hasher = Arc::new(Argon2Hasher::new());
        UserService::new(repository, hasher)
    }

    fn make_request(username: &str, password: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_stores_hash_only() {
        let service = create_service();

        let id = service
            .create(make_request("reader", "secret", "reader@email.com"))
            .await
            .unwrap();

        let user = service.get(id).await.unwrap();
        assert_eq!(user.username(), "reader");
        assert_eq!(user.email(), "reader@email.com");
        assert_ne!(user.password_hash(), "secret");
        assert!(Argon2Hasher::new().verify("secret", user.password_hash()));
    }

    #[tokio::test]
    async fn test_create_user_short_password() {
        let service = create_service();

        let err = service
            .create(make_request("reader", "short", "reader@email.com"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_user_long_password() {
        let service = create_service();

        let err = service
            .create(make_request("reader", &"p".repeat(73), "reader@email.com"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_user_invalid_email() {
        let service = create_service();

        let err = service
            .create(make_request("reader", "secret", "a.b.com"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_duplicate_username() {
        let service = create_service();

        service
            .create(make_request("reader", "secret", "reader@email.com"))
            .await
            .unwrap();

        let err = service
            .create(make_request("reader", "secret", "other@email.com"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_invalid_user_never_reaches_repository() {
        let mut repository = MockUserRepository::new();
        repository.expect_create().never();

        let service = UserService::new(Arc::new(repository), Arc::new(Argon2Hasher::new()));
        let err = service
            .create(make_request("has space", "secret", "reader@email.com"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_repository_never_sees_plaintext() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_create()
            .withf(|user| user.password_hash() != "secret" && user.password_hash().starts_with("$argon2"))
            .times(1)
            .returning(|_| Ok(UserId::new(1).unwrap()));

        let service = UserService::new(Arc::new(repository), Arc::new(Argon2Hasher::new()));
        let id = service
            .create(make_request("reader", "secret", "reader@email.com"))
            .await
            .unwrap();

        assert_eq!(id.as_i64(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let service = create_service();

        let err = service.get(UserId::new(5).unwrap()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserNotFound);
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password() {
        let service = create_service();
        let id = service
            .create(make_request("reader", "secret", "reader@email.com"))
            .await
            .unwrap();

        service
            .update(
                id,
                UpdateUserRequest {
                    username: "reader2".to_string(),
                    password: "another-secret".to_string(),
                    email: "reader2@email.com".to_string(),
                },
            )
            .await
            .unwrap();

        let user = service.get(id).await.unwrap();
        let hasher = Argon2Hasher::new();
        assert_eq!(user.username(), "reader2");
        assert!(hasher.verify("another-secret", user.password_hash()));
        assert!(!hasher.verify("secret", user.password_hash()));
        assert!(user.updated_at().is_some());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let service = create_service();

        let err = service
            .update(
                UserId::new(3).unwrap(),
                UpdateUserRequest {
                    username: "reader".to_string(),
                    password: "secret".to_string(),
                    email: "reader@email.com".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UserNotFound);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let service = create_service();
        let id = service
            .create(make_request("reader", "secret", "reader@email.com"))
            .await
            .unwrap();

        service.delete(id).await.unwrap();

        let err = service.delete(id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserNotFound);
    }

    #[test]
    fn test_request_debug_redacts_password() {
        let request = make_request("reader", "secret", "reader@email.com");
        let debug = format!("{:?}", request);

        assert!(debug.contains("reader"));
        assert!(!debug.contains("secret"));
    }
}
