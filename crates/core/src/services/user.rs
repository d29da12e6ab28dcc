//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use hostel_common::{AppError, AppResult, IdGenerator, config::BootstrapConfig};
use hostel_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for self-service registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(max = 32))]
    pub block: Option<String>,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Input for updating one's own profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,
}

/// Input for an admin creating a warden account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWardenInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 32))]
    pub block: String,
}

/// Trim and upper-case a block name. Blank becomes `None`.
#[must_use]
pub fn normalize_block(block: &str) -> Option<String> {
    let block = block.trim();
    if block.is_empty() {
        None
    } else {
        Some(block.to_uppercase())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn display_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be blank".to_string()));
    }
    Ok(name.to_string())
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new student.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        let block = input.block.as_deref().and_then(normalize_block);
        let user = self
            .insert(input.name, &input.email, &input.password, Role::Student, block)
            .await?;

        info!(user_id = %user.id, "Registered student");
        Ok(user)
    }

    /// Check credentials.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn authenticate(&self, input: LoginInput) -> AppResult<user::Model> {
        input.validate()?;

        let Some(user) = self.user_repo.find_by_email(&input.email).await? else {
            return Err(AppError::Unauthorized);
        };

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Update the caller's own name or email.
    pub async fn update_profile(
        &self,
        user: user::Model,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user_id = user.id.clone();
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name.as_deref() {
            active.name = Set(display_name(name)?);
        }

        if let Some(email) = input.email {
            let email = normalize_email(&email);
            if let Some(existing) = self.user_repo.find_by_email(&email).await? {
                if existing.id != user_id {
                    return Err(AppError::Conflict("Email already registered".to_string()));
                }
            }
            active.email = Set(email);
        }

        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// List users, optionally filtered by role.
    pub async fn list(&self, role: Option<Role>) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_by_role(role).await
    }

    /// Create a warden account.
    pub async fn create_warden(&self, input: CreateWardenInput) -> AppResult<user::Model> {
        input.validate()?;

        let Some(block) = normalize_block(&input.block) else {
            return Err(AppError::Validation("block must not be blank".to_string()));
        };
        let warden = self
            .insert(input.name, &input.email, &input.password, Role::Warden, Some(block))
            .await?;

        info!(user_id = %warden.id, block = ?warden.block, "Created warden");
        Ok(warden)
    }

    /// Change a user's role.
    pub async fn update_role(&self, id: &str, role: Role) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(id).await?;
        if user.role == role {
            return Ok(user);
        }

        let previous = user.role;
        let mut active: user::ActiveModel = user.into();
        active.role = Set(role);
        active.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        info!(user_id = %user.id, from = %previous, to = %role, "Changed user role");
        Ok(user)
    }

    /// Hard-delete a user. Admins cannot delete themselves.
    pub async fn delete(&self, actor: &user::Model, id: &str) -> AppResult<()> {
        if actor.id == id {
            return Err(AppError::Forbidden(
                "Admins cannot delete their own account".to_string(),
            ));
        }

        self.user_repo.delete(id).await?;
        info!(user_id = %id, deleted_by = %actor.id, "Deleted user");
        Ok(())
    }

    /// Create the configured admin if no account uses its email yet.
    pub async fn ensure_admin(&self, config: &BootstrapConfig) -> AppResult<Option<user::Model>> {
        let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
            return Ok(None);
        };

        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let name = config
            .admin_name
            .clone()
            .unwrap_or_else(|| "Administrator".to_string());
        let admin = self.insert(name, email, password, Role::Admin, None).await?;

        info!(user_id = %admin.id, "Bootstrapped admin account");
        Ok(Some(admin))
    }

    async fn insert(
        &self,
        name: String,
        email: &str,
        password: &str,
        role: Role,
        block: Option<String>,
    ) -> AppResult<user::Model> {
        let name = display_name(&name)?;
        let email = normalize_email(email);
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            email: Set(email),
            password_hash: Set(hash_password(password)?),
            role: Set(role),
            block: Set(block),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, email: &str, role: Role, password_hash: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            block: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db.into_connection())))
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[test]
    fn test_normalize_block() {
        assert_eq!(normalize_block(" b2 "), Some("B2".to_string()));
        assert_eq!(normalize_block("   "), None);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let existing = create_test_user("u1", "asha@hostel.test", Role::Student, "x");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = svc
            .register(RegisterInput {
                name: "Asha".to_string(),
                email: "Asha@Hostel.test".to_string(),
                password: "password123".to_string(),
                block: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc
            .register(RegisterInput {
                name: "Asha".to_string(),
                email: "asha@hostel.test".to_string(),
                password: "short".to_string(),
                block: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_blank_name() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc
            .register(RegisterInput {
                name: "   ".to_string(),
                email: "blank@hostel.test".to_string(),
                password: "long-enough".to_string(),
                block: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_profile_blank_name() {
        let user = create_test_user("u1", "asha@hostel.test", Role::Student, "hash");
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc
            .update_profile(
                user,
                UpdateProfileInput {
                    name: Some(" \t ".to_string()),
                    email: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_creates_student() {
        let created = create_test_user("u2", "ravi@hostel.test", Role::Student, "hash");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
        );

        let user = svc
            .register(RegisterInput {
                name: "Ravi".to_string(),
                email: "ravi@hostel.test".to_string(),
                password: "password123".to_string(),
                block: Some("c".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(user.role, Role::Student);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let hash = hash_password("right-password").unwrap();
        let user = create_test_user("u1", "asha@hostel.test", Role::Student, &hash);
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[user]]),
        );

        let unknown = svc
            .authenticate(LoginInput {
                email: "nobody@hostel.test".to_string(),
                password: "right-password".to_string(),
            })
            .await
            .unwrap_err();
        let wrong = svc
            .authenticate(LoginInput {
                email: "asha@hostel.test".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::Unauthorized));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_login_success() {
        let hash = hash_password("right-password").unwrap();
        let user = create_test_user("u1", "asha@hostel.test", Role::Student, &hash);
        let svc =
            service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]));

        let user = svc
            .authenticate(LoginInput {
                email: "asha@hostel.test".to_string(),
                password: "right-password".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.id, "u1");
    }

    #[tokio::test]
    async fn test_update_profile_email_taken() {
        let me = create_test_user("u1", "me@hostel.test", Role::Student, "x");
        let other = create_test_user("u2", "taken@hostel.test", Role::Student, "x");
        let svc =
            service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[other]]));

        let result = svc
            .update_profile(
                me,
                UpdateProfileInput {
                    name: None,
                    email: Some("taken@hostel.test".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let admin = create_test_user("a1", "admin@hostel.test", Role::Admin, "x");
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc.delete(&admin, "a1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_other_user() {
        let admin = create_test_user("a1", "admin@hostel.test", Role::Admin, "x");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]),
        );

        assert!(svc.delete(&admin, "s1").await.is_ok());
    }

    #[tokio::test]
    async fn test_create_warden_blank_block() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc
            .create_warden(CreateWardenInput {
                name: "Warden".to_string(),
                email: "w@hostel.test".to_string(),
                password: "password123".to_string(),
                block: "   ".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_ensure_admin_skips_when_unconfigured() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc.ensure_admin(&BootstrapConfig::default()).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_ensure_admin_skips_existing() {
        let existing = create_test_user("a1", "root@hostel.test", Role::Admin, "x");
        let svc =
            service(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]));

        let result = svc
            .ensure_admin(&BootstrapConfig {
                admin_name: None,
                admin_email: Some("root@hostel.test".to_string()),
                admin_password: Some("password123".to_string()),
            })
            .await
            .unwrap();

        assert!(result.is_none());
    }
}
