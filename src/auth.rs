use validator::Validate;

use crate::{
    app::{ArcUserRepository, ServiceError, ServiceResult},
    persistence::users::NewUser,
    session::{Role, SessionUser},
};

/// Work factor for bcrypt password hashing.
const BCRYPT_COST: u32 = 10;

#[derive(Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Validate)]
struct EmailValidator {
    #[validate(email)]
    email: String,
}

pub fn validate_email(email: &str) -> ServiceResult<String> {
    let validator = EmailValidator {
        email: email.trim().to_string(),
    };
    if validator.validate().is_err() {
        return ServiceError::validation("Invalid email");
    }
    Ok(validator.email)
}

#[async_trait::async_trait]
pub trait AuthService {
    /// Creates an account. The role must be one of the two known roles and
    /// is fixed for the lifetime of the account.
    async fn signup(&self, name: &str, email: &str, password: &str, role: &str)
    -> ServiceResult<()>;

    /// Authenticates by email, password and role. A wrong role is rejected
    /// with the same message as an unknown email so callers cannot learn
    /// which roles an address is registered under.
    async fn login(&self, email: &str, password: &str, role: &str)
    -> ServiceResult<SessionUser>;
}

pub struct AuthServiceImpl {
    user_repository: ArcUserRepository,
}

impl AuthServiceImpl {
    pub fn new(user_repository: ArcUserRepository) -> Self {
        Self { user_repository }
    }
}

#[async_trait::async_trait]
impl AuthService for AuthServiceImpl {
    async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> ServiceResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return ServiceError::validation("Name must not be empty");
        }
        if password.is_empty() {
            return ServiceError::validation("Password must not be empty");
        }
        let Some(role) = Role::parse(role) else {
            return ServiceError::validation("Invalid role");
        };
        let email = validate_email(email)?;

        let password_hash = bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| ServiceError::Internal(format!("failed to hash password: {}", e)))?;

        let user = NewUser {
            name: name.to_string(),
            email,
            password_hash,
            role,
        };
        let id = self.user_repository.create_user(&user).await?;
        log::info!("created {} account {} (id {})", role.as_str(), user.email, id);
        Ok(())
    }

    async fn login(&self, email: &str, password: &str, role: &str) -> ServiceResult<SessionUser> {
        // An unknown role string can never match a stored user, so it gets
        // the same rejection as an unknown email.
        let user = match Role::parse(role) {
            Some(role) => {
                self.user_repository
                    .find_by_email_and_role(email.trim(), role)
                    .await?
            }
            None => None,
        };
        let Some(user) = user else {
            log::warn!("login rejected for {}: no matching user", email);
            return ServiceError::auth_rejected("User not found");
        };

        let valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| ServiceError::Internal(format!("failed to verify password: {}", e)))?;
        if !valid {
            log::warn!("login rejected for {}: invalid password", email);
            return ServiceError::auth_rejected("Invalid password");
        }

        Ok(SessionUser {
            id: user.id,
            name: user.name,
            role: user.role,
        })
    }
}
