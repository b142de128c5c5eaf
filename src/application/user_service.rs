use std::sync::Arc;

use validator::Validate;

use crate::application::passwords;
use crate::domain::errors::DomainError;
use crate::domain::id::RecordId;
use crate::domain::personnel::TokenScope;
use crate::domain::ports::{CredentialIssuer, UserRepository};
use crate::domain::user::{Gender, NewUser, Signup, User, UserLogin, UserRole};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    credentials: Arc<dyn CredentialIssuer>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        credentials: Arc<dyn CredentialIssuer>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            repo,
            credentials,
            bcrypt_cost,
        }
    }

    pub fn signup(&self, mut request: Signup) -> Result<User, DomainError> {
        request.first_name = request.first_name.trim().to_string();
        request.email = request.email.trim().to_lowercase();
        request
            .validate()
            .map_err(|e| DomainError::invalid(e.to_string()))?;

        let role: UserRole = request.role.trim().parse()?;
        let gender = request
            .gender
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::parse::<Gender>)
            .transpose()?;
        let last_name = request
            .last_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if self.repo.find_by_email(&request.email)?.is_some() {
            return Err(DomainError::invalid(format!(
                "Email {} is already registered",
                request.email
            )));
        }

        let user = self.repo.create(NewUser {
            id: RecordId::generate(),
            first_name: request.first_name,
            last_name,
            password_hash: passwords::hash(&request.password, self.bcrypt_cost)?,
            email: request.email,
            role,
            gender,
        })?;
        log::info!("User {} signed up as {}", user.id, user.role.as_str());
        Ok(user)
    }

    /// Unknown email, wrong password and missing fields all fail with the
    /// same `Invalid credentials` error.
    pub fn login(&self, email: Option<&str>, password: Option<&str>) -> Result<UserLogin, DomainError> {
        let invalid = || DomainError::invalid(INVALID_CREDENTIALS);

        let email = email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or_else(invalid)?;
        let password = password.filter(|p| !p.is_empty()).ok_or_else(invalid)?;

        let Some(user) = self.repo.find_by_email(&email)? else {
            log::warn!("Login attempt for unknown user email");
            return Err(invalid());
        };
        if !passwords::matches(password, &user.password_hash) {
            log::warn!("Wrong password for user {}", user.id);
            return Err(invalid());
        }

        let token = self.credentials.issue(TokenScope::User, &user.id, 0)?;
        log::info!("User {} logged in", user.id);
        Ok(UserLogin { user, token })
    }
}
