use std::sync::Arc;

use crate::application::passwords;
use crate::domain::errors::DomainError;
use crate::domain::id::RecordId;
use crate::domain::personnel::{
    DeliveryPersonnel, LoginOutcome, NewPersonnel, PersonnelRole, RegisterPersonnel, TokenScope,
};
use crate::domain::ports::{CredentialIssuer, PersonnelRepository};

const TOKEN_FAILED: &str = "Not authorized, token failed";

pub struct PersonnelService {
    repo: Arc<dyn PersonnelRepository>,
    credentials: Arc<dyn CredentialIssuer>,
    bcrypt_cost: u32,
}

impl PersonnelService {
    pub fn new(
        repo: Arc<dyn PersonnelRepository>,
        credentials: Arc<dyn CredentialIssuer>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            repo,
            credentials,
            bcrypt_cost,
        }
    }

    pub fn register(&self, request: RegisterPersonnel) -> Result<DeliveryPersonnel, DomainError> {
        let required = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let (Some(name), Some(email), Some(password), Some(contact_details), Some(vehicle_type)) = (
            required(request.name),
            required(request.email).map(|e| e.to_lowercase()),
            request.password.filter(|p| !p.is_empty()),
            required(request.contact_details),
            required(request.vehicle_type),
        ) else {
            return Err(DomainError::invalid("All fields are required"));
        };

        let role = match request.role.as_deref().map(str::trim) {
            None | Some("") => PersonnelRole::default(),
            Some(raw) => raw.parse()?,
        };

        if self.repo.find_by_email(&email)?.is_some() {
            return Err(DomainError::invalid("User already exists"));
        }

        let personnel = self.repo.create(NewPersonnel {
            id: RecordId::generate(),
            name,
            email,
            password_hash: passwords::hash(&password, self.bcrypt_cost)?,
            contact_details,
            vehicle_type,
            role,
        })?;
        log::info!("Registered {} personnel {}", personnel.role, personnel.id);
        Ok(personnel)
    }

    /// Checks the password, advances the token epoch and issues a token
    /// bound to the new epoch. Earlier tokens stop working.
    pub fn login(&self, email: Option<&str>, password: Option<&str>) -> Result<LoginOutcome, DomainError> {
        let (Some(email), Some(password)) = (
            email.map(str::trim).filter(|e| !e.is_empty()),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(DomainError::invalid("Email and password are required"));
        };

        let personnel = self
            .repo
            .find_by_email(&email.to_lowercase())?
            .ok_or_else(|| {
                DomainError::Unauthorized("Invalid email! Please SignUp via Register".to_string())
            })?;

        if personnel.role != PersonnelRole::Delivery {
            log::warn!("Login refused for {} personnel {}", personnel.role, personnel.id);
            return Err(DomainError::Forbidden(
                "Access denied. Not a delivery personnel.".to_string(),
            ));
        }
        if !passwords::matches(password, &personnel.password_hash) {
            log::warn!("Wrong password for personnel {}", personnel.id);
            return Err(DomainError::Unauthorized(
                "Password does not match Username".to_string(),
            ));
        }

        let personnel = self
            .repo
            .bump_token_version(&personnel.id)?
            .ok_or_else(|| DomainError::Unauthorized("Personnel no longer exists".to_string()))?;
        let token = self.credentials.issue(
            TokenScope::Personnel,
            &personnel.id,
            personnel.token_version,
        )?;

        log::info!(
            "Personnel {} logged in (token version {})",
            personnel.id,
            personnel.token_version
        );
        Ok(LoginOutcome { personnel, token })
    }

    pub fn authenticate(&self, token: &str) -> Result<DeliveryPersonnel, DomainError> {
        let credential = self.credentials.verify(token)?;
        if credential.scope != TokenScope::Personnel {
            log::warn!("{} token presented for personnel route", credential.scope.as_str());
            return Err(DomainError::Unauthorized(TOKEN_FAILED.to_string()));
        }

        let personnel = self
            .repo
            .find_by_id(&credential.subject)?
            .ok_or_else(|| {
                log::warn!("Token for unknown personnel {}", credential.subject);
                DomainError::Unauthorized(TOKEN_FAILED.to_string())
            })?;

        if personnel.token_version != credential.token_version {
            log::warn!(
                "Superseded token for personnel {} (version {}, current {})",
                personnel.id,
                credential.token_version,
                personnel.token_version
            );
            return Err(DomainError::Unauthorized(TOKEN_FAILED.to_string()));
        }
        Ok(personnel)
    }

    pub fn list_delivery(&self) -> Result<Vec<DeliveryPersonnel>, DomainError> {
        let personnel = self.repo.list_by_role(PersonnelRole::Delivery)?;
        if personnel.is_empty() {
            return Err(DomainError::not_found("No delivery personnel found"));
        }
        Ok(personnel)
    }

    pub fn set_availability(
        &self,
        personnel: &DeliveryPersonnel,
        is_available: Option<bool>,
    ) -> Result<DeliveryPersonnel, DomainError> {
        let is_available =
            is_available.ok_or_else(|| DomainError::invalid("isAvailable must be a boolean"))?;

        let updated = self
            .repo
            .set_availability(&personnel.id, is_available)?
            .ok_or_else(|| DomainError::not_found("Delivery personnel not found"))?;
        log::info!(
            "Personnel {} is now {}",
            updated.id,
            if updated.is_available { "available" } else { "unavailable" }
        );
        Ok(updated)
    }
}
