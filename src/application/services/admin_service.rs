//! Admin accounts: login, roster management and activation.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{Admin, NewAdmin};
use crate::domain::repositories::AdminRepository;
use crate::error::AppError;
use crate::utils::password::{MIN_PASSWORD_LENGTH, hash_password, verify_password};
use crate::utils::validation::normalize_email;

/// Input for registering an admin.
#[derive(Debug, Clone)]
pub struct AdminRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_super: bool,
}

pub struct AdminService<R: AdminRepository> {
    repository: Arc<R>,
}

impl<R: AdminRepository> AdminService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Checks credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown email, a wrong
    /// password or a deactivated account. The response does not reveal which.
    pub async fn login(&self, email: &str, password: &str) -> Result<Admin, AppError> {
        let invalid = || AppError::unauthorized("Invalid email or password", json!({}));

        let admin = self
            .repository
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &admin.password_hash) || !admin.is_active {
            tracing::warn!(admin_id = admin.id, "Admin login rejected");
            return Err(invalid());
        }

        Ok(admin)
    }

    pub async fn get(&self, id: i64) -> Result<Admin, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Admin not found", json!({"id": id})))
    }

    /// Loads the admin behind a session, refusing deactivated accounts.
    pub async fn ensure_active(&self, id: i64) -> Result<Admin, AppError> {
        let admin = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unauthorized", json!({})))?;

        if !admin.is_active {
            return Err(AppError::forbidden(
                "Account is deactivated",
                json!({"admin_id": id}),
            ));
        }

        Ok(admin)
    }

    /// Registers an admin without an acting admin (operator CLI bootstrap).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a short password and
    /// [`AppError::Conflict`] if the email is taken.
    pub async fn register(&self, registration: AdminRegistration) -> Result<Admin, AppError> {
        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::bad_request(
                "Password too short",
                json!({"min_length": MIN_PASSWORD_LENGTH}),
            ));
        }

        let email = normalize_email(&registration.email);
        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(
                "Email already registered",
                json!({"email": email}),
            ));
        }

        let admin = self
            .repository
            .create(NewAdmin {
                name: registration.name.trim().to_string(),
                email,
                password_hash: hash_password(&registration.password)?,
                is_super: registration.is_super,
            })
            .await?;

        tracing::info!(admin_id = admin.id, is_super = admin.is_super, "Admin created");
        Ok(admin)
    }

    /// Creates an admin on behalf of `actor_id`, who must be a super admin.
    pub async fn create_admin(
        &self,
        actor_id: i64,
        registration: AdminRegistration,
    ) -> Result<Admin, AppError> {
        self.require_super(actor_id).await?;
        self.register(registration).await
    }

    pub async fn list_admins(&self) -> Result<Vec<Admin>, AppError> {
        self.repository.list().await
    }

    /// Activates or deactivates another admin. Super admins only.
    ///
    /// # Errors
    ///
    /// - [`AppError::Forbidden`] if the actor is not a super admin
    /// - [`AppError::Validation`] if the actor targets their own account
    /// - [`AppError::NotFound`] if the target does not exist
    pub async fn set_admin_active(
        &self,
        actor_id: i64,
        target_id: i64,
        is_active: bool,
    ) -> Result<Admin, AppError> {
        self.require_super(actor_id).await?;

        if actor_id == target_id {
            return Err(AppError::bad_request(
                "Cannot change your own status",
                json!({"id": target_id}),
            ));
        }

        self.get(target_id).await?;
        let admin = self.repository.set_active(target_id, is_active).await?;

        tracing::info!(actor_id, target_id, is_active, "Admin status changed");
        Ok(admin)
    }

    async fn require_super(&self, actor_id: i64) -> Result<(), AppError> {
        let actor = self.get(actor_id).await?;
        if !actor.is_super {
            return Err(AppError::forbidden(
                "Super admin privileges required",
                json!({}),
            ));
        }
        Ok(())
    }
}
