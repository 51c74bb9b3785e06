//! DTOs for customer accounts and the address book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{Address, NewAddress, UpdateAddress, UpdateUser, User};
use crate::utils::validation::{PINCODE_RE, normalize_email};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            phone: u.phone,
            name: u.name,
            email: u.email,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

/// Profile update. `null` clears a field, an absent field is left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
}

impl UpdateProfileRequest {
    /// Field errors for values that are present but malformed.
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = validator::ValidationErrors::new();

        if let Some(Some(name)) = &self.name
            && (name.trim().is_empty() || name.chars().count() > 100)
        {
            errors.add("name", validator::ValidationError::new("length"));
        }

        if let Some(Some(email)) = &self.email
            && !validator::ValidateEmail::validate_email(email)
        {
            let mut error = validator::ValidationError::new("email");
            error.message = Some("Invalid email".into());
            errors.add("email", error);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<UpdateProfileRequest> for UpdateUser {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name.map(|n| n.map(|n| n.trim().to_string())),
            email: req.email.map(|e| e.map(|e| normalize_email(&e))),
        }
    }
}

// ─── Addresses ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub id: i64,
    pub label: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Address> for AddressResponse {
    fn from(a: Address) -> Self {
        Self {
            id: a.id,
            label: a.label,
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            state: a.state,
            pincode: a.pincode,
            latitude: a.latitude,
            longitude: a.longitude,
            is_default: a.is_default,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddressListResponse {
    pub items: Vec<AddressResponse>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddressRequest {
    #[validate(length(min = 1, max = 50))]
    pub label: String,
    #[validate(length(min = 1, max = 200))]
    pub line1: String,
    #[validate(length(max = 200))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(regex(path = "*PINCODE_RE", message = "Pincode must be 4 to 10 digits"))]
    pub pincode: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
}

impl CreateAddressRequest {
    pub fn into_new_address(self, user_id: i64) -> NewAddress {
        NewAddress {
            user_id,
            label: self.label.trim().to_string(),
            line1: self.line1,
            line2: self.line2,
            city: self.city,
            state: self.state,
            pincode: self.pincode,
            latitude: self.latitude,
            longitude: self.longitude,
            is_default: self.is_default,
        }
    }
}

/// Partial address update. `line2`, `latitude` and `longitude` accept `null`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAddressRequest {
    #[validate(length(min = 1, max = 50))]
    pub label: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub line1: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub line2: Option<Option<String>>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,
    #[validate(regex(path = "*PINCODE_RE", message = "Pincode must be 4 to 10 digits"))]
    pub pincode: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub longitude: Option<Option<f64>>,
}

impl UpdateAddressRequest {
    fn coordinates_in_range(&self) -> bool {
        let lat_ok = !matches!(self.latitude, Some(Some(lat)) if !(-90.0..=90.0).contains(&lat));
        let lng_ok =
            !matches!(self.longitude, Some(Some(lng)) if !(-180.0..=180.0).contains(&lng));
        lat_ok && lng_ok
    }

    /// Runs the derived field rules plus the coordinate range check.
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => validator::ValidationErrors::new(),
            Err(errors) => errors,
        };

        if !self.coordinates_in_range() {
            errors.add(
                "coordinates",
                validator::ValidationError::new("range")
                    .with_message("Coordinates out of range".into()),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<UpdateAddressRequest> for UpdateAddress {
    fn from(req: UpdateAddressRequest) -> Self {
        Self {
            label: req.label.map(|l| l.trim().to_string()),
            line1: req.line1,
            line2: req.line2,
            city: req.city,
            state: req.state,
            pincode: req.pincode,
            latitude: req.latitude,
            longitude: req.longitude,
        }
    }
}
