use super::SessionManager;
use crate::api::Registration;
use crate::error::{Result, SyncError};

/// Reject a registration form before it reaches the network.
pub fn validate_registration(form: &Registration) -> Result<()> {
    let required = [
        ("username", &form.username),
        ("first name", &form.firstname),
        ("last name", &form.lastname),
        ("password", &form.password),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(SyncError::Validation(format!("{} is required", field)));
        }
    }
    if form.password != form.confirm_password {
        return Err(SyncError::Validation("passwords do not match".to_string()));
    }
    Ok(())
}

impl SessionManager {
    /// Create an account. Does not log in; the caller sends the user to the login surface.
    pub async fn register(&self, form: &Registration) -> Result<()> {
        validate_registration(form)?;
        self.inner.api.register(form).await?;
        tracing::info!(username = %form.username, "registration succeeded");
        Ok(())
    }
}
