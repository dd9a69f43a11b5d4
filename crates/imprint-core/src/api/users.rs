//! `/api/users` routes.

use reqwest::Method;

use super::types::{UserData, UsersData};
use super::{ApiClient, NewUser, User, UserUpdate};
use crate::error::ApiError;
use crate::session::Session;

impl ApiClient {
    pub async fn list_users(&self, session: &Session) -> Result<Vec<User>, ApiError> {
        let request = self.request(Method::GET, "/api/users", Some(session));
        let data: UsersData = self.send(request).await?;
        Ok(data
            .users
            .into_iter()
            .map(|u| u.into_user(&self.roles))
            .collect())
    }

    pub async fn get_user(&self, session: &Session, id: &str) -> Result<User, ApiError> {
        let request = self.request(Method::GET, &format!("/api/users/{id}"), Some(session));
        let data: UserData = self.send(request).await?;
        Ok(data.user.into_user(&self.roles))
    }

    /// Register a user. Admin only.
    pub async fn create_user(&self, session: &Session, user: &NewUser) -> Result<User, ApiError> {
        session.require_admin()?;
        let request = self
            .request(Method::POST, "/api/register", Some(session))
            .json(&user.payload(&self.roles));
        let data: UserData = self.send(request).await?;
        tracing::debug!("Created user {}", data.user.id);
        Ok(data.user.into_user(&self.roles))
    }

    /// Update a user. Admin only.
    pub async fn update_user(
        &self,
        session: &Session,
        id: &str,
        update: &UserUpdate,
    ) -> Result<User, ApiError> {
        session.require_admin()?;
        let request = self
            .request(Method::PUT, &format!("/api/users/{id}"), Some(session))
            .json(&update.payload(&self.roles));
        let data: UserData = self.send(request).await?;
        Ok(data.user.into_user(&self.roles))
    }

    /// Delete a user. Admin only.
    pub async fn delete_user(&self, session: &Session, id: &str) -> Result<(), ApiError> {
        session.require_admin()?;
        let request = self.request(Method::DELETE, &format!("/api/users/{id}"), Some(session));
        self.send_empty(request).await?;
        tracing::debug!("Deleted user {}", id);
        Ok(())
    }
}
