//! Wire and domain types for the admin API, and the transforms between them.

use serde::{Deserialize, Serialize};

use crate::session::{Role, RoleResolver};
use crate::types::SourceImage;

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role_id: Option<String>,
}

/// Role object nested in some user responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRole {
    #[serde(default)]
    pub id: Option<String>,
    pub role_name: String,
}

/// User as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified_at: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub role: Option<ApiRole>,
}

impl ApiUser {
    /// Convert to the domain user. A nested role name wins over `role_id`.
    pub fn into_user(self, roles: &RoleResolver) -> User {
        let role = match &self.role {
            Some(role) => Role::from_api_name(&role.role_name),
            None => roles.resolve(self.role_id.as_deref()),
        };
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Fields for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Fields for updating a user. The password is only sent when present.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserPayload<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    role_id: &'a str,
}

impl NewUser {
    pub(crate) fn payload<'a>(&'a self, roles: &'a RoleResolver) -> UserPayload<'a> {
        UserPayload {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            password: Some(&self.password),
            role_id: roles.role_id(self.role),
        }
    }
}

impl UserUpdate {
    pub(crate) fn payload<'a>(&'a self, roles: &'a RoleResolver) -> UserPayload<'a> {
        UserPayload {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            password: self.password.as_deref().filter(|p| !p.is_empty()),
            role_id: roles.role_id(self.role),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersData {
    pub users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    pub user: ApiUser,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Where a product's image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// An image that is already published
    Url(String),
    /// A raw file to run through the publish pipeline first
    Upload(SourceImage),
}

/// Fields for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: Option<ImageSource>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProductPayload<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsData {
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductData {
    pub product: Product,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_user(json: &str) -> ApiUser {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_user_role_from_role_id() {
        let roles = RoleResolver::default();
        let user = api_user(
            r#"{"id":"1","first_name":"Ada","last_name":"Lovelace","email":"ada@example.com",
                "email_verified_at":null,"role_id":"41fc96df-063b-433b-96f7-b5efc6978825",
                "created_at":"2024-01-01","updated_at":"2024-01-02"}"#,
        )
        .into_user(&roles);

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.created_at.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_nested_role_name_wins() {
        let roles = RoleResolver::default();
        let user = api_user(
            r#"{"id":"1","email":"x@example.com","role_id":"41fc96df-063b-433b-96f7-b5efc6978825",
                "role":{"id":"r","role_name":"CUSTOMER"}}"#,
        )
        .into_user(&roles);
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn test_unknown_role_id_is_customer() {
        let roles = RoleResolver::default();
        let user = api_user(r#"{"id":"1","email":"x@example.com","role_id":"mystery"}"#)
            .into_user(&roles);
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn test_new_user_payload() {
        let roles = RoleResolver::default();
        let new_user = NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "secret".into(),
            role: Role::Admin,
        };
        let json = serde_json::to_value(new_user.payload(&roles)).unwrap();
        assert_eq!(json["password"], "secret");
        assert_eq!(json["role_id"], "41fc96df-063b-433b-96f7-b5efc6978825");
        assert_eq!(json["first_name"], "Ada");
    }

    #[test]
    fn test_update_payload_omits_missing_password() {
        let roles = RoleResolver::default();
        let mut update = UserUpdate {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: None,
            role: Role::Customer,
        };
        let json = serde_json::to_value(update.payload(&roles)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role_id"], "a5fbd39c-6a51-4f36-8c7f-d171f355cb56");

        update.password = Some(String::new());
        let json = serde_json::to_value(update.payload(&roles)).unwrap();
        assert!(json.get("password").is_none());

        update.password = Some("new".into());
        let json = serde_json::to_value(update.payload(&roles)).unwrap();
        assert_eq!(json["password"], "new");
    }

    #[test]
    fn test_product_accepts_camel_case_fields() {
        let product: Product = serde_json::from_str(
            r#"{"id":"p1","name":"Chair","description":"Oak","price":129.5,
                "imageUrl":"https://cdn.example.com/images/products/1_chair.jpg","createdAt":"2024-05-01"}"#,
        )
        .unwrap();
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://cdn.example.com/images/products/1_chair.jpg")
        );
        assert_eq!(product.created_at.as_deref(), Some("2024-05-01"));

        let product: Product =
            serde_json::from_str(r#"{"id":"p2","name":"Lamp","price":20,"image_url":null}"#).unwrap();
        assert_eq!(product.image_url, None);
        assert_eq!(product.description, "");
    }

    #[test]
    fn test_product_payload_without_image_omits_field() {
        let payload = ProductPayload {
            name: "Chair",
            description: "Oak",
            price: 10.0,
            image_url: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("image_url").is_none());
    }
}
