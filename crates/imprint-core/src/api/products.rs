//! `/api/products` routes.
//!
//! Product images given as raw files are published through the image
//! pipeline before the product is saved; only the resulting URL is sent.

use reqwest::Method;

use super::types::{ProductData, ProductPayload, ProductsData};
use super::{ApiClient, ImageSource, Product, ProductDraft};
use crate::error::ApiError;
use crate::pipeline::ImagePublisher;
use crate::session::Session;

impl ApiClient {
    /// List products. The catalog is readable without a session.
    pub async fn list_products(&self, session: Option<&Session>) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "/api/products", session);
        let data: ProductsData = self.send(request).await?;
        Ok(data.products)
    }

    pub async fn get_product(&self, session: Option<&Session>, id: &str) -> Result<Product, ApiError> {
        let request = self.request(Method::GET, &format!("/api/products/{id}"), session);
        let data: ProductData = self.send(request).await?;
        Ok(data.product)
    }

    /// Create a product. Admin only.
    ///
    /// A product without an image is saved with an empty `image_url`.
    pub async fn create_product(
        &self,
        session: &Session,
        draft: ProductDraft,
        publisher: Option<&ImagePublisher>,
    ) -> Result<Product, ApiError> {
        session.require_admin()?;
        let image_url = resolve_image(draft.image, publisher).await?;
        let payload = ProductPayload {
            name: &draft.name,
            description: &draft.description,
            price: draft.price,
            image_url: Some(image_url.unwrap_or_default()),
        };

        let request = self
            .request(Method::POST, "/api/products", Some(session))
            .json(&payload);
        let data: ProductData = self.send(request).await?;
        tracing::debug!("Created product {}", data.product.id);
        Ok(data.product)
    }

    /// Update a product. Admin only.
    ///
    /// Without a new image the stored `image_url` is left as it is.
    pub async fn update_product(
        &self,
        session: &Session,
        id: &str,
        draft: ProductDraft,
        publisher: Option<&ImagePublisher>,
    ) -> Result<Product, ApiError> {
        session.require_admin()?;
        let image_url = resolve_image(draft.image, publisher)
            .await?
            .filter(|url| !url.is_empty());
        let payload = ProductPayload {
            name: &draft.name,
            description: &draft.description,
            price: draft.price,
            image_url,
        };

        let request = self
            .request(Method::PUT, &format!("/api/products/{id}"), Some(session))
            .json(&payload);
        let data: ProductData = self.send(request).await?;
        Ok(data.product)
    }

    /// Delete a product. Admin only.
    pub async fn delete_product(&self, session: &Session, id: &str) -> Result<(), ApiError> {
        session.require_admin()?;
        let request = self.request(Method::DELETE, &format!("/api/products/{id}"), Some(session));
        self.send_empty(request).await?;
        tracing::debug!("Deleted product {}", id);
        Ok(())
    }
}

/// Turn an image source into the URL sent to the API.
async fn resolve_image(
    image: Option<ImageSource>,
    publisher: Option<&ImagePublisher>,
) -> Result<Option<String>, ApiError> {
    match image {
        None => Ok(None),
        Some(ImageSource::Url(url)) => Ok(Some(url)),
        Some(ImageSource::Upload(source)) => {
            let publisher = publisher
                .ok_or_else(|| ApiError::NoPublisher(source.file_name().to_string()))?;
            let published = publisher.publish(source).await?;
            Ok(Some(published.url.into_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{client, client_at, session};
    use super::*;
    use crate::config::Config;
    use crate::pipeline::test_support::png_bytes;
    use crate::session::Role;
    use crate::storage::MemoryStore;
    use crate::test_http::serve_once;
    use crate::types::SourceImage;
    use std::sync::Arc;

    fn draft(image: Option<ImageSource>) -> ProductDraft {
        ProductDraft {
            name: "Chair".into(),
            description: "Oak".into(),
            price: 129.5,
            image,
        }
    }

    #[tokio::test]
    async fn test_resolve_image_publishes_uploads() {
        let store = Arc::new(MemoryStore::default());
        let publisher = ImagePublisher::new(&Config::default(), store.clone()).unwrap();
        let source = SourceImage::new(png_bytes(32, 32), "chair.png", "image/png");

        let url = resolve_image(Some(ImageSource::Upload(source)), Some(&publisher))
            .await
            .unwrap()
            .unwrap();

        assert!(url.ends_with("_chair.jpg"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_image_passes_urls_through() {
        let url = resolve_image(Some(ImageSource::Url("https://x/y.jpg".into())), None)
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://x/y.jpg"));
        assert_eq!(resolve_image(None, None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upload_without_publisher_fails() {
        let source = SourceImage::new(png_bytes(8, 8), "chair.png", "image/png");
        let err = resolve_image(Some(ImageSource::Upload(source)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoPublisher(_)));
    }

    #[tokio::test]
    async fn test_pipeline_failure_surfaces_as_image_error() {
        let store = Arc::new(MemoryStore::default());
        let publisher = ImagePublisher::new(&Config::default(), store.clone()).unwrap();
        let source = SourceImage::new(Vec::new(), "chair.png", "image/png");

        let err = resolve_image(Some(ImageSource::Upload(source)), Some(&publisher))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Image(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_customer_cannot_create_and_nothing_is_published() {
        let store = Arc::new(MemoryStore::default());
        let publisher = ImagePublisher::new(&Config::default(), store.clone()).unwrap();
        let source = SourceImage::new(png_bytes(16, 16), "chair.png", "image/png");

        let err = client()
            .create_product(
                &session(Role::Customer),
                draft(Some(ImageSource::Upload(source))),
                Some(&publisher),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_customer_cannot_update_or_delete() {
        let client = client();
        let customer = session(Role::Customer);

        let err = client
            .update_product(&customer, "p1", draft(None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = client.delete_product(&customer, "p1").await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    const PRODUCT: &str = r#"{"success":true,"data":{"product":{"id":"p1","name":"Chair","description":"Oak","price":129.5,"imageUrl":"https://cdn/x.jpg","createdAt":"2024-01-01"}}}"#;

    #[tokio::test]
    async fn test_list_products_without_session() {
        let body = r#"{"success":true,"data":{"products":[
            {"id":"p1","name":"Chair","price":129.5,"image_url":"https://cdn/x.jpg"},
            {"id":"p2","name":"Table","description":"Pine","price":300}
        ]}}"#;
        let (base, request) = serve_once(200, body).await;

        let products = client_at(&base).list_products(None).await.unwrap();
        let request = request.await.unwrap();

        assert_eq!(request.path, "/api/products");
        assert_eq!(request.header("authorization"), None);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].image_url.as_deref(), Some("https://cdn/x.jpg"));
        assert_eq!(products[0].description, "");
        assert_eq!(products[1].price, 300.0);
    }

    #[tokio::test]
    async fn test_get_product_accepts_camel_case_fields() {
        let (base, request) = serve_once(200, PRODUCT).await;

        let product = client_at(&base).get_product(None, "p1").await.unwrap();

        assert_eq!(request.await.unwrap().path, "/api/products/p1");
        assert_eq!(product.image_url.as_deref(), Some("https://cdn/x.jpg"));
        assert_eq!(product.created_at.as_deref(), Some("2024-01-01"));
    }

    #[tokio::test]
    async fn test_update_without_image_omits_image_url() {
        let (base, request) = serve_once(200, PRODUCT).await;

        client_at(&base)
            .update_product(&session(Role::Admin), "p1", draft(None), None)
            .await
            .unwrap();
        let request = request.await.unwrap();

        assert_eq!(request.method, "PUT");
        assert_eq!(request.path, "/api/products/p1");
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
        assert_eq!(
            request.json(),
            serde_json::json!({"name": "Chair", "description": "Oak", "price": 129.5})
        );
    }

    #[tokio::test]
    async fn test_create_without_image_sends_empty_url() {
        let (base, request) = serve_once(201, PRODUCT).await;

        client_at(&base)
            .create_product(&session(Role::Admin), draft(None), None)
            .await
            .unwrap();
        let request = request.await.unwrap();

        assert_eq!(request.method, "POST");
        assert_eq!(request.json()["image_url"], "");
    }

    #[tokio::test]
    async fn test_create_with_upload_sends_published_url() {
        let (base, request) = serve_once(201, PRODUCT).await;
        let store = Arc::new(MemoryStore::default());
        let publisher = ImagePublisher::new(&Config::default(), store.clone()).unwrap();
        let source = SourceImage::new(png_bytes(24, 24), "chair.png", "image/png");

        client_at(&base)
            .create_product(
                &session(Role::Admin),
                draft(Some(ImageSource::Upload(source))),
                Some(&publisher),
            )
            .await
            .unwrap();
        let request = request.await.unwrap();

        let sent = request.json()["image_url"].as_str().unwrap().to_string();
        assert!(sent.ends_with("_chair.jpg"), "{sent}");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let (base, request) = serve_once(200, r#"{"success":true}"#).await;

        client_at(&base)
            .delete_product(&session(Role::Admin), "p1")
            .await
            .unwrap();
        let request = request.await.unwrap();

        assert_eq!(request.method, "DELETE");
        assert_eq!(request.path, "/api/products/p1");
    }
}
