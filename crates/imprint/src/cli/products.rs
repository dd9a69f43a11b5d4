//! The `imprint products` command.

use anyhow::Context;
use clap::{Args, Subcommand};
use imprint_core::api::{ImageSource, Product, ProductDraft};
use imprint_core::{Config, ImagePublisher, SourceImage, StoreFactory};

use super::theme::{confirm, success};
use super::{api_client, expand_path, require_session};

/// Arguments for the `products` command.
#[derive(Args, Debug)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

/// Product fields shared by create and update.
#[derive(Args, Debug)]
pub struct ProductFields {
    /// Product name
    #[arg(long)]
    pub name: String,

    /// Product description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Price
    #[arg(long)]
    pub price: f64,

    /// Image: an http(s) URL, or a local file to watermark and upload
    #[arg(long)]
    pub image: Option<String>,
}

/// Subcommands for product management.
#[derive(Subcommand, Debug)]
pub enum ProductsCommand {
    /// List products
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create a product (admin only)
    Create(ProductFields),

    /// Update a product (admin only); the image is kept unless --image is given
    Update {
        /// Product id
        id: String,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Delete a product (admin only)
    Delete {
        /// Product id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Execute the products command.
pub async fn execute(args: ProductsArgs, config: &Config) -> anyhow::Result<()> {
    let client = api_client(config)?;

    match args.command {
        ProductsCommand::List { json } => {
            let session = require_session().ok();
            let products = client.list_products(session.as_ref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&products)?);
            } else {
                print_table(&products);
            }
        }

        ProductsCommand::Create(fields) => {
            let session = require_session()?;
            let (draft, publisher) = prepare(fields, config).await?;
            let product = client
                .create_product(&session, draft, publisher.as_ref())
                .await?;
            success(format!("Created product {} ({})", product.name, product.id));
            println!("{}", product.id);
        }

        ProductsCommand::Update { id, fields } => {
            let session = require_session()?;
            let (draft, publisher) = prepare(fields, config).await?;
            let product = client
                .update_product(&session, &id, draft, publisher.as_ref())
                .await?;
            success(format!("Updated product {} ({})", product.name, product.id));
        }

        ProductsCommand::Delete { id, yes } => {
            let session = require_session()?;
            session.require_admin()?;
            if !confirm(&format!("Delete product {id}?"), yes)? {
                return Ok(());
            }
            client.delete_product(&session, &id).await?;
            success(format!("Deleted product {id}"));
        }
    }

    Ok(())
}

/// Build the draft, and a publisher when the image is a local file.
async fn prepare(
    fields: ProductFields,
    config: &Config,
) -> anyhow::Result<(ProductDraft, Option<ImagePublisher>)> {
    let (image, publisher) = match fields.image {
        None => (None, None),
        Some(url) if is_url(&url) => (Some(ImageSource::Url(url)), None),
        Some(path) => {
            let path = expand_path(path.as_ref());
            let source = SourceImage::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let publisher = ImagePublisher::new(config, StoreFactory::create(config)?)?;
            (Some(ImageSource::Upload(source)), Some(publisher))
        }
    };

    let draft = ProductDraft {
        name: fields.name,
        description: fields.description,
        price: fields.price,
        image,
    };
    Ok((draft, publisher))
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn print_table(products: &[Product]) {
    if products.is_empty() {
        eprintln!("No products");
        return;
    }
    for product in products {
        println!(
            "{:<38} {:<28} {:>10.2}  {}",
            product.id,
            product.name,
            product.price,
            product.image_url.as_deref().unwrap_or("-")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://cdn.example.com/a.jpg"));
        assert!(is_url("http://localhost/a.jpg"));
        assert!(!is_url("./photos/a.jpg"));
        assert!(!is_url("~/a.jpg"));
    }

    #[tokio::test]
    async fn test_prepare_with_url_needs_no_store() {
        let fields = ProductFields {
            name: "Chair".into(),
            description: String::new(),
            price: 12.0,
            image: Some("https://cdn.example.com/chair.jpg".into()),
        };
        let (draft, publisher) = prepare(fields, &Config::default()).await.unwrap();
        assert!(publisher.is_none());
        assert!(matches!(draft.image, Some(ImageSource::Url(_))));
    }

    #[tokio::test]
    async fn test_prepare_with_file_builds_publisher() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chair.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let mut config = Config::default();
        config.storage.backend = imprint_core::config::StorageBackend::Memory;
        let fields = ProductFields {
            name: "Chair".into(),
            description: String::new(),
            price: 12.0,
            image: Some(path.to_string_lossy().into_owned()),
        };

        let (draft, publisher) = prepare(fields, &config).await.unwrap();
        assert!(publisher.is_some());
        match draft.image {
            Some(ImageSource::Upload(source)) => assert_eq!(source.file_name(), "chair.png"),
            other => panic!("unexpected image source: {other:?}"),
        }
    }
}
