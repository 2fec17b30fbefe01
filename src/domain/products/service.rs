//! Product catalog.

use async_trait::async_trait;
use mockall::automock;
use tracing::warn;

use crate::{
    database::Db,
    domain::products::{
        errors::CatalogError,
        models::{Product, ProductId},
        repository::PgProductsRepository,
    },
};

/// [`Catalog`] backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    db: Db,
    repository: PgProductsRepository,
}

impl PgCatalog {
    /// A catalog over `db`.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_products(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn find_by_id(&self, product: ProductId) -> Result<Option<Product>, CatalogError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.find_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }
}

/// Read-only product lookup.
#[automock]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Retrieves every product, ordered by id.
    async fn list_all(&self) -> Result<Vec<Product>, CatalogError>;

    /// Retrieve a single product, or `None` when the id is unknown.
    async fn find_by_id(&self, product: ProductId) -> Result<Option<Product>, CatalogError>;
}

/// List the catalog for display, treating an unavailable catalog as empty.
pub async fn browse(catalog: &dyn Catalog) -> Vec<Product> {
    match catalog.list_all().await {
        Ok(products) => products,
        Err(error) => {
            warn!(%error, "catalog unavailable, showing no products");

            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{errors::StorageError, test::TestContext};

    use super::*;

    fn product(id: i64, price: u64) -> Product {
        Product {
            id: ProductId::from_i64(id),
            name: format!("Product {id}"),
            price,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn browse_returns_catalog_products() {
        let mut catalog = MockCatalog::new();

        catalog
            .expect_list_all()
            .times(1)
            .returning(|| Ok(vec![product(1, 10_00), product(2, 25_00)]));

        let products = browse(&catalog).await;

        assert_eq!(products.len(), 2);
        assert_eq!(products.first().map(|p| p.price), Some(10_00));
    }

    #[tokio::test]
    async fn browse_treats_unavailable_catalog_as_empty() {
        let mut catalog = MockCatalog::new();

        catalog.expect_list_all().returning(|| {
            Err(CatalogError::Unavailable(StorageError::Unavailable(
                "connection refused".to_string(),
            )))
        });

        assert!(browse(&catalog).await.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn list_all_returns_products_ordered_by_id() -> TestResult {
        let ctx = TestContext::new().await;

        let b = ctx.create_product("Chanel No. 5", 25_00).await?;
        let a = ctx.create_product("Dior Sauvage", 10_00).await?;

        let products = ctx.catalog.list_all().await?;
        let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();

        assert_eq!(ids, vec![b.id, a.id]);
        assert!(ids.windows(2).all(|w| w.first() < w.get(1)), "ids ascend");

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn find_by_id_returns_none_for_unknown_product() -> TestResult {
        let ctx = TestContext::new().await;

        let found = ctx.catalog.find_by_id(ProductId::from_i64(9_999)).await?;

        assert!(found.is_none());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn find_by_id_returns_product_detail() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx.create_product("Versace Eros", 82_50).await?;

        let found = ctx.catalog.find_by_id(created.id).await?;

        assert_eq!(found, Some(created));

        Ok(())
    }
}
