// ============================================================================
// Catalog Infrastructure - PostgreSQL Product Repository
// File: crates/catalog-infrastructure/src/database/postgres/product_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use catalog_core::domain::Product;
use catalog_core::error::DomainError;
use catalog_core::repositories::{ProductFilter, ProductOrder, ProductRepository, SlugIndex};

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<Uuid>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category_id: row.category_id,
            image: row.image,
            thumbnail: row.thumbnail,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, stock, \
     category_id, image, thumbnail, is_active, created_at, updated_at";

fn db_err(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e: sqlx::Error| {
        error!("Database error {}: {}", context, e);
        DomainError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl SlugIndex for PgProductRepository {
    async fn slug_exists(&self, slug: &str, exclude: Option<&Uuid>) -> Result<bool, DomainError> {
        let exists: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT 1 FROM products
            WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
            LIMIT 1
            "#,
        )
        .bind(slug)
        .bind(exclude.copied())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("checking product slug"))?;

        Ok(exists.is_some())
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("finding product by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1 AND is_active = TRUE"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("finding product by slug"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_slug_any(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("finding product by slug (any)"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let order_by = match filter.order {
            ProductOrder::CreatedAtDesc => "created_at DESC",
            ProductOrder::CreatedAtAsc => "created_at ASC",
            ProductOrder::PriceAsc => "price ASC",
            ProductOrder::PriceDesc => "price DESC",
        };

        let page = filter.page.max(1) as i64;
        let page_size = filter.page_size.max(1) as i64;
        let search = filter.search.as_ref().map(|s| format!("%{}%", s));

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE ($1::bool OR is_active = TRUE)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR description ILIKE $3)
            ORDER BY {order_by}
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.include_inactive)
        .bind(filter.category_id)
        .bind(search)
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("listing products"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, product: &Product) -> Result<Product, DomainError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO products
                (id, name, slug, description, price, stock,
                 category_id, image, thumbnail, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category_id)
        .bind(&product.image)
        .bind(&product.thumbnail)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("creating product"))?;

        Ok(row.into())
    }

    async fn update(&self, product: &Product) -> Result<Product, DomainError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r#"
            UPDATE products SET
                name = $2, slug = $3, description = $4, price = $5, stock = $6,
                category_id = $7, image = $8, thumbnail = $9, is_active = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category_id)
        .bind(&product.image)
        .bind(&product.thumbnail)
        .bind(product.is_active)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("updating product"))?;

        Ok(row.into())
    }

    async fn set_thumbnail_if_absent(
        &self,
        id: &Uuid,
        thumbnail: &str,
    ) -> Result<bool, DomainError> {
        // Compare-and-set: the row predicate keeps the write idempotent even
        // across processes.
        let result = sqlx::query(
            r#"
            UPDATE products SET thumbnail = $2, updated_at = NOW()
            WHERE id = $1 AND thumbnail IS NULL
            "#,
        )
        .bind(id)
        .bind(thumbnail)
        .execute(&self.pool)
        .await
        .map_err(db_err("setting product thumbnail"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn detach_category(&self, category_id: &Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE products SET category_id = NULL, updated_at = NOW()
            WHERE category_id = $1
            "#,
        )
        .bind(category_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("detaching category from products"))?;

        Ok(result.rows_affected())
    }
}
