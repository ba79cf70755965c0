//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Listing active products (all, by category)
//! - Filtered, sorted, paged search
//! - CRUD with soft delete
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /products/search?query=silk&category=saree&sortBy=price_asc       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductQuery { text: "silk", category: Saree, sort: PriceAsc, ... }   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE is_active = 1                                                   │
//! │    AND (name LIKE '%silk%' OR description LIKE '%silk%')               │
//! │    AND category = 'saree'                                              │
//! │  ORDER BY price_cents ASC                                              │
//! │  LIMIT 12 OFFSET 0            + a COUNT(*) with the same WHERE         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! LIKE is case-insensitive for ASCII in SQLite, which matches how shoppers
//! type product names.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::PRODUCT_COLUMNS;
use crate::error::{DbError, DbResult};
use storefront_core::{Category, Product};

// =============================================================================
// Query & Command Types
// =============================================================================

/// Catalog ordering for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    /// Highest average rating first.
    Rating,
}

impl ProductSort {
    /// Maps the `sortBy` query parameter. Anything unknown means newest.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("price_asc") => ProductSort::PriceAsc,
            Some("price_desc") => ProductSort::PriceDesc,
            Some("rating") => ProductSort::Rating,
            _ => ProductSort::Newest,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            ProductSort::Newest => "created_at DESC, rowid DESC",
            ProductSort::PriceAsc => "price_cents ASC, rowid ASC",
            ProductSort::PriceDesc => "price_cents DESC, rowid ASC",
            ProductSort::Rating => {
                "CASE WHEN review_count = 0 THEN 0.0 \
                 ELSE CAST(rating_total AS REAL) / review_count END DESC, \
                 review_count DESC, rowid ASC"
            }
        }
    }
}

/// Filters and paging for [`ProductRepository::search`].
#[derive(Debug, Clone)]
pub struct ProductQuery {
    /// Substring matched against name and description.
    pub text: Option<String>,
    pub category: Option<Category>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub sort: ProductSort,
    /// 1-based.
    pub page: i64,
    pub limit: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery {
            text: None,
            category: None,
            min_price_cents: None,
            max_price_cents: None,
            sort: ProductSort::Newest,
            page: 1,
            limit: 12,
        }
    }
}

impl ProductQuery {
    fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }

    /// Appends the WHERE clause shared by the page query and the count.
    fn push_filters(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(" WHERE is_active = 1");

        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(text));
            builder
                .push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        if let Some(category) = self.category {
            builder.push(" AND category = ").push_bind(category);
        }

        if let Some(min) = self.min_price_cents {
            builder.push(" AND price_cents >= ").push_bind(min);
        }

        if let Some(max) = self.max_price_cents {
            builder.push(" AND price_cents <= ").push_bind(max);
        }
    }
}

/// Escapes LIKE wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fields for a new catalog entry. Already validated by the caller.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub image: String,
    pub category: Category,
    pub stock: i64,
}

/// Partial product edit. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub image: Option<String>,
    pub category: Option<Category>,
    pub stock: Option<i64>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let (page, total) = repo.search(&ProductQuery::default()).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Active products, newest first.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Every product including soft-deleted ones (admin view).
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn list_by_category(&self, category: Category) -> DbResult<Vec<Product>> {
        debug!(category = %category, "Listing products by category");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 AND category = ? \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product only if it is still on sale.
    pub async fn get_active(&self, id: &str) -> DbResult<Option<Product>> {
        Ok(self.get_by_id(id).await?.filter(|p| p.is_active))
    }

    /// Runs a catalog search. Returns the requested page and the total
    /// number of matches across all pages.
    pub async fn search(&self, query: &ProductQuery) -> DbResult<(Vec<Product>, i64)> {
        debug!(
            text = ?query.text,
            category = ?query.category,
            sort = ?query.sort,
            page = query.page,
            limit = query.limit,
            "Searching products"
        );

        let mut count_builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        query.push_filters(&mut count_builder);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        query.push_filters(&mut builder);
        builder
            .push(" ORDER BY ")
            .push(query.sort.order_by())
            .push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok((products, total))
    }

    /// Inserts a new product with empty rating aggregates.
    pub async fn insert(&self, new: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            description: new.description,
            price_cents: new.price_cents,
            image: new.image,
            category: new.category,
            stock: new.stock,
            rating_total: 0,
            review_count: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, image, category,
                stock, rating_total, review_count, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.image)
        .bind(product.category)
        .bind(product.stock)
        .bind(product.rating_total)
        .bind(product.review_count)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Applies a partial update and returns the stored product.
    pub async fn update(&self, id: &str, update: ProductUpdate) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                price_cents = COALESCE(?, price_cents),
                image = COALESCE(?, image),
                category = COALESCE(?, category),
                stock = COALESCE(?, stock),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.price_cents)
        .bind(&update.image)
        .bind(update.category)
        .bind(update.stock)
        .bind(update.is_active)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Orders keep referencing the row, so it is never physically removed.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
