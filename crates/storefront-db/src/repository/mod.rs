//! # Repository Module
//!
//! One repository per stored collection.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  axum handler                                                           │
//! │       │                                                                 │
//! │       │  state.db.orders().place_order(user_id, &cart, ...)            │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── place_order  (one transaction: stock + order + items)             │
//! │  ├── list_for_user                                                     │
//! │  └── update_status (transition check + restock)                        │
//! │       │                                                                 │
//! │       ▼  SQL                                                            │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Accounts and roles
//! - [`product::ProductRepository`] - Catalog CRUD and search
//! - [`order::OrderRepository`] - Checkout and fulfilment
//! - [`review::ReviewRepository`] - Reviews and rating aggregates
//! - [`wishlist::WishlistRepository`] - Saved products
//! - [`stats::StatsRepository`] - Admin dashboard aggregates

pub mod order;
pub mod product;
pub mod review;
pub mod stats;
pub mod user;
pub mod wishlist;

/// Column list shared by every query that loads a full `Product`.
pub(crate) const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, image, category, \
     stock, rating_total, review_count, is_active, created_at, updated_at";

/// Same columns, qualified with the `p` alias for joins.
pub(crate) const PRODUCT_COLUMNS_P: &str = "p.id, p.name, p.description, p.price_cents, p.image, \
     p.category, p.stock, p.rating_total, p.review_count, p.is_active, p.created_at, p.updated_at";

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository tests.

    use storefront_core::{Category, Product, Role, User};

    use crate::repository::product::NewProduct;
    use crate::repository::user::NewUser;
    use crate::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn create_user(db: &Database, email: &str) -> User {
        db.users()
            .insert(NewUser {
                name: "Test Shopper".to_string(),
                email: email.to_string(),
                password_hash: "$argon2id$test".to_string(),
                role: Role::User,
            })
            .await
            .unwrap()
    }

    pub async fn create_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
        db.products()
            .insert(NewProduct {
                name: name.to_string(),
                description: format!("{name} description"),
                price_cents,
                image: "pr1".to_string(),
                category: Category::Saree,
                stock,
            })
            .await
            .unwrap()
    }
}
