//! # storefront-db: Database Layer for the Storefront
//!
//! SQLite storage for users, products, orders, reviews and wishlists, using
//! sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  axum handler (POST /orders)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │               │    │ OrderRepo ... │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (DATABASE_PATH, default ./storefront.db)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! let sarees = db.products().list_by_category(Category::Saree).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::{OrderRepository, OrderStatusUpdate, OrderWithCustomer};
pub use repository::product::{
    NewProduct, ProductQuery, ProductRepository, ProductSort, ProductUpdate,
};
pub use repository::review::{ReviewRepository, ReviewWithAuthor};
pub use repository::stats::{PopularProduct, StatsRepository, StatusCount, StoreSummary};
pub use repository::user::{NewUser, ProfileUpdate, UserRepository};
pub use repository::wishlist::WishlistRepository;
