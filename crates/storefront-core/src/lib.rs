//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate holds every storefront rule that can be expressed without I/O:
//! money arithmetic, entity types, checkout cart math, order status
//! transitions and input validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser SPA (React)                          │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► Account ──► Admin          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    storefront-api (axum)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │  money   │ │   cart   │ │ order_flow       │  │   │
//! │  │   │ Product  │ │  Money   │ │   Cart   │ │ status machine   │  │   │
//! │  │   │  Order   │ │          │ │ CartLine │ │                  │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                storefront-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Order, Review, Wishlist)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Checkout cart built from the SPA's cart lines
//! - [`order_flow`] - Which order status changes are legal
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::cart::Cart;
//!
//! let mut cart = Cart::new();
//! cart.add_item("p-1", 2).unwrap();
//! cart.add_item("p-1", 1).unwrap();
//!
//! assert_eq!(cart.item_count(), 1);
//! assert_eq!(cart.total_quantity(), 3);
//! ```

pub mod cart;
pub mod error;
pub mod money;
pub mod order_flow;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products allowed in a single order.
pub const MAX_CART_ITEMS: usize = 50;

/// Maximum quantity of a single product in one order.
///
/// Catches typos like 100 instead of 10 before stock is touched.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Highest unit price a product may carry, in minor units (₹1 crore).
///
/// With `MAX_ITEM_QUANTITY` and `MAX_CART_ITEMS` this keeps every order
/// total far inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Minimum password length accepted at registration and password change.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Stock given to a product when the creator does not specify one.
pub const DEFAULT_STOCK: i64 = 10;
