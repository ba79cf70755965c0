//! # Validation Module
//!
//! Input validation for everything the SPA can send.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: SPA forms                                                    │
//! │  └── Required fields, immediate feedback                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: axum handler                                                 │
//! │  ├── JSON deserialization (types, camelCase)                           │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── CHECK constraints (stock >= 0, rating 1..5)                       │
//! │  └── UNIQUE constraints (email, one review per user/product)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_email, validate_quantity};
//!
//! let email = validate_email("  Asha@Example.COM ").unwrap();
//! assert_eq!(email, "asha@example.com");
//!
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest page size the catalog search will serve.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Highest page number the catalog search accepts.
pub const MAX_PAGE: i64 = 10_000;

fn too_long(field: &str, max: usize) -> ValidationError {
    ValidationError::TooLong {
        field: field.to_string(),
        max,
    }
}

/// Trims `value` and checks it is present and at most `max` characters.
fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(too_long(field, max));
    }

    Ok(value.to_string())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a display name. Returns it trimmed.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, 100)
}

/// Validates an email address and normalizes it to lowercase.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@`, a non-empty local part, a dotted domain
/// - No whitespace
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_email;
///
/// assert_eq!(validate_email("A@B.in").unwrap(), "a@b.in");
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = required_text("email", email, 254)?.to_lowercase();

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let dotted = domain
        .split('.')
        .all(|label| !label.is_empty());
    if !domain.contains('.') || !dotted {
        return Err(invalid());
    }

    Ok(email)
}

/// Validates a password.
///
/// Passwords are not trimmed; leading spaces are part of the secret.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if password.len() > 128 {
        return Err(too_long("password", 128));
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product name. Returns it trimmed.
///
/// ```rust
/// use storefront_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Chanderi Cotton Kurta").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, 200)
}

pub fn validate_description(description: &str) -> ValidationResult<String> {
    required_text("description", description, 5000)
}

/// Validates a price in minor units. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query. Empty is fine (no text filter).
///
/// Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(too_long("query", 100));
    }

    Ok(query.to_string())
}

// =============================================================================
// Order & Review Validators
// =============================================================================

/// Validates an order line quantity.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Checkout: POST /orders                                                 │
/// │                                                                         │
/// │  items: [{ productId, quantity: 5 }]                                   │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → "quantity must be positive"                      │
/// │       ├── qty > 99? → "quantity must be between 1 and 99"              │
/// │       └── OK → stock check inside the order transaction                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a review rating (1 to 5 stars).
pub fn validate_rating(rating: i64) -> ValidationResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }

    Ok(())
}

pub fn validate_comment(comment: &str) -> ValidationResult<String> {
    required_text("comment", comment, 2000)
}

// =============================================================================
// Paging Validators
// =============================================================================

/// Validates a 1-based page number.
pub fn validate_page(page: i64) -> ValidationResult<()> {
    if page < 1 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }

    if page > MAX_PAGE {
        return Err(ValidationError::OutOfRange {
            field: "page".to_string(),
            min: 1,
            max: MAX_PAGE,
        });
    }

    Ok(())
}

pub fn validate_limit(limit: i64) -> ValidationResult<()> {
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_LIMIT,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ```rust
/// use storefront_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
