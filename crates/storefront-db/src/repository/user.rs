//! # User Repository
//!
//! Accounts, profile edits and role changes.
//!
//! Emails are stored exactly as given; callers pass them through
//! `validate_email` first so lookups are effectively case-insensitive.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use storefront_core::{Role, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

/// Fields needed to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Profile fields to change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new account.
    ///
    /// ## Errors
    /// `UniqueViolation` on `email` if the address is already registered.
    pub async fn insert(&self, new: NewUser) -> DbResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %user.id, email = %user.email, "Inserting user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { .. } => Err(DbError::duplicate("email", &user.email)),
                other => Err(other),
            },
        }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// True when `email` belongs to an account other than `user_id`.
    pub async fn email_taken_by_other(&self, email: &str, user_id: &str) -> DbResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = ? AND id != ?)",
        )
        .bind(email)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Applies a profile update and returns the stored user.
    pub async fn update_profile(&self, id: &str, update: ProfileUpdate) -> DbResult<User> {
        debug!(
            id = %id,
            name = update.name.is_some(),
            email = update.email.is_some(),
            password = update.password_hash.is_some(),
            "Updating profile"
        );

        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                return match DbError::from(e) {
                    DbError::UniqueViolation { .. } => Err(DbError::duplicate(
                        "email",
                        update.email.unwrap_or_default(),
                    )),
                    other => Err(other),
                }
            }
        };

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    pub async fn update_role(&self, id: &str, role: Role) -> DbResult<User> {
        debug!(id = %id, role = %role, "Updating role");

        let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// All accounts, newest first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{create_user, test_db};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let user = create_user(&db, "asha@example.com").await;

        let by_id = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "asha@example.com");
        assert_eq!(by_id.role, Role::User);
        assert_eq!(by_id.password_hash, "$argon2id$test");

        let by_email = db.users().get_by_email("asha@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, user.id);

        assert!(db.users().get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        create_user(&db, "dup@example.com").await;

        let err = db
            .users()
            .insert(NewUser {
                name: "Other".to_string(),
                email: "dup@example.com".to_string(),
                password_hash: "x".to_string(),
                role: Role::User,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let db = test_db().await;
        let user = create_user(&db, "meera@example.com").await;

        let updated = db
            .users()
            .update_profile(
                &user.id,
                ProfileUpdate {
                    name: Some("Meera K".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Meera K");
        assert_eq!(updated.email, "meera@example.com");
        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_update_profile_email_collision() {
        let db = test_db().await;
        let first = create_user(&db, "first@example.com").await;
        let second = create_user(&db, "second@example.com").await;

        assert!(db
            .users()
            .email_taken_by_other("first@example.com", &second.id)
            .await
            .unwrap());
        assert!(!db
            .users()
            .email_taken_by_other("first@example.com", &first.id)
            .await
            .unwrap());

        let err = db
            .users()
            .update_profile(
                &second.id,
                ProfileUpdate {
                    email: Some("first@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_update_role() {
        let db = test_db().await;
        let user = create_user(&db, "ravi@example.com").await;

        let admin = db.users().update_role(&user.id, Role::Admin).await.unwrap();
        assert!(admin.is_admin());

        let err = db.users().update_role("missing", Role::Admin).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = test_db().await;
        create_user(&db, "a@example.com").await;
        create_user(&db, "b@example.com").await;

        let users = db.users().list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "b@example.com");
    }
}
