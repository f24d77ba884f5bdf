use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub date_created: DateTime<Utc>,
}

/// Validated input for creating or editing an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemData {
    pub title: String,
    pub description: String,
    pub category_id: i64,
}

impl Category {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT id, name FROM tbl_categories ORDER BY id ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT id, name FROM tbl_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT id, name FROM tbl_categories WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO tbl_categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }
}

const ITEM_COLUMNS: &str = "id, title, description, category_id, date_created";

impl Item {
    /// Most recently created items first
    pub async fn find_latest(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ITEM_COLUMNS} FROM tbl_items ORDER BY date_created DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ITEM_COLUMNS} FROM tbl_items ORDER BY id ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_category(
        pool: &SqlitePool,
        category_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ITEM_COLUMNS} FROM tbl_items WHERE category_id = $1 ORDER BY id ASC"
        ))
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ITEM_COLUMNS} FROM tbl_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_title(pool: &SqlitePool, title: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {ITEM_COLUMNS} FROM tbl_items WHERE title = $1 ORDER BY id ASC LIMIT 1"
        ))
        .bind(title)
        .fetch_optional(pool)
        .await
    }

    /// Insert an item stamped with the current UTC time
    pub async fn create(pool: &SqlitePool, data: &ItemData) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO tbl_items (title, description, category_id, date_created)
             VALUES ($1, $2, $3, $4)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Returns `None` if no item has this id
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &ItemData,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE tbl_items
             SET title = $2, description = $3, category_id = $4
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tbl_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogDb;

    fn item(title: &str, category_id: i64) -> ItemData {
        ItemData {
            title: title.to_string(),
            description: format!("{title} description"),
            category_id,
        }
    }

    #[actix_web::test]
    async fn test_category_lookup() {
        let db = CatalogDb::in_memory().await.unwrap();
        let soccer = Category::create(&db.pool, "Soccer").await.unwrap();
        Category::create(&db.pool, "Hockey").await.unwrap();

        assert_eq!(
            Category::find_by_id(&db.pool, soccer.id).await.unwrap(),
            Some(soccer.clone())
        );
        assert_eq!(
            Category::find_by_name(&db.pool, "Soccer").await.unwrap(),
            Some(soccer)
        );
        assert!(Category::find_by_name(&db.pool, "Chess").await.unwrap().is_none());

        let names: Vec<String> = Category::find_all(&db.pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Soccer", "Hockey"]);
    }

    #[actix_web::test]
    async fn test_duplicate_category_name_violates_unique() {
        let db = CatalogDb::in_memory().await.unwrap();
        Category::create(&db.pool, "Soccer").await.unwrap();
        let err = Category::create(&db.pool, "Soccer").await.unwrap_err();
        let sqlx::Error::Database(db_err) = err else {
            panic!("expected a database error");
        };
        assert!(db_err.is_unique_violation());
    }

    #[actix_web::test]
    async fn test_item_lifecycle() {
        let db = CatalogDb::in_memory().await.unwrap();
        let soccer = Category::create(&db.pool, "Soccer").await.unwrap();

        let ball = Item::create(&db.pool, &item("Ball", soccer.id)).await.unwrap();
        assert_eq!(ball.title, "Ball");
        assert_eq!(Item::find_by_title(&db.pool, "Ball").await.unwrap(), Some(ball.clone()));

        let edited = Item::update(&db.pool, ball.id, &item("Shin guards", soccer.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.title, "Shin guards");
        assert_eq!(edited.date_created, ball.date_created);

        assert!(Item::update(&db.pool, 999, &item("Ghost", soccer.id))
            .await
            .unwrap()
            .is_none());

        assert_eq!(Item::delete(&db.pool, ball.id).await.unwrap(), 1);
        assert!(Item::find_by_id(&db.pool, ball.id).await.unwrap().is_none());
        assert_eq!(Item::delete(&db.pool, ball.id).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn test_latest_and_by_category() {
        let db = CatalogDb::in_memory().await.unwrap();
        let soccer = Category::create(&db.pool, "Soccer").await.unwrap();
        let hockey = Category::create(&db.pool, "Hockey").await.unwrap();

        for title in ["Ball", "Cleats", "Goal"] {
            Item::create(&db.pool, &item(title, soccer.id)).await.unwrap();
        }
        Item::create(&db.pool, &item("Stick", hockey.id)).await.unwrap();

        let latest: Vec<String> = Item::find_latest(&db.pool, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(latest, vec!["Stick", "Goal"]);

        let soccer_items = Item::find_by_category(&db.pool, soccer.id).await.unwrap();
        assert_eq!(soccer_items.len(), 3);
        assert!(soccer_items.iter().all(|i| i.category_id == soccer.id));
        assert_eq!(Item::find_all(&db.pool).await.unwrap().len(), 4);
    }
}
