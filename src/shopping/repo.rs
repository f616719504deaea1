use anyhow::Context;
use axum::extract::FromRef;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    query::Filter,
    shopping::{
        dto::{NewItem, ShoppingFilter},
        repo_types::{CategoryBreakdown, ItemStatus, ShoppingItem, ShoppingTotals},
    },
    state::AppState,
};

const SELECT_ITEM: &str = "SELECT id, user_id, item_name, category, amount, quantity, unit, \
     status, purchase_date, shop_name, notes, priority, created_at, updated_at FROM shopping_list";

// Moving to purchased stamps today's date unless one is already set.
const STAMP_PURCHASE_DATE: &str = " = 'purchased' AND purchase_date IS NULL \
     THEN CURRENT_DATE ELSE purchase_date END";

#[derive(Clone)]
pub struct ShoppingRepo {
    db: SqlitePool,
}

impl FromRef<AppState> for ShoppingRepo {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db.clone())
    }
}

fn scoped<'a>(head: &str, user_id: i64, f: &'a ShoppingFilter) -> Filter<'a> {
    let mut filter = Filter::owned(head, "user_id", user_id);
    filter
        .eq("category", f.category)
        .eq("status", f.status)
        .eq("priority", f.priority)
        .contains("item_name", f.item_name.as_deref())
        .date_range("purchase_date", &f.range);
    filter
}

fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    qb.push(" AND id IN (");
    let mut list = qb.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    list.push_unseparated(")");
}

impl ShoppingRepo {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Highest priority first, newest first within a priority.
    pub async fn list(&self, user_id: i64, f: &ShoppingFilter) -> anyhow::Result<Vec<ShoppingItem>> {
        let mut qb = scoped(SELECT_ITEM, user_id, f).into_builder();
        qb.push(" ORDER BY priority ASC, created_at DESC, id DESC");
        qb.build_query_as::<ShoppingItem>()
            .fetch_all(&self.db)
            .await
            .context("list shopping items")
    }

    pub async fn find(&self, id: i64, user_id: i64) -> anyhow::Result<Option<ShoppingItem>> {
        sqlx::query_as::<_, ShoppingItem>(&format!("{SELECT_ITEM} WHERE id = ? AND user_id = ?"))
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("load shopping item {id}"))
    }

    pub async fn create(&self, user_id: i64, new: &NewItem) -> anyhow::Result<i64> {
        let done = sqlx::query(
            "INSERT INTO shopping_list (user_id, item_name, category, amount, quantity, unit, \
             status, purchase_date, shop_name, notes, priority) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, \
             CASE WHEN ?8 IS NULL AND ?7 = 'purchased' THEN CURRENT_DATE ELSE ?8 END, \
             ?9, ?10, ?11)",
        )
        .bind(user_id)
        .bind(&new.item_name)
        .bind(new.category)
        .bind(new.amount)
        .bind(new.quantity)
        .bind(&new.unit)
        .bind(new.status)
        .bind(new.purchase_date)
        .bind(&new.shop_name)
        .bind(&new.notes)
        .bind(new.priority)
        .execute(&self.db)
        .await
        .context("insert shopping item")?;
        Ok(done.last_insert_rowid())
    }

    /// Full replace. A given purchase date wins; otherwise a purchased item
    /// keeps its existing date or gets today's.
    pub async fn update(&self, id: i64, user_id: i64, new: &NewItem) -> anyhow::Result<bool> {
        let done = sqlx::query(
            "UPDATE shopping_list SET item_name = ?1, category = ?2, amount = ?3, quantity = ?4, \
             unit = ?5, status = ?6, \
             purchase_date = CASE WHEN ?7 IS NOT NULL THEN ?7 \
             WHEN ?6 = 'purchased' THEN COALESCE(purchase_date, CURRENT_DATE) ELSE NULL END, \
             shop_name = ?8, notes = ?9, priority = ?10, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?11 AND user_id = ?12",
        )
        .bind(&new.item_name)
        .bind(new.category)
        .bind(new.amount)
        .bind(new.quantity)
        .bind(&new.unit)
        .bind(new.status)
        .bind(new.purchase_date)
        .bind(&new.shop_name)
        .bind(&new.notes)
        .bind(new.priority)
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .with_context(|| format!("update shopping item {id}"))?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM shopping_list WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .with_context(|| format!("delete shopping item {id}"))?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn update_status(&self, id: i64, user_id: i64, status: ItemStatus) -> anyhow::Result<bool> {
        Ok(self.set_status(user_id, &[id], status).await? > 0)
    }

    /// One statement over the whole id set; returns the number of rows changed.
    pub async fn set_status(&self, user_id: i64, ids: &[i64], status: ItemStatus) -> anyhow::Result<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE shopping_list SET status = ");
        qb.push_bind(status)
            .push(", updated_at = CURRENT_TIMESTAMP, purchase_date = CASE WHEN ")
            .push_bind(status)
            .push(STAMP_PURCHASE_DATE)
            .push(" WHERE user_id = ")
            .push_bind(user_id);
        push_id_list(&mut qb, ids);
        let done = qb
            .build()
            .execute(&self.db)
            .await
            .context("update shopping item status")?;
        Ok(done.rows_affected())
    }

    pub async fn delete_many(&self, user_id: i64, ids: &[i64]) -> anyhow::Result<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM shopping_list WHERE user_id = ");
        qb.push_bind(user_id);
        push_id_list(&mut qb, ids);
        let done = qb
            .build()
            .execute(&self.db)
            .await
            .context("delete shopping items")?;
        Ok(done.rows_affected())
    }

    pub async fn totals(&self, user_id: i64, f: &ShoppingFilter) -> anyhow::Result<ShoppingTotals> {
        let mut qb = scoped(
            "SELECT COUNT(*) AS total_items, \
             COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending_count, \
             COALESCE(SUM(CASE WHEN status = 'purchased' THEN 1 ELSE 0 END), 0) AS purchased_count, \
             COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled_count, \
             TOTAL(CASE WHEN status = 'purchased' THEN amount END) AS total_spent, \
             TOTAL(CASE WHEN status = 'pending' THEN amount END) AS pending_amount, \
             AVG(CASE WHEN status = 'purchased' THEN amount END) AS avg_amount \
             FROM shopping_list",
            user_id,
            f,
        )
        .into_builder();
        qb.build_query_as::<ShoppingTotals>()
            .fetch_one(&self.db)
            .await
            .context("shopping totals")
    }

    pub async fn by_category(&self, user_id: i64, f: &ShoppingFilter) -> anyhow::Result<Vec<CategoryBreakdown>> {
        let mut qb = scoped(
            "SELECT category, COUNT(*) AS item_count, TOTAL(amount) AS total_amount, \
             TOTAL(amount) / COUNT(*) AS avg_amount, \
             SUM(CASE WHEN status = 'purchased' THEN 1 ELSE 0 END) AS purchased_count, \
             SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END) AS pending_count \
             FROM shopping_list",
            user_id,
            f,
        )
        .into_builder();
        qb.push(" GROUP BY category ORDER BY total_amount DESC, category");
        qb.build_query_as::<CategoryBreakdown>()
            .fetch_all(&self.db)
            .await
            .context("shopping category breakdown")
    }
}
