use anyhow::Context;
use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    dates::DateRange,
    gifts::{
        dto::{GiftFilter, NewGift},
        repo_types::{EventTypeTotals, GiftDirection, GiftRecord, GiftTotals, MonthlyGiftTotals, NameBalance},
    },
    query::Filter,
    state::AppState,
};

const SELECT_GIFT: &str = "SELECT id, user_id, name, gift_type, event_type, amount, event_date, \
     relationship, location, notes, created_at, updated_at FROM gift_records";

#[derive(Clone)]
pub struct GiftRepo {
    db: SqlitePool,
}

impl FromRef<AppState> for GiftRepo {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db.clone())
    }
}

fn scoped<'a>(head: &str, user_id: i64, f: &'a GiftFilter) -> Filter<'a> {
    let mut filter = Filter::owned(head, "user_id", user_id);
    filter
        .eq("gift_type", f.gift_type)
        .eq("event_type", f.event_type.as_deref())
        .contains("name", f.name.as_deref())
        .date_range("event_date", &f.range);
    filter
}

impl GiftRepo {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: i64, f: &GiftFilter) -> anyhow::Result<Vec<GiftRecord>> {
        let mut qb = scoped(SELECT_GIFT, user_id, f).into_builder();
        qb.push(" ORDER BY event_date DESC, created_at DESC, id DESC");
        qb.build_query_as::<GiftRecord>()
            .fetch_all(&self.db)
            .await
            .context("list gift records")
    }

    pub async fn find(&self, id: i64, user_id: i64) -> anyhow::Result<Option<GiftRecord>> {
        sqlx::query_as::<_, GiftRecord>(&format!("{SELECT_GIFT} WHERE id = ? AND user_id = ?"))
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("load gift record {id}"))
    }

    pub async fn create(&self, user_id: i64, new: &NewGift) -> anyhow::Result<i64> {
        let done = sqlx::query(
            "INSERT INTO gift_records (user_id, name, gift_type, event_type, amount, event_date, \
             relationship, location, notes) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&new.name)
        .bind(new.gift_type)
        .bind(&new.event_type)
        .bind(new.amount)
        .bind(new.event_date)
        .bind(&new.relationship)
        .bind(&new.location)
        .bind(&new.notes)
        .execute(&self.db)
        .await
        .context("insert gift record")?;
        Ok(done.last_insert_rowid())
    }

    pub async fn update(&self, id: i64, user_id: i64, new: &NewGift) -> anyhow::Result<bool> {
        let done = sqlx::query(
            "UPDATE gift_records SET name = ?, gift_type = ?, event_type = ?, amount = ?, \
             event_date = ?, relationship = ?, location = ?, notes = ?, \
             updated_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?",
        )
        .bind(&new.name)
        .bind(new.gift_type)
        .bind(&new.event_type)
        .bind(new.amount)
        .bind(new.event_date)
        .bind(&new.relationship)
        .bind(&new.location)
        .bind(&new.notes)
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .with_context(|| format!("update gift record {id}"))?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM gift_records WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .with_context(|| format!("delete gift record {id}"))?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn totals(&self, user_id: i64, f: &GiftFilter) -> anyhow::Result<GiftTotals> {
        let mut qb = scoped(
            "SELECT COUNT(*) AS total_count, \
             COALESCE(SUM(CASE WHEN gift_type = 'giving' THEN 1 ELSE 0 END), 0) AS giving_count, \
             COALESCE(SUM(CASE WHEN gift_type = 'receiving' THEN 1 ELSE 0 END), 0) AS receiving_count, \
             TOTAL(CASE WHEN gift_type = 'giving' THEN amount END) AS total_giving, \
             TOTAL(CASE WHEN gift_type = 'receiving' THEN amount END) AS total_receiving, \
             TOTAL(CASE WHEN gift_type = 'receiving' THEN amount ELSE -amount END) AS net_amount, \
             AVG(CASE WHEN gift_type = 'giving' THEN amount END) AS avg_giving, \
             AVG(CASE WHEN gift_type = 'receiving' THEN amount END) AS avg_receiving \
             FROM gift_records",
            user_id,
            f,
        )
        .into_builder();
        qb.build_query_as::<GiftTotals>()
            .fetch_one(&self.db)
            .await
            .context("gift totals")
    }

    pub async fn by_event_type(
        &self,
        user_id: i64,
        gift_type: Option<GiftDirection>,
        range: &DateRange,
    ) -> anyhow::Result<Vec<EventTypeTotals>> {
        let mut filter = Filter::owned(
            "SELECT event_type, gift_type, COUNT(*) AS count, TOTAL(amount) AS total_amount, \
             TOTAL(amount) / COUNT(*) AS avg_amount, MAX(amount) AS max_amount, \
             MIN(amount) AS min_amount FROM gift_records",
            "user_id",
            user_id,
        );
        filter.eq("gift_type", gift_type).date_range("event_date", range);
        let mut qb = filter.into_builder();
        qb.push(" GROUP BY event_type, gift_type ORDER BY total_amount DESC, event_type");
        qb.build_query_as::<EventTypeTotals>()
            .fetch_all(&self.db)
            .await
            .context("gift event type breakdown")
    }

    /// Largest imbalance first.
    pub async fn by_name(&self, user_id: i64, range: &DateRange) -> anyhow::Result<Vec<NameBalance>> {
        let mut filter = Filter::owned(
            "SELECT name, \
             TOTAL(CASE WHEN gift_type = 'giving' THEN amount END) AS total_giving, \
             TOTAL(CASE WHEN gift_type = 'receiving' THEN amount END) AS total_receiving, \
             TOTAL(CASE WHEN gift_type = 'receiving' THEN amount ELSE -amount END) AS balance, \
             COUNT(*) AS interaction_count, MAX(event_date) AS last_event_date \
             FROM gift_records",
            "user_id",
            user_id,
        );
        filter.date_range("event_date", range);
        let mut qb = filter.into_builder();
        qb.push(" GROUP BY name ORDER BY ABS(balance) DESC, name");
        qb.build_query_as::<NameBalance>()
            .fetch_all(&self.db)
            .await
            .context("gift name statistics")
    }

    pub async fn yearly(&self, user_id: i64, year: i32) -> anyhow::Result<Vec<MonthlyGiftTotals>> {
        sqlx::query_as::<_, MonthlyGiftTotals>(
            "SELECT strftime('%Y-%m', event_date) AS month, gift_type, COUNT(*) AS count, \
             TOTAL(amount) AS total_amount FROM gift_records \
             WHERE user_id = ? AND strftime('%Y', event_date) = ? \
             GROUP BY month, gift_type ORDER BY month, gift_type",
        )
        .bind(user_id)
        .bind(format!("{year:04}"))
        .fetch_all(&self.db)
        .await
        .with_context(|| format!("gift breakdown for {year}"))
    }
}
