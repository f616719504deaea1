use anyhow::Context;
use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    categories::EntryKind,
    dates::DateRange,
    query::Filter,
    records::{
        dto::{NewRecord, RecordFilter},
        repo_types::{CategoryTotal, DayKindTotal, KindTotal, Record},
    },
    state::AppState,
};

const SELECT_RECORD: &str = "SELECT r.id, r.type, r.category_id, c.name AS category_name, \
     c.type AS category_type, r.amount, r.description, r.record_date, r.user_id, r.created_at \
     FROM records r LEFT JOIN categories c ON c.id = r.category_id";

#[derive(Clone)]
pub struct RecordRepo {
    db: SqlitePool,
}

impl FromRef<AppState> for RecordRepo {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db.clone())
    }
}

impl RecordRepo {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: i64, f: &RecordFilter) -> anyhow::Result<Vec<Record>> {
        let mut filter = Filter::owned(SELECT_RECORD, "r.user_id", user_id);
        filter
            .eq("r.type", f.kind)
            .eq("r.category_id", f.category_id)
            .date_range("r.record_date", &f.range);
        let mut qb = filter.into_builder();
        qb.push(" ORDER BY r.record_date DESC, r.created_at DESC, r.id DESC");
        if let Some(limit) = f.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        qb.build_query_as::<Record>()
            .fetch_all(&self.db)
            .await
            .context("list records")
    }

    pub async fn find(&self, id: i64, user_id: i64) -> anyhow::Result<Option<Record>> {
        let mut filter = Filter::owned(SELECT_RECORD, "r.user_id", user_id);
        filter.eq("r.id", Some(id));
        let mut qb = filter.into_builder();
        qb.build_query_as::<Record>()
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("load record {id}"))
    }

    pub async fn create(&self, user_id: i64, new: &NewRecord) -> anyhow::Result<i64> {
        let done = sqlx::query(
            "INSERT INTO records (type, category_id, amount, description, record_date, user_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.kind)
        .bind(new.category_id)
        .bind(new.amount)
        .bind(&new.description)
        .bind(new.record_date)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("insert record")?;
        Ok(done.last_insert_rowid())
    }

    pub async fn update(&self, id: i64, user_id: i64, new: &NewRecord) -> anyhow::Result<bool> {
        let done = sqlx::query(
            "UPDATE records SET type = ?, category_id = ?, amount = ?, description = ?, \
             record_date = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?",
        )
        .bind(new.kind)
        .bind(new.category_id)
        .bind(new.amount)
        .bind(&new.description)
        .bind(new.record_date)
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .with_context(|| format!("update record {id}"))?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64, user_id: i64) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM records WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .with_context(|| format!("delete record {id}"))?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn totals_by_kind(&self, user_id: i64, f: &RecordFilter) -> anyhow::Result<Vec<KindTotal>> {
        let mut filter = Filter::owned(
            "SELECT type, TOTAL(amount) AS total, COUNT(*) AS count FROM records",
            "user_id",
            user_id,
        );
        filter
            .eq("category_id", f.category_id)
            .date_range("record_date", &f.range);
        let mut qb = filter.into_builder();
        qb.push(" GROUP BY type");
        qb.build_query_as::<KindTotal>()
            .fetch_all(&self.db)
            .await
            .context("record totals")
    }

    pub async fn totals_by_category(
        &self,
        user_id: i64,
        kind: Option<EntryKind>,
        range: &DateRange,
    ) -> anyhow::Result<Vec<CategoryTotal>> {
        let mut filter = Filter::owned(
            "SELECT c.id, c.name, c.type, TOTAL(r.amount) AS total, COUNT(r.id) AS count \
             FROM records r JOIN categories c ON c.id = r.category_id",
            "r.user_id",
            user_id,
        );
        filter.eq("r.type", kind).date_range("r.record_date", range);
        let mut qb = filter.into_builder();
        qb.push(" GROUP BY c.id, c.name, c.type ORDER BY total DESC, c.name");
        qb.build_query_as::<CategoryTotal>()
            .fetch_all(&self.db)
            .await
            .context("record totals by category")
    }

    pub async fn totals_by_day(&self, user_id: i64, range: &DateRange) -> anyhow::Result<Vec<DayKindTotal>> {
        let mut filter = Filter::owned(
            "SELECT record_date, type, TOTAL(amount) AS total, COUNT(*) AS count FROM records",
            "user_id",
            user_id,
        );
        filter.date_range("record_date", range);
        let mut qb = filter.into_builder();
        qb.push(" GROUP BY record_date, type ORDER BY record_date");
        qb.build_query_as::<DayKindTotal>()
            .fetch_all(&self.db)
            .await
            .context("record totals by day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, records::stats::fold_totals, test_support::seed_user};
    use time::macros::date;

    async fn setup() -> (RecordRepo, i64, i64) {
        let pool = db::memory().await.unwrap();
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;
        (RecordRepo::new(pool), alice, bob)
    }

    // Seeded ids: 1 = Salary (income), 5 = Dining (expense).
    fn record(kind: EntryKind, category_id: i64, amount: f64, day: time::Date) -> NewRecord {
        NewRecord {
            kind,
            category_id,
            amount,
            description: None,
            record_date: day,
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_with_category_names() {
        let (repo, alice, _) = setup().await;
        repo.create(alice, &record(EntryKind::Expense, 5, 20.0, date!(2025 - 01 - 10))).await.unwrap();
        repo.create(alice, &record(EntryKind::Income, 1, 1000.0, date!(2025 - 01 - 15))).await.unwrap();

        let rows = repo.list(alice, &RecordFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].record_date, date!(2025 - 01 - 15));
        assert_eq!(rows[0].category_name.as_deref(), Some("Salary"));
        assert_eq!(rows[0].category_type, Some(EntryKind::Income));

        let limited = RecordFilter { limit: Some(1), ..Default::default() };
        assert_eq!(repo.list(alice, &limited).await.unwrap().len(), 1);

        let expenses = RecordFilter { kind: Some(EntryKind::Expense), ..Default::default() };
        assert_eq!(repo.list(alice, &expenses).await.unwrap()[0].amount, 20.0);
    }

    #[tokio::test]
    async fn january_statistics() {
        let (repo, alice, _) = setup().await;
        repo.create(alice, &record(EntryKind::Income, 1, 1000.0, date!(2025 - 01 - 15))).await.unwrap();
        repo.create(alice, &record(EntryKind::Expense, 5, 99.0, date!(2025 - 02 - 01))).await.unwrap();

        let january = RecordFilter {
            range: DateRange {
                start: Some(date!(2025 - 01 - 01)),
                end: Some(date!(2025 - 01 - 31)),
            },
            ..Default::default()
        };
        let totals = fold_totals(&repo.totals_by_kind(alice, &january).await.unwrap());
        assert_eq!(totals.income, 1000.0);
        assert_eq!(totals.expense, 0.0);
        assert_eq!(totals.balance, 1000.0);
        assert_eq!(totals.income_count, 1);
        assert_eq!(totals.expense_count, 0);
    }

    #[tokio::test]
    async fn category_and_daily_breakdowns() {
        let (repo, alice, _) = setup().await;
        let day = date!(2025 - 03 - 01);
        repo.create(alice, &record(EntryKind::Expense, 5, 30.0, day)).await.unwrap();
        repo.create(alice, &record(EntryKind::Expense, 5, 10.0, day)).await.unwrap();
        repo.create(alice, &record(EntryKind::Expense, 6, 60.0, day)).await.unwrap();
        repo.create(alice, &record(EntryKind::Income, 1, 500.0, date!(2025 - 03 - 02))).await.unwrap();

        let cats = repo
            .totals_by_category(alice, Some(EntryKind::Expense), &DateRange::default())
            .await
            .unwrap();
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].name, "Transport");
        assert_eq!(cats[0].total, 60.0);
        assert_eq!(cats[1].count, 2);

        let days = repo.totals_by_day(alice, &DateRange::default()).await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].record_date, day);
        assert_eq!(days[0].total, 100.0);
    }

    #[tokio::test]
    async fn other_users_cannot_touch_records() {
        let (repo, alice, bob) = setup().await;
        let id = repo
            .create(alice, &record(EntryKind::Income, 1, 10.0, date!(2025 - 01 - 01)))
            .await
            .unwrap();
        let edit = record(EntryKind::Income, 1, 99.0, date!(2025 - 01 - 01));

        assert!(repo.find(id, bob).await.unwrap().is_none());
        assert!(!repo.update(id, bob, &edit).await.unwrap());
        assert!(!repo.delete(id, bob).await.unwrap());
        assert!(repo.list(bob, &RecordFilter::default()).await.unwrap().is_empty());

        assert!(repo.update(id, alice, &edit).await.unwrap());
        assert_eq!(repo.find(id, alice).await.unwrap().unwrap().amount, 99.0);
        assert!(repo.delete(id, alice).await.unwrap());
    }
}
