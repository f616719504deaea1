use std::collections::HashMap;

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::{
    mahjong::{
        dto::{MahjongFilter, NewSession, Seat},
        repo_types::{
            DailyResult, GameTypeResult, MahjongSession, MahjongTotals, MonthlyResult, SeatRow,
            SessionRow,
        },
    },
    query::Filter,
    state::AppState,
};

const SELECT_SESSION: &str = "SELECT id, user_id, game_date, game_time, win_amount, table_fee, \
     taxi_fee, cigarette_fee, game_type, location, notes, created_at, updated_at \
     FROM mahjong_records";

#[derive(Clone)]
pub struct MahjongRepo {
    db: SqlitePool,
}

impl FromRef<AppState> for MahjongRepo {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db.clone())
    }
}

fn scoped<'a>(head: &str, user_id: i64, f: &'a MahjongFilter) -> Filter<'a> {
    let mut filter = Filter::owned(head, "user_id", user_id);
    filter
        .date_range("game_date", &f.range)
        .eq("game_type", f.game_type.as_deref());
    if let Some(result) = f.result {
        filter.raw(result.condition());
    }
    filter
}

async fn insert_seats(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: i64,
    seats: &[Seat],
) -> anyhow::Result<()> {
    if seats.is_empty() {
        return Ok(());
    }
    let mut qb =
        QueryBuilder::<Sqlite>::new("INSERT INTO mahjong_players (session_id, seat, name, score) ");
    qb.push_values(seats.iter().enumerate(), |mut b, (seat, s)| {
        b.push_bind(session_id)
            .push_bind(seat as i64)
            .push_bind(s.name.clone())
            .push_bind(s.score);
    });
    qb.build()
        .execute(&mut **tx)
        .await
        .with_context(|| format!("insert seats of session {session_id}"))?;
    Ok(())
}

impl MahjongRepo {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn seats_by_session(&self, ids: &[i64]) -> anyhow::Result<HashMap<i64, Vec<SeatRow>>> {
        let mut grouped: HashMap<i64, Vec<SeatRow>> = HashMap::new();
        if ids.is_empty() {
            return Ok(grouped);
        }
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT session_id, seat, name, score FROM mahjong_players WHERE session_id IN (",
        );
        let mut list = qb.separated(", ");
        for id in ids {
            list.push_bind(*id);
        }
        list.push_unseparated(") ORDER BY session_id, seat");
        let rows = qb
            .build_query_as::<SeatRow>()
            .fetch_all(&self.db)
            .await
            .context("load mahjong seats")?;
        for row in rows {
            grouped.entry(row.session_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn attach_seats(&self, rows: Vec<SessionRow>) -> anyhow::Result<Vec<MahjongSession>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut seats = self.seats_by_session(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let own = seats.remove(&row.id).unwrap_or_default();
                MahjongSession::assemble(row, own)
            })
            .collect())
    }

    /// Oldest first, by date then time of day.
    pub async fn list(&self, user_id: i64, f: &MahjongFilter) -> anyhow::Result<Vec<MahjongSession>> {
        let mut qb = scoped(SELECT_SESSION, user_id, f).into_builder();
        qb.push(" ORDER BY game_date ASC, game_time ASC, id ASC");
        let rows = qb
            .build_query_as::<SessionRow>()
            .fetch_all(&self.db)
            .await
            .context("list mahjong sessions")?;
        self.attach_seats(rows).await
    }

    pub async fn find(&self, id: i64, user_id: i64) -> anyhow::Result<Option<MahjongSession>> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "{SELECT_SESSION} WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("load mahjong session {id}"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.attach_seats(vec![row]).await?.pop())
    }

    /// Parent and seat rows are written in one transaction.
    pub async fn create(&self, user_id: i64, new: &NewSession) -> anyhow::Result<i64> {
        let mut tx = self.db.begin().await.context("begin transaction")?;
        let done = sqlx::query(
            "INSERT INTO mahjong_records (user_id, game_date, game_time, win_amount, table_fee, \
             taxi_fee, cigarette_fee, game_type, location, notes) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(new.game_date)
        .bind(&new.game_time)
        .bind(new.win_amount)
        .bind(new.table_fee)
        .bind(new.taxi_fee)
        .bind(new.cigarette_fee)
        .bind(&new.game_type)
        .bind(&new.location)
        .bind(&new.notes)
        .execute(&mut *tx)
        .await
        .context("insert mahjong session")?;
        let id = done.last_insert_rowid();
        insert_seats(&mut tx, id, &new.seats).await?;
        tx.commit().await.context("commit mahjong session")?;
        debug!(session_id = id, seats = new.seats.len(), "mahjong session stored");
        Ok(id)
    }

    /// Full replace; seats are rewritten in the same transaction.
    pub async fn update(&self, id: i64, user_id: i64, new: &NewSession) -> anyhow::Result<bool> {
        let mut tx = self.db.begin().await.context("begin transaction")?;
        let done = sqlx::query(
            "UPDATE mahjong_records SET game_date = ?, game_time = ?, win_amount = ?, \
             table_fee = ?, taxi_fee = ?, cigarette_fee = ?, game_type = ?, location = ?, \
             notes = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?",
        )
        .bind(new.game_date)
        .bind(&new.game_time)
        .bind(new.win_amount)
        .bind(new.table_fee)
        .bind(new.taxi_fee)
        .bind(new.cigarette_fee)
        .bind(&new.game_type)
        .bind(&new.location)
        .bind(&new.notes)
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("update mahjong session {id}"))?;
        if done.rows_affected() == 0 {
            return Ok(false);
        }
        sqlx::query("DELETE FROM mahjong_players WHERE session_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("clear seats of session {id}"))?;
        insert_seats(&mut tx, id, &new.seats).await?;
        tx.commit().await.context("commit mahjong session")?;
        Ok(true)
    }

    /// Seats go with the parent through ON DELETE CASCADE.
    pub async fn delete(&self, id: i64, user_id: i64) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM mahjong_records WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .with_context(|| format!("delete mahjong session {id}"))?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn totals(&self, user_id: i64, f: &MahjongFilter) -> anyhow::Result<MahjongTotals> {
        let mut qb = scoped(
            "SELECT COUNT(*) AS total_games, \
             COALESCE(SUM(CASE WHEN win_amount > 0 THEN 1 ELSE 0 END), 0) AS win_games, \
             COALESCE(SUM(CASE WHEN win_amount < 0 THEN 1 ELSE 0 END), 0) AS lose_games, \
             COALESCE(SUM(CASE WHEN win_amount = 0 THEN 1 ELSE 0 END), 0) AS draw_games, \
             TOTAL(win_amount) AS total_amount, \
             TOTAL(table_fee + taxi_fee + cigarette_fee) AS total_fees, \
             TOTAL(win_amount - table_fee - taxi_fee - cigarette_fee) AS net_amount, \
             AVG(win_amount) AS avg_amount, \
             MAX(CASE WHEN win_amount > 0 THEN win_amount END) AS max_win, \
             MIN(CASE WHEN win_amount < 0 THEN win_amount END) AS min_lose \
             FROM mahjong_records",
            user_id,
            f,
        )
        .into_builder();
        qb.build_query_as::<MahjongTotals>()
            .fetch_one(&self.db)
            .await
            .context("mahjong totals")
    }

    pub async fn daily(&self, user_id: i64, f: &MahjongFilter) -> anyhow::Result<Vec<DailyResult>> {
        let mut qb = scoped(
            "SELECT game_date AS date, COUNT(*) AS games, TOTAL(win_amount) AS amount, \
             SUM(CASE WHEN win_amount > 0 THEN 1 ELSE 0 END) AS wins, \
             SUM(CASE WHEN win_amount < 0 THEN 1 ELSE 0 END) AS loses \
             FROM mahjong_records",
            user_id,
            f,
        )
        .into_builder();
        qb.push(" GROUP BY game_date ORDER BY game_date");
        qb.build_query_as::<DailyResult>()
            .fetch_all(&self.db)
            .await
            .context("mahjong daily breakdown")
    }

    pub async fn by_game_type(&self, user_id: i64, f: &MahjongFilter) -> anyhow::Result<Vec<GameTypeResult>> {
        let mut qb = scoped(
            "SELECT game_type, COUNT(*) AS games, TOTAL(win_amount) AS total_amount, \
             TOTAL(win_amount) / COUNT(*) AS avg_amount, \
             SUM(CASE WHEN win_amount > 0 THEN 1 ELSE 0 END) AS wins, \
             SUM(CASE WHEN win_amount < 0 THEN 1 ELSE 0 END) AS loses \
             FROM mahjong_records",
            user_id,
            f,
        )
        .into_builder();
        qb.push(" GROUP BY game_type ORDER BY games DESC, game_type");
        qb.build_query_as::<GameTypeResult>()
            .fetch_all(&self.db)
            .await
            .context("mahjong game type breakdown")
    }

    pub async fn monthly(&self, user_id: i64, f: &MahjongFilter) -> anyhow::Result<Vec<MonthlyResult>> {
        let mut qb = scoped(
            "SELECT strftime('%Y-%m', game_date) AS month, COUNT(*) AS games, \
             TOTAL(win_amount) AS total_amount, TOTAL(win_amount) / COUNT(*) AS avg_amount, \
             SUM(CASE WHEN win_amount > 0 THEN 1 ELSE 0 END) AS wins, \
             SUM(CASE WHEN win_amount < 0 THEN 1 ELSE 0 END) AS loses \
             FROM mahjong_records",
            user_id,
            f,
        )
        .into_builder();
        qb.push(" GROUP BY month ORDER BY month DESC");
        qb.build_query_as::<MonthlyResult>()
            .fetch_all(&self.db)
            .await
            .context("mahjong monthly breakdown")
    }
}
