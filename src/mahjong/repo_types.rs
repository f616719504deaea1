use std::str::FromStr;

use serde::Serialize;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::{
    dates::{iso_date, sql_timestamp},
    validation::UnknownVariant,
};

/// Parent row of a session; seats live in `mahjong_players`.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub user_id: i64,
    pub game_date: Date,
    pub game_time: Option<String>,
    pub win_amount: f64,
    pub table_fee: f64,
    pub taxi_fee: f64,
    pub cigarette_fee: f64,
    pub game_type: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct SeatRow {
    pub session_id: i64,
    pub seat: i64,
    pub name: String,
    pub score: f64,
}

/// A session as returned to clients, seats flattened back into parallel arrays.
#[derive(Debug, Clone, Serialize)]
pub struct MahjongSession {
    pub id: i64,
    pub user_id: i64,
    #[serde(with = "iso_date")]
    pub game_date: Date,
    pub game_time: Option<String>,
    pub players: Vec<String>,
    pub scores: Vec<f64>,
    pub win_amount: f64,
    pub table_fee: f64,
    pub taxi_fee: f64,
    pub cigarette_fee: f64,
    pub net_amount: f64,
    pub game_type: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "sql_timestamp")]
    pub created_at: PrimitiveDateTime,
    #[serde(with = "sql_timestamp")]
    pub updated_at: PrimitiveDateTime,
}

impl MahjongSession {
    /// `seats` must already be sorted by seat number.
    pub fn assemble(row: SessionRow, seats: Vec<SeatRow>) -> Self {
        let (players, scores) = seats.into_iter().map(|s| (s.name, s.score)).unzip();
        Self {
            net_amount: row.win_amount - row.table_fee - row.taxi_fee - row.cigarette_fee,
            id: row.id,
            user_id: row.user_id,
            game_date: row.game_date,
            game_time: row.game_time,
            players,
            scores,
            win_amount: row.win_amount,
            table_fee: row.table_fee,
            taxi_fee: row.taxi_fee,
            cigarette_fee: row.cigarette_fee,
            game_type: row.game_type,
            location: row.location,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Outcome of a session, decided by the sign of `win_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Win,
    Lose,
    Draw,
}

impl ResultType {
    pub const ACCEPTED: &'static str = "win, lose, draw";

    pub fn condition(self) -> &'static str {
        match self {
            Self::Win => "win_amount > 0",
            Self::Lose => "win_amount < 0",
            Self::Draw => "win_amount = 0",
        }
    }
}

impl FromStr for ResultType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Self::Win),
            "lose" => Ok(Self::Lose),
            "draw" => Ok(Self::Draw),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MahjongTotals {
    pub total_games: i64,
    pub win_games: i64,
    pub lose_games: i64,
    pub draw_games: i64,
    pub total_amount: f64,
    pub total_fees: f64,
    pub net_amount: f64,
    pub avg_amount: Option<f64>,
    pub max_win: Option<f64>,
    pub min_lose: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyResult {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub games: i64,
    pub amount: f64,
    pub wins: i64,
    pub loses: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GameTypeResult {
    pub game_type: Option<String>,
    pub games: i64,
    pub total_amount: f64,
    pub avg_amount: f64,
    pub wins: i64,
    pub loses: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonthlyResult {
    pub month: String,
    pub games: i64,
    pub total_amount: f64,
    pub avg_amount: f64,
    pub wins: i64,
    pub loses: i64,
}
