use serde::Deserialize;
use time::Date;

use crate::{
    dates::{parse_clock, parse_date, DateRange},
    error::AppError,
    mahjong::repo_types::ResultType,
    validation::{fee, non_blank, optional_choice, required_amount, required_text, NumberLike},
};

#[derive(Debug, Deserialize)]
pub struct SessionPayload {
    pub game_date: Option<String>,
    pub game_time: Option<String>,
    pub players: Option<Vec<String>>,
    pub scores: Option<Vec<NumberLike>>,
    pub win_amount: Option<NumberLike>,
    pub table_fee: Option<NumberLike>,
    pub taxi_fee: Option<NumberLike>,
    pub cigarette_fee: Option<NumberLike>,
    pub game_type: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Seat {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub game_date: Date,
    pub game_time: Option<String>,
    pub seats: Vec<Seat>,
    pub win_amount: f64,
    pub table_fee: f64,
    pub taxi_fee: f64,
    pub cigarette_fee: f64,
    pub game_type: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl SessionPayload {
    pub fn validate(self) -> Result<NewSession, AppError> {
        let game_date = required_text("game_date", self.game_date)?;
        let (Some(players), Some(scores)) = (self.players, self.scores) else {
            return Err(AppError::invalid("players and scores are required"));
        };
        if players.len() != scores.len() {
            return Err(AppError::invalid(format!(
                "players and scores must have the same length ({} vs {})",
                players.len(),
                scores.len()
            )));
        }
        let seats = players
            .into_iter()
            .zip(&scores)
            .map(|(name, score)| {
                let name = required_text("player name", Some(name))?;
                let score = required_amount("score", Some(score))?;
                Ok(Seat { name, score })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(NewSession {
            game_date: parse_date("game_date", &game_date)?,
            game_time: non_blank(self.game_time)
                .map(|t| parse_clock("game_time", &t))
                .transpose()?,
            seats,
            win_amount: required_amount("win_amount", self.win_amount.as_ref())?,
            table_fee: fee("table_fee", self.table_fee.as_ref())?,
            taxi_fee: fee("taxi_fee", self.taxi_fee.as_ref())?,
            cigarette_fee: fee("cigarette_fee", self.cigarette_fee.as_ref())?,
            game_type: non_blank(self.game_type),
            location: non_blank(self.location),
            notes: non_blank(self.notes),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MahjongQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub game_type: Option<String>,
    pub result_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MahjongFilter {
    pub range: DateRange,
    pub game_type: Option<String>,
    pub result: Option<ResultType>,
}

impl MahjongQuery {
    pub fn validate(self) -> Result<MahjongFilter, AppError> {
        Ok(MahjongFilter {
            range: DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())?,
            game_type: non_blank(self.game_type),
            result: optional_choice("result_type", self.result_type.as_deref(), ResultType::ACCEPTED)?,
        })
    }
}
