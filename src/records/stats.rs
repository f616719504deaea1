//! Reshaping of grouped aggregate rows into the response shapes.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::{
    categories::EntryKind,
    dates::iso_date,
    records::repo_types::{CategoryTotal, DayKindTotal, KindTotal},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub income_count: i64,
    pub expense_count: i64,
}

impl Totals {
    fn add(&mut self, kind: EntryKind, total: f64, count: i64) {
        match kind {
            EntryKind::Income => {
                self.income += total;
                self.income_count += count;
            }
            EntryKind::Expense => {
                self.expense += total;
                self.expense_count += count;
            }
        }
        self.balance = self.income - self.expense;
    }
}

/// Groups missing from `rows` stay at zero.
pub fn fold_totals(rows: &[KindTotal]) -> Totals {
    rows.iter().fold(Totals::default(), |mut acc, row| {
        acc.add(row.kind, row.total, row.count);
        acc
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub total: f64,
    pub count: i64,
    pub percentage: f64,
}

/// Share of the summed total, rounded to one decimal.
pub fn with_percentages(rows: Vec<CategoryTotal>) -> Vec<CategoryShare> {
    let sum: f64 = rows.iter().map(|r| r.total).sum();
    rows.into_iter()
        .map(|r| {
            let percentage = if sum > 0.0 {
                (r.total / sum * 1000.0).round() / 10.0
            } else {
                0.0
            };
            CategoryShare {
                id: r.id,
                name: r.name,
                kind: r.kind,
                total: r.total,
                count: r.count,
                percentage,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub income: f64,
    pub expense: f64,
    pub income_count: i64,
    pub expense_count: i64,
}

/// One row per date, ascending, with both directions side by side.
pub fn pivot_daily(rows: &[DayKindTotal]) -> Vec<DailyTotals> {
    let mut days: BTreeMap<Date, Totals> = BTreeMap::new();
    for row in rows {
        days.entry(row.record_date)
            .or_default()
            .add(row.kind, row.total, row.count);
    }
    days.into_iter()
        .map(|(date, t)| DailyTotals {
            date,
            income: t.income,
            expense: t.expense,
            income_count: t.income_count,
            expense_count: t.expense_count,
        })
        .collect()
}
