//! Report generation business logic.
//!
//! Produces period summaries (income, expense, balance and expenses per category) and the
//! small display helpers shared by the overview screens. All functions return structured
//! data; the bot layer formats it.

use crate::{
    entities::{Category, Transaction, category, transaction},
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QuerySelect, prelude::*};

/// Time window of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    /// The last 30 days
    Month,
    /// The last 365 days
    Year,
    /// Everything ever recorded
    AllTime,
}

impl ReportPeriod {
    /// Start of the window relative to `now`, or `None` for all time.
    #[must_use]
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Month => Some(now - Duration::days(30)),
            Self::Year => Some(now - Duration::days(365)),
            Self::AllTime => None,
        }
    }
}

/// Total expenses of one category within a report window.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// Category name
    pub name: String,
    /// Sum of expenses
    pub total: f64,
}

/// Summary of a user's transactions within a window.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReport {
    /// The window reported on
    pub period: ReportPeriod,
    /// Sum of income
    pub income: f64,
    /// Sum of expenses
    pub expense: f64,
    /// Expenses per category, largest first
    pub expenses_by_category: Vec<CategoryTotal>,
}

impl PeriodReport {
    /// Income minus expenses
    #[must_use]
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

async fn sum_for_user<C>(
    db: &C,
    user_id: i64,
    is_income: bool,
    since: Option<DateTime<Utc>>,
) -> Result<f64>
where
    C: ConnectionTrait,
{
    let mut query = Transaction::find()
        .select_only()
        .column_as(transaction::Column::Amount.sum(), "total")
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::IsIncome.eq(is_income));
    if let Some(since) = since {
        query = query.filter(transaction::Column::CreatedAt.gte(since));
    }

    let total: Option<Option<f64>> = query.into_tuple().one(db).await?;
    Ok(total.flatten().unwrap_or(0.0))
}

async fn expenses_by_category<C>(
    db: &C,
    user_id: i64,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<CategoryTotal>>
where
    C: ConnectionTrait,
{
    let mut query = Transaction::find()
        .select_only()
        .column(category::Column::Name)
        .column_as(transaction::Column::Amount.sum(), "total")
        .inner_join(Category)
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::IsIncome.eq(false));
    if let Some(since) = since {
        query = query.filter(transaction::Column::CreatedAt.gte(since));
    }

    let rows: Vec<(String, f64)> = query
        .group_by(category::Column::Id)
        .group_by(category::Column::Name)
        .into_tuple()
        .all(db)
        .await?;

    let mut totals: Vec<CategoryTotal> = rows
        .into_iter()
        .map(|(name, total)| CategoryTotal { name, total })
        .collect();
    totals.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    Ok(totals)
}

/// Generates the income/expense report for `user_id` over `period`, ending at `now`.
pub async fn generate_report<C>(
    db: &C,
    user_id: i64,
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> Result<PeriodReport>
where
    C: ConnectionTrait,
{
    let since = period.since(now);

    Ok(PeriodReport {
        period,
        income: sum_for_user(db, user_id, true, since).await?,
        expense: sum_for_user(db, user_id, false, since).await?,
        expenses_by_category: expenses_by_category(db, user_id, since).await?,
    })
}

/// Calculates how much of `target` has been reached, as a percentage.
///
/// Returns 0 for a non-positive target.
#[must_use]
pub fn calculate_progress(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }

    (current / target) * 100.0
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // clamped_progress is within [0, 100] and length is small, so the cast stays in range
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}
