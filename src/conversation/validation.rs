//! Parsing and validation of free-text input.
//!
//! Every failure here is recoverable: the handler re-prompts the same step with the
//! error's message and keeps the working data collected so far.

use crate::entities::BudgetPeriod;
use chrono::NaiveDate;
use thiserror::Error;

/// Token (compared case-insensitively) that skips the optional goal deadline
pub const SKIP_TOKEN: &str = "skip";

/// Day.month.year, as typed by users
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// A rejected input; `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Not a number, not finite, or not greater than zero
    #[error("Enter a valid amount (a number greater than 0):")]
    InvalidAmount,
    /// Empty or whitespace-only name
    #[error("The name cannot be empty!")]
    EmptyName,
    /// Date not in DD.MM.YYYY form
    #[error("Invalid date format! Use DD.MM.YYYY")]
    InvalidDate,
    /// Date on or before today
    #[error("The date must be in the future! Enter it again:")]
    DateNotInFuture,
    /// Not one of the offered period options
    #[error("Please choose a period from the options provided")]
    UnknownPeriod,
}

/// Optional deadline answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    /// The user chose not to set a deadline
    Skip,
    /// A validated future date
    Date(NaiveDate),
}

/// Parses a strictly positive, finite decimal amount.
pub fn parse_amount(input: &str) -> Result<f64, ValidationError> {
    let amount: f64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidAmount)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::InvalidAmount);
    }
    Ok(amount)
}

/// Trims a name and rejects it if nothing is left.
pub fn parse_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Parses a goal deadline: the skip token, or a `DD.MM.YYYY` date strictly after `today`.
pub fn parse_target_date(input: &str, today: NaiveDate) -> Result<DateInput, ValidationError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case(SKIP_TOKEN) {
        return Ok(DateInput::Skip);
    }

    let date =
        NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate)?;
    if date <= today {
        return Err(ValidationError::DateNotInFuture);
    }
    Ok(DateInput::Date(date))
}

/// Normalizes a period token (`day`, `week`, `month`, `year`, any case).
pub fn parse_budget_period(input: &str) -> Result<BudgetPeriod, ValidationError> {
    match input.trim().to_lowercase().as_str() {
        "day" => Ok(BudgetPeriod::Day),
        "week" => Ok(BudgetPeriod::Week),
        "month" => Ok(BudgetPeriod::Month),
        "year" => Ok(BudgetPeriod::Year),
        _ => Err(ValidationError::UnknownPeriod),
    }
}
