//! The closed set of menu labels the bot offers.
//!
//! A label tap arrives as an ordinary text event; the router compares text against
//! these constants.

/// Greeting command
pub const START: &str = "/start";

/// Start an income entry
pub const INCOME: &str = "➕ Income";
/// Start an expense entry
pub const EXPENSE: &str = "➖ Expense";
/// Start a report
pub const REPORT: &str = "📊 Report";
/// Show categories
pub const CATEGORIES: &str = "📝 Categories";
/// Show budgets
pub const BUDGETS: &str = "💰 Budgets";
/// Show savings goals
pub const SAVINGS: &str = "🎯 Savings";
/// Show help
pub const HELP: &str = "ℹ️ Help";

/// Abort the active flow
pub const CANCEL: &str = "❌ Cancel";
/// Abort the active flow and show the main menu
pub const MAIN_MENU: &str = "🔙 Main menu";

/// Start goal creation
pub const NEW_GOAL: &str = "➕ New goal";
/// Start a deposit
pub const DEPOSIT: &str = "💵 Deposit";
/// Start budget creation
pub const NEW_BUDGET: &str = "➕ New budget";
/// Reset all budgets
pub const RESET_BUDGETS: &str = "🔄 Reset budgets";
/// Inline button label for creating a category
pub const NEW_CATEGORY: &str = "➕ New category";

/// Skip the goal deadline
pub const SKIP: &str = "Skip";

/// Report over the last 30 days
pub const REPORT_MONTH: &str = "Last 30 days";
/// Report over the last 365 days
pub const REPORT_YEAR: &str = "Last 365 days";
/// Report over everything
pub const REPORT_ALL_TIME: &str = "All time";

/// Budget period labels, in display order
pub const PERIOD_DAY: &str = "Day";
/// Week period label
pub const PERIOD_WEEK: &str = "Week";
/// Month period label
pub const PERIOD_MONTH: &str = "Month";
/// Year period label
pub const PERIOD_YEAR: &str = "Year";

/// True for labels that abort any flow
#[must_use]
pub fn is_cancel(text: &str) -> bool {
    matches!(text.trim(), CANCEL | MAIN_MENU)
}
