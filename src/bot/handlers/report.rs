//! Report generation: pick a period, get income, expenses and balance.

use super::{HandlerContext, Transition};
use crate::{
    bot::{
        event::EventPayload,
        menu,
        reply::{Keyboard, Reply},
    },
    conversation::{ConversationState, ValidationError},
    core::report::{self, ReportPeriod},
    errors::Result,
};
use std::fmt::Write;

const PERIOD_PROMPT: &str = "Choose the report period:";

fn period_from_label(label: &str) -> Option<ReportPeriod> {
    match label {
        menu::REPORT_MONTH => Some(ReportPeriod::Month),
        menu::REPORT_YEAR => Some(ReportPeriod::Year),
        menu::REPORT_ALL_TIME => Some(ReportPeriod::AllTime),
        _ => None,
    }
}

const fn period_title(period: ReportPeriod) -> &'static str {
    match period {
        ReportPeriod::Month => "last 30 days",
        ReportPeriod::Year => "last 365 days",
        ReportPeriod::AllTime => "all time",
    }
}

/// Asks for the report period.
pub fn begin() -> Transition {
    Transition::to(
        Reply::new(PERIOD_PROMPT, Keyboard::ReportPeriod),
        ConversationState::Report,
    )
}

/// Generates the report for the chosen period.
pub async fn step(ctx: HandlerContext<'_>, payload: &EventPayload) -> Result<Transition> {
    let Some(period) = payload.text().and_then(period_from_label) else {
        return Ok(Transition::reprompt(
            &ValidationError::UnknownPeriod,
            Reply::new(PERIOD_PROMPT, Keyboard::ReportPeriod),
            ConversationState::Report,
        ));
    };

    let data = report::generate_report(ctx.db, ctx.user.id, period, chrono::Utc::now()).await?;
    let money = |amount| ctx.settings.money(amount);

    let mut text = format!(
        "📊 **Report: {}**\n\
         ➖ Expenses: {}\n\
         ➕ Income: {}\n\
         🧮 Balance: {}\n\n\
         **Expenses by category:**",
        period_title(period),
        money(data.expense),
        money(data.income),
        money(data.balance()),
    );
    for row in &data.expenses_by_category {
        write!(text, "\n- {}: {}", row.name, money(row.total))?;
    }
    if data.expenses_by_category.is_empty() {
        text.push_str("\n\nNo expense data");
    }

    Ok(Transition::finish(Reply::main(text)))
}
