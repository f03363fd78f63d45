//! Budgets: overview, the creation flow (category, period, limit) and reset.

use super::{HandlerContext, Transition, category as category_handler};
use crate::{
    bot::{
        event::{CallbackAction, EventPayload},
        reply::{Keyboard, Reply},
    },
    conversation::{BudgetStep, ConversationState, validation},
    core::{
        budget::{self, UpsertOutcome},
        category,
        report::calculate_progress,
    },
    errors::{Error, Result},
};
use std::fmt::Write;
use tracing::info;

const CATEGORY_PROMPT: &str = "Choose a category for the budget:";
const PERIOD_PROMPT: &str = "Choose the budget period:";
const AMOUNT_PROMPT: &str = "Enter the budget amount:";

/// Lists the user's budgets with spend and status.
pub async fn overview(ctx: HandlerContext<'_>) -> Result<Transition> {
    let budgets = budget::list_budgets(ctx.db, ctx.user.id).await?;
    let keyboard = Keyboard::Budgets {
        can_reset: !budgets.is_empty(),
    };

    if budgets.is_empty() {
        return Ok(Transition::finish(Reply::new(
            "You have no budgets yet.",
            keyboard,
        )));
    }

    let mut text = String::from("💰 **Your budgets:**\n");
    for (b, category) in &budgets {
        let left = b.amount - b.current_spent;
        let status = if left >= 0.0 {
            "✅ Within limit".to_string()
        } else {
            format!("❌ Exceeded by {}", ctx.settings.money(-left))
        };
        write!(
            text,
            "\n📌 **{}**\nLimit: {} ({})\nSpent: {} ({:.1}%)\nRemaining: {}\nStatus: {status}\n",
            category.as_ref().map_or("?", |c| c.name.as_str()),
            ctx.settings.money(b.amount),
            b.period,
            ctx.settings.money(b.current_spent),
            calculate_progress(b.current_spent, b.amount),
            ctx.settings.money(left),
        )?;
    }

    Ok(Transition::finish(Reply::new(text.trim_end(), keyboard)))
}

async fn category_picker(ctx: HandlerContext<'_>) -> Result<Reply> {
    category_handler::picker(
        ctx,
        CATEGORY_PROMPT,
        CallbackAction::BudgetCategory,
        CallbackAction::NewBudgetCategory,
    )
    .await
}

/// Starts budget creation with the category picker.
pub async fn begin(ctx: HandlerContext<'_>) -> Result<Transition> {
    Ok(Transition::to(
        category_picker(ctx).await?,
        ConversationState::BudgetCreation(BudgetStep::AwaitCategory),
    ))
}

/// Selects the budget's category and asks for the period.
pub async fn select_category(ctx: HandlerContext<'_>, category_id: i64) -> Result<Transition> {
    category::get_category_for_user(ctx.db, ctx.user.id, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    Ok(Transition::to(
        Reply::new(PERIOD_PROMPT, Keyboard::BudgetPeriod),
        ConversationState::BudgetCreation(BudgetStep::AwaitPeriod { category_id }),
    ))
}

/// Advances budget creation by one event.
pub async fn step(
    ctx: HandlerContext<'_>,
    step: BudgetStep,
    payload: &EventPayload,
) -> Result<Transition> {
    match step {
        BudgetStep::AwaitCategory => match payload.callback() {
            Some(CallbackAction::BudgetCategory(category_id)) => {
                select_category(ctx, category_id).await
            }
            // Replaces the budget flow with standalone category creation
            Some(CallbackAction::NewBudgetCategory) => Ok(category_handler::begin()),
            _ => Ok(Transition::to(
                category_picker(ctx).await?,
                ConversationState::BudgetCreation(step),
            )),
        },
        BudgetStep::AwaitPeriod { category_id } => {
            match validation::parse_budget_period(payload.text().unwrap_or_default()) {
                Ok(period) => Ok(Transition::to(
                    Reply::cancel_only(AMOUNT_PROMPT),
                    ConversationState::BudgetCreation(BudgetStep::AwaitAmount {
                        category_id,
                        period,
                    }),
                )),
                Err(e) => Ok(Transition::reprompt(
                    &e,
                    Reply::new(PERIOD_PROMPT, Keyboard::BudgetPeriod),
                    ConversationState::BudgetCreation(step),
                )),
            }
        }
        BudgetStep::AwaitAmount {
            category_id,
            period,
        } => {
            let amount = match validation::parse_amount(payload.text().unwrap_or_default()) {
                Ok(amount) => amount,
                Err(e) => {
                    return Ok(Transition::reprompt(
                        &e,
                        Reply::cancel_only(AMOUNT_PROMPT),
                        ConversationState::BudgetCreation(step),
                    ));
                }
            };

            let category = category::get_category_for_user(ctx.db, ctx.user.id, category_id)
                .await?
                .ok_or(Error::CategoryNotFound { id: category_id })?;
            let (saved, outcome) =
                budget::upsert_budget(ctx.db, ctx.user.id, category_id, period, amount).await?;

            let action = match outcome {
                UpsertOutcome::Created => "created",
                UpsertOutcome::Updated => "updated",
            };
            info!(user_id = ctx.user.id, budget_id = saved.id, action, "Budget saved");

            Ok(Transition::finish(Reply::main(format!(
                "✅ Budget for category **«{}»** {action}!\nLimit: {} ({})",
                category.name,
                ctx.settings.money(saved.amount),
                saved.period,
            ))))
        }
    }
}

/// Zeroes spend on all of the user's budgets.
pub async fn reset(ctx: HandlerContext<'_>) -> Result<Transition> {
    let reset = budget::reset_all(ctx.db, ctx.user.id).await?;
    if reset == 0 {
        return Ok(Transition::finish(Reply::main(
            "You have no budgets to reset",
        )));
    }

    Ok(Transition::finish(Reply::main(
        "✅ All budgets reset (current spend zeroed, period restarted)",
    )))
}
