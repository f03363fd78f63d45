//! Transaction entry: amount, then category (existing or newly created), then save.

use super::{HandlerContext, Transition, category as category_handler};
use crate::{
    bot::{
        event::{CallbackAction, EventPayload},
        reply::Reply,
    },
    config::settings::Settings,
    conversation::{ConversationState, TransactionStep, validation},
    core::{
        budget::{self, ExpenseOutcome},
        category,
        transaction::{self, TransactionKind},
    },
    errors::{Error, Result},
};
use sea_orm::TransactionTrait;
use std::fmt::Write;
use tracing::info;

const AMOUNT_PROMPT: &str = "Enter the amount:";
const CATEGORY_PROMPT: &str = "Choose a category:";

/// Starts entry of an income or expense.
pub fn begin(kind: TransactionKind) -> Transition {
    Transition::to(
        Reply::cancel_only(AMOUNT_PROMPT),
        ConversationState::Transaction(TransactionStep::AwaitAmount { kind }),
    )
}

/// Advances the transaction flow by one event.
pub async fn step(
    ctx: HandlerContext<'_>,
    step: TransactionStep,
    payload: &EventPayload,
) -> Result<Transition> {
    match step {
        TransactionStep::AwaitAmount { kind } => {
            let state = ConversationState::Transaction(step);
            match validation::parse_amount(payload.text().unwrap_or_default()) {
                Ok(amount) => Ok(Transition::to(
                    category_picker(ctx).await?,
                    ConversationState::Transaction(TransactionStep::AwaitCategory { kind, amount }),
                )),
                Err(e) => Ok(Transition::reprompt(&e, Reply::cancel_only(AMOUNT_PROMPT), state)),
            }
        }
        TransactionStep::AwaitCategory { kind, amount } => match payload.callback() {
            Some(CallbackAction::TransactionCategory(category_id)) => {
                save(ctx, kind, amount, category_id).await
            }
            Some(CallbackAction::NewTransactionCategory) => Ok(Transition::to(
                Reply::cancel_only(category_handler::NAME_PROMPT),
                ConversationState::Transaction(TransactionStep::AwaitNewCategoryName {
                    kind,
                    amount,
                }),
            )),
            _ => Ok(Transition::to(
                category_picker(ctx).await?,
                ConversationState::Transaction(step),
            )),
        },
        TransactionStep::AwaitNewCategoryName { kind, amount } => {
            let prompt = Reply::cancel_only(category_handler::NAME_PROMPT);
            let state = ConversationState::Transaction(step);
            let Some(text) = payload.text() else {
                return Ok(Transition::to(prompt, state));
            };
            match validation::parse_name(text) {
                Ok(name) => save_with_new_category(ctx, kind, amount, &name).await,
                Err(e) => Ok(Transition::reprompt(&e, prompt, state)),
            }
        }
    }
}

async fn category_picker(ctx: HandlerContext<'_>) -> Result<Reply> {
    category_handler::picker(
        ctx,
        CATEGORY_PROMPT,
        CallbackAction::TransactionCategory,
        CallbackAction::NewTransactionCategory,
    )
    .await
}

async fn save(
    ctx: HandlerContext<'_>,
    kind: TransactionKind,
    amount: f64,
    category_id: i64,
) -> Result<Transition> {
    let recorded =
        transaction::record_transaction(ctx.db, ctx.user.id, category_id, amount, kind).await?;

    let mut text = format!("✅ {kind} {} saved!", ctx.settings.money(amount));
    append_budget_notes(&mut text, ctx.settings, &recorded.category.name, &recorded.budgets)?;

    info!(
        user_id = ctx.user.id,
        transaction_id = recorded.transaction.id,
        "Transaction entry completed"
    );
    Ok(Transition::finish(Reply::main(text)))
}

/// Creates the category and files the pending transaction under it as one unit.
async fn save_with_new_category(
    ctx: HandlerContext<'_>,
    kind: TransactionKind,
    amount: f64,
    name: &str,
) -> Result<Transition> {
    let txn = ctx.db.begin().await?;

    let created = match category::create_category(&txn, ctx.user.id, name).await {
        Ok(created) => created,
        Err(Error::DuplicateCategory { name }) => {
            txn.rollback().await?;
            return Ok(category_handler::already_exists(&name));
        }
        Err(e) => return Err(e),
    };
    let recorded =
        transaction::record_transaction(&txn, ctx.user.id, created.id, amount, kind).await?;

    txn.commit().await?;

    info!(
        user_id = ctx.user.id,
        category_id = created.id,
        transaction_id = recorded.transaction.id,
        "Transaction entry completed with a new category"
    );
    Ok(Transition::finish(Reply::main(format!(
        "✅ Category «{}» created and transaction saved!\nAmount: {}",
        created.name,
        ctx.settings.money(amount)
    ))))
}

/// Appends overage warnings and near-limit reminders for the budgets an expense touched.
fn append_budget_notes(
    text: &mut String,
    settings: &Settings,
    category_name: &str,
    outcome: &ExpenseOutcome,
) -> Result<()> {
    for notice in &outcome.overages {
        write!(
            text,
            "\n\n⚠️ Budget exceeded for category {}!\nLimit: {} ({})\nSpent: {}\nOver by: {}",
            notice.category_name,
            settings.money(notice.limit),
            notice.period,
            settings.money(notice.spent),
            settings.money(notice.overage),
        )?;
    }

    for near in outcome
        .updated
        .iter()
        .filter(|b| budget::is_near_limit(b, settings.budget_alert_percent))
    {
        write!(
            text,
            "\n\n🔔 Budget for category {category_name} is almost used up: {} left of {} ({})",
            settings.money(near.amount - near.current_spent),
            settings.money(near.amount),
            near.period,
        )?;
    }

    Ok(())
}
