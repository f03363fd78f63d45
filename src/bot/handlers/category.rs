//! Category screens and the standalone category creation flow.

use super::{HandlerContext, Transition};
use crate::{
    bot::{
        event::{CallbackAction, EventPayload},
        menu,
        reply::{InlineButton, Reply},
    },
    conversation::{ConversationState, validation},
    core::{category, transaction},
    errors::{Error, Result},
};
use std::fmt::Write;

pub(super) const NAME_PROMPT: &str = "Enter the category name:";

/// Builds a category picker: one button per category plus a "new category" button.
pub(super) async fn picker(
    ctx: HandlerContext<'_>,
    prompt: &str,
    select: fn(i64) -> CallbackAction,
    create: CallbackAction,
) -> Result<Reply> {
    let categories = category::list_categories(ctx.db, ctx.user.id).await?;
    let mut buttons: Vec<InlineButton> = categories
        .into_iter()
        .map(|c| InlineButton::new(c.name, select(c.id)))
        .collect();
    buttons.push(InlineButton::new(menu::NEW_CATEGORY, create));

    Ok(Reply::cancel_only(prompt).with_inline(buttons))
}

/// Lists the user's categories with transaction count and total.
pub async fn overview(ctx: HandlerContext<'_>) -> Result<Transition> {
    let summaries = category::category_summaries(ctx.db, ctx.user.id).await?;
    let new_category =
        InlineButton::new(menu::NEW_CATEGORY, CallbackAction::NewTransactionCategory);

    if summaries.is_empty() {
        let reply = Reply::main("You have no categories yet").with_inline(vec![new_category]);
        return Ok(Transition::finish(reply));
    }

    let mut text = String::from("📝 **Your categories:**\n\n");
    for summary in &summaries {
        writeln!(
            text,
            "- {} ({} transactions, total: {})",
            summary.category.name,
            summary.transaction_count,
            ctx.settings.money(summary.total)
        )?;
    }

    let mut buttons: Vec<InlineButton> = summaries
        .into_iter()
        .map(|s| InlineButton::new(s.category.name, CallbackAction::ViewCategory(s.category.id)))
        .collect();
    buttons.push(new_category);

    Ok(Transition::finish(Reply::main(text).with_inline(buttons)))
}

/// Shows the most recent transactions of one of the user's categories.
pub async fn detail(ctx: HandlerContext<'_>, category_id: i64) -> Result<Transition> {
    let category = category::get_category_for_user(ctx.db, ctx.user.id, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let recent = transaction::recent_transactions_for_category(
        ctx.db,
        category.id,
        ctx.settings.recent_transactions,
    )
    .await?;

    let mut text = format!("📊 **{}**\n", category.name);
    for t in &recent {
        writeln!(
            text,
            "{} {} ({})",
            if t.is_income { "➕" } else { "➖" },
            ctx.settings.money(t.amount),
            t.created_at.format(validation::DATE_FORMAT)
        )?;
    }
    if recent.is_empty() {
        text.push_str("\nNo transactions in this category yet");
    }

    Ok(Transition::finish(Reply::main(text.trim_end())))
}

/// Starts standalone category creation.
pub fn begin() -> Transition {
    Transition::to(
        Reply::cancel_only(NAME_PROMPT),
        ConversationState::CategoryCreation,
    )
}

/// Creates the category named by the user's message.
pub async fn create(ctx: HandlerContext<'_>, payload: &EventPayload) -> Result<Transition> {
    let prompt = Reply::cancel_only(NAME_PROMPT);
    let Some(text) = payload.text() else {
        return Ok(Transition::to(prompt, ConversationState::CategoryCreation));
    };
    let name = match validation::parse_name(text) {
        Ok(name) => name,
        Err(e) => return Ok(Transition::reprompt(&e, prompt, ConversationState::CategoryCreation)),
    };

    match category::create_category(ctx.db, ctx.user.id, &name).await {
        Ok(created) => Ok(Transition::finish(Reply::main(format!(
            "✅ Category «{}» created!",
            created.name
        )))),
        Err(Error::DuplicateCategory { name }) => Ok(already_exists(&name)),
        Err(e) => Err(e),
    }
}

/// Ends a flow after a duplicate category name; nothing was written.
pub(super) fn already_exists(name: &str) -> Transition {
    Transition::finish(Reply::main(format!(
        "❌ Category «{name}» already exists!"
    )))
}
