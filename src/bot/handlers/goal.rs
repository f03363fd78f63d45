//! Savings goals: overview, goal creation and deposits.

use super::{HandlerContext, Transition};
use crate::{
    bot::{
        event::{CallbackAction, EventPayload},
        reply::{InlineButton, Keyboard, Reply},
    },
    conversation::{
        ConversationState, DateInput, DepositStep, GoalStep,
        validation::{self, DATE_FORMAT},
    },
    core::{
        goal,
        report::{calculate_progress, format_progress_bar},
    },
    entities::savings_goal,
    errors::{Error, Result},
};
use std::fmt::Write;
use tracing::info;

const NAME_PROMPT: &str = "Enter the goal name:";
const TARGET_PROMPT: &str = "Enter the target amount:";
const DATE_PROMPT: &str = "Enter the target date (DD.MM.YYYY) or press 'Skip':";
const SELECT_PROMPT: &str = "Choose a goal to deposit into:";
const DEPOSIT_PROMPT: &str = "Enter the deposit amount:";

fn remaining(goal: &savings_goal::Model) -> f64 {
    (goal.target_amount - goal.current_amount).max(0.0)
}

/// Lists the user's goals with progress.
pub async fn overview(ctx: HandlerContext<'_>) -> Result<Transition> {
    let goals = goal::list_goals(ctx.db, ctx.user.id).await?;
    let keyboard = Keyboard::Savings {
        can_deposit: !goals.is_empty(),
    };

    if goals.is_empty() {
        return Ok(Transition::finish(Reply::new(
            "You have no savings goals yet.",
            keyboard,
        )));
    }

    let mut text = String::from("🎯 **Your savings goals:**\n");
    for g in &goals {
        let progress = calculate_progress(g.current_amount, g.target_amount);
        write!(
            text,
            "\n📌 **{}**\nTarget: {}\nSaved: {}\n{}\nRemaining: {}\n",
            g.name,
            ctx.settings.money(g.target_amount),
            ctx.settings.money(g.current_amount),
            format_progress_bar(progress, None),
            ctx.settings.money(remaining(g)),
        )?;
        if let Some(date) = g.target_date {
            writeln!(text, "Deadline: {}", date.format(DATE_FORMAT))?;
        }
    }

    Ok(Transition::finish(Reply::new(text.trim_end(), keyboard)))
}

/// Starts goal creation.
pub fn begin() -> Transition {
    Transition::to(
        Reply::cancel_only(NAME_PROMPT),
        ConversationState::GoalCreation(GoalStep::AwaitName),
    )
}

/// Advances goal creation by one event.
pub async fn creation_step(
    ctx: HandlerContext<'_>,
    step: GoalStep,
    payload: &EventPayload,
) -> Result<Transition> {
    let input = payload.text().unwrap_or_default();

    match step {
        GoalStep::AwaitName => match validation::parse_name(input) {
            Ok(name) => Ok(Transition::to(
                Reply::cancel_only(TARGET_PROMPT),
                ConversationState::GoalCreation(GoalStep::AwaitTargetAmount { name }),
            )),
            Err(e) => Ok(Transition::reprompt(
                &e,
                Reply::cancel_only(NAME_PROMPT),
                ConversationState::GoalCreation(GoalStep::AwaitName),
            )),
        },
        GoalStep::AwaitTargetAmount { name } => match validation::parse_amount(input) {
            Ok(target_amount) => Ok(Transition::to(
                Reply::new(DATE_PROMPT, Keyboard::SkipOrCancel),
                ConversationState::GoalCreation(GoalStep::AwaitTargetDate {
                    name,
                    target_amount,
                }),
            )),
            Err(e) => Ok(Transition::reprompt(
                &e,
                Reply::cancel_only(TARGET_PROMPT),
                ConversationState::GoalCreation(GoalStep::AwaitTargetAmount { name }),
            )),
        },
        GoalStep::AwaitTargetDate {
            name,
            target_amount,
        } => {
            let today = chrono::Utc::now().date_naive();
            let target_date = match validation::parse_target_date(input, today) {
                Ok(DateInput::Skip) => None,
                Ok(DateInput::Date(date)) => Some(date),
                Err(e) => {
                    return Ok(Transition::reprompt(
                        &e,
                        Reply::new(DATE_PROMPT, Keyboard::SkipOrCancel),
                        ConversationState::GoalCreation(GoalStep::AwaitTargetDate {
                            name,
                            target_amount,
                        }),
                    ));
                }
            };

            let created =
                goal::create_goal(ctx.db, ctx.user.id, &name, target_amount, target_date, today)
                    .await?;

            let deadline = created.target_date.map_or_else(
                || "No deadline".to_string(),
                |date| format!("Deadline: {}", date.format(DATE_FORMAT)),
            );
            Ok(Transition::finish(Reply::main(format!(
                "✅ Goal «{}» created!\nTarget amount: {}\n{deadline}",
                created.name,
                ctx.settings.money(created.target_amount),
            ))))
        }
    }
}

fn goal_picker(ctx: HandlerContext<'_>, goals: Vec<savings_goal::Model>) -> Reply {
    let buttons = goals
        .into_iter()
        .map(|g| {
            let label = format!(
                "{} ({}/{})",
                g.name,
                ctx.settings.money(g.current_amount),
                ctx.settings.money(g.target_amount)
            );
            InlineButton::new(label, CallbackAction::Deposit(g.id))
        })
        .collect();
    Reply::cancel_only(SELECT_PROMPT).with_inline(buttons)
}

/// Starts a deposit by asking which goal to fund.
pub async fn begin_deposit(ctx: HandlerContext<'_>) -> Result<Transition> {
    let goals = goal::list_goals(ctx.db, ctx.user.id).await?;
    if goals.is_empty() {
        return Ok(Transition::finish(Reply::main(
            "You have no goals to deposit into",
        )));
    }

    Ok(Transition::to(
        goal_picker(ctx, goals),
        ConversationState::GoalDeposit(DepositStep::AwaitGoalSelection),
    ))
}

/// Selects the goal to deposit into and asks for the amount.
pub async fn select_goal(ctx: HandlerContext<'_>, goal_id: i64) -> Result<Transition> {
    goal::get_goal_for_user(ctx.db, ctx.user.id, goal_id)
        .await?
        .ok_or(Error::GoalNotFound { id: goal_id })?;

    Ok(Transition::to(
        Reply::cancel_only(DEPOSIT_PROMPT),
        ConversationState::GoalDeposit(DepositStep::AwaitAmount { goal_id }),
    ))
}

/// Advances the deposit flow by one event.
pub async fn deposit_step(
    ctx: HandlerContext<'_>,
    step: DepositStep,
    payload: &EventPayload,
) -> Result<Transition> {
    match step {
        DepositStep::AwaitGoalSelection => match payload.callback() {
            Some(CallbackAction::Deposit(goal_id)) => select_goal(ctx, goal_id).await,
            _ => {
                let goals = goal::list_goals(ctx.db, ctx.user.id).await?;
                Ok(Transition::to(
                    goal_picker(ctx, goals),
                    ConversationState::GoalDeposit(step),
                ))
            }
        },
        DepositStep::AwaitAmount { goal_id } => {
            let amount = match validation::parse_amount(payload.text().unwrap_or_default()) {
                Ok(amount) => amount,
                Err(e) => {
                    return Ok(Transition::reprompt(
                        &e,
                        Reply::cancel_only(DEPOSIT_PROMPT),
                        ConversationState::GoalDeposit(step),
                    ));
                }
            };

            let outcome = goal::deposit(ctx.db, ctx.user.id, goal_id, amount).await?;
            let g = &outcome.goal;

            let mut text = format!(
                "✅ You deposited {} into **«{}»**\n\
                 💰 Current balance: {} of {}\n\
                 📊 Progress: {:.1}%\n\
                 📌 Left to save: {}",
                ctx.settings.money(outcome.deposited),
                g.name,
                ctx.settings.money(g.current_amount),
                ctx.settings.money(g.target_amount),
                calculate_progress(g.current_amount, g.target_amount),
                ctx.settings.money(remaining(g)),
            );
            if outcome.completed {
                text.push_str("\n\n🎉 Congratulations! Goal reached!");
            }

            info!(user_id = ctx.user.id, goal_id, "Deposit completed");
            Ok(Transition::finish(Reply::main(text)))
        }
    }
}
