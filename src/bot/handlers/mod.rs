//! Handlers for menu actions and conversation flows.
//!
//! A handler receives the user's current step by value and returns a [`Transition`]: the
//! reply to send and the state to store afterwards. Handlers never touch the session store
//! themselves; the dispatcher writes `next` back once the handler succeeds.

/// Budget overview, creation flow and reset
pub mod budget;
/// Category overview, detail view and standalone creation
pub mod category;
/// Savings overview, goal creation and deposits
pub mod goal;
/// Start, help and cancel
pub mod menus;
/// Period report flow
pub mod report;
/// Income and expense entry flow
pub mod transaction;

use super::{event::EventPayload, reply::Reply, router::MenuAction};
use crate::{
    config::settings::Settings,
    conversation::{ConversationState, ValidationError},
    entities::user,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Everything a handler may use while processing one event
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Ledger database
    pub db: &'a DatabaseConnection,
    /// Presentation settings
    pub settings: &'a Settings,
    /// The sender, registered on first contact
    pub user: &'a user::Model,
}

/// Outcome of handling one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Response to send
    pub reply: Reply,
    /// State to store once the response is produced
    pub next: ConversationState,
}

impl Transition {
    /// Moves to `next` (also used to stay on the same step after a validation error)
    pub const fn to(reply: Reply, next: ConversationState) -> Self {
        Self { reply, next }
    }

    /// Ends the flow and returns the user to idle
    pub fn finish(reply: Reply) -> Self {
        Self::to(reply, ConversationState::Idle)
    }

    /// Re-prompts the current step: `prompt` with its text replaced by the validation
    /// message. The state, and with it the working data, is kept as is.
    pub fn reprompt(error: &ValidationError, prompt: Reply, state: ConversationState) -> Self {
        let reply = Reply {
            text: error.to_string(),
            ..prompt
        };
        Self::to(reply, state)
    }
}

/// Runs an idle-state action.
pub async fn run_menu_action(ctx: HandlerContext<'_>, action: MenuAction) -> Result<Transition> {
    match action {
        MenuAction::Start => Ok(menus::start()),
        MenuAction::Help => Ok(menus::help()),
        MenuAction::BeginTransaction(kind) => Ok(transaction::begin(kind)),
        MenuAction::BeginReport => Ok(report::begin()),
        MenuAction::ShowCategories => category::overview(ctx).await,
        MenuAction::ViewCategory(id) => category::detail(ctx, id).await,
        MenuAction::BeginCategory => Ok(category::begin()),
        MenuAction::ShowSavings => goal::overview(ctx).await,
        MenuAction::BeginGoal => Ok(goal::begin()),
        MenuAction::BeginDeposit => goal::begin_deposit(ctx).await,
        MenuAction::DepositInto(goal_id) => goal::select_goal(ctx, goal_id).await,
        MenuAction::ShowBudgets => budget::overview(ctx).await,
        MenuAction::BeginBudget => budget::begin(ctx).await,
        MenuAction::BudgetFor(category_id) => budget::select_category(ctx, category_id).await,
        MenuAction::ResetBudgets => budget::reset(ctx).await,
    }
}

/// Hands an event to the step the user is currently on.
pub async fn continue_flow(
    ctx: HandlerContext<'_>,
    state: ConversationState,
    payload: &EventPayload,
) -> Result<Transition> {
    match state {
        ConversationState::Idle => Ok(Transition::finish(menus::main_menu_reply())),
        ConversationState::Transaction(step) => transaction::step(ctx, step, payload).await,
        ConversationState::CategoryCreation => category::create(ctx, payload).await,
        ConversationState::GoalCreation(step) => goal::creation_step(ctx, step, payload).await,
        ConversationState::GoalDeposit(step) => goal::deposit_step(ctx, step, payload).await,
        ConversationState::BudgetCreation(step) => budget::step(ctx, step, payload).await,
        ConversationState::Report => report::step(ctx, payload).await,
    }
}
