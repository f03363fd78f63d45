//! Command router - picks exactly one handler for an inbound event.
//!
//! Precedence:
//! 1. a cancel label aborts any flow;
//! 2. a user inside a flow always gets the flow's handler, whatever they sent;
//! 3. an idle user's event is matched against an ordered table of menu labels and
//!    callback tags; the first match wins and anything unmatched is ignored.

use super::{
    event::{CallbackAction, EventPayload},
    menu,
};
use crate::{conversation::ConversationState, core::transaction::TransactionKind};

/// Stateless or flow-starting actions available from the idle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Greeting and main menu
    Start,
    /// Help text
    Help,
    /// Start transaction entry
    BeginTransaction(TransactionKind),
    /// Start report generation
    BeginReport,
    /// Categories overview
    ShowCategories,
    /// Category detail
    ViewCategory(i64),
    /// Start standalone category creation
    BeginCategory,
    /// Savings overview
    ShowSavings,
    /// Start goal creation
    BeginGoal,
    /// Start a deposit with goal selection
    BeginDeposit,
    /// Start a deposit into an already chosen goal
    DepositInto(i64),
    /// Budgets overview
    ShowBudgets,
    /// Start budget creation with category selection
    BeginBudget,
    /// Start budget creation for an already chosen category
    BudgetFor(i64),
    /// Reset all budgets
    ResetBudgets,
}

/// The router's decision for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Abort the active flow (if any) and return to the main menu
    Cancel,
    /// Hand the event to the active flow's current step
    ContinueFlow,
    /// Run an idle-state action
    Menu(MenuAction),
    /// Nothing to do
    Ignore,
}

/// One entry of the idle dispatch table
struct IdleRoute {
    name: &'static str,
    matcher: fn(&EventPayload) -> Option<MenuAction>,
}

impl IdleRoute {
    const fn new(name: &'static str, matcher: fn(&EventPayload) -> Option<MenuAction>) -> Self {
        Self { name, matcher }
    }
}

fn label(payload: &EventPayload, text: &str, action: MenuAction) -> Option<MenuAction> {
    payload.is_label(text).then_some(action)
}

/// Ordered dispatch table for idle users
pub struct Router {
    idle_routes: Vec<IdleRoute>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Builds the router with the bot's fixed menu and callback table.
    #[must_use]
    pub fn new() -> Self {
        let idle_routes = vec![
            IdleRoute::new("start", |p| label(p, menu::START, MenuAction::Start)),
            IdleRoute::new("help", |p| label(p, menu::HELP, MenuAction::Help)),
            IdleRoute::new("income", |p| {
                label(
                    p,
                    menu::INCOME,
                    MenuAction::BeginTransaction(TransactionKind::Income),
                )
            }),
            IdleRoute::new("expense", |p| {
                label(
                    p,
                    menu::EXPENSE,
                    MenuAction::BeginTransaction(TransactionKind::Expense),
                )
            }),
            IdleRoute::new("report", |p| label(p, menu::REPORT, MenuAction::BeginReport)),
            IdleRoute::new("categories", |p| {
                label(p, menu::CATEGORIES, MenuAction::ShowCategories)
            }),
            IdleRoute::new("budgets", |p| label(p, menu::BUDGETS, MenuAction::ShowBudgets)),
            IdleRoute::new("savings", |p| label(p, menu::SAVINGS, MenuAction::ShowSavings)),
            IdleRoute::new("new_goal", |p| label(p, menu::NEW_GOAL, MenuAction::BeginGoal)),
            IdleRoute::new("deposit", |p| label(p, menu::DEPOSIT, MenuAction::BeginDeposit)),
            IdleRoute::new("new_budget", |p| {
                label(p, menu::NEW_BUDGET, MenuAction::BeginBudget)
            }),
            IdleRoute::new("reset_budgets", |p| {
                label(p, menu::RESET_BUDGETS, MenuAction::ResetBudgets)
            }),
            IdleRoute::new("view_category", |p| match p.callback()? {
                CallbackAction::ViewCategory(id) => Some(MenuAction::ViewCategory(id)),
                _ => None,
            }),
            IdleRoute::new("new_category", |p| match p.callback()? {
                CallbackAction::NewTransactionCategory | CallbackAction::NewBudgetCategory => {
                    Some(MenuAction::BeginCategory)
                }
                _ => None,
            }),
            IdleRoute::new("deposit_into", |p| match p.callback()? {
                CallbackAction::Deposit(id) => Some(MenuAction::DepositInto(id)),
                _ => None,
            }),
            IdleRoute::new("budget_for", |p| match p.callback()? {
                CallbackAction::BudgetCategory(id) => Some(MenuAction::BudgetFor(id)),
                _ => None,
            }),
        ];

        Self { idle_routes }
    }

    /// Decides what to do with `payload` given the user's current `state`.
    #[must_use]
    pub fn resolve(&self, state: &ConversationState, payload: &EventPayload) -> Route {
        if payload.text().is_some_and(menu::is_cancel) {
            return Route::Cancel;
        }

        if !state.is_idle() {
            return Route::ContinueFlow;
        }

        self.idle_routes
            .iter()
            .find_map(|route| {
                let action = (route.matcher)(payload)?;
                tracing::trace!(route = route.name, "Matched idle route");
                Some(Route::Menu(action))
            })
            .unwrap_or(Route::Ignore)
    }
}
