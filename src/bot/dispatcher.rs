//! Event dispatch - the handler boundary.
//!
//! The sender's session is locked for the whole event. The current state is taken out of
//! the session (leaving it idle) and handed to the selected handler; only a successful
//! handler puts a state back. Any error therefore leaves the user idle:
//! - not-found errors reply with a "not found" message,
//! - everything else is logged and answered with a generic failure message.

use super::{
    BotData,
    event::InboundEvent,
    handlers::{self, HandlerContext, Transition, menus},
    reply::Reply,
    router::Route,
};
use crate::{conversation::ConversationState, core::user, errors::Result};
use tracing::{debug, error, instrument, warn};

impl BotData {
    /// Handles one inbound event and returns the reply to send, if any.
    ///
    /// Events from the same sender are processed one at a time.
    #[instrument(skip(self, event), fields(sender = %event.sender))]
    pub async fn dispatch(&self, event: InboundEvent) -> Option<Reply> {
        let mut session = self.sessions.lock(&event.sender).await;

        let route = self.router.resolve(&session, &event.payload);
        debug!(?route, flow = session.flow_name(), "Resolved route");
        let reply = if route == Route::Ignore {
            None
        } else {
            let state = std::mem::take(&mut *session);
            Some(match self.execute(&event, route, state).await {
                Ok(transition) => {
                    debug!(next = transition.next.flow_name(), "Handled event");
                    *session = transition.next;
                    transition.reply
                }
                Err(e) if e.is_not_found() => {
                    warn!(error = %e, "Selected entity no longer exists, flow aborted");
                    Reply::not_found()
                }
                Err(e) => {
                    error!(error = %e, "Failed to handle event, session cleared");
                    Reply::failure()
                }
            })
        };

        self.sessions.release(&event.sender, session).await;
        reply
    }

    async fn execute(
        &self,
        event: &InboundEvent,
        route: Route,
        state: ConversationState,
    ) -> Result<Transition> {
        if route == Route::Cancel {
            return Ok(menus::cancel(event.payload.text()));
        }

        let user = user::get_or_create_user(&self.database, &event.sender).await?;
        let ctx = HandlerContext {
            db: &self.database,
            settings: &self.settings,
            user: &user,
        };

        match route {
            Route::Menu(action) => handlers::run_menu_action(ctx, action).await,
            Route::ContinueFlow => handlers::continue_flow(ctx, state, &event.payload).await,
            // Both are settled before a user is loaded
            Route::Cancel | Route::Ignore => Ok(Transition::finish(menus::main_menu_reply())),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        bot::{
            event::CallbackAction,
            menu,
            reply::{InlineButton, Keyboard},
        },
        config::settings::Settings,
        conversation::{BudgetStep, DepositStep, GoalStep, TransactionStep},
        core::transaction::TransactionKind,
        entities::{
            Budget, BudgetPeriod, Category, SavingsGoal, Transaction, budget, category,
            savings_goal,
        },
        errors::Result,
        test_utils::*,
    };
    use sea_orm::{
        ColumnTrait, DatabaseBackend, DbErr, EntityTrait, MockDatabase, PaginatorTrait,
        QueryFilter,
    };

    const ALICE: &str = "alice";

    async fn setup_bot() -> Result<BotData> {
        Ok(BotData::new(setup_test_db().await?, Settings::default()))
    }

    async fn say(bot: &BotData, text: &str) -> Option<Reply> {
        bot.dispatch(InboundEvent::text(ALICE, text)).await
    }

    async fn press(bot: &BotData, action: CallbackAction) -> Option<Reply> {
        bot.dispatch(InboundEvent::callback(ALICE, action.to_string()))
            .await
    }

    async fn state(bot: &BotData) -> ConversationState {
        bot.sessions().current(ALICE).await
    }

    /// Registers alice with one category and returns it.
    async fn alice_with_category(bot: &BotData, name: &str) -> Result<category::Model> {
        let user = create_test_user(&bot.database, ALICE).await?;
        create_test_category(&bot.database, &user, name).await
    }

    async fn transaction_count(bot: &BotData) -> Result<u64> {
        Ok(Transaction::find().count(&bot.database).await?)
    }

    #[tokio::test]
    async fn test_start_registers_user_and_shows_main_menu() -> Result<()> {
        let bot = setup_bot().await?;

        let reply = say(&bot, menu::START).await.unwrap();

        assert_eq!(reply.keyboard, Keyboard::Main);
        assert!(reply.text.contains("Choose an action"));
        assert_eq!(
            crate::entities::User::find().count(&bot.database).await?,
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_sessions_only_tracked_during_flows() -> Result<()> {
        let bot = setup_bot().await?;
        alice_with_category(&bot, "Food").await?;

        assert!(say(&bot, "hello there").await.is_none());
        assert!(bot.dispatch(InboundEvent::text("bob", "hi")).await.is_none());
        assert_eq!(bot.sessions().tracked_users().await, 0);

        say(&bot, menu::EXPENSE).await.unwrap();
        assert_eq!(bot.sessions().tracked_users().await, 1);

        say(&bot, menu::CANCEL).await.unwrap();
        assert_eq!(bot.sessions().tracked_users().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unrecognized_idle_input_is_ignored() -> Result<()> {
        let bot = setup_bot().await?;

        assert!(say(&bot, "hello there").await.is_none());
        assert!(say(&bot, "150").await.is_none());
        assert!(
            bot.dispatch(InboundEvent::callback(ALICE, "bogus_1"))
                .await
                .is_none()
        );
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_entry_records_one_transaction() -> Result<()> {
        let bot = setup_bot().await?;
        let food = alice_with_category(&bot, "Food").await?;

        let prompt = say(&bot, menu::EXPENSE).await.unwrap();
        assert_eq!(prompt.keyboard, Keyboard::CancelOnly);

        let picker = say(&bot, "150").await.unwrap();
        assert!(
            picker
                .inline
                .contains(&InlineButton::new("Food", CallbackAction::TransactionCategory(food.id)))
        );
        assert!(
            picker.inline.contains(&InlineButton::new(
                menu::NEW_CATEGORY,
                CallbackAction::NewTransactionCategory
            ))
        );
        assert_eq!(
            state(&bot).await,
            ConversationState::Transaction(TransactionStep::AwaitCategory {
                kind: TransactionKind::Expense,
                amount: 150.0
            })
        );

        let saved = press(&bot, CallbackAction::TransactionCategory(food.id))
            .await
            .unwrap();

        assert!(saved.text.contains("Expense 150.00 ₽ saved!"));
        assert_eq!(saved.keyboard, Keyboard::Main);
        let rows = Transaction::find().all(&bot.database).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, 150.0);
        assert_eq!(rows[0].category_id, food.id);
        assert!(!rows[0].is_income);
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_positive_amounts_are_recorded_exactly() -> Result<()> {
        let bot = setup_bot().await?;
        let salary = alice_with_category(&bot, "Salary").await?;

        for (input, expected) in [("0.01", 0.01), ("12.5", 12.5), ("3000", 3000.0)] {
            say(&bot, menu::INCOME).await;
            say(&bot, input).await;
            press(&bot, CallbackAction::TransactionCategory(salary.id)).await;
            assert!(state(&bot).await.is_idle());

            let stored = Transaction::find()
                .filter(crate::entities::transaction::Column::Amount.eq(expected))
                .all(&bot.database)
                .await?;
            assert_eq!(stored.len(), 1, "{input}");
            assert!(stored[0].is_income);
        }
        assert_eq!(transaction_count(&bot).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_amounts_reprompt_same_step() -> Result<()> {
        let bot = setup_bot().await?;
        alice_with_category(&bot, "Food").await?;
        say(&bot, menu::EXPENSE).await;
        let awaiting = state(&bot).await;

        for input in ["abc", "0", "-5", "", "1,5", menu::REPORT] {
            let reply = say(&bot, input).await.unwrap();
            assert_eq!(reply.text, "Enter a valid amount (a number greater than 0):");
            assert_eq!(reply.keyboard, Keyboard::CancelOnly);
            assert_eq!(state(&bot).await, awaiting, "{input}");
        }

        assert_eq!(transaction_count(&bot).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_amount_keeps_collected_fields() -> Result<()> {
        let bot = setup_bot().await?;
        say(&bot, menu::NEW_GOAL).await;
        say(&bot, "Laptop").await;

        say(&bot, "lots").await;

        assert_eq!(
            state(&bot).await,
            ConversationState::GoalCreation(GoalStep::AwaitTargetAmount {
                name: "Laptop".to_string()
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_discards_flow_without_side_effects() -> Result<()> {
        let bot = setup_bot().await?;
        alice_with_category(&bot, "Food").await?;
        say(&bot, menu::EXPENSE).await;
        say(&bot, "150").await;

        let reply = say(&bot, menu::CANCEL).await.unwrap();

        assert_eq!(reply.text, "Operation cancelled");
        assert_eq!(reply.keyboard, Keyboard::Main);
        assert!(state(&bot).await.is_idle());
        assert_eq!(transaction_count(&bot).await?, 0);

        // Cancelling while idle is harmless
        assert!(say(&bot, menu::CANCEL).await.is_some());
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_main_menu_label_acts_as_cancel() -> Result<()> {
        let bot = setup_bot().await?;
        say(&bot, menu::NEW_BUDGET).await;
        assert_eq!(
            state(&bot).await,
            ConversationState::BudgetCreation(BudgetStep::AwaitCategory)
        );

        let reply = say(&bot, menu::MAIN_MENU).await.unwrap();

        assert_eq!(reply.text, "Main menu:");
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_new_category_during_transaction_saves_both() -> Result<()> {
        let bot = setup_bot().await?;
        say(&bot, menu::EXPENSE).await;
        say(&bot, "75").await;
        press(&bot, CallbackAction::NewTransactionCategory).await;

        let blank = say(&bot, "   ").await.unwrap();
        assert_eq!(blank.text, "The name cannot be empty!");

        let reply = say(&bot, " Coffee ").await.unwrap();

        assert!(reply.text.contains("Category «Coffee» created and transaction saved!"));
        let categories = Category::find().all(&bot.database).await?;
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Coffee");
        let rows = Transaction::find().all(&bot.database).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category_id, categories[0].id);
        assert_eq!(rows[0].amount, 75.0);
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_category_mid_transaction_ends_flow() -> Result<()> {
        let bot = setup_bot().await?;
        alice_with_category(&bot, "Food").await?;
        say(&bot, menu::EXPENSE).await;
        say(&bot, "75").await;
        press(&bot, CallbackAction::NewTransactionCategory).await;

        let reply = say(&bot, "Food").await.unwrap();

        assert!(reply.text.contains("already exists"));
        assert_eq!(Category::find().count(&bot.database).await?, 1);
        assert_eq!(transaction_count(&bot).await?, 0);
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_standalone_category_creation_never_duplicates() -> Result<()> {
        let bot = setup_bot().await?;

        for _ in 0..2 {
            press(&bot, CallbackAction::NewTransactionCategory).await;
            assert_eq!(state(&bot).await, ConversationState::CategoryCreation);
            say(&bot, "Travel").await;
            assert!(state(&bot).await.is_idle());
        }

        press(&bot, CallbackAction::NewTransactionCategory).await;
        let reply = say(&bot, "Travel").await.unwrap();

        assert_eq!(reply.text, "❌ Category «Travel» already exists!");
        assert_eq!(Category::find().count(&bot.database).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_categories_overview_and_detail() -> Result<()> {
        let bot = setup_bot().await?;
        let food = alice_with_category(&bot, "Food").await?;
        let user = create_test_user(&bot.database, ALICE).await?;
        create_test_transaction(&bot.database, &user, &food, 40.0, TransactionKind::Expense)
            .await?;
        create_test_transaction(&bot.database, &user, &food, 10.0, TransactionKind::Income)
            .await?;

        let overview = say(&bot, menu::CATEGORIES).await.unwrap();
        assert!(overview.text.contains("- Food (2 transactions, total: 50.00 ₽)"));
        assert!(
            overview
                .inline
                .contains(&InlineButton::new("Food", CallbackAction::ViewCategory(food.id)))
        );

        let detail = press(&bot, CallbackAction::ViewCategory(food.id))
            .await
            .unwrap();
        let today = chrono::Utc::now().format("%d.%m.%Y").to_string();
        assert!(detail.text.starts_with("📊 **Food**"));
        assert!(detail.text.contains(&format!("➕ 10.00 ₽ ({today})")));
        assert!(detail.text.contains(&format!("➖ 40.00 ₽ ({today})")));
        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_category_detail_is_not_found() -> Result<()> {
        let bot = setup_bot().await?;
        let bob = create_test_user(&bot.database, "bob").await?;
        let bobs = create_test_category(&bot.database, &bob, "Secret").await?;

        let reply = press(&bot, CallbackAction::ViewCategory(bobs.id))
            .await
            .unwrap();

        assert_eq!(reply, Reply::not_found());
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    /// Creates a 1000/month Food budget for alice with `spent` already used.
    async fn food_budget_spent(
        bot: &BotData,
        spent: f64,
    ) -> Result<(category::Model, budget::Model)> {
        let food = alice_with_category(bot, "Food").await?;
        let user = create_test_user(&bot.database, ALICE).await?;
        let budget =
            create_test_budget(&bot.database, &user, &food, BudgetPeriod::Month, 1000.0).await?;
        set_budget_spent(&bot.database, budget.id, spent).await?;
        Ok((food, budget))
    }

    async fn spend(bot: &BotData, category_id: i64, amount: &str) -> Reply {
        say(bot, menu::EXPENSE).await;
        say(bot, amount).await;
        press(bot, CallbackAction::TransactionCategory(category_id))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_expense_reaching_limit_exactly_is_not_an_overage() -> Result<()> {
        let bot = setup_bot().await?;
        let (food, budget) = food_budget_spent(&bot, 850.0).await?;

        let reply = spend(&bot, food.id, "150").await;

        assert_eq!(reload_budget(&bot.database, budget.id).await?.current_spent, 1000.0);
        assert!(!reply.text.contains("Budget exceeded"));
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_over_limit_reports_overage() -> Result<()> {
        let bot = setup_bot().await?;
        let (food, budget) = food_budget_spent(&bot, 950.0).await?;

        let reply = spend(&bot, food.id, "150").await;

        assert_eq!(reload_budget(&bot.database, budget.id).await?.current_spent, 1100.0);
        assert!(reply.text.contains("⚠️ Budget exceeded for category Food!"));
        assert!(reply.text.contains("Limit: 1000.00 ₽ (month)"));
        assert!(reply.text.contains("Spent: 1100.00 ₽"));
        assert!(reply.text.contains("Over by: 100.00 ₽"));
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_near_limit_warns_softly() -> Result<()> {
        let bot = setup_bot().await?;
        let (food, _) = food_budget_spent(&bot, 700.0).await?;

        let reply = spend(&bot, food.id, "150").await;

        assert!(reply.text.contains("🔔 Budget for category Food is almost used up"));
        assert!(!reply.text.contains("Budget exceeded"));
        Ok(())
    }

    #[tokio::test]
    async fn test_income_leaves_budgets_untouched() -> Result<()> {
        let bot = setup_bot().await?;
        let (food, budget) = food_budget_spent(&bot, 950.0).await?;

        say(&bot, menu::INCOME).await;
        say(&bot, "500").await;
        let reply = press(&bot, CallbackAction::TransactionCategory(food.id))
            .await
            .unwrap();

        assert!(reply.text.contains("Income 500.00 ₽ saved!"));
        assert_eq!(reload_budget(&bot.database, budget.id).await?.current_spent, 950.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_budgets_zeroes_spend_keeps_limits() -> Result<()> {
        let bot = setup_bot().await?;
        let (food, budget) = food_budget_spent(&bot, 400.0).await?;
        let user = create_test_user(&bot.database, ALICE).await?;
        let week =
            create_test_budget(&bot.database, &user, &food, BudgetPeriod::Week, 200.0).await?;
        set_budget_spent(&bot.database, week.id, 150.0).await?;

        let reply = say(&bot, menu::RESET_BUDGETS).await.unwrap();

        assert!(reply.text.contains("All budgets reset"));
        for (id, limit) in [(budget.id, 1000.0), (week.id, 200.0)] {
            let reloaded = reload_budget(&bot.database, id).await?;
            assert_eq!(reloaded.current_spent, 0.0);
            assert_eq!(reloaded.amount, limit);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_without_budgets() -> Result<()> {
        let bot = setup_bot().await?;

        let reply = say(&bot, menu::RESET_BUDGETS).await.unwrap();

        assert_eq!(reply.text, "You have no budgets to reset");
        Ok(())
    }

    async fn create_budget(bot: &BotData, category_id: i64, period: &str, amount: &str) -> Reply {
        say(bot, menu::NEW_BUDGET).await;
        press(bot, CallbackAction::BudgetCategory(category_id)).await;
        say(bot, period).await;
        say(bot, amount).await.unwrap()
    }

    #[tokio::test]
    async fn test_budget_created_twice_is_upserted() -> Result<()> {
        let bot = setup_bot().await?;
        let food = alice_with_category(&bot, "Food").await?;

        let first = create_budget(&bot, food.id, menu::PERIOD_MONTH, "1000").await;
        assert!(first.text.contains("created!"));
        let budget = Budget::find().one(&bot.database).await?.unwrap();
        set_budget_spent(&bot.database, budget.id, 300.0).await?;

        let second = create_budget(&bot, food.id, "month", "1500").await;
        assert!(second.text.contains("updated!"));
        assert!(second.text.contains("Limit: 1500.00 ₽ (month)"));

        let budgets = Budget::find().all(&bot.database).await?;
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, 1500.0);
        assert_eq!(budgets[0].current_spent, 0.0);
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_period_must_be_known() -> Result<()> {
        let bot = setup_bot().await?;
        let food = alice_with_category(&bot, "Food").await?;
        say(&bot, menu::NEW_BUDGET).await;
        press(&bot, CallbackAction::BudgetCategory(food.id)).await;

        let reply = say(&bot, "fortnight").await.unwrap();

        assert_eq!(reply.text, "Please choose a period from the options provided");
        assert_eq!(reply.keyboard, Keyboard::BudgetPeriod);
        assert_eq!(
            state(&bot).await,
            ConversationState::BudgetCreation(BudgetStep::AwaitPeriod {
                category_id: food.id
            })
        );

        say(&bot, menu::PERIOD_WEEK).await;
        assert_eq!(
            state(&bot).await,
            ConversationState::BudgetCreation(BudgetStep::AwaitAmount {
                category_id: food.id,
                period: BudgetPeriod::Week
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_new_category_from_budget_picker_switches_flow() -> Result<()> {
        let bot = setup_bot().await?;
        say(&bot, menu::NEW_BUDGET).await;

        press(&bot, CallbackAction::NewBudgetCategory).await;
        assert_eq!(state(&bot).await, ConversationState::CategoryCreation);

        let reply = say(&bot, "Rent").await.unwrap();
        assert_eq!(reply.text, "✅ Category «Rent» created!");
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_budgets_overview_shows_status() -> Result<()> {
        let bot = setup_bot().await?;
        food_budget_spent(&bot, 1200.0).await?;

        let reply = say(&bot, menu::BUDGETS).await.unwrap();

        assert!(reply.text.contains("📌 **Food**"));
        assert!(reply.text.contains("Spent: 1200.00 ₽ (120.0%)"));
        assert!(reply.text.contains("❌ Exceeded by 200.00 ₽"));
        assert_eq!(reply.keyboard, Keyboard::Budgets { can_reset: true });
        Ok(())
    }

    #[tokio::test]
    async fn test_goal_with_past_date_rejected_then_future_accepted() -> Result<()> {
        let bot = setup_bot().await?;
        say(&bot, menu::NEW_GOAL).await;
        say(&bot, "Vacation").await;
        say(&bot, "5000").await;

        let past = say(&bot, "01.01.2020").await.unwrap();
        assert_eq!(past.text, "The date must be in the future! Enter it again:");
        let malformed = say(&bot, "2099-01-01").await.unwrap();
        assert_eq!(malformed.text, "Invalid date format! Use DD.MM.YYYY");
        assert_eq!(SavingsGoal::find().count(&bot.database).await?, 0);

        let created = say(&bot, "01.01.2099").await.unwrap();

        assert!(created.text.contains("Goal «Vacation» created!"));
        assert!(created.text.contains("Deadline: 01.01.2099"));
        let goal = SavingsGoal::find().one(&bot.database).await?.unwrap();
        assert_eq!(goal.target_amount, 5000.0);
        assert_eq!(goal.current_amount, 0.0);
        assert_eq!(
            goal.target_date,
            chrono::NaiveDate::from_ymd_opt(2099, 1, 1)
        );
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_goal_skip_leaves_no_deadline() -> Result<()> {
        let bot = setup_bot().await?;
        say(&bot, menu::NEW_GOAL).await;
        say(&bot, "Bike").await;
        say(&bot, "300").await;

        let reply = say(&bot, menu::SKIP).await.unwrap();

        assert!(reply.text.contains("No deadline"));
        let goal = SavingsGoal::find().one(&bot.database).await?.unwrap();
        assert_eq!(goal.target_date, None);
        Ok(())
    }

    async fn deposit(bot: &BotData, goal_id: i64, amount: &str) -> Reply {
        say(bot, menu::DEPOSIT).await;
        press(bot, CallbackAction::Deposit(goal_id)).await;
        say(bot, amount).await.unwrap()
    }

    #[tokio::test]
    async fn test_deposit_completion_notice_iff_target_reached() -> Result<()> {
        let bot = setup_bot().await?;
        let user = create_test_user(&bot.database, ALICE).await?;
        let goal = create_test_goal(&bot.database, &user, "Bike", 300.0).await?;

        let partial = deposit(&bot, goal.id, "100").await;
        assert!(partial.text.contains("Current balance: 100.00 ₽ of 300.00 ₽"));
        assert!(!partial.text.contains("Goal reached"));

        let exact = deposit(&bot, goal.id, "200").await;
        assert!(exact.text.contains("Current balance: 300.00 ₽ of 300.00 ₽"));
        assert!(exact.text.contains("🎉 Congratulations! Goal reached!"));

        let stored = SavingsGoal::find_by_id(goal.id)
            .one(&bot.database)
            .await?
            .unwrap();
        assert_eq!(stored.current_amount, 300.0);
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_deposit_without_goals() -> Result<()> {
        let bot = setup_bot().await?;

        let reply = say(&bot, menu::DEPOSIT).await.unwrap();

        assert_eq!(reply.text, "You have no goals to deposit into");
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_deposit_into_vanished_goal_is_not_found() -> Result<()> {
        let bot = setup_bot().await?;
        let user = create_test_user(&bot.database, ALICE).await?;
        let goal = create_test_goal(&bot.database, &user, "Bike", 300.0).await?;
        bot.sessions()
            .set(
                ALICE,
                ConversationState::GoalDeposit(DepositStep::AwaitAmount { goal_id: goal.id }),
            )
            .await;
        SavingsGoal::delete_many()
            .filter(savings_goal::Column::Id.eq(goal.id))
            .exec(&bot.database)
            .await?;

        let reply = say(&bot, "50").await.unwrap();

        assert_eq!(reply, Reply::not_found());
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_savings_overview_lists_progress() -> Result<()> {
        let bot = setup_bot().await?;
        let empty = say(&bot, menu::SAVINGS).await.unwrap();
        assert_eq!(empty.keyboard, Keyboard::Savings { can_deposit: false });

        let user = create_test_user(&bot.database, ALICE).await?;
        create_test_goal(&bot.database, &user, "Laptop", 2000.0).await?;

        let reply = say(&bot, menu::SAVINGS).await.unwrap();

        assert!(reply.text.contains("📌 **Laptop**"));
        assert!(reply.text.contains("Target: 2000.00 ₽"));
        assert!(reply.text.contains("Remaining: 2000.00 ₽"));
        assert_eq!(reply.keyboard, Keyboard::Savings { can_deposit: true });
        Ok(())
    }

    #[tokio::test]
    async fn test_report_for_chosen_period() -> Result<()> {
        let bot = setup_bot().await?;
        let food = alice_with_category(&bot, "Food").await?;
        let user = create_test_user(&bot.database, ALICE).await?;
        let salary = create_test_category(&bot.database, &user, "Salary").await?;
        create_test_transaction(&bot.database, &user, &salary, 1000.0, TransactionKind::Income)
            .await?;
        create_test_transaction(&bot.database, &user, &food, 250.0, TransactionKind::Expense)
            .await?;

        let prompt = say(&bot, menu::REPORT).await.unwrap();
        assert_eq!(prompt.keyboard, Keyboard::ReportPeriod);

        let unknown = say(&bot, "Last decade").await.unwrap();
        assert_eq!(unknown.keyboard, Keyboard::ReportPeriod);
        assert_eq!(state(&bot).await, ConversationState::Report);

        let report = say(&bot, menu::REPORT_MONTH).await.unwrap();

        assert!(report.text.contains("Report: last 30 days"));
        assert!(report.text.contains("➖ Expenses: 250.00 ₽"));
        assert!(report.text.contains("➕ Income: 1000.00 ₽"));
        assert!(report.text.contains("🧮 Balance: 750.00 ₽"));
        assert!(report.text.contains("- Food: 250.00 ₽"));
        assert!(state(&bot).await.is_idle());
        Ok(())
    }

    #[tokio::test]
    async fn test_users_have_independent_sessions() -> Result<()> {
        let bot = setup_bot().await?;
        say(&bot, menu::EXPENSE).await;

        let bobs = bot.dispatch(InboundEvent::text("bob", menu::NEW_GOAL)).await;

        assert!(bobs.is_some());
        assert_eq!(
            bot.sessions().current("bob").await,
            ConversationState::GoalCreation(GoalStep::AwaitName)
        );
        assert!(matches!(
            state(&bot).await,
            ConversationState::Transaction(TransactionStep::AwaitAmount { .. })
        ));
        assert_eq!(bot.sessions().active_flows().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_persistence_failure_clears_session() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors([DbErr::Custom("database is locked".to_string())])
            .into_connection();
        let bot = BotData::new(db, Settings::default());
        bot.sessions()
            .set(ALICE, ConversationState::GoalCreation(GoalStep::AwaitName))
            .await;

        let reply = say(&bot, "Laptop").await.unwrap();

        assert_eq!(reply, Reply::failure());
        assert!(state(&bot).await.is_idle());
        Ok(())
    }
}
