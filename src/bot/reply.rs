//! Outbound replies.
//!
//! A reply is text plus a description of the menu that should follow it. Rendering the
//! menu (reply keyboard, buttons, ...) is the transport's business.

use super::{event::CallbackAction, menu};

/// The fixed menus a reply can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Main menu
    Main,
    /// Only the cancel label
    CancelOnly,
    /// Report period choices plus cancel
    ReportPeriod,
    /// Skip plus cancel (goal deadline)
    SkipOrCancel,
    /// Budget period choices plus cancel
    BudgetPeriod,
    /// Savings sub-menu; deposit only offered when goals exist
    Savings {
        /// Whether the user has at least one goal
        can_deposit: bool,
    },
    /// Budgets sub-menu; reset only offered when budgets exist
    Budgets {
        /// Whether the user has at least one budget
        can_reset: bool,
    },
}

impl Keyboard {
    /// Label rows of this menu
    #[must_use]
    pub fn rows(self) -> Vec<Vec<&'static str>> {
        match self {
            Self::Main => vec![
                vec![menu::INCOME, menu::EXPENSE],
                vec![menu::REPORT, menu::CATEGORIES],
                vec![menu::BUDGETS, menu::SAVINGS],
                vec![menu::HELP],
            ],
            Self::CancelOnly => vec![vec![menu::CANCEL]],
            Self::ReportPeriod => vec![
                vec![menu::REPORT_MONTH],
                vec![menu::REPORT_YEAR],
                vec![menu::REPORT_ALL_TIME],
                vec![menu::CANCEL],
            ],
            Self::SkipOrCancel => vec![vec![menu::SKIP], vec![menu::CANCEL]],
            Self::BudgetPeriod => vec![
                vec![menu::PERIOD_DAY, menu::PERIOD_WEEK],
                vec![menu::PERIOD_MONTH, menu::PERIOD_YEAR],
                vec![menu::CANCEL],
            ],
            Self::Savings { can_deposit } => {
                let mut first = vec![menu::NEW_GOAL];
                if can_deposit {
                    first.push(menu::DEPOSIT);
                }
                vec![first, vec![menu::MAIN_MENU]]
            }
            Self::Budgets { can_reset } => {
                let mut first = vec![menu::NEW_BUDGET];
                if can_reset {
                    first.push(menu::RESET_BUDGETS);
                }
                vec![first, vec![menu::MAIN_MENU]]
            }
        }
    }
}

/// An inline selection button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    /// Visible text
    pub label: String,
    /// Action delivered back when pressed
    pub action: CallbackAction,
}

impl InlineButton {
    /// Creates a button
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// A response to one inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Message text (Markdown)
    pub text: String,
    /// Menu that follows the message
    pub keyboard: Keyboard,
    /// Inline selection buttons attached to the message
    pub inline: Vec<InlineButton>,
}

impl Reply {
    /// Reply with a menu and no inline buttons
    pub fn new(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard,
            inline: Vec::new(),
        }
    }

    /// Reply followed by the main menu
    pub fn main(text: impl Into<String>) -> Self {
        Self::new(text, Keyboard::Main)
    }

    /// Reply followed by the cancel-only menu
    pub fn cancel_only(text: impl Into<String>) -> Self {
        Self::new(text, Keyboard::CancelOnly)
    }

    /// Attaches inline buttons
    #[must_use]
    pub fn with_inline(mut self, inline: Vec<InlineButton>) -> Self {
        self.inline = inline;
        self
    }

    /// Shown when a selected entity no longer exists
    #[must_use]
    pub fn not_found() -> Self {
        Self::main("❌ Not found. It may no longer exist.")
    }

    /// Shown when handling failed unexpectedly
    #[must_use]
    pub fn failure() -> Self {
        Self::main("❌ Something went wrong. Please try again.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_contains_every_entry_point() {
        let labels: Vec<&str> = Keyboard::Main.rows().into_iter().flatten().collect();
        for label in [
            menu::INCOME,
            menu::EXPENSE,
            menu::REPORT,
            menu::CATEGORIES,
            menu::BUDGETS,
            menu::SAVINGS,
            menu::HELP,
        ] {
            assert!(labels.contains(&label), "{label}");
        }
    }

    #[test]
    fn test_submenus_hide_unavailable_actions() {
        let without = Keyboard::Savings { can_deposit: false }.rows();
        assert!(!without.iter().flatten().any(|l| *l == menu::DEPOSIT));

        let with = Keyboard::Budgets { can_reset: true }.rows();
        assert!(with.iter().flatten().any(|l| *l == menu::RESET_BUDGETS));
    }

    #[test]
    fn test_flow_menus_offer_cancel() {
        for keyboard in [
            Keyboard::CancelOnly,
            Keyboard::ReportPeriod,
            Keyboard::SkipOrCancel,
            Keyboard::BudgetPeriod,
        ] {
            assert!(keyboard.rows().iter().flatten().any(|l| *l == menu::CANCEL));
        }
    }
}
