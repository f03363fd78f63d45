//! Stateless replies: greeting, help and flow cancellation.

use super::Transition;
use crate::bot::{menu, reply::Reply};

/// Greeting shown for `/start`
pub fn start() -> Transition {
    Transition::finish(Reply::main(
        "💰 **Finance Buddy**\n\nChoose an action:",
    ))
}

/// Lists what each main menu entry does.
pub fn help() -> Transition {
    let text = format!(
        "📚 **Available commands:**\n\n\
         {} - record income\n\
         {} - record an expense\n\
         {} - view statistics\n\
         {} - manage categories\n\
         {} - set spending limits\n\
         {} - savings goals",
        menu::INCOME,
        menu::EXPENSE,
        menu::REPORT,
        menu::CATEGORIES,
        menu::BUDGETS,
        menu::SAVINGS,
    );
    Transition::finish(Reply::main(text))
}

/// Plain main menu prompt
pub fn main_menu_reply() -> Reply {
    Reply::main("Main menu:")
}

/// Drops whatever flow was active. `label` is the cancel label the user pressed.
pub fn cancel(label: Option<&str>) -> Transition {
    if label == Some(menu::MAIN_MENU) {
        return Transition::finish(main_menu_reply());
    }
    Transition::finish(Reply::main("Operation cancelled"))
}
