mod actions;
pub(crate) mod args;

pub(crate) use actions::{
    handle_categories, handle_history, handle_problem, handle_streak, handle_submit, handle_today,
    handle_update_answer,
};
