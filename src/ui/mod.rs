//! Ratatui front-end: a roster table with modal dialogs for adding, updating,
//! deleting and looking up students. All persistence goes through
//! [`StudentStore`](crate::db::StudentStore).

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
