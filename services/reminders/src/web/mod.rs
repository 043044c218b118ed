pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the handlers and middleware the binary needs to build the router.
pub use middleware::require_owner;
pub use rest::{
    complete_reminder_handler, create_reminder_handler, delete_reminder_handler,
    get_reminder_handler, list_due_reminders_handler, list_reminders_handler,
    reminder_stats_handler, update_reminder_handler,
};
