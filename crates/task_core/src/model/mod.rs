pub mod priority;
pub mod task;
pub mod time_status;

pub use priority::Priority;
pub use task::Task;
pub use time_status::{
    MISSING_DATETIME, REMINDER_WINDOW, TimeStatus, format_datetime, parse_datetime,
    validate_time_order,
};
