pub mod clock;
pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod notify;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::AppError;
pub use manager::TaskManager;
pub use model::{Priority, Task, TimeStatus};
