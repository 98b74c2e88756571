//! Domain model (ids, tasks, errors).

pub mod errors;
pub mod ids;
pub mod task;

pub use errors::{FormError, ParsePriorityError};
pub use ids::TaskId;
pub use task::{Action, NewTask, PermittedActions, Priority, Task};
