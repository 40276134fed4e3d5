pub mod compiler;
pub mod dates;
pub mod plugin;
pub mod scheduler;
pub mod store;
pub mod weeks;

pub use crate::domain::model::{Mark, Range, RangeInput};
pub use crate::domain::ports::HostCalendar;
pub use crate::utils::error::Result;
