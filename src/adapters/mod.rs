// Adapters layer: concrete implementations of the host calendar port and
// mark export formats.

pub mod export;
pub mod memory;

pub use export::{export_marks, ExportFormat};
pub use memory::MemoryCalendar;
