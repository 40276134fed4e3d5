pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, LocalOutput};

pub use adapters::{export_marks, ExportFormat, MemoryCalendar};
pub use config::{presets::Preset, toml_config::CalendarConfig, OptionsPatch, PluginOptions};
pub use crate::core::{
    compiler::MarkCompiler,
    plugin::{DateRangePlugin, PluginHooks},
    store::RangeStore,
};
pub use domain::events::PluginEvent;
pub use domain::model::{Content, Mark, Range, RangeInput};
pub use domain::ports::HostCalendar;
pub use utils::error::{DateRangeError, Result};
