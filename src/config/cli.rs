use crate::adapters::export::ExportFormat;
use crate::config::toml_config::CalendarConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "daterange-marks")]
#[command(about = "Compile calendar date ranges into day marks")]
pub struct CliConfig {
    #[arg(long, short = 'c', help = "TOML calendar configuration")]
    pub config: PathBuf,

    #[arg(long, help = "Preset to apply (project, schedule, holiday)")]
    pub preset: Option<String>,

    #[arg(long, value_enum, default_value = "json")]
    pub format: ExportFormat,

    #[arg(long, short = 'o', help = "Write marks to this file instead of stdout")]
    pub output: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 讀取設定檔；命令列的 `--preset` 優先於檔案中的 preset
    pub fn load_calendar(&self) -> Result<CalendarConfig> {
        let mut calendar = CalendarConfig::from_file(&self.config)?;
        if let Some(preset) = &self.preset {
            calendar.preset = Some(preset.clone());
        }
        Ok(calendar)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("config", &self.config.display().to_string())?;
        if let Some(output) = &self.output {
            validate_non_empty_string("output", output)?;
        }
        Ok(())
    }
}

/// 輸出目的地：指定路徑時寫檔（自動建立上層目錄），否則寫到 stdout。
#[derive(Debug, Clone)]
pub struct LocalOutput {
    path: Option<PathBuf>,
}

impl LocalOutput {
    pub fn new(path: Option<String>) -> Self {
        Self {
            path: path.map(PathBuf::from),
        }
    }

    pub fn write(&self, content: &str) -> Result<String> {
        match &self.path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, content)?;
                Ok(Path::new(path).display().to_string())
            }
            None => {
                println!("{}", content);
                Ok("stdout".to_string())
            }
        }
    }
}
