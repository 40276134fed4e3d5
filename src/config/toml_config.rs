use crate::config::presets::{merge_preset_with_options, Preset};
use crate::config::{OptionsPatch, PluginOptions};
use crate::core::store::validate_batch;
use crate::domain::model::RangeInput;
use crate::utils::error::{DateRangeError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 日曆設定檔：可選的 preset、`[plugin]` 覆寫表與初始範圍 `[[ranges]]`。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub plugin: OptionsPatch,
    #[serde(default)]
    pub ranges: Vec<RangeInput>,
}

impl CalendarConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DateRangeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DateRangeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CALENDAR_COLOR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DateRangeError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// preset（若有）疊上 `[plugin]` 覆寫，再疊上內建預設值
    pub fn plugin_options(&self) -> Result<PluginOptions> {
        let patch = match &self.preset {
            Some(name) => {
                let preset = Preset::from_name(name);
                tracing::debug!("Applying preset '{}'", preset.name());
                merge_preset_with_options(preset, self.plugin.clone())
            }
            None => self.plugin.clone(),
        };
        let options = PluginOptions::with_patch(patch);
        options.validate()?;
        Ok(options)
    }

    pub fn validate_config(&self) -> Result<()> {
        self.plugin_options()?;
        validate_batch(&self.ranges)?;
        Ok(())
    }
}

impl Validate for CalendarConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
