use clap::Parser;
use daterange_marks::utils::{logger, validation::Validate};
use daterange_marks::{export_marks, CliConfig, DateRangePlugin, LocalOutput, MemoryCalendar};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting daterange-marks CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let calendar = match config.load_calendar().and_then(|c| c.validate().map(|_| c)) {
        Ok(calendar) => calendar,
        Err(e) => {
            tracing::error!(
                "❌ Failed to load {}: {} ({:?})",
                config.config.display(),
                e,
                e.category()
            );
            // 可修正的資料衝突與輸入錯誤使用不同的退出碼
            let exit_code = if e.is_recoverable() { 2 } else { 1 };
            std::process::exit(exit_code);
        }
    };
    tracing::info!(
        "📅 Loaded {} ranges (preset: {})",
        calendar.ranges.len(),
        calendar.preset.as_deref().unwrap_or("none")
    );

    let mut plugin = DateRangePlugin::from_config(MemoryCalendar::new(), &calendar)?;
    // 分批安裝時等待所有批次完成
    if plugin.has_pending_tasks() {
        tracing::info!("⏳ Waiting for batched installation");
        plugin.run_pending().await;
    }

    let info = plugin.get_info();
    tracing::info!(
        "🗓️ {} ranges cover {} dates, {} marks compiled",
        info.range_count,
        info.date_count,
        info.mark_count
    );

    let rendered = export_marks(plugin.marks(), config.format)?;
    let destination = LocalOutput::new(config.output.clone()).write(&rendered)?;
    tracing::info!("✅ Marks written to {}", destination);

    plugin.destroy();
    Ok(())
}
