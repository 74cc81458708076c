// ==========================================
// 城燃计划量误差统计 - 命令行入口
// ==========================================
// 用法:
//   gas-peak-stats [root_dir] [output_dir]
//
// root_dir 缺省时读取 GAS_STATS_ROOT，再缺省为当前目录；
// output_dir 缺省为当前目录
// ==========================================

use anyhow::Context;
use gas_peak_stats::config::{StatsConfig, ROOT_DIR_ENV};
use gas_peak_stats::{logging, FsBatchDataSource, StatsRunner};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", gas_peak_stats::APP_NAME, gas_peak_stats::VERSION);
    tracing::info!("==================================================");

    let mut args = std::env::args().skip(1);
    let root_dir = args
        .next()
        .or_else(|| std::env::var(ROOT_DIR_ENV).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let output_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let config = StatsConfig::load().context("加载统计配置失败")?;
    config.log_config();

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;

    let source = FsBatchDataSource::new(&root_dir, config.layout.clone());
    tracing::info!("数据目录: {}", source.work_dir().display());

    let runner = StatsRunner::new(source, config, &output_dir)?;
    let summary = runner.execute().context("统计执行失败")?;

    for report in &summary.reports {
        tracing::info!("报表: {}", report.display());
    }
    Ok(())
}
