// ==========================================
// 城燃计划量误差统计 - 统计执行器
// ==========================================
// 顺序: 城燃误差率 → 门站误差率 → LNG 与供用气平衡
// 批次索引只构建一次，三份报表各写出一次
// ==========================================

use crate::config::StatsConfig;
use crate::engine::lng_info::calc_lng_info;
use crate::engine::ratio_engine::{PipelineOutcome, RatioEngine};
use crate::error::StatsResult;
use crate::importer::{BatchDataSource, BatchIndex};
use crate::report::{
    company_ratio_rows, gas_ratio_rows, lng_info_header, lng_info_rows, ReportWriter,
    COMPANY_RATIO_HEADER, GAS_RATIO_HEADER,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// 一次运行的汇总
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub batch_count: usize,
    pub company_rows: usize,
    pub gas_rows: usize,
    pub lng_rows: usize,
    pub reports: Vec<PathBuf>,
}

pub struct StatsRunner<S: BatchDataSource> {
    source: S,
    config: StatsConfig,
    output_dir: PathBuf,
    writer: ReportWriter,
}

impl<S: BatchDataSource> StatsRunner<S> {
    /// # 参数
    /// - source: 批次数据源
    /// - config: 统计配置
    /// - output_dir: 报表输出目录（需已存在）
    pub fn new<P: AsRef<Path>>(source: S, config: StatsConfig, output_dir: P) -> StatsResult<Self> {
        config.validate()?;
        let writer = ReportWriter::new(&config.output_encoding)?;
        Ok(Self {
            source,
            config,
            output_dir: output_dir.as_ref().to_path_buf(),
            writer,
        })
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// 执行全部统计并写出报表
    pub fn execute(&self) -> StatsResult<RunSummary> {
        let index = BatchIndex::load(&self.source)?;
        let mut summary = RunSummary {
            batch_count: index.len(),
            ..RunSummary::default()
        };

        let engine = RatioEngine::new(&self.source, &index, &self.config);

        let company = engine.company_error_ratio()?;
        summary.company_rows = self.write_company_report(&company)?;
        summary
            .reports
            .push(self.output_dir.join(&self.config.reports.company_ratio));

        let gas = engine.gas_error_ratio()?;
        summary.gas_rows = self.write_gas_report(&gas)?;
        summary
            .reports
            .push(self.output_dir.join(&self.config.reports.gas_ratio));

        summary.lng_rows = self.lng_report(&index)?;
        summary
            .reports
            .push(self.output_dir.join(&self.config.reports.lng_info));

        info!(
            batches = summary.batch_count,
            company_rows = summary.company_rows,
            gas_rows = summary.gas_rows,
            lng_rows = summary.lng_rows,
            "统计全部完成"
        );
        Ok(summary)
    }

    fn write_company_report(&self, outcome: &PipelineOutcome) -> StatsResult<usize> {
        let rows = company_ratio_rows(&outcome.records, &self.config.undefined_ratio_marker);
        self.writer.write(
            self.output_dir.join(&self.config.reports.company_ratio),
            COMPANY_RATIO_HEADER,
            &rows,
        )
    }

    fn write_gas_report(&self, outcome: &PipelineOutcome) -> StatsResult<usize> {
        let rows = gas_ratio_rows(&outcome.records, &self.config.undefined_ratio_marker);
        self.writer.write(
            self.output_dir.join(&self.config.reports.gas_ratio),
            GAS_RATIO_HEADER,
            &rows,
        )
    }

    fn lng_report(&self, index: &BatchIndex) -> StatsResult<usize> {
        let records = calc_lng_info(&self.source, index, &self.config)?;
        let labels: Vec<String> = self
            .config
            .lng_stations
            .iter()
            .map(|s| s.label.clone())
            .collect();
        self.writer.write(
            self.output_dir.join(&self.config.reports.lng_info),
            &lng_info_header(&labels),
            &lng_info_rows(&records),
        )
    }
}
