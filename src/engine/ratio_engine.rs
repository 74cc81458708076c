// ==========================================
// 城燃计划量误差统计 - 误差率引擎
// ==========================================
// 流程（按批次索引日期顺序）:
//   1. 目标日期 = 预测日期 + 滞后天数（批复量是明日的，明日数据后日才采集到）
//   2. 目标日期 → 批次号；未命中时按调用处的 MissingBatchPolicy 处理
//   3. 读取当前批次的预测侧、目标批次的实际侧
//   4. 按实体内连接，计算误差率
//   5. 报表日期 = 预测日期 + 1 天（预测对应的目标日）
// ==========================================

use crate::config::StatsConfig;
use crate::domain::{
    CompanyPlan, CompanyUsage, EntityQuantity, MissingBatchPolicy, RatioRecord, StationApproval,
    StationUsage,
};
use crate::error::{StatsError, StatsResult};
use crate::importer::{BatchDataSource, BatchIndex, EntityExtractor};
use chrono::{Duration, NaiveDate};
use tracing::{debug, info, instrument, warn};

// ==========================================
// PipelineSettings - 单条流程的参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub lookahead_days: i64,
    pub label_offset_days: i64,
    pub missing_batch: MissingBatchPolicy,
}

impl PipelineSettings {
    pub fn company(config: &StatsConfig) -> Self {
        Self {
            lookahead_days: config.lookahead_days,
            label_offset_days: config.label_offset_days,
            missing_batch: config.company_missing_batch,
        }
    }

    pub fn gas(config: &StatsConfig) -> Self {
        Self {
            lookahead_days: config.lookahead_days,
            label_offset_days: config.label_offset_days,
            missing_batch: config.gas_missing_batch,
        }
    }
}

// ==========================================
// PipelineOutcome - 流程结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub records: Vec<RatioRecord>,
    /// 完成对比的预测日期数
    pub processed_dates: usize,
    /// 因目标批次缺失而跳过的预测日期
    pub skipped_dates: Vec<NaiveDate>,
    /// 因目标批次缺失而结束时的预测日期
    pub halted_at: Option<NaiveDate>,
}

/// 日期偏移（溢出时返回 None）
pub fn shift_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

/// 报表日期偏移，溢出即错误
pub fn label_date(date: NaiveDate, days: i64) -> StatsResult<NaiveDate> {
    shift_date(date, days).ok_or_else(|| StatsError::DateOutOfRange {
        date: date.to_string(),
        days,
    })
}

/// 通用误差率流程
///
/// # 参数
/// - join_for: (预测批次号, 实际批次号) → 内连接后的实体数量
pub fn run_ratio_pipeline<F>(
    name: &str,
    index: &BatchIndex,
    settings: PipelineSettings,
    mut join_for: F,
) -> StatsResult<PipelineOutcome>
where
    F: FnMut(&str, &str) -> StatsResult<Vec<EntityQuantity>>,
{
    let mut outcome = PipelineOutcome::default();

    for record in index.iter() {
        info!(pipeline = name, "process ts: {}, batch number: {}", record.date, record.batch_id);

        let target = shift_date(record.date, settings.lookahead_days)
            .and_then(|target| index.resolve(target));

        let target = match target {
            Some(target) => target,
            None => match settings.missing_batch {
                MissingBatchPolicy::Halt => {
                    info!(pipeline = name, "{} 之后无实际数据批次，统计结束", record.date);
                    outcome.halted_at = Some(record.date);
                    break;
                }
                MissingBatchPolicy::Skip => {
                    warn!(pipeline = name, "{} 的目标批次缺失，跳过", record.date);
                    outcome.skipped_dates.push(record.date);
                    continue;
                }
            },
        };

        let quantities = join_for(&record.batch_id, &target.batch_id)?;
        debug!(
            pipeline = name,
            forecast_batch = %record.batch_id,
            actual_batch = %target.batch_id,
            rows = quantities.len(),
            "关联完成"
        );

        let label = label_date(record.date, settings.label_offset_days)?;
        outcome.records.extend(
            quantities
                .into_iter()
                .map(|q| RatioRecord::from_quantity(label, q)),
        );
        outcome.processed_dates += 1;
    }

    info!(
        pipeline = name,
        processed = outcome.processed_dates,
        rows = outcome.records.len(),
        "误差率统计完成"
    );
    Ok(outcome)
}

// ==========================================
// 内连接
// ==========================================

/// 内连接：按左表顺序输出，键相同的左右行两两组合
pub fn inner_join<L, R, K, FL, FR, C, T>(
    left: &[L],
    right: &[R],
    left_key: FL,
    right_key: FR,
    mut combine: C,
) -> Vec<T>
where
    K: PartialEq + ?Sized,
    FL: Fn(&L) -> &K,
    FR: Fn(&R) -> &K,
    C: FnMut(&L, &R) -> T,
{
    let mut joined = Vec::new();
    for l in left {
        for r in right.iter().filter(|r| right_key(*r) == left_key(l)) {
            joined.push(combine(l, r));
        }
    }
    joined
}

/// 实际用量 ⋈ 城燃计划量（按公司名）
pub fn join_company(usage: &[CompanyUsage], plans: &[CompanyPlan]) -> Vec<EntityQuantity> {
    inner_join(
        usage,
        plans,
        |u: &CompanyUsage| u.company_name.as_str(),
        |p: &CompanyPlan| p.company_name.as_str(),
        |u, p| EntityQuantity {
            entity_id: u.company_name.clone(),
            entity_name: None,
            plan_value: p.plan_value_wm3,
            actual_value: u.quantity,
        },
    )
}

/// 实际供气量 ⋈ 门站批复量（按 gis_id）
pub fn join_station(usage: &[StationUsage], approvals: &[StationApproval]) -> Vec<EntityQuantity> {
    inner_join(
        usage,
        approvals,
        |u: &StationUsage| u.gis_id.as_str(),
        |a: &StationApproval| a.gis_id.as_str(),
        |u, a| EntityQuantity {
            entity_id: u.gis_id.clone(),
            entity_name: Some(a.station_name.clone()),
            plan_value: a.plan_value_wm3,
            actual_value: u.quantity,
        },
    )
}

// ==========================================
// RatioEngine - 城燃 / 门站两条误差率流程
// ==========================================
pub struct RatioEngine<'a, S: BatchDataSource + ?Sized> {
    index: &'a BatchIndex,
    extractor: EntityExtractor<'a, S>,
    config: &'a StatsConfig,
}

impl<'a, S: BatchDataSource + ?Sized> RatioEngine<'a, S> {
    pub fn new(source: &'a S, index: &'a BatchIndex, config: &'a StatsConfig) -> Self {
        Self {
            index,
            extractor: EntityExtractor::new(source, config),
            config,
        }
    }

    /// 城燃误差率
    #[instrument(skip(self))]
    pub fn company_error_ratio(&self) -> StatsResult<PipelineOutcome> {
        run_ratio_pipeline(
            "company",
            self.index,
            PipelineSettings::company(self.config),
            |forecast_batch, actual_batch| {
                let plans = self.extractor.company_plan(forecast_batch)?;
                let usage = self.extractor.real_company_usage(actual_batch)?;
                Ok(join_company(&usage, &plans))
            },
        )
    }

    /// 门站误差率
    #[instrument(skip(self))]
    pub fn gas_error_ratio(&self) -> StatsResult<PipelineOutcome> {
        run_ratio_pipeline(
            "gas",
            self.index,
            PipelineSettings::gas(self.config),
            |forecast_batch, actual_batch| {
                let approvals = self.extractor.gas_approval(forecast_batch)?;
                let usage = self.extractor.real_station_usage(actual_batch)?;
                Ok(join_station(&usage, &approvals))
            },
        )
    }
}
