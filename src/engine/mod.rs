// ==========================================
// 城燃计划量误差统计 - 引擎层
// ==========================================
// 职责: 批次对齐、计划量与实际用量关联、误差率计算、报表编排
// ==========================================

pub mod lng_info;
pub mod ratio_engine;
pub mod runner;

// 重导出核心引擎
pub use lng_info::{calc_lng_info, lng_info_for_batch};
pub use ratio_engine::{
    inner_join, join_company, join_station, run_ratio_pipeline, PipelineOutcome,
    PipelineSettings, RatioEngine,
};
pub use runner::{RunSummary, StatsRunner};
