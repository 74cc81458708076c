// ==========================================
// 城燃计划量误差统计 - 核心库
// ==========================================
// 功能: 计划量（城燃计划 / 门站批复）与 SCADA 实际用量逐日对比，
//       输出误差率报表
// 运行方式: 单线程批处理，失败后整批重跑
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 错误类型
pub mod error;

// 配置层 - 标识列表与文件布局
pub mod config;

// 导入层 - 批次索引与实体抽取
pub mod importer;

// 引擎层 - 误差率计算与编排
pub mod engine;

// 报表层 - 分隔文本输出
pub mod report;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::StatsConfig;
pub use domain::{BatchRecord, EntityQuantity, MissingBatchPolicy, Ratio, RatioRecord};
pub use engine::{RatioEngine, RunSummary, StatsRunner};
pub use error::{StatsError, StatsResult};
pub use importer::{BatchDataSource, BatchIndex, EntityExtractor, FsBatchDataSource};
pub use report::ReportWriter;

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "城燃计划量误差统计";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
