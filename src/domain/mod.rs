// ==========================================
// 城燃计划量误差统计 - 领域模型层
// ==========================================
// 职责: 定义批次、计划量、实际用量、误差率等领域实体
// 红线: 不含文件访问逻辑,不含统计流程
// ==========================================

pub mod batch;
pub mod quantity;
pub mod types;

// 重导出核心类型
pub use batch::BatchRecord;
pub use quantity::{
    CompanyInfo, CompanyPlan, CompanyUsage, EntityQuantity, LngInfoRecord, RatioRecord,
    ScadaReading, StationApproval, StationUsage,
};
pub use types::{MissingBatchPolicy, Ratio};
