// ==========================================
// 城燃计划量误差统计 - 配置层
// ==========================================
// 职责: 固定标识列表、设备代码、文件名、报表编码等配置项
// 存储: JSON 配置文件（缺省时使用内置默认值）
// ==========================================

pub mod stats_config;

// 重导出核心配置
pub use stats_config::{
    default_config_path, CompositeStation, LngStation, ReportFiles, SourceLayout, StatsConfig,
    CONFIG_PATH_ENV, ROOT_DIR_ENV,
};
