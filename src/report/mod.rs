// ==========================================
// 城燃计划量误差统计 - 报表层
// ==========================================
// 职责: 报表列布局 + 按配置编码写出分隔文本
// ==========================================

pub mod layout;
pub mod writer;

pub use layout::{
    company_ratio_rows, gas_ratio_rows, lng_info_header, lng_info_rows, COMPANY_RATIO_HEADER,
    GAS_RATIO_HEADER,
};
pub use writer::ReportWriter;
