// ==========================================
// 城燃计划量误差统计 - 导入层
// ==========================================
// 职责: 批次索引、原始表读取、实体数据抽取
// 支持: CSV
// ==========================================

pub mod batch_index;
pub mod data_source;
pub mod extractors;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use batch_index::BatchIndex;
pub use data_source::{BatchDataSource, BatchTable, FsBatchDataSource};
pub use extractors::EntityExtractor;
pub use field_mapper::{canonical_id, FieldMapper};
pub use file_parser::{CsvParser, FileParser, RawRecord, UniversalFileParser};
