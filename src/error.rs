// ==========================================
// 城燃计划量误差统计 - 统一错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单次运行内的错误均为致命错误，整批重跑
// ==========================================

use thiserror::Error;

/// 统计任务错误类型
#[derive(Error, Debug)]
pub enum StatsError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("目录 {dir} 下未找到前缀为 {prefix} 的文件")]
    PrefixNotMatched { dir: String, prefix: String },

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 字段映射错误 =====
    #[error("缺少字段 (表 {table}, 行 {row}): {field}")]
    MissingField {
        table: String,
        row: usize,
        field: String,
    },

    #[error("类型转换失败 (表 {table}, 行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        table: String,
        row: usize,
        field: String,
        message: String,
    },

    #[error("日期格式错误 (行 {row}): 无法解析 {value}")]
    DateFormatError { row: usize, value: String },

    #[error("日期偏移越界: {date} 偏移 {days} 天")]
    DateOutOfRange { date: String, days: i64 },

    // ===== 业务数据错误 =====
    #[error("分输站 {parent} 的子站 {child} 不在批复表中")]
    CompositeChildMissing { parent: String, child: String },

    #[error("批次 {batch_id} 的遥测数据中没有站点 {gis_id}")]
    StationNotFound { batch_id: String, gis_id: String },

    // ===== 配置错误 =====
    #[error("配置读取失败 ({path}): {message}")]
    ConfigReadError { path: String, message: String },

    #[error("配置值错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 报表错误 =====
    #[error("不支持的编码: {0}")]
    UnknownEncoding(String),

    #[error("报表内容含有无法以 {encoding} 编码的字符: {character}")]
    UnencodableCharacter { encoding: String, character: String },

    #[error("报表写入失败 ({path}): {message}")]
    ReportWriteError { path: String, message: String },
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for StatsError {
    fn from(err: std::io::Error) -> Self {
        StatsError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for StatsError {
    fn from(err: csv::Error) -> Self {
        StatsError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type StatsResult<T> = Result<T, StatsError>;
