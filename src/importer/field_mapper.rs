// ==========================================
// 城燃计划量误差统计 - 字段映射器
// ==========================================
// 职责: 原始行记录 → 强类型字段，带表名与行号的错误信息
// ==========================================

use crate::error::{StatsError, StatsResult};
use crate::importer::file_parser::RawRecord;

/// 标识字段规范化
///
/// 去掉首尾空白；数值列被当作浮点读入时产生的 `123.0` 还原为 `123`
pub fn canonical_id(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.strip_suffix(".0") {
        Some(head) if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => {
            head.to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// 按表名映射字段
pub struct FieldMapper<'a> {
    table: &'a str,
}

impl<'a> FieldMapper<'a> {
    pub fn new(table: &'a str) -> Self {
        Self { table }
    }

    /// 提取字符串字段（空值视为 None）
    pub fn get_string(&self, row: &RawRecord, key: &str) -> Option<String> {
        row.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    /// 必填字符串字段
    pub fn require_string(&self, row: &RawRecord, key: &str, row_number: usize) -> StatsResult<String> {
        self.get_string(row, key)
            .ok_or_else(|| StatsError::MissingField {
                table: self.table.to_string(),
                row: row_number,
                field: key.to_string(),
            })
    }

    /// 必填标识字段（规范化）
    pub fn require_id(&self, row: &RawRecord, key: &str, row_number: usize) -> StatsResult<String> {
        self.require_string(row, key, row_number)
            .map(|v| canonical_id(&v))
    }

    /// 解析浮点数（空值为 None）
    pub fn parse_f64(&self, row: &RawRecord, key: &str, row_number: usize) -> StatsResult<Option<f64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| StatsError::TypeConversionError {
                    table: self.table.to_string(),
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为浮点数: {}", value),
                }),
        }
    }

    /// 必填浮点数
    pub fn require_f64(&self, row: &RawRecord, key: &str, row_number: usize) -> StatsResult<f64> {
        self.parse_f64(row, key, row_number)?
            .ok_or_else(|| StatsError::MissingField {
                table: self.table.to_string(),
                row: row_number,
                field: key.to_string(),
            })
    }

    /// 解析整数代码，兼容 `11.0` 形式
    pub fn parse_code(&self, row: &RawRecord, key: &str, row_number: usize) -> StatsResult<Option<i64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => {
                if let Ok(code) = value.parse::<i64>() {
                    return Ok(Some(code));
                }
                match value.parse::<f64>() {
                    Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(f as i64)),
                    _ => Err(StatsError::TypeConversionError {
                        table: self.table.to_string(),
                        row: row_number,
                        field: key.to_string(),
                        message: format!("无法解析为整数: {}", value),
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_canonical_id() {
        assert_eq!(canonical_id(" 100100017 "), "100100017");
        assert_eq!(canonical_id("100100017.0"), "100100017");
        assert_eq!(canonical_id("A12.0"), "A12.0");
        assert_eq!(canonical_id("12.5"), "12.5");
        assert_eq!(canonical_id(".0"), ".0");
    }

    #[test]
    fn test_parse_values() {
        let mapper = FieldMapper::new("scada");
        let r = row(&[("gis_id", "79.0"), ("dno", "11.0"), ("flow_m3_h", " 12.5 "), ("empty", "")]);

        assert_eq!(mapper.require_id(&r, "gis_id", 1).unwrap(), "79");
        assert_eq!(mapper.parse_code(&r, "dno", 1).unwrap(), Some(11));
        assert_eq!(mapper.require_f64(&r, "flow_m3_h", 1).unwrap(), 12.5);
        assert_eq!(mapper.parse_f64(&r, "empty", 1).unwrap(), None);
    }

    #[test]
    fn test_missing_and_invalid_fields() {
        let mapper = FieldMapper::new("company_plan");
        let r = row(&[("plan_value_wm3", "abc")]);

        assert!(matches!(
            mapper.require_string(&r, "company_name", 3),
            Err(StatsError::MissingField { row: 3, .. })
        ));
        assert!(matches!(
            mapper.require_f64(&r, "plan_value_wm3", 3),
            Err(StatsError::TypeConversionError { .. })
        ));
    }
}
