// ==========================================
// 城燃计划量误差统计 - 报表列布局
// ==========================================

use crate::domain::types::format_value;
use crate::domain::{LngInfoRecord, RatioRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 城燃误差率报表表头
pub const COMPANY_RATIO_HEADER: &[&str] = &["时间", "company_name", "计划量", "实际用量", "误差率"];

/// 门站误差率报表表头
pub const GAS_RATIO_HEADER: &[&str] = &["时间", "gis_id", "门站", "计划量", "实际用量", "误差率"];

pub fn company_ratio_rows(records: &[RatioRecord], undefined_marker: &str) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.date.format(DATE_FORMAT).to_string(),
                r.entity_id.clone(),
                format_value(r.plan_value),
                format_value(r.actual_value),
                r.ratio.render(undefined_marker),
            ]
        })
        .collect()
}

pub fn gas_ratio_rows(records: &[RatioRecord], undefined_marker: &str) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.date.format(DATE_FORMAT).to_string(),
                r.entity_id.clone(),
                r.entity_name.clone().unwrap_or_default(),
                format_value(r.plan_value),
                format_value(r.actual_value),
                r.ratio.render(undefined_marker),
            ]
        })
        .collect()
}

/// LNG 报表表头：ts + 各 LNG 站列 + 供用气平衡三列
pub fn lng_info_header(lng_labels: &[String]) -> Vec<String> {
    let mut header = vec!["ts".to_string()];
    header.extend(lng_labels.iter().cloned());
    header.extend(
        ["总供气(万方)", "总用气(万方)", "差值(万方)"]
            .iter()
            .map(|s| s.to_string()),
    );
    header
}

pub fn lng_info_rows(records: &[LngInfoRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            let mut row = vec![r.date.format(DATE_FORMAT).to_string()];
            row.extend(r.lng_quantities.iter().map(|(_, q)| format_value(*q)));
            row.push(format_value(r.total_supply));
            row.push(format_value(r.total_usage));
            row.push(format_value(r.difference));
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ratio;
    use chrono::NaiveDate;

    #[test]
    fn test_gas_ratio_row_layout() {
        let record = RatioRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            entity_id: "79".to_string(),
            entity_name: Some("门站79".to_string()),
            plan_value: 120.0,
            actual_value: 100.0,
            ratio: Ratio::Value(20.0),
        };
        let rows = gas_ratio_rows(&[record], "N/A");
        assert_eq!(rows[0], vec!["2023-01-02", "79", "门站79", "120.0", "100.0", "20.0"]);
        assert_eq!(rows[0].len(), GAS_RATIO_HEADER.len());
    }

    #[test]
    fn test_company_ratio_row_undefined() {
        let record = RatioRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            entity_id: "城燃A".to_string(),
            entity_name: None,
            plan_value: 1.5,
            actual_value: 0.0,
            ratio: Ratio::Undefined,
        };
        let rows = company_ratio_rows(&[record], "N/A");
        assert_eq!(rows[0], vec!["2023-01-02", "城燃A", "1.5", "0.0", "N/A"]);
    }

    #[test]
    fn test_lng_header() {
        let header = lng_info_header(&["临港LNG_m3".to_string(), "团结路_m3".to_string()]);
        assert_eq!(
            header,
            vec!["ts", "临港LNG_m3", "团结路_m3", "总供气(万方)", "总用气(万方)", "差值(万方)"]
        );
    }
}
