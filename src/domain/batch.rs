// ==========================================
// 城燃计划量误差统计 - 批次记录
// ==========================================
// 来源: req_batch_no 表 (ts, req_batch_no)
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// 批次记录：某一自然日对应的请求批次号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// 批次日期（无时分秒）
    pub date: NaiveDate,
    /// 批次号（规范化后的字符串）
    pub batch_id: String,
}

impl BatchRecord {
    pub fn new(date: NaiveDate, batch_id: impl Into<String>) -> Self {
        Self {
            date,
            batch_id: batch_id.into(),
        }
    }

    /// 日（day-of-month），去重键
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// 是否与给定日期同月同日（忽略年份）
    pub fn matches_month_day(&self, date: NaiveDate) -> bool {
        self.date.month() == date.month() && self.date.day() == date.day()
    }
}
