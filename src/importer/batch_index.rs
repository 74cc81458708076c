// ==========================================
// 城燃计划量误差统计 - 批次索引
// ==========================================
// 职责: 加载 (ts, req_batch_no)，按日期排序，按日去重（保留最后一条），
//       提供日期 → 批次查找
// 查找口径: 同月同日即命中，忽略年份（固定的循环统计周期）
// ==========================================

use crate::domain::BatchRecord;
use crate::error::{StatsError, StatsResult};
use crate::importer::data_source::BatchDataSource;
use crate::importer::field_mapper::{canonical_id, FieldMapper};
use crate::importer::file_parser::RawRecord;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::{debug, info};

const TS_FIELD: &str = "ts";
const BATCH_NO_FIELD: &str = "req_batch_no";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// 批次索引（构建后只读）
#[derive(Debug, Clone, Default)]
pub struct BatchIndex {
    records: Vec<BatchRecord>,
}

impl BatchIndex {
    /// 从数据源加载批次索引
    pub fn load<S: BatchDataSource + ?Sized>(source: &S) -> StatsResult<Self> {
        let rows = source.load_batch_index()?;
        let index = Self::from_raw_records(&rows)?;
        info!("批次索引加载完成: {} 条原始记录, 去重后 {} 条", rows.len(), index.len());
        Ok(index)
    }

    /// 从原始行构建
    pub fn from_raw_records(rows: &[RawRecord]) -> StatsResult<Self> {
        let mapper = FieldMapper::new("req_batch_no");
        let mut entries = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;
            let ts_raw = mapper.require_string(row, TS_FIELD, row_number)?;
            let ts = parse_timestamp(&ts_raw).ok_or(StatsError::DateFormatError {
                row: row_number,
                value: ts_raw.clone(),
            })?;
            let batch_id = mapper.require_id(row, BATCH_NO_FIELD, row_number)?;
            entries.push((ts, batch_id));
        }

        Ok(Self::from_entries(entries))
    }

    /// 从 (时间, 批次号) 构建：稳定排序后按日去重，保留最后一条
    pub fn from_entries(mut entries: Vec<(NaiveDateTime, String)>) -> Self {
        entries.sort_by_key(|(ts, _)| *ts);

        let mut last_by_day: HashMap<u32, usize> = HashMap::new();
        for (pos, (ts, _)) in entries.iter().enumerate() {
            last_by_day.insert(ts.day(), pos);
        }

        let records: Vec<BatchRecord> = entries
            .into_iter()
            .enumerate()
            .filter(|(pos, (ts, _))| last_by_day.get(&ts.day()) == Some(pos))
            .map(|(_, (ts, batch_id))| BatchRecord::new(ts.date(), canonical_id(&batch_id)))
            .collect();

        debug!("批次索引: {:?}", records);
        Self { records }
    }

    /// 按日期查找批次（同月同日，忽略年份）
    pub fn resolve(&self, date: NaiveDate) -> Option<&BatchRecord> {
        self.records.iter().find(|r| r.matches_month_day(date))
    }

    pub fn records(&self) -> &[BatchRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 解析日期或日期时间
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
