// ==========================================
// 城燃计划量误差统计 - 实体数据抽取
// ==========================================
// 职责: 按批次号读取原始表，按固定类别过滤，得到按实体归一的数量
// - 城燃计划量: 全部行
// - 门站批复量: 合成分输站 → 追加 → 门站白名单过滤
// - 工商户实际用量: 设备代码过滤 → 关联公司目录 → 按公司汇总 → 换算万方
// - 门站实际供气量: 设备代码过滤 → 按 gis_id 汇总 → 换算万方 → 白名单过滤
// ==========================================

use crate::config::{CompositeStation, StatsConfig};
use crate::domain::types::round2;
use crate::domain::{
    CompanyInfo, CompanyPlan, CompanyUsage, ScadaReading, StationApproval, StationUsage,
};
use crate::error::{StatsError, StatsResult};
use crate::importer::data_source::{BatchDataSource, BatchTable};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::RawRecord;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

// ==========================================
// EntityExtractor - 按批次抽取
// ==========================================
pub struct EntityExtractor<'a, S: BatchDataSource + ?Sized> {
    source: &'a S,
    config: &'a StatsConfig,
}

impl<'a, S: BatchDataSource + ?Sized> EntityExtractor<'a, S> {
    pub fn new(source: &'a S, config: &'a StatsConfig) -> Self {
        Self { source, config }
    }

    /// 城燃计划量（不过滤）
    pub fn company_plan(&self, batch_id: &str) -> StatsResult<Vec<CompanyPlan>> {
        let rows = self.source.load_batch_table(batch_id, BatchTable::CompanyPlan)?;
        parse_company_plans(&rows)
    }

    /// 门站批复量（含合成的分输站，已按白名单过滤）
    pub fn gas_approval(&self, batch_id: &str) -> StatsResult<Vec<StationApproval>> {
        let rows = self.source.load_batch_table(batch_id, BatchTable::GasApproval)?;
        let mut approvals = parse_station_approvals(&rows)?;

        for composite in &self.config.composite_stations {
            let parent = synthesize_composite(&approvals, composite)?;
            if approvals.iter().any(|a| a.gis_id == parent.gis_id) {
                warn!(batch_id, "批复表中已存在分输站 {} 的原始行", parent.gis_id);
            }
            debug!(batch_id, "合成分输站 {}: {}", parent.station_name, parent.plan_value_wm3);
            approvals.push(parent);
        }

        approvals.retain(|a| self.config.is_tracked_station(&a.gis_id));
        Ok(approvals)
    }

    /// 公司目录（已按客户类型过滤）
    pub fn company_info(&self, batch_id: &str) -> StatsResult<Vec<CompanyInfo>> {
        let rows = self.source.load_batch_table(batch_id, BatchTable::CompanyInfo)?;
        let mut infos = parse_company_infos(&rows)?;
        infos.retain(|info| info.customer_type == self.config.company_customer_type);
        Ok(infos)
    }

    /// 遥测读数（全部）
    pub fn scada(&self, batch_id: &str) -> StatsResult<Vec<ScadaReading>> {
        let rows = self.source.load_batch_table(batch_id, BatchTable::Scada)?;
        parse_scada(&rows)
    }

    /// 工商户实际用量（万方）
    pub fn real_company_usage(&self, batch_id: &str) -> StatsResult<Vec<CompanyUsage>> {
        let infos = self.company_info(batch_id)?;
        let readings = self.scada(batch_id)?;
        Ok(aggregate_company_usage(
            &readings,
            &infos,
            self.config.company_device_code,
            self.config.unit_divisor,
        ))
    }

    /// 门站实际供气量（万方，已按白名单过滤）
    pub fn real_station_usage(&self, batch_id: &str) -> StatsResult<Vec<StationUsage>> {
        let readings = self.scada(batch_id)?;
        let mut usages = aggregate_station_usage(
            &readings,
            self.config.station_device_code,
            self.config.unit_divisor,
        );
        usages.retain(|u| self.config.is_tracked_station(&u.gis_id));
        Ok(usages)
    }
}

// ==========================================
// 行解析
// ==========================================

pub fn parse_company_plans(rows: &[RawRecord]) -> StatsResult<Vec<CompanyPlan>> {
    let mapper = FieldMapper::new("company_plan");
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let row_number = idx + 1;
            Ok(CompanyPlan {
                gis_id: mapper.require_id(row, "gis_id", row_number)?,
                company_name: mapper.require_string(row, "company_name", row_number)?,
                plan_value_wm3: mapper.require_f64(row, "plan_value_wm3", row_number)?,
            })
        })
        .collect()
}

pub fn parse_station_approvals(rows: &[RawRecord]) -> StatsResult<Vec<StationApproval>> {
    let mapper = FieldMapper::new("gas_approval");
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let row_number = idx + 1;
            Ok(StationApproval {
                gis_id: mapper.require_id(row, "gis_id", row_number)?,
                station_name: mapper.get_string(row, "stationName").unwrap_or_default(),
                plan_value_wm3: mapper.require_f64(row, "plan_value_wm3", row_number)?,
                unit: mapper.get_string(row, "unit"),
            })
        })
        .collect()
}

pub fn parse_company_infos(rows: &[RawRecord]) -> StatsResult<Vec<CompanyInfo>> {
    let mapper = FieldMapper::new("company_info");
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let row_number = idx + 1;
            Ok(CompanyInfo {
                gis_id: mapper.require_id(row, "gis_id", row_number)?,
                company_name: mapper.require_string(row, "company_name", row_number)?,
                customer_type: mapper.get_string(row, "type").unwrap_or_default(),
            })
        })
        .collect()
}

pub fn parse_scada(rows: &[RawRecord]) -> StatsResult<Vec<ScadaReading>> {
    let mapper = FieldMapper::new("scada");
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let row_number = idx + 1;
            Ok(ScadaReading {
                gis_id: mapper.require_id(row, "gis_id", row_number)?,
                dno: mapper.parse_code(row, "dno", row_number)?,
                flow_m3_h: mapper.parse_f64(row, "flow_m3_h", row_number)?.unwrap_or(0.0),
            })
        })
        .collect()
}

// ==========================================
// 分输站合成
// ==========================================

/// 合成分输站批复行：计划量 = 全部子站计划量之和，单位取第一个子站
///
/// 子站不在批复表中时报错，不按 0 计
pub fn synthesize_composite(
    approvals: &[StationApproval],
    composite: &CompositeStation,
) -> StatsResult<StationApproval> {
    let mut total = 0.0;
    for child in &composite.children {
        let mut found = false;
        for approval in approvals.iter().filter(|a| &a.gis_id == child) {
            total += approval.plan_value_wm3;
            found = true;
        }
        if !found {
            return Err(StatsError::CompositeChildMissing {
                parent: composite.gis_id.clone(),
                child: child.clone(),
            });
        }
    }

    let unit = approvals
        .iter()
        .find(|a| composite.children.contains(&a.gis_id))
        .and_then(|a| a.unit.clone());

    Ok(StationApproval {
        gis_id: composite.gis_id.clone(),
        station_name: composite.name.clone(),
        plan_value_wm3: total,
        unit,
    })
}

// ==========================================
// 汇总
// ==========================================

/// 工商户用量：按设备代码过滤，左关联公司目录，未关联到公司的读数丢弃，
/// 按公司名汇总后换算并保留两位小数（按公司名排序）
pub fn aggregate_company_usage(
    readings: &[ScadaReading],
    infos: &[CompanyInfo],
    device_code: i64,
    divisor: f64,
) -> Vec<CompanyUsage> {
    let mut directory: HashMap<&str, Vec<&str>> = HashMap::new();
    for info in infos {
        directory
            .entry(info.gis_id.as_str())
            .or_default()
            .push(info.company_name.as_str());
    }

    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    let mut unmatched = 0usize;
    for reading in readings.iter().filter(|r| r.dno == Some(device_code)) {
        match directory.get(reading.gis_id.as_str()) {
            Some(names) => {
                for name in names {
                    *totals.entry(*name).or_insert(0.0) += reading.flow_m3_h;
                }
            }
            None => unmatched += 1,
        }
    }

    if unmatched > 0 {
        debug!("{} 条工商户读数未关联到公司目录", unmatched);
    }

    totals
        .into_iter()
        .map(|(name, total)| CompanyUsage {
            company_name: name.to_string(),
            quantity: round2(total / divisor),
        })
        .collect()
}

/// 门站用量：按设备代码过滤，按 gis_id 汇总后换算并保留两位小数（按 gis_id 排序）
pub fn aggregate_station_usage(
    readings: &[ScadaReading],
    device_code: i64,
    divisor: f64,
) -> Vec<StationUsage> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for reading in readings.iter().filter(|r| r.dno == Some(device_code)) {
        *totals.entry(reading.gis_id.as_str()).or_insert(0.0) += reading.flow_m3_h;
    }

    totals
        .into_iter()
        .map(|(gis_id, total)| StationUsage {
            gis_id: gis_id.to_string(),
            quantity: round2(total / divisor),
        })
        .collect()
}

/// 指定站点的原始流量之和（不换算）；遥测中没有该站点时报错
pub fn station_flow_total(
    readings: &[ScadaReading],
    gis_id: &str,
    batch_id: &str,
) -> StatsResult<f64> {
    let mut matched = readings.iter().filter(|r| r.gis_id == gis_id).peekable();
    if matched.peek().is_none() {
        return Err(StatsError::StationNotFound {
            batch_id: batch_id.to_string(),
            gis_id: gis_id.to_string(),
        });
    }
    Ok(matched.map(|r| r.flow_m3_h).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::data_source::{raw_records, MemoryDataSource};

    fn approval(gis_id: &str, value: f64) -> StationApproval {
        StationApproval {
            gis_id: gis_id.to_string(),
            station_name: format!("站{}", gis_id),
            plan_value_wm3: value,
            unit: Some("万方".to_string()),
        }
    }

    fn reading(gis_id: &str, dno: i64, flow: f64) -> ScadaReading {
        ScadaReading {
            gis_id: gis_id.to_string(),
            dno: Some(dno),
            flow_m3_h: flow,
        }
    }

    fn poli() -> CompositeStation {
        StatsConfig::default().composite_stations[0].clone()
    }

    #[test]
    fn test_synthesize_composite_sums_children() {
        let approvals = vec![
            approval("200287136", 12.5),
            approval("100304635", 7.25),
            approval("79", 100.0),
        ];
        let parent = synthesize_composite(&approvals, &poli()).unwrap();
        assert_eq!(parent.gis_id, "100219112");
        assert_eq!(parent.station_name, "泊里分输站");
        assert_eq!(parent.plan_value_wm3, 19.75);
        assert_eq!(parent.unit.as_deref(), Some("万方"));
    }

    #[test]
    fn test_synthesize_composite_zero_children() {
        let approvals = vec![approval("200287136", 0.0), approval("100304635", 0.0)];
        let parent = synthesize_composite(&approvals, &poli()).unwrap();
        assert_eq!(parent.plan_value_wm3, 0.0);
    }

    #[test]
    fn test_synthesize_composite_absent_child_is_error() {
        let approvals = vec![approval("200287136", 3.0)];
        let result = synthesize_composite(&approvals, &poli());
        assert!(matches!(
            result,
            Err(StatsError::CompositeChildMissing { ref child, .. }) if child == "100304635"
        ));
    }

    #[test]
    fn test_gas_approval_appends_parent_and_filters() {
        let mut source = MemoryDataSource::new();
        source.insert_table(
            "B1",
            BatchTable::GasApproval,
            raw_records(
                &["gis_id", "stationName", "plan_value_wm3", "unit"],
                &[
                    &["79", "门站79", "100", "万方"],
                    &["200287136", "子站A", "12", "万方"],
                    &["100304635", "子站B", "8", "万方"],
                    &["555", "未跟踪站", "1", "万方"],
                ],
            ),
        );
        let config = StatsConfig::default();
        let extractor = EntityExtractor::new(&source, &config);

        let approvals = extractor.gas_approval("B1").unwrap();
        let ids: Vec<&str> = approvals.iter().map(|a| a.gis_id.as_str()).collect();
        assert_eq!(ids, vec!["79", "100219112"]);
        assert_eq!(approvals[1].plan_value_wm3, 20.0);
    }

    #[test]
    fn test_company_usage_joins_directory() {
        let readings = vec![
            reading("1", 11, 30000.0),
            reading("2", 11, 20000.0),
            reading("3", 11, 99999.0), // 不在目录中
            reading("1", 7, 50000.0),  // 门站读数
        ];
        let infos = vec![
            CompanyInfo {
                gis_id: "1".to_string(),
                company_name: "城燃A".to_string(),
                customer_type: "工商户".to_string(),
            },
            CompanyInfo {
                gis_id: "2".to_string(),
                company_name: "城燃A".to_string(),
                customer_type: "工商户".to_string(),
            },
        ];

        let usage = aggregate_company_usage(&readings, &infos, 11, 10000.0);
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].company_name, "城燃A");
        assert_eq!(usage[0].quantity, 5.0);
    }

    #[test]
    fn test_company_info_filtered_by_customer_type() {
        let mut source = MemoryDataSource::new();
        source.insert_table(
            "B1",
            BatchTable::CompanyInfo,
            raw_records(
                &["gis_id", "company_name", "type"],
                &[&["1", "城燃A", "工商户"], &["2", "居民区", "居民"]],
            ),
        );
        let config = StatsConfig::default();
        let infos = EntityExtractor::new(&source, &config).company_info("B1").unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].company_name, "城燃A");
    }

    #[test]
    fn test_station_usage_scaled_and_rounded() {
        let readings = vec![
            reading("79", 7, 12000.0),
            reading("79", 7, 345.678),
            reading("80", 7, 10000.0),
            reading("79", 11, 1.0e6),
        ];
        let usage = aggregate_station_usage(&readings, 7, 10000.0);
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].gis_id, "79");
        assert_eq!(usage[0].quantity, 1.23);
        assert_eq!(usage[1].quantity, 1.0);
    }

    #[test]
    fn test_real_station_usage_tracked_only() {
        let mut source = MemoryDataSource::new();
        source.insert_table(
            "B1",
            BatchTable::Scada,
            raw_records(
                &["gis_id", "dno", "flow_m3_h"],
                &[&["79", "7", "20000"], &["555", "7", "10000"], &["100100017.0", "7.0", "5000"]],
            ),
        );
        let config = StatsConfig::default();
        let usage = EntityExtractor::new(&source, &config)
            .real_station_usage("B1")
            .unwrap();
        let ids: Vec<&str> = usage.iter().map(|u| u.gis_id.as_str()).collect();
        assert_eq!(ids, vec!["100100017", "79"]);
        assert_eq!(usage[0].quantity, 0.5);
    }

    #[test]
    fn test_station_flow_total() {
        let readings = vec![reading("100100022", 3, 1.5), reading("100100022", 3, 2.0)];
        assert_eq!(station_flow_total(&readings, "100100022", "B1").unwrap(), 3.5);
        assert!(matches!(
            station_flow_total(&readings, "10012167", "B1"),
            Err(StatsError::StationNotFound { .. })
        ));
    }
}
