// ==========================================
// 城燃计划量误差统计 - LNG 与供用气平衡
// ==========================================
// 口径: 批次中的遥测为前一日数据，报表日期 = 批次日期 - 1 天
// - LNG 站点: 原始 flow_m3_h 汇总（m3），保留两位小数
// - 总供气: 白名单门站流量之和 / 换算除数
// - 总用气: 工商户设备代码流量之和 / 换算除数
// ==========================================

use crate::config::StatsConfig;
use crate::domain::types::round2;
use crate::domain::{LngInfoRecord, ScadaReading};
use crate::engine::ratio_engine::label_date;
use crate::error::StatsResult;
use crate::importer::extractors::station_flow_total;
use crate::importer::{BatchDataSource, BatchIndex, EntityExtractor};
use chrono::NaiveDate;
use tracing::{info, instrument};

/// 单个批次的 LNG 与供用气平衡
pub fn lng_info_for_batch(
    readings: &[ScadaReading],
    date: NaiveDate,
    batch_id: &str,
    config: &StatsConfig,
) -> StatsResult<LngInfoRecord> {
    let lng_quantities = config
        .lng_stations
        .iter()
        .map(|station| {
            station_flow_total(readings, &station.gis_id, batch_id)
                .map(|total| (station.label.clone(), round2(total)))
        })
        .collect::<StatsResult<Vec<_>>>()?;

    let supply_total: f64 = readings
        .iter()
        .filter(|r| config.is_tracked_station(&r.gis_id))
        .map(|r| r.flow_m3_h)
        .sum();
    let usage_total: f64 = readings
        .iter()
        .filter(|r| r.dno == Some(config.company_device_code))
        .map(|r| r.flow_m3_h)
        .sum();

    let total_supply = round2(supply_total / config.unit_divisor);
    let total_usage = round2(usage_total / config.unit_divisor);

    Ok(LngInfoRecord {
        date,
        lng_quantities,
        total_supply,
        total_usage,
        difference: round2(total_supply - total_usage),
    })
}

/// 遍历批次索引生成 LNG 报表行
#[instrument(skip_all)]
pub fn calc_lng_info<S: BatchDataSource + ?Sized>(
    source: &S,
    index: &BatchIndex,
    config: &StatsConfig,
) -> StatsResult<Vec<LngInfoRecord>> {
    let extractor = EntityExtractor::new(source, config);
    let mut records = Vec::with_capacity(index.len());

    for record in index.iter() {
        let date = label_date(record.date, config.lng_label_offset_days)?;
        let readings = extractor.scada(&record.batch_id)?;
        records.push(lng_info_for_batch(&readings, date, &record.batch_id, config)?);
    }

    info!("LNG 统计完成: {} 行", records.len());
    Ok(records)
}
