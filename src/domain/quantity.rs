// ==========================================
// 城燃计划量误差统计 - 计划量与实际用量实体
// ==========================================
// 单位: 计划量与实际用量均为万方 (wm3)，LNG 为原始 m3
// ==========================================

use crate::domain::types::Ratio;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// 预测侧
// ==========================================

/// 城燃公司计划量 (company_plan)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPlan {
    pub gis_id: String,
    pub company_name: String,
    pub plan_value_wm3: f64,
}

/// 门站批复量 (gas_approval)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationApproval {
    pub gis_id: String,
    pub station_name: String,
    pub plan_value_wm3: f64,
    pub unit: Option<String>,
}

// ==========================================
// 实际侧
// ==========================================

/// 工商户实际用量，按公司名汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyUsage {
    pub company_name: String,
    pub quantity: f64,
}

/// 门站实际供气量，按 gis_id 汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationUsage {
    pub gis_id: String,
    pub quantity: f64,
}

// ==========================================
// 关联结果
// ==========================================

/// 计划量与实际用量按实体内连接后的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityQuantity {
    /// 公司名 或 门站 gis_id
    pub entity_id: String,
    /// 门站名称（公司报表为空）
    pub entity_name: Option<String>,
    pub plan_value: f64,
    pub actual_value: f64,
}

impl EntityQuantity {
    pub fn ratio(&self) -> Ratio {
        Ratio::compute(self.plan_value, self.actual_value)
    }
}

/// 误差率报表行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRecord {
    /// 计划量对应的目标日期（预测日期 + 1 天）
    pub date: NaiveDate,
    pub entity_id: String,
    pub entity_name: Option<String>,
    pub plan_value: f64,
    pub actual_value: f64,
    pub ratio: Ratio,
}

impl RatioRecord {
    pub fn from_quantity(date: NaiveDate, quantity: EntityQuantity) -> Self {
        let ratio = quantity.ratio();
        Self {
            date,
            entity_id: quantity.entity_id,
            entity_name: quantity.entity_name,
            plan_value: quantity.plan_value,
            actual_value: quantity.actual_value,
            ratio,
        }
    }
}

/// LNG 及供用气平衡报表行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LngInfoRecord {
    /// 数据日期（批次日期 - 1 天）
    pub date: NaiveDate,
    /// (列名, 原始 m3 汇总) 按配置顺序
    pub lng_quantities: Vec<(String, f64)>,
    /// 总供气（万方）
    pub total_supply: f64,
    /// 总用气（万方）
    pub total_usage: f64,
    /// 差值（万方）
    pub difference: f64,
}

/// SCADA 遥测读数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScadaReading {
    pub gis_id: String,
    /// 设备类别代码
    pub dno: Option<i64>,
    /// 流量（空值按 0 计）
    pub flow_m3_h: f64,
}

/// 公司目录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub gis_id: String,
    pub company_name: String,
    pub customer_type: String,
}
