// ==========================================
// 城燃计划量误差统计 - 统计配置
// ==========================================
// 说明: 门站白名单、分输站子站、遥测设备代码等均为配置项，
//       更新时只改配置文件，不改统计逻辑
// ==========================================

use crate::domain::types::MissingBatchPolicy;
use crate::error::{StatsError, StatsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "GAS_STATS_CONFIG";

/// 统计周期根目录环境变量
pub const ROOT_DIR_ENV: &str = "GAS_STATS_ROOT";

// ==========================================
// 分输站 (Composite Station)
// ==========================================
/// 由若干子站批复量合成的父站
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeStation {
    pub gis_id: String,
    pub name: String,
    pub children: Vec<String>,
}

// ==========================================
// LNG 站点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LngStation {
    pub gis_id: String,
    /// 报表列名
    pub label: String,
}

// ==========================================
// 输入目录布局
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLayout {
    /// 根目录下的工作子目录
    pub work_subdir: String,
    pub batch_index_file: String,
    pub company_plan_file: String,
    pub gas_approval_file: String,
    pub company_info_file: String,
    /// 批次目录下的遥测子目录
    pub scada_dir: String,
    /// 遥测文件名前缀
    pub scada_prefix: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            work_subdir: "data/qd_high".to_string(),
            batch_index_file: "req_batch_no.csv".to_string(),
            company_plan_file: "company_plan.csv".to_string(),
            gas_approval_file: "gas_approval.csv".to_string(),
            company_info_file: "company_info.csv".to_string(),
            scada_dir: "scada".to_string(),
            scada_prefix: "jzw".to_string(),
        }
    }
}

// ==========================================
// 输出文件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportFiles {
    pub company_ratio: String,
    pub gas_ratio: String,
    pub lng_info: String,
}

impl Default for ReportFiles {
    fn default() -> Self {
        Self {
            company_ratio: "company_ratio.csv".to_string(),
            gas_ratio: "gas_ratio.csv".to_string(),
            lng_info: "lng_info.csv".to_string(),
        }
    }
}

// ==========================================
// StatsConfig - 统计配置全集
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub layout: SourceLayout,
    pub reports: ReportFiles,

    /// 参与统计的门站 gis_id 白名单
    pub tracked_station_ids: Vec<String>,
    /// 分输站合成规则
    pub composite_stations: Vec<CompositeStation>,
    /// LNG 站点（lng_info 报表）
    pub lng_stations: Vec<LngStation>,

    /// 工商户表计设备代码 (dno)
    pub company_device_code: i64,
    /// 门站表计设备代码 (dno)
    pub station_device_code: i64,
    /// 公司目录中的客户类型
    pub company_customer_type: String,

    /// m3 → 万方 换算除数
    pub unit_divisor: f64,
    /// 实际用量滞后天数（批复量在后日才能采集到）
    pub lookahead_days: i64,
    /// 报表日期相对预测日期的偏移
    pub label_offset_days: i64,
    /// LNG 报表日期相对批次日期的偏移（遥测为前一日数据）
    pub lng_label_offset_days: i64,

    pub company_missing_batch: MissingBatchPolicy,
    pub gas_missing_batch: MissingBatchPolicy,

    /// 报表编码（WHATWG 标签，例如 gbk / utf-8）
    pub output_encoding: String,
    /// 误差率无定义时的输出文本
    pub undefined_ratio_marker: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            layout: SourceLayout::default(),
            reports: ReportFiles::default(),
            tracked_station_ids: ["79", "100100017", "100100020", "100100024", "100219112"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            composite_stations: vec![CompositeStation {
                gis_id: "100219112".to_string(),
                name: "泊里分输站".to_string(),
                children: vec!["200287136".to_string(), "100304635".to_string()],
            }],
            lng_stations: vec![
                LngStation {
                    gis_id: "100100022".to_string(),
                    label: "临港LNG_m3".to_string(),
                },
                LngStation {
                    gis_id: "10012167".to_string(),
                    label: "团结路_m3".to_string(),
                },
            ],
            company_device_code: 11,
            station_device_code: 7,
            company_customer_type: "工商户".to_string(),
            unit_divisor: 10000.0,
            lookahead_days: 2,
            label_offset_days: 1,
            lng_label_offset_days: -1,
            company_missing_batch: MissingBatchPolicy::Halt,
            gas_missing_batch: MissingBatchPolicy::Halt,
            output_encoding: "gbk".to_string(),
            undefined_ratio_marker: "N/A".to_string(),
        }
    }
}

impl StatsConfig {
    /// 从 JSON 文件加载配置，未出现的键使用默认值
    pub fn from_file<P: AsRef<Path>>(path: P) -> StatsResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| StatsError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: StatsConfig =
            serde_json::from_str(&raw).map_err(|e| StatsError::ConfigReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// 按优先级加载配置
    ///
    /// # 顺序
    /// 1. 环境变量 GAS_STATS_CONFIG 指定的文件
    /// 2. 用户配置目录下的 gas-peak-stats/config.json（存在时）
    /// 3. 内置默认值
    pub fn load() -> StatsResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                tracing::info!("使用配置文件: {}", trimmed);
                return Self::from_file(trimmed);
            }
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                tracing::info!("使用配置文件: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("未找到配置文件，使用内置默认配置");
        Ok(Self::default())
    }

    /// 校验配置值
    pub fn validate(&self) -> StatsResult<()> {
        if !(self.unit_divisor.is_finite() && self.unit_divisor > 0.0) {
            return Err(StatsError::ConfigValueError {
                key: "unit_divisor".to_string(),
                value: self.unit_divisor.to_string(),
                message: "必须为正数".to_string(),
            });
        }

        if encoding_rs::Encoding::for_label(self.output_encoding.trim().as_bytes()).is_none() {
            return Err(StatsError::ConfigValueError {
                key: "output_encoding".to_string(),
                value: self.output_encoding.clone(),
                message: "未知编码标签".to_string(),
            });
        }

        for station in &self.composite_stations {
            if station.children.is_empty() {
                return Err(StatsError::ConfigValueError {
                    key: "composite_stations".to_string(),
                    value: station.gis_id.clone(),
                    message: "分输站至少需要一个子站".to_string(),
                });
            }
        }

        if self.layout.scada_prefix.is_empty() {
            return Err(StatsError::ConfigValueError {
                key: "layout.scada_prefix".to_string(),
                value: String::new(),
                message: "遥测文件前缀不能为空".to_string(),
            });
        }

        Ok(())
    }

    /// 是否为白名单门站
    pub fn is_tracked_station(&self, gis_id: &str) -> bool {
        self.tracked_station_ids.iter().any(|id| id == gis_id)
    }

    /// 打印已加载配置
    pub fn log_config(&self) {
        tracing::info!("统计配置:");
        tracing::info!("  工作目录        : {}", self.layout.work_subdir);
        tracing::info!("  遥测文件前缀    : {}", self.layout.scada_prefix);
        tracing::info!("  门站白名单      : {:?}", self.tracked_station_ids);
        tracing::info!("  分输站数量      : {}", self.composite_stations.len());
        tracing::info!(
            "  设备代码        : 工商户={}, 门站={}",
            self.company_device_code,
            self.station_device_code
        );
        tracing::info!("  滞后天数        : {}", self.lookahead_days);
        tracing::info!("  报表编码        : {}", self.output_encoding);
        tracing::info!(
            "  缺失批次策略    : 公司={}, 门站={}",
            self.company_missing_batch,
            self.gas_missing_batch
        );
    }
}

/// 默认配置文件路径（用户配置目录）
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gas-peak-stats").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_values() {
        let config = StatsConfig::default();
        assert_eq!(config.tracked_station_ids.len(), 5);
        assert!(config.is_tracked_station("100219112"));
        assert!(!config.is_tracked_station("200287136"));
        assert_eq!(config.company_device_code, 11);
        assert_eq!(config.station_device_code, 7);
        assert_eq!(config.unit_divisor, 10000.0);
        assert_eq!(config.lookahead_days, 2);
        assert_eq!(config.output_encoding, "gbk");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{"output_encoding": "utf-8", "gas_missing_batch": "SKIP", "layout": {{"scada_prefix": "scada_"}}}}"#
        )
        .unwrap();

        let config = StatsConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_encoding, "utf-8");
        assert_eq!(config.gas_missing_batch, MissingBatchPolicy::Skip);
        assert_eq!(config.company_missing_batch, MissingBatchPolicy::Halt);
        assert_eq!(config.layout.scada_prefix, "scada_");
        assert_eq!(config.layout.company_plan_file, "company_plan.csv");
        assert_eq!(config.composite_stations[0].name, "泊里分输站");
    }

    #[test]
    fn test_invalid_encoding_rejected() {
        let config = StatsConfig {
            output_encoding: "not-an-encoding".to_string(),
            ..StatsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StatsError::ConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_divisor_rejected() {
        let config = StatsConfig {
            unit_divisor: 0.0,
            ..StatsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = StatsConfig::from_file("non_existent_config.json");
        assert!(matches!(result, Err(StatsError::ConfigReadError { .. })));
    }
}
