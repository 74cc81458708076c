// ==========================================
// 城燃计划量误差统计 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 误差率 (Deviation Ratio)
// ==========================================
// 实际用量为 0 时误差率无定义，使用显式哨兵值而不是 inf/NaN
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Ratio {
    Value(f64), // 百分比，已保留两位小数
    Undefined,  // 实际用量为 0
}

impl Ratio {
    /// 计算误差率: (计划量 - 实际用量) / 实际用量 × 100，保留两位小数
    pub fn compute(plan_value: f64, actual_value: f64) -> Self {
        if actual_value == 0.0 {
            return Ratio::Undefined;
        }
        let ratio = (plan_value - actual_value) / actual_value * 100.0;
        if ratio.is_finite() {
            Ratio::Value(round2(ratio))
        } else {
            Ratio::Undefined
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Value(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Ratio::Undefined)
    }

    /// 报表中的文本形式，无定义时输出 marker
    pub fn render(&self, undefined_marker: &str) -> String {
        match self {
            Ratio::Value(v) => format_value(*v),
            Ratio::Undefined => undefined_marker.to_string(),
        }
    }
}

// ==========================================
// 目标批次缺失策略 (Missing Batch Policy)
// ==========================================
// 每个流程调用处显式选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissingBatchPolicy {
    Halt, // 视为数据已耗尽，结束整个流程
    Skip, // 仅跳过当前日期
}

impl Default for MissingBatchPolicy {
    fn default() -> Self {
        MissingBatchPolicy::Halt
    }
}

impl fmt::Display for MissingBatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingBatchPolicy::Halt => write!(f, "HALT"),
            MissingBatchPolicy::Skip => write!(f, "SKIP"),
        }
    }
}

// ==========================================
// 数值工具
// ==========================================

/// 保留两位小数（四舍五入，远离零）
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 报表数值格式：整数值保留一位小数（20.0），其余按最短表示输出
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
