// ==========================================
// 城燃计划量误差统计 - 批次数据源
// ==========================================
// 职责: 按批次号定位并读取原始表（外部数据访问）
// 布局: <root>/<work_subdir>/req_batch_no.csv
//       <root>/<work_subdir>/<batch_id>/{company_plan,gas_approval,company_info}.csv
//       <root>/<work_subdir>/<batch_id>/scada/<前缀>*
// ==========================================

use crate::config::SourceLayout;
use crate::error::{StatsError, StatsResult};
use crate::importer::file_parser::{FileParser, RawRecord, UniversalFileParser};
#[cfg(test)]
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ==========================================
// 批次内的表类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchTable {
    CompanyPlan, // 城燃计划量
    GasApproval, // 门站批复量
    CompanyInfo, // 公司目录
    Scada,       // 遥测数据（按前缀查找）
}

impl fmt::Display for BatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchTable::CompanyPlan => write!(f, "company_plan"),
            BatchTable::GasApproval => write!(f, "gas_approval"),
            BatchTable::CompanyInfo => write!(f, "company_info"),
            BatchTable::Scada => write!(f, "scada"),
        }
    }
}

// ==========================================
// BatchDataSource Trait
// ==========================================
// 实现者: FsBatchDataSource（目录布局）；测试中另有 MemoryDataSource
pub trait BatchDataSource {
    /// 读取批次索引表 (ts, req_batch_no)
    fn load_batch_index(&self) -> StatsResult<Vec<RawRecord>>;

    /// 读取指定批次的某类表
    fn load_batch_table(&self, batch_id: &str, table: BatchTable) -> StatsResult<Vec<RawRecord>>;
}

// ==========================================
// FsBatchDataSource - 文件系统数据源
// ==========================================
pub struct FsBatchDataSource {
    work_dir: PathBuf,
    layout: SourceLayout,
    parser: UniversalFileParser,
}

impl FsBatchDataSource {
    /// # 参数
    /// - root: 统计周期根目录
    /// - layout: 目录布局配置
    pub fn new<P: AsRef<Path>>(root: P, layout: SourceLayout) -> Self {
        let work_dir = root.as_ref().join(&layout.work_subdir);
        Self {
            work_dir,
            layout,
            parser: UniversalFileParser,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// 批次表的文件路径
    pub fn table_path(&self, batch_id: &str, table: BatchTable) -> StatsResult<PathBuf> {
        let batch_dir = self.work_dir.join(batch_id);
        let path = match table {
            BatchTable::CompanyPlan => batch_dir.join(&self.layout.company_plan_file),
            BatchTable::GasApproval => batch_dir.join(&self.layout.gas_approval_file),
            BatchTable::CompanyInfo => batch_dir.join(&self.layout.company_info_file),
            BatchTable::Scada => find_prefixed_file(
                &batch_dir.join(&self.layout.scada_dir),
                &self.layout.scada_prefix,
            )?,
        };
        Ok(path)
    }
}

impl BatchDataSource for FsBatchDataSource {
    fn load_batch_index(&self) -> StatsResult<Vec<RawRecord>> {
        let path = self.work_dir.join(&self.layout.batch_index_file);
        debug!("读取批次索引: {}", path.display());
        self.parser.parse_to_raw_records(&path)
    }

    fn load_batch_table(&self, batch_id: &str, table: BatchTable) -> StatsResult<Vec<RawRecord>> {
        let path = self.table_path(batch_id, table)?;
        debug!(batch_id, %table, "读取批次表: {}", path.display());
        self.parser.parse_to_raw_records(&path)
    }
}

/// 在目录中查找以 prefix 开头的文件
///
/// 多个匹配时取文件名字典序第一个，并记录数据质量告警
pub fn find_prefixed_file(dir: &Path, prefix: &str) -> StatsResult<PathBuf> {
    if !dir.is_dir() {
        return Err(StatsError::FileNotFound(dir.display().to_string()));
    }

    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(prefix))
                .unwrap_or(false)
        })
        .collect();
    matches.sort();

    if matches.len() > 1 {
        warn!(
            "目录 {} 下有 {} 个前缀为 {} 的文件，使用 {}",
            dir.display(),
            matches.len(),
            prefix,
            matches[0].display()
        );
    }

    matches
        .into_iter()
        .next()
        .ok_or_else(|| StatsError::PrefixNotMatched {
            dir: dir.display().to_string(),
            prefix: prefix.to_string(),
        })
}

// ==========================================
// MemoryDataSource - 内存数据源
// ==========================================
// 仅用于单元测试；缺失的表按文件不存在处理
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryDataSource {
    batch_index: Vec<RawRecord>,
    tables: HashMap<(String, BatchTable), Vec<RawRecord>>,
}

#[cfg(test)]
impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_index(mut self, rows: Vec<RawRecord>) -> Self {
        self.batch_index = rows;
        self
    }

    pub fn insert_table(&mut self, batch_id: &str, table: BatchTable, rows: Vec<RawRecord>) {
        self.tables.insert((batch_id.to_string(), table), rows);
    }
}

#[cfg(test)]
impl BatchDataSource for MemoryDataSource {
    fn load_batch_index(&self) -> StatsResult<Vec<RawRecord>> {
        Ok(self.batch_index.clone())
    }

    fn load_batch_table(&self, batch_id: &str, table: BatchTable) -> StatsResult<Vec<RawRecord>> {
        self.tables
            .get(&(batch_id.to_string(), table))
            .cloned()
            .ok_or_else(|| StatsError::FileNotFound(format!("{}/{}", batch_id, table)))
    }
}

/// 由列名与行数据构造原始记录
#[cfg(test)]
pub fn raw_records(headers: &[&str], rows: &[&[&str]]) -> Vec<RawRecord> {
    rows.iter()
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_prefixed_file_first_match() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("other.csv"), "a\n1\n").unwrap();
        fs::write(dir.path().join("jzw_20230102.csv"), "a\n1\n").unwrap();
        fs::write(dir.path().join("jzw_20230101.csv"), "a\n1\n").unwrap();

        let found = find_prefixed_file(dir.path(), "jzw").unwrap();
        assert_eq!(found.file_name().unwrap(), "jzw_20230101.csv");
    }

    #[test]
    fn test_find_prefixed_file_no_match() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("other.csv"), "a\n1\n").unwrap();

        let result = find_prefixed_file(dir.path(), "jzw");
        assert!(matches!(result, Err(StatsError::PrefixNotMatched { .. })));
    }

    #[test]
    fn test_find_prefixed_file_missing_dir() {
        let dir = TempDir::new().unwrap();
        let result = find_prefixed_file(&dir.path().join("scada"), "jzw");
        assert!(matches!(result, Err(StatsError::FileNotFound(_))));
    }

    #[test]
    fn test_fs_source_reads_batch_tables() {
        let root = TempDir::new().unwrap();
        let layout = SourceLayout::default();
        let batch_dir = root.path().join(&layout.work_subdir).join("B1");
        fs::create_dir_all(batch_dir.join("scada")).unwrap();
        fs::write(
            root.path().join(&layout.work_subdir).join("req_batch_no.csv"),
            "ts,req_batch_no\n2023-01-01,B1\n",
        )
        .unwrap();
        fs::write(
            batch_dir.join("company_plan.csv"),
            "gis_id,company_name,plan_value_wm3\n1,城燃A,1.5\n",
        )
        .unwrap();
        fs::write(batch_dir.join("scada").join("jzw.csv"), "gis_id,dno,flow_m3_h\n1,11,5\n").unwrap();

        let source = FsBatchDataSource::new(root.path(), layout);
        assert_eq!(source.load_batch_index().unwrap().len(), 1);
        assert_eq!(
            source.load_batch_table("B1", BatchTable::CompanyPlan).unwrap()[0]
                .get("company_name"),
            Some(&"城燃A".to_string())
        );
        assert_eq!(source.load_batch_table("B1", BatchTable::Scada).unwrap().len(), 1);
        assert!(matches!(
            source.load_batch_table("B1", BatchTable::GasApproval),
            Err(StatsError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_memory_source_missing_table() {
        let source = MemoryDataSource::new();
        assert!(source.load_batch_table("B1", BatchTable::Scada).is_err());
    }
}
