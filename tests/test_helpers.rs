// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 在临时目录中构造统计周期目录布局与合成数据
// ==========================================

#![allow(dead_code)]

use gas_peak_stats::config::SourceLayout;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 临时统计周期目录
pub struct TestPeriod {
    pub root: TempDir,
    pub layout: SourceLayout,
}

impl TestPeriod {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let root = TempDir::new()?;
        let layout = SourceLayout::default();
        fs::create_dir_all(root.path().join(&layout.work_subdir))?;
        Ok(Self { root, layout })
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.path().join(&self.layout.work_subdir)
    }

    /// 写入批次索引 (ts, req_batch_no)
    pub fn write_batch_index(&self, rows: &[(&str, &str)]) -> Result<(), Box<dyn Error>> {
        let mut content = String::from("ts,req_batch_no\n");
        for (ts, batch_no) in rows {
            content.push_str(&format!("{},{}\n", ts, batch_no));
        }
        fs::write(self.work_dir().join(&self.layout.batch_index_file), content)?;
        Ok(())
    }

    fn batch_dir(&self, batch_id: &str) -> Result<PathBuf, Box<dyn Error>> {
        let dir = self.work_dir().join(batch_id);
        fs::create_dir_all(dir.join(&self.layout.scada_dir))?;
        Ok(dir)
    }

    /// 城燃计划量 (gis_id, company_name, plan_value_wm3)
    pub fn write_company_plan(
        &self,
        batch_id: &str,
        rows: &[(&str, &str, f64)],
    ) -> Result<(), Box<dyn Error>> {
        let mut content = String::from("gis_id,company_name,plan_value_wm3\n");
        for (gis_id, name, value) in rows {
            content.push_str(&format!("{},{},{}\n", gis_id, name, value));
        }
        fs::write(self.batch_dir(batch_id)?.join(&self.layout.company_plan_file), content)?;
        Ok(())
    }

    /// 门站批复量 (gis_id, stationName, plan_value_wm3)
    pub fn write_gas_approval(
        &self,
        batch_id: &str,
        rows: &[(&str, &str, f64)],
    ) -> Result<(), Box<dyn Error>> {
        let mut content = String::from("gis_id,stationName,plan_value_wm3,unit\n");
        for (gis_id, name, value) in rows {
            content.push_str(&format!("{},{},{},万方\n", gis_id, name, value));
        }
        fs::write(self.batch_dir(batch_id)?.join(&self.layout.gas_approval_file), content)?;
        Ok(())
    }

    /// 公司目录 (gis_id, company_name, type)
    pub fn write_company_info(
        &self,
        batch_id: &str,
        rows: &[(&str, &str, &str)],
    ) -> Result<(), Box<dyn Error>> {
        let mut content = String::from("gis_id,company_name,type\n");
        for (gis_id, name, kind) in rows {
            content.push_str(&format!("{},{},{}\n", gis_id, name, kind));
        }
        fs::write(self.batch_dir(batch_id)?.join(&self.layout.company_info_file), content)?;
        Ok(())
    }

    /// 遥测数据 (gis_id, dno, flow_m3_h)，文件名 = 前缀 + suffix
    pub fn write_scada(
        &self,
        batch_id: &str,
        suffix: &str,
        rows: &[(&str, i64, f64)],
    ) -> Result<(), Box<dyn Error>> {
        let mut content = String::from("gis_id,dno,flow_m3_h\n");
        for (gis_id, dno, flow) in rows {
            content.push_str(&format!("{},{},{}\n", gis_id, dno, flow));
        }
        let name = format!("{}{}", self.layout.scada_prefix, suffix);
        fs::write(
            self.batch_dir(batch_id)?.join(&self.layout.scada_dir).join(name),
            content,
        )?;
        Ok(())
    }
}

/// 读取 GBK 编码的报表并按行拆分
pub fn read_gbk_lines(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let bytes = fs::read(path)?;
    let (text, _, had_errors) = encoding_rs::GBK.decode(&bytes);
    assert!(!had_errors, "报表不是合法的 GBK 编码");
    Ok(text.lines().map(|l| l.to_string()).collect())
}
