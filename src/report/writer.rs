// ==========================================
// 城燃计划量误差统计 - 报表写出
// ==========================================
// 格式: 逗号分隔，含表头，无索引列
// 编码: 按配置（默认 GBK），字符无法编码或目标不可写时整次运行失败
// ==========================================

use crate::error::{StatsError, StatsResult};
use csv::{Terminator, WriterBuilder};
use encoding_rs::Encoding;
use std::path::Path;
use tracing::info;

pub struct ReportWriter {
    encoding: &'static Encoding,
}

impl ReportWriter {
    /// # 参数
    /// - encoding_label: WHATWG 编码标签（gbk / gb18030 / utf-8 ...）
    pub fn new(encoding_label: &str) -> StatsResult<Self> {
        let encoding = Encoding::for_label(encoding_label.trim().as_bytes())
            .ok_or_else(|| StatsError::UnknownEncoding(encoding_label.to_string()))?;
        Ok(Self { encoding })
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// 渲染为编码后的字节
    pub fn render<H, R>(&self, header: &[H], rows: &[Vec<R>]) -> StatsResult<Vec<u8>>
    where
        H: AsRef<str>,
        R: AsRef<str>,
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(header.iter().map(|h| h.as_ref()))?;
        for row in rows {
            writer.write_record(row.iter().map(|v| v.as_ref()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| StatsError::CsvParseError(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| StatsError::CsvParseError(e.to_string()))?;

        let (encoded, _, had_errors) = self.encoding.encode(&text);
        if had_errors {
            return Err(self.unencodable(&text));
        }
        Ok(encoded.into_owned())
    }

    // encoding_rs 会把无法编码的字符替换为 &#NNNN;，这里定位第一个
    fn unencodable(&self, text: &str) -> StatsError {
        let mut buf = [0u8; 4];
        let character = text
            .chars()
            .find(|c| self.encoding.encode(c.encode_utf8(&mut buf)).2)
            .map(String::from)
            .unwrap_or_default();
        StatsError::UnencodableCharacter {
            encoding: self.encoding.name().to_string(),
            character,
        }
    }

    /// 写出报表文件，返回数据行数
    pub fn write<P, H, R>(&self, path: P, header: &[H], rows: &[Vec<R>]) -> StatsResult<usize>
    where
        P: AsRef<Path>,
        H: AsRef<str>,
        R: AsRef<str>,
    {
        let path = path.as_ref();
        let bytes = self.render(header, rows)?;
        std::fs::write(path, bytes).map_err(|e| StatsError::ReportWriteError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        info!(
            "报表已写出: {} ({} 行, 编码 {})",
            path.display(),
            rows.len(),
            self.encoding.name()
        );
        Ok(rows.len())
    }
}
