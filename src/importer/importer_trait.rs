// ==========================================
// 运营计划对账系统 - 导入层 Trait
// ==========================================
// 职责: 定义文件解析与表格来源接口（不包含实现）
// ==========================================

use crate::domain::record::InputResource;
use crate::importer::error::ImportResult;
use crate::importer::raw_table::RawTable;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表格
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - sheet_name: 工作表名（仅 Excel 有效，None = 第一个工作表）
    ///
    /// # 返回
    /// - Ok(RawTable): 表头 + 非空白行
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_table(&self, file_path: &Path, sheet_name: Option<&str>) -> ImportResult<RawTable>;
}

// ==========================================
// TableSource Trait
// ==========================================
// 用途: 按资源类别提供原始表格
// 实现者: FileTableSource（磁盘文件）, InMemoryTableSource（嵌入调用/测试）
pub trait TableSource {
    /// 加载指定资源
    ///
    /// # 返回
    /// - Err(MappingSourceUnavailable): 映射表缺失或不可读
    /// - Err(FileNotFound 等): 其他资源缺失或不可读
    fn load(&self, resource: InputResource) -> ImportResult<RawTable>;
}
