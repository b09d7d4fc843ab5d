// ==========================================
// 运营计划对账系统 - 导入层
// ==========================================
// 职责: 外部表格读取、结构校验、字段映射与清洗
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod raw_table;
pub mod schema_validator;
pub mod source_loader;

// 重导出核心类型
pub use data_cleaner::{CoercedQuantity, DataCleaner};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, MappedSource};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use raw_table::{RawRow, RawTable};
pub use schema_validator::SchemaValidator;
pub use source_loader::{FileTableSource, InMemoryTableSource, RunInputs, RunPaths, SourceLoader};

// 重导出 Trait 接口
pub use importer_trait::{FileParser, TableSource};
