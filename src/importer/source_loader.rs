// ==========================================
// 运营计划对账系统 - 输入加载器
// ==========================================
// 职责: 一次性读入五个表格资源（模板/预测/订单/出货/映射）
// 致命: 任一资源不可读；映射表缺失报 MappingSourceUnavailable
// ==========================================

use crate::config::run_config::RunConfig;
use crate::domain::record::InputResource;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FileParser, TableSource};
use crate::importer::raw_table::RawTable;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, instrument};

// ==========================================
// RunInputs - 单次运行的全部原始输入
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub template: RawTable,
    pub forecast: RawTable,
    pub order: RawTable,
    pub shipment: RawTable,
    pub mapping: RawTable,
}

// ==========================================
// RunPaths - 输入文件路径
// ==========================================
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub template: PathBuf,
    pub forecast: PathBuf,
    pub order: PathBuf,
    pub shipment: PathBuf,
    /// 映射表为外部提供，可能缺失
    pub mapping: Option<PathBuf>,
}

// ==========================================
// FileTableSource - 磁盘文件来源
// ==========================================
pub struct FileTableSource<'a> {
    paths: RunPaths,
    config: &'a RunConfig,
    parser: Box<dyn FileParser>,
}

impl<'a> FileTableSource<'a> {
    pub fn new(paths: RunPaths, config: &'a RunConfig) -> Self {
        Self {
            paths,
            config,
            parser: Box::new(UniversalFileParser),
        }
    }

    /// 替换文件解析器
    pub fn with_parser(mut self, parser: Box<dyn FileParser>) -> Self {
        self.parser = parser;
        self
    }
}

impl TableSource for FileTableSource<'_> {
    fn load(&self, resource: InputResource) -> ImportResult<RawTable> {
        let sheet = self.config.sheet_name(resource);

        let path = match resource {
            InputResource::Template => &self.paths.template,
            InputResource::Forecast => &self.paths.forecast,
            InputResource::Order => &self.paths.order,
            InputResource::Shipment => &self.paths.shipment,
            InputResource::Mapping => {
                let path = self.paths.mapping.as_ref().ok_or_else(|| {
                    ImportError::MappingSourceUnavailable("未提供映射表路径".to_string())
                })?;
                // 映射表读取失败统一归为 “映射表不可用”
                return self
                    .parser
                    .parse_table(path, sheet)
                    .map_err(|e| ImportError::MappingSourceUnavailable(format!("{}: {}", path.display(), e)));
            }
        };

        self.parser.parse_table(path, sheet)
    }
}

// ==========================================
// InMemoryTableSource - 内存表格来源
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableSource {
    tables: HashMap<InputResource, RawTable>,
}

impl InMemoryTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, resource: InputResource, table: RawTable) -> Self {
        self.tables.insert(resource, table);
        self
    }
}

impl TableSource for InMemoryTableSource {
    fn load(&self, resource: InputResource) -> ImportResult<RawTable> {
        match self.tables.get(&resource) {
            Some(table) => Ok(table.clone()),
            None if resource == InputResource::Mapping => Err(
                ImportError::MappingSourceUnavailable("内存来源未提供映射表".to_string()),
            ),
            None => Err(ImportError::FileNotFound(resource.to_string())),
        }
    }
}

// ==========================================
// SourceLoader - 输入加载器
// ==========================================
pub struct SourceLoader;

impl SourceLoader {
    /// 读入全部资源；映射表最先读取（缺失时不必解析其他文件）
    #[instrument(skip(self, source))]
    pub fn load(&self, source: &dyn TableSource) -> ImportResult<RunInputs> {
        let mapping = source.load(InputResource::Mapping)?;
        let template = source.load(InputResource::Template)?;
        let forecast = source.load(InputResource::Forecast)?;
        let order = source.load(InputResource::Order)?;
        let shipment = source.load(InputResource::Shipment)?;

        info!(
            template_rows = template.len(),
            forecast_rows = forecast.len(),
            order_rows = order.len(),
            shipment_rows = shipment.len(),
            mapping_rows = mapping.len(),
            "输入读取完成"
        );

        Ok(RunInputs {
            template,
            forecast,
            order,
            shipment,
            mapping,
        })
    }
}
