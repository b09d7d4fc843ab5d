// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 构建五个输入表格（内存 RawTable / 临时 CSV 文件）
// ==========================================

#![allow(dead_code)]

use operation_planning::importer::{RawTable, RunInputs, RunPaths};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEMPLATE_HEADERS: [&str; 3] = ["晶圆", "规格", "品名"];
pub const ORDER_HEADERS: [&str; 3] = ["品名", "订单日期", "未交订单数量"];
pub const SHIPMENT_HEADERS: [&str; 3] = ["品名", "交易日期", "数量"];
pub const MAPPING_HEADERS: [&str; 19] = [
    "旧晶圆品名", "旧规格", "旧品名", "新晶圆品名", "新规格", "新品名", "半成品",
    "替代晶圆1", "替代规格1", "替代品名1",
    "替代晶圆2", "替代规格2", "替代品名2",
    "替代晶圆3", "替代规格3", "替代品名3",
    "替代晶圆4", "替代规格4", "替代品名4",
];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ==========================================
// ScenarioBuilder - 对账场景构建器
// ==========================================

pub struct ScenarioBuilder {
    template: Vec<Vec<String>>,
    forecast_months: Vec<u32>,
    forecast: Vec<Vec<String>>,
    order: Vec<Vec<String>>,
    shipment: Vec<Vec<String>>,
    mapping: Vec<Vec<String>>,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self {
            template: Vec::new(),
            forecast_months: Vec::new(),
            forecast: Vec::new(),
            order: Vec::new(),
            shipment: Vec::new(),
            mapping: Vec::new(),
        }
    }

    /// 模板行（晶圆/规格/品名）
    pub fn base(mut self, wafer: &str, spec: &str, part: &str) -> Self {
        self.template.push(strings(&[wafer, spec, part]));
        self
    }

    /// 预测月份列（“N月预测”）
    pub fn forecast_months(mut self, months: &[u32]) -> Self {
        self.forecast_months = months.to_vec();
        self
    }

    /// 预测行：生产料号 + 每个月份列的数量（与 forecast_months 对齐）
    pub fn forecast(mut self, part: &str, quantities: &[&str]) -> Self {
        let mut row = vec![part.to_string()];
        row.extend(strings(quantities));
        self.forecast.push(row);
        self
    }

    pub fn order(mut self, part: &str, date: &str, quantity: &str) -> Self {
        self.order.push(strings(&[part, date, quantity]));
        self
    }

    pub fn shipment(mut self, part: &str, date: &str, quantity: &str) -> Self {
        self.shipment.push(strings(&[part, date, quantity]));
        self
    }

    /// 新旧料号替换（只填品名）
    pub fn rename(self, old: &str, new: &str) -> Self {
        self.mapping_row(old, new, false, &[])
    }

    /// 完整映射行；substitutes 为 (槽位 1..=4, 替代品名)
    pub fn mapping_row(mut self, old: &str, new: &str, semi: bool, substitutes: &[(usize, &str)]) -> Self {
        let mut row = vec![String::new(); MAPPING_HEADERS.len()];
        row[2] = old.to_string();
        row[5] = new.to_string();
        row[6] = if semi { "是".to_string() } else { String::new() };
        for (slot, part) in substitutes {
            row[7 + (slot - 1) * 3 + 2] = part.to_string();
        }
        self.mapping.push(row);
        self
    }

    fn forecast_headers(&self) -> Vec<String> {
        let mut headers = vec!["生产料号".to_string()];
        headers.extend(self.forecast_months.iter().map(|m| format!("{}月预测", m)));
        headers
    }

    /// 内存输入
    pub fn inputs(&self) -> RunInputs {
        RunInputs {
            template: RawTable::from_rows("template", strings(&TEMPLATE_HEADERS), self.template.clone()),
            forecast: RawTable::from_rows("forecast", self.forecast_headers(), self.forecast.clone()),
            order: RawTable::from_rows("order", strings(&ORDER_HEADERS), self.order.clone()),
            shipment: RawTable::from_rows("shipment", strings(&SHIPMENT_HEADERS), self.shipment.clone()),
            mapping: RawTable::from_rows("mapping", strings(&MAPPING_HEADERS), self.mapping.clone()),
        }
    }

    /// 写出为临时目录下的 CSV 文件
    ///
    /// # 返回
    /// - TempDir: 临时目录（需要保持存活）
    /// - RunPaths: 五个输入文件路径
    pub fn write_csv(&self) -> Result<(TempDir, RunPaths), Box<dyn Error>> {
        let dir = TempDir::new()?;

        let template = write_csv_file(dir.path(), "template.csv", &strings(&TEMPLATE_HEADERS), &self.template)?;
        let forecast = write_csv_file(dir.path(), "forecast.csv", &self.forecast_headers(), &self.forecast)?;
        let order = write_csv_file(dir.path(), "order.csv", &strings(&ORDER_HEADERS), &self.order)?;
        let shipment = write_csv_file(dir.path(), "shipment.csv", &strings(&SHIPMENT_HEADERS), &self.shipment)?;
        let mapping = write_csv_file(dir.path(), "mapping.csv", &strings(&MAPPING_HEADERS), &self.mapping)?;

        Ok((
            dir,
            RunPaths {
                template,
                forecast,
                order,
                shipment,
                mapping: Some(mapping),
            },
        ))
    }
}

/// 写一个 CSV 文件
pub fn write_csv_file(
    dir: &Path,
    name: &str,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(path)
}

/// 读取 CSV 文本
pub fn read_text(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
