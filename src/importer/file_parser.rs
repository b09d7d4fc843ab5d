// ==========================================
// 运营计划对账系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 约定: 单元格一律转为文本；整数值浮点不带 “.0”（料号不能变成数字）
// ==========================================

use crate::importer::data_cleaner::excel_serial_to_datetime;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use crate::importer::raw_table::RawTable;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_table(&self, file_path: &Path, _sheet_name: Option<&str>) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        // 打开 CSV 文件
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头（去除 UTF-8 BOM）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut table = RawTable::new(table_name(path), headers);

        // 读取所有行（表头为第 1 行）
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells = record.iter().map(|v| v.to_string()).collect();
            table.push_row(row_idx + 2, cells);
        }

        Ok(table)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_table(&self, file_path: &Path, sheet_name: Option<&str>) -> ImportResult<RawTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 打开 Excel 文件（xlsx/xls 自动识别）
        let mut workbook = open_workbook_auto(path)?;

        let target = select_sheet(&workbook.sheet_names(), sheet_name, path)?;
        let range = workbook.worksheet_range(&target)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
        let mut table = RawTable::new(table_name(path), headers);

        // 读取数据行
        for (row_idx, data_row) in rows.enumerate() {
            let cells = data_row.iter().map(cell_to_string).collect();
            table.push_row(row_idx + 2, cells);
        }

        Ok(table)
    }
}

/// 选择工作表：指定名称优先（必须存在），否则第一个
fn select_sheet(sheet_names: &[String], requested: Option<&str>, path: &Path) -> ImportResult<String> {
    match requested {
        Some(name) if sheet_names.iter().any(|s| s == name) => Ok(name.to_string()),
        Some(name) => Err(ImportError::SheetNotFound {
            file: path.display().to_string(),
            sheet: name.to_string(),
        }),
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string())),
    }
}

/// 单元格转文本
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    }
}

/// 整数值浮点去掉小数部分（12345.0 → "12345"）
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_table(&self, file_path: &Path, sheet_name: Option<&str>) -> ImportResult<RawTable> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_table(file_path, sheet_name),
            "xlsx" | "xls" => ExcelParser.parse_table(file_path, sheet_name),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
