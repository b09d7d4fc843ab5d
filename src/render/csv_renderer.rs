// ==========================================
// 运营计划对账系统 - CSV 输出
// ==========================================
// 主表: 晶圆品名,规格,品名,{period}-forecast,{period}-order,{period}-shipment,...
// 异常清单: row,品名,period（row 为主表数据行序号，从 1 开始）
// ==========================================

use crate::domain::master::{FlaggedCell, MasterTable};
use crate::engine::error::{ReconcileError, ReconcileResult};
use crate::render::TableRenderer;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// 异常清单列名
pub const FLAG_COLUMNS: [&str; 3] = ["row", "品名", "period"];

pub struct CsvRenderer<W: Write> {
    table_writer: csv::Writer<W>,
    flag_writer: Option<csv::Writer<W>>,
}

impl<W: Write> CsvRenderer<W> {
    /// 只输出主表
    pub fn new(table_out: W) -> Self {
        Self {
            table_writer: csv::Writer::from_writer(table_out),
            flag_writer: None,
        }
    }

    /// 同时输出异常清单
    pub fn with_flags(table_out: W, flags_out: W) -> Self {
        Self {
            table_writer: csv::Writer::from_writer(table_out),
            flag_writer: Some(csv::Writer::from_writer(flags_out)),
        }
    }

    /// 取回底层输出（测试读取内存缓冲用）
    pub fn into_inner(self) -> ReconcileResult<(W, Option<W>)> {
        let table = self
            .table_writer
            .into_inner()
            .map_err(|e| ReconcileError::Render(e.error().to_string()))?;
        let flags = match self.flag_writer {
            Some(writer) => Some(
                writer
                    .into_inner()
                    .map_err(|e| ReconcileError::Render(e.error().to_string()))?,
            ),
            None => None,
        };
        Ok((table, flags))
    }

    fn write_table(&mut self, table: &MasterTable) -> ReconcileResult<()> {
        self.table_writer.write_record(table.column_names())?;

        for row in &table.rows {
            let mut record: Vec<String> = vec![
                row.identity.wafer_code.clone(),
                row.identity.spec.clone(),
                row.identity.part_name.clone(),
            ];
            for cells in &row.cells {
                record.push(format_quantity(cells.forecast));
                record.push(format_quantity(cells.order));
                record.push(format_quantity(cells.shipment));
            }
            self.table_writer.write_record(&record)?;
        }

        self.table_writer.flush()?;
        Ok(())
    }

    fn write_flags(&mut self, table: &MasterTable, flagged: &[FlaggedCell]) -> ReconcileResult<()> {
        let Some(writer) = self.flag_writer.as_mut() else {
            return Ok(());
        };

        writer.write_record(FLAG_COLUMNS)?;
        for cell in flagged {
            let part_name = table
                .rows
                .get(cell.row_index)
                .map(|row| row.identity.part_name.as_str())
                .unwrap_or("");
            writer.write_record([
                (cell.row_index + 1).to_string(),
                part_name.to_string(),
                cell.period.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl CsvRenderer<File> {
    /// 输出到文件；异常清单写到同目录 `<stem>_flags.csv`
    pub fn to_paths(table_path: &Path) -> ReconcileResult<Self> {
        let flags_path = flags_path_for(table_path);
        Ok(Self::with_flags(File::create(table_path)?, File::create(flags_path)?))
    }
}

impl<W: Write> TableRenderer for CsvRenderer<W> {
    fn render(&mut self, table: &MasterTable, flagged: &[FlaggedCell]) -> ReconcileResult<()> {
        self.write_table(table)?;
        self.write_flags(table, flagged)?;
        info!(rows = table.rows.len(), flagged = flagged.len(), "CSV 输出完成");
        Ok(())
    }
}

/// 异常清单路径：`out.csv` → `out_flags.csv`
pub fn flags_path_for(table_path: &Path) -> PathBuf {
    let stem = table_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    table_path.with_file_name(format!("{}_flags.csv", stem))
}

/// 整数不带小数点；其余保留原精度
fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Identity;
    use crate::domain::master::{MasterRow, PeriodCells};
    use crate::domain::period::Period;

    fn table() -> MasterTable {
        let march = Period::new(2025, 3).unwrap();
        MasterTable {
            periods: vec![march],
            rows: vec![MasterRow {
                identity: Identity::new("W9", "S9", "XYZ-9"),
                cells: vec![PeriodCells {
                    forecast: 100.0,
                    order: 0.0,
                    shipment: 2.5,
                }],
            }],
        }
    }

    #[test]
    fn test_render_table_and_flags() {
        let table = table();
        let flagged = vec![FlaggedCell {
            row_index: 0,
            period: table.periods[0],
        }];

        let mut renderer = CsvRenderer::with_flags(Vec::new(), Vec::new());
        renderer.render(&table, &flagged).unwrap();
        let (table_out, flags_out) = renderer.into_inner().unwrap();

        let table_text = String::from_utf8(table_out).unwrap();
        let mut lines = table_text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "晶圆品名,规格,品名,2025-03-forecast,2025-03-order,2025-03-shipment"
        );
        assert_eq!(lines.next().unwrap(), "W9,S9,XYZ-9,100,0,2.5");

        let flags_text = String::from_utf8(flags_out.unwrap()).unwrap();
        assert_eq!(flags_text, "row,品名,period\n1,XYZ-9,2025-03\n");
    }

    #[test]
    fn test_flags_path() {
        assert_eq!(
            flags_path_for(Path::new("/tmp/out/result.csv")),
            PathBuf::from("/tmp/out/result_flags.csv")
        );
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(-0.0), "0");
        assert_eq!(format_quantity(1.25), "1.25");
    }
}
