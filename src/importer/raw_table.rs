// ==========================================
// 运营计划对账系统 - 原始表格
// ==========================================
// 用途: 文件解析产物（表头 + 行记录），字段映射前的统一形态
// ==========================================

use std::collections::HashMap;

/// 原始数据行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// 源表行号（表头为第 1 行）
    pub row_number: usize,
    /// 列名 → 单元格文本（已去首尾空白）
    pub values: HashMap<String, String>,
}

impl RawRow {
    /// 读取单元格，缺列视为空字符串
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

/// 原始表格
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// 从表头与行值（按列顺序）构造，完全空白的行跳过
    pub fn from_rows(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self::new(name, headers);
        for (idx, cells) in rows.into_iter().enumerate() {
            table.push_row(idx + 2, cells);
        }
        table
    }

    /// 追加一行；同名列只取第一次出现
    pub fn push_row(&mut self, row_number: usize, cells: Vec<String>) {
        let mut values = HashMap::new();
        for (col_idx, value) in cells.into_iter().enumerate() {
            if let Some(header) = self.headers.get(col_idx) {
                if header.is_empty() {
                    continue;
                }
                values
                    .entry(header.clone())
                    .or_insert_with(|| value.trim().to_string());
            }
        }

        // 跳过完全空白的行
        if values.values().all(|v| v.is_empty()) {
            return;
        }

        self.rows.push(RawRow { row_number, values });
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_from_rows_skips_blank_and_trims() {
        let table = RawTable::from_rows(
            "order",
            s(&["品名", "数量"]),
            vec![s(&[" A ", "1"]), s(&["", "  "]), s(&["B", "2"])],
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("品名"), "A");
        assert_eq!(table.rows[1].row_number, 4);
    }

    #[test]
    fn test_duplicate_header_keeps_first() {
        let table = RawTable::from_rows("t", s(&["品名", "品名"]), vec![s(&["first", "second"])]);
        assert_eq!(table.rows[0].get("品名"), "first");
    }

    #[test]
    fn test_missing_cell_reads_empty() {
        let table = RawTable::from_rows("t", s(&["品名", "数量"]), vec![s(&["A"])]);
        assert_eq!(table.rows[0].get("数量"), "");
        assert!(table.has_column("数量"));
        assert!(!table.has_column("日期"));
    }
}
