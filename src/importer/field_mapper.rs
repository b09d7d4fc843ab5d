// ==========================================
// 运营计划对账系统 - 字段映射器实现
// ==========================================
// 职责: 原始行 → 领域结构 + 类型转换
// 输出: 基础身份列表 / 映射条目 / 预测记录 / 订单与出货记录
// 原则: 单元格级问题只计数（CoercionStats），不丢行、不报错
// ==========================================

use crate::config::run_config::{DatedColumns, IdentityColumns, RunConfig};
use crate::domain::identity::{Identity, MappingEntry};
use crate::domain::period::Period;
use crate::domain::record::{SourceKind, SourceRecord};
use crate::domain::report::CoercionStats;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::raw_table::{RawRow, RawTable};
use tracing::{debug, warn};

/// 字段映射产物
#[derive(Debug, Clone, Default)]
pub struct MappedSource {
    pub records: Vec<SourceRecord>,
    pub stats: CoercionStats,
}

pub struct FieldMapper<'a> {
    config: &'a RunConfig,
    cleaner: DataCleaner,
}

impl<'a> FieldMapper<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            cleaner: DataCleaner,
        }
    }

    fn identity_from_row(&self, row: &RawRow, cols: &IdentityColumns) -> Identity {
        Identity::new(
            row.get(&cols.wafer_code),
            row.get(&cols.spec),
            row.get(&cols.part_name),
        )
    }

    // ==========================================
    // 主计划模板
    // ==========================================

    /// 基础身份列表（保持模板顺序，保留重复行，去重由主表构建负责）
    pub fn map_base_identities(&self, table: &RawTable) -> Vec<Identity> {
        let cols = &self.config.base_columns;
        let identities: Vec<Identity> = table
            .rows
            .iter()
            .map(|row| self.identity_from_row(row, cols))
            .collect();
        debug!(rows = identities.len(), "基础身份映射完成");
        identities
    }

    // ==========================================
    // 新旧料号映射表
    // ==========================================

    /// 映射条目（不做有效性过滤，由映射索引统计无效条目）
    pub fn map_mapping_entries(&self, table: &RawTable) -> Vec<MappingEntry> {
        let cols = &self.config.mapping_columns;
        table
            .rows
            .iter()
            .map(|row| {
                let substitutes = cols
                    .substitutes
                    .iter()
                    .map(|sub_cols| self.identity_from_row(row, sub_cols))
                    .collect();

                MappingEntry::new(
                    self.identity_from_row(row, &cols.old),
                    self.identity_from_row(row, &cols.new),
                    self.cleaner.normalize_flag(row.get(&cols.semi_finished)),
                    substitutes,
                    row.row_number,
                )
            })
            .collect()
    }

    // ==========================================
    // 预测数据（宽表：生产料号 + N月预测）
    // ==========================================

    /// 预测月份列：(列名, 期间)，按列顺序
    ///
    /// 同一期间匹配到多个列时（如 "6月预测" 与 "6月预测(调整)"），
    /// 只保留最后一个，避免同月重复计数
    pub fn forecast_month_columns(&self, table: &RawTable) -> Vec<(String, Period)> {
        let calendar = self.config.forecast_calendar();
        let mut columns: Vec<(String, Period)> = Vec::new();

        for header in &table.headers {
            let Some(period) = calendar.period_for_label(header) else {
                continue;
            };
            match columns.iter_mut().find(|(_, p)| *p == period) {
                Some(existing) => {
                    warn!(
                        table = %table.name,
                        period = %period,
                        dropped = %existing.0,
                        kept = %header,
                        "预测月份列重复，保留后出现的列"
                    );
                    existing.0 = header.clone();
                }
                None => columns.push((header.clone(), period)),
            }
        }

        columns
    }

    /// 预测记录：每行 × 每个月份列一条；空白单元格不产生记录
    pub fn map_forecast(&self, table: &RawTable) -> MappedSource {
        let identity_col = &self.config.forecast_columns.identity;
        let month_columns = self.forecast_month_columns(table);
        let mut mapped = MappedSource::default();

        if month_columns.is_empty() {
            warn!(table = %table.name, "预测数据未找到月份列");
        }

        for row in &table.rows {
            mapped.stats.rows += 1;
            let identity = self.cleaner.clean_identity(row.get(identity_col));
            if identity.is_empty() {
                mapped.stats.identities_empty += 1;
            }

            for (column, period) in &month_columns {
                let raw = row.get(column);
                if raw.trim().is_empty() {
                    continue;
                }

                let quantity = self.cleaner.coerce_quantity(raw);
                if quantity.coerced {
                    mapped.stats.quantities_coerced += 1;
                    debug!(row = row.row_number, column = %column, value = %raw, "预测数量无法解析，按 0 计");
                }

                mapped.records.push(SourceRecord::forecast(
                    identity.clone(),
                    *period,
                    quantity.value,
                    row.row_number,
                ));
            }
        }

        mapped.stats.records = mapped.records.len();
        mapped
    }

    // ==========================================
    // 未交订单 / 出货明细（长表：品名 + 日期 + 数量）
    // ==========================================

    pub fn map_order(&self, table: &RawTable) -> MappedSource {
        self.map_dated(table, SourceKind::Order, &self.config.order_columns)
    }

    pub fn map_shipment(&self, table: &RawTable) -> MappedSource {
        self.map_dated(table, SourceKind::Shipment, &self.config.shipment_columns)
    }

    /// 每行一条记录；日期无法解析时 date = None（行保留，不参与按月聚合）
    fn map_dated(&self, table: &RawTable, source: SourceKind, cols: &DatedColumns) -> MappedSource {
        let mut mapped = MappedSource::default();

        for row in &table.rows {
            mapped.stats.rows += 1;

            let identity = self.cleaner.clean_identity(row.get(&cols.identity));
            if identity.is_empty() {
                mapped.stats.identities_empty += 1;
            }

            let raw_date = row.get(&cols.date);
            let date = self.cleaner.parse_date_lenient(raw_date);
            if date.is_none() {
                mapped.stats.dates_unparseable += 1;
                debug!(source = %source, row = row.row_number, value = %raw_date, "日期无法解析");
            }

            let raw_quantity = row.get(&cols.quantity);
            let quantity = self.cleaner.coerce_quantity(raw_quantity);
            if quantity.coerced {
                mapped.stats.quantities_coerced += 1;
                debug!(source = %source, row = row.row_number, value = %raw_quantity, "数量无法解析，按 0 计");
            }

            mapped.records.push(SourceRecord::dated(
                source,
                identity,
                date,
                quantity.value,
                row.row_number,
            ));
        }

        mapped.stats.records = mapped.records.len();
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_map_forecast_expands_month_columns() {
        let config = RunConfig::default();
        let mapper = FieldMapper::new(&config);
        let table = RawTable::from_rows(
            "forecast",
            s(&["生产料号", "备注", "3月预测", "4月预测"]),
            vec![s(&["ABC-1", "x", "100", ""]), s(&["DEF-2", "", "N/A", "5"])],
        );

        let mapped = mapper.map_forecast(&table);

        assert_eq!(mapped.records.len(), 3);
        assert_eq!(mapped.records[0].identity, "ABC-1");
        assert_eq!(mapped.records[0].period(), Some(Period::new(2025, 3).unwrap()));
        assert_eq!(mapped.records[0].quantity, 100.0);
        // "N/A" 强制为 0，但记录保留
        assert_eq!(mapped.records[1].quantity, 0.0);
        assert_eq!(mapped.stats.quantities_coerced, 1);
        assert_eq!(mapped.stats.rows, 2);
    }

    #[test]
    fn test_duplicate_month_columns_keep_last() {
        let config = RunConfig::default();
        let mapper = FieldMapper::new(&config);
        let table = RawTable::from_rows(
            "forecast",
            s(&["生产料号", "6月预测", "7月预测", "6月预测(调整)"]),
            vec![s(&["A", "100", "8", "120"])],
        );

        let columns = mapper.forecast_month_columns(&table);
        let june = Period::new(2025, 6).unwrap();
        // 6 月只保留调整列，位置沿用首次出现处
        assert_eq!(
            columns,
            vec![
                ("6月预测(调整)".to_string(), june),
                ("7月预测".to_string(), Period::new(2025, 7).unwrap()),
            ]
        );

        let mapped = mapper.map_forecast(&table);
        let june_total: f64 = mapped
            .records
            .iter()
            .filter(|r| r.period() == Some(june))
            .map(|r| r.quantity)
            .sum();
        assert_eq!(mapped.records.len(), 2);
        assert_eq!(june_total, 120.0);
    }

    #[test]
    fn test_map_order_keeps_rows_with_bad_cells() {
        let config = RunConfig::default();
        let mapper = FieldMapper::new(&config);
        let table = RawTable::from_rows(
            "order",
            s(&["品名", "订单日期", "未交订单数量"]),
            vec![
                s(&["XYZ-9", "2025-01-15", "10"]),
                s(&["XYZ-9", "不是日期", "20"]),
                s(&["", "2025-03-02", "abc"]),
            ],
        );

        let mapped = mapper.map_order(&table);

        assert_eq!(mapped.records.len(), 3);
        assert_eq!(mapped.records[0].date, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(mapped.records[1].date, None);
        assert_eq!(mapped.records[2].identity, "");
        assert_eq!(mapped.records[2].quantity, 0.0);
        assert_eq!(mapped.stats.dates_unparseable, 1);
        assert_eq!(mapped.stats.identities_empty, 1);
        assert_eq!(mapped.stats.quantities_coerced, 1);
    }

    #[test]
    fn test_map_mapping_entries() {
        let config = RunConfig::default();
        let mapper = FieldMapper::new(&config);
        let table = RawTable::from_rows(
            "mapping",
            s(&[
                "旧晶圆品名", "旧规格", "旧品名", "新晶圆品名", "新规格", "新品名", "半成品",
                "替代晶圆1", "替代规格1", "替代品名1", "替代晶圆2", "替代规格2", "替代品名2",
            ]),
            vec![s(&["W", "S", "ABC-1", "W", "S", "XYZ-9", "", "", "", "", "W", "S", "SUB-2"])],
        );

        let entries = mapper.map_mapping_entries(&table);

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.old_identity.key(), "ABC-1");
        assert_eq!(entry.new_identity.key(), "XYZ-9");
        assert!(!entry.is_semi_finished);
        assert_eq!(entry.substitutes, vec![(2, Identity::new("W", "S", "SUB-2"))]);
    }

    #[test]
    fn test_map_base_identities_preserves_order() {
        let config = RunConfig::default();
        let mapper = FieldMapper::new(&config);
        let table = RawTable::from_rows(
            "template",
            s(&["晶圆", "规格", "品名"]),
            vec![s(&["W2", "S2", "B"]), s(&["W1", "S1", "A"])],
        );

        let identities = mapper.map_base_identities(&table);
        assert_eq!(identities[0].key(), "B");
        assert_eq!(identities[1].key(), "A");
    }
}
