// ==========================================
// 运营计划对账系统 - 主表构建
// ==========================================
// 输入: 基础身份列表（模板顺序）+ 三个数据源聚合 + 连续期间
// 输出: 稠密主表（每个基础身份一行，每期间三列，缺失为 0）
// 红线: 不做任何身份解析；聚合已基于规范品名
// ==========================================

use crate::domain::identity::Identity;
use crate::domain::master::{MasterRow, MasterTable};
use crate::domain::period::Period;
use crate::domain::record::SourceKind;
use crate::domain::report::UnmatchedSummary;
use crate::engine::aggregator::SourceAggregate;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

// ==========================================
// MasterBuildResult - 构建产物
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct MasterBuildResult {
    pub table: MasterTable,
    /// 三元组完全相同的重复模板行（保留第一行）
    pub duplicate_base_rows: usize,
    /// 每个数据源中没有基础行承接的聚合量
    pub unmatched: BTreeMap<SourceKind, UnmatchedSummary>,
}

pub struct MasterTableBuilder;

impl MasterTableBuilder {
    /// 构建稠密主表
    ///
    /// # 规则
    /// - 模板行按三元组去重，保持模板顺序
    /// - 匹配键为品名；空品名的模板行保留但不匹配任何聚合
    /// - 每个 (行, 期间, 数据源) 都有显式数值，未命中为 0
    #[instrument(skip_all, fields(base = base_identities.len(), periods = periods.len()))]
    pub fn build(
        &self,
        base_identities: &[Identity],
        aggregates: &[&SourceAggregate],
        periods: &[Period],
    ) -> MasterBuildResult {
        let mut result = MasterBuildResult::default();

        // 1. 去重（完整三元组）
        let mut seen: HashSet<&Identity> = HashSet::new();
        let mut base: Vec<&Identity> = Vec::with_capacity(base_identities.len());
        for identity in base_identities {
            if seen.insert(identity) {
                base.push(identity);
            } else {
                result.duplicate_base_rows += 1;
                debug!(identity = %identity, "模板重复行已忽略");
            }
        }

        let period_positions: HashMap<Period, usize> = periods
            .iter()
            .enumerate()
            .map(|(i, p)| (*p, i))
            .collect();

        // 2. 行骨架（全零）
        let mut rows: Vec<MasterRow> = base
            .iter()
            .map(|identity| MasterRow::zeroed((*identity).clone(), periods.len()))
            .collect();

        // 品名 → 行下标（同名不同三元组的行共享同一聚合值）
        let mut rows_by_key: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, identity) in base.iter().enumerate() {
            if !identity.is_empty() {
                rows_by_key.entry(identity.key()).or_default().push(i);
            }
        }

        // 3. 填充聚合值；无基础行的聚合量计入 unmatched
        for aggregate in aggregates {
            let unmatched = result.unmatched.entry(aggregate.source).or_default();

            for ((identity, period), quantity) in &aggregate.cells {
                let (Some(targets), Some(&col)) =
                    (rows_by_key.get(identity.as_str()), period_positions.get(period))
                else {
                    unmatched.add(identity, *quantity);
                    continue;
                };

                for &row in targets {
                    rows[row].cells[col].set(aggregate.source, *quantity);
                }
            }

            if unmatched.identity_count() > 0 {
                warn!(
                    source = %aggregate.source,
                    identities = unmatched.identity_count(),
                    quantity = unmatched.total_quantity,
                    "部分品名在主计划模板中不存在，数量未计入主表"
                );
            }
        }

        if result.duplicate_base_rows > 0 {
            warn!(duplicates = result.duplicate_base_rows, "主计划模板存在重复行");
        }

        result.table = MasterTable {
            periods: periods.to_vec(),
            rows,
        };

        info!(
            rows = result.table.rows.len(),
            columns = result.table.column_names().len(),
            "主表构建完成"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn aggregate(source: SourceKind, cells: &[(&str, &str, f64)]) -> SourceAggregate {
        let mut agg = SourceAggregate::new(source);
        for (identity, period, qty) in cells {
            agg.cells.insert((identity.to_string(), p(period)), *qty);
        }
        agg
    }

    #[test]
    fn test_dense_fill_with_zero() {
        let base = vec![Identity::new("W", "S", "A"), Identity::new("W", "S", "B")];
        let periods = vec![p("2025-01"), p("2025-02"), p("2025-03")];
        let forecast = aggregate(SourceKind::Forecast, &[("A", "2025-02", 100.0)]);
        let order = aggregate(SourceKind::Order, &[("B", "2025-03", 7.0)]);
        let shipment = aggregate(SourceKind::Shipment, &[]);

        let result = MasterTableBuilder.build(&base, &[&forecast, &order, &shipment], &periods);
        let table = &result.table;

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, &p("2025-02"), SourceKind::Forecast), Some(100.0));
        assert_eq!(table.cell(1, &p("2025-03"), SourceKind::Order), Some(7.0));
        for (row, _) in table.rows.iter().enumerate() {
            for period in &periods {
                for source in SourceKind::ALL {
                    assert!(table.cell(row, period, source).is_some());
                }
            }
        }
        assert_eq!(table.cell(0, &p("2025-01"), SourceKind::Shipment), Some(0.0));
    }

    #[test]
    fn test_template_order_and_dedup() {
        let base = vec![
            Identity::new("W2", "S2", "B"),
            Identity::new("W1", "S1", "A"),
            Identity::new("W2", "S2", "B"),
        ];

        let result = MasterTableBuilder.build(&base, &[], &[p("2025-01")]);

        assert_eq!(result.duplicate_base_rows, 1);
        let names: Vec<&str> = result.table.rows.iter().map(|r| r.identity.key()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_unmatched_reported() {
        let base = vec![Identity::from_part_name("A")];
        let order = aggregate(
            SourceKind::Order,
            &[("A", "2025-01", 1.0), ("GHOST", "2025-01", 5.0), ("", "2025-01", 2.0)],
        );

        let result = MasterTableBuilder.build(&base, &[&order], &[p("2025-01")]);
        let unmatched = &result.unmatched[&SourceKind::Order];

        assert_eq!(unmatched.identity_count(), 2);
        assert_eq!(unmatched.total_quantity, 7.0);
        assert_eq!(result.table.source_total(SourceKind::Order) + unmatched.total_quantity, 8.0);
    }

    #[test]
    fn test_empty_base_name_never_matches() {
        let base = vec![Identity::new("W", "S", "")];
        let order = aggregate(SourceKind::Order, &[("", "2025-01", 2.0)]);

        let result = MasterTableBuilder.build(&base, &[&order], &[p("2025-01")]);

        assert_eq!(result.table.cell(0, &p("2025-01"), SourceKind::Order), Some(0.0));
        assert_eq!(result.unmatched[&SourceKind::Order].total_quantity, 2.0);
    }

    #[test]
    fn test_no_periods_yields_identity_only_table() {
        let base = vec![Identity::from_part_name("A")];
        let result = MasterTableBuilder.build(&base, &[], &[]);
        assert_eq!(result.table.column_names().len(), 3);
        assert!(result.table.rows[0].cells.is_empty());
    }
}
