// ==========================================
// 运营计划对账系统 - 对账编排器
// ==========================================
// 主流程:
//   结构校验 → 映射索引 → 身份解析（三源共享改写集合）
//   → 期间提取 → 聚合 → 主表构建 → 异常标记 → 诊断
// 单线程、同步、一次运行到底；运行之间不共享状态
// ==========================================

use crate::config::run_config::RunConfig;
use crate::domain::identity::Identity;
use crate::domain::master::{FlaggedCell, MasterTable};
use crate::domain::record::{SourceKind, SourceRecord};
use crate::domain::report::{Replacement, RunDiagnostics, SourceDiagnostics};
use crate::engine::aggregator::{SourceAggregate, SourceAggregator};
use crate::engine::discrepancy_flagger::DiscrepancyFlagger;
use crate::engine::error::ReconcileResult;
use crate::engine::mapping_index::MappingIndex;
use crate::engine::master_builder::MasterTableBuilder;
use crate::engine::period_extractor::PeriodExtractor;
use crate::engine::resolver::{IdentityResolver, ReplacementLog};
use crate::importer::field_mapper::{FieldMapper, MappedSource};
use crate::importer::importer_trait::TableSource;
use crate::importer::schema_validator::SchemaValidator;
use crate::importer::source_loader::{RunInputs, SourceLoader};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// ReconcileOutput - 对账结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ReconcileOutput {
    /// 稠密主表
    pub table: MasterTable,
    /// 有预测无订单的 (行, 期间)
    pub flagged: Vec<FlaggedCell>,
    /// 被改写过的原始品名（三源共享）
    pub replaced: BTreeSet<String>,
    /// 改写明细
    pub replacements: Vec<Replacement>,
    pub diagnostics: RunDiagnostics,
}

// ==========================================
// ReconcileOrchestrator - 对账编排器
// ==========================================
pub struct ReconcileOrchestrator {
    config: RunConfig,
}

impl ReconcileOrchestrator {
    /// # 参数
    /// - config: 运行配置快照
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// 从表格来源读取全部输入后执行对账
    pub fn run_from_source(&self, source: &dyn TableSource) -> ReconcileResult<ReconcileOutput> {
        let inputs = SourceLoader.load(source)?;
        self.run(&inputs)
    }

    /// 执行一次完整对账
    ///
    /// # 返回
    /// - Ok(ReconcileOutput): 主表、异常标记、改写集合与诊断
    /// - Err: 缺少必需列等致命错误
    #[instrument(skip(self, inputs), fields(run_id = tracing::field::Empty))]
    pub fn run(&self, inputs: &RunInputs) -> ReconcileResult<ReconcileOutput> {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!("对账开始");

        // ==========================================
        // 步骤 1: 结构校验（任一缺列即终止）
        // ==========================================
        let validator = SchemaValidator::new(&self.config);
        validator.validate_mapping(&inputs.mapping)?;
        validator.validate_template(&inputs.template)?;
        validator.validate_forecast(&inputs.forecast)?;
        validator.validate_order(&inputs.order)?;
        validator.validate_shipment(&inputs.shipment)?;
        debug!("结构校验通过");

        let mapper = FieldMapper::new(&self.config);

        // ==========================================
        // 步骤 2: 映射索引（本次运行内只读）
        // ==========================================
        let entries = mapper.map_mapping_entries(&inputs.mapping);
        let index = MappingIndex::build(&entries);
        let index_stats = index.stats();

        // ==========================================
        // 步骤 3: 字段映射 + 身份解析
        // ==========================================
        let base_identities = mapper.map_base_identities(&inputs.template);
        let universe: HashSet<String> = base_identities
            .iter()
            .filter(|id| !id.is_empty())
            .map(|id| id.key().to_string())
            .collect();

        let mapped = [
            (SourceKind::Forecast, mapper.map_forecast(&inputs.forecast)),
            (SourceKind::Order, mapper.map_order(&inputs.order)),
            (SourceKind::Shipment, mapper.map_shipment(&inputs.shipment)),
        ];

        let resolver = IdentityResolver::new(&index, universe, self.config.semi_finished_precedence);
        let mut log = ReplacementLog::default();
        let mut diagnostics = RunDiagnostics {
            run_id: run_id.clone(),
            mapping_entries: index_stats.entries,
            invalid_mapping_entries: index_stats.invalid_entries,
            mapping_cycles: index_stats.cycles,
            ..RunDiagnostics::default()
        };

        let mut resolved: Vec<(SourceKind, Vec<SourceRecord>)> = Vec::with_capacity(mapped.len());
        for (source, MappedSource { records, stats }) in mapped {
            let raw_quantity_total: f64 = records.iter().map(|r| r.quantity).sum();
            let output = resolver.resolve(source, records, &mut log);

            let diag = diagnostics.source_mut(source);
            diag.coercion = stats;
            diag.replaced_rows = output.replaced_rows;
            diag.raw_quantity_total = raw_quantity_total;

            resolved.push((source, output.records));
        }

        // ==========================================
        // 步骤 4: 期间提取
        // ==========================================
        let calendar = self.config.forecast_calendar();
        let periods = PeriodExtractor::new(&calendar).extract_periods(
            &inputs.forecast.headers,
            &Self::dates_of(&resolved, SourceKind::Order),
            &Self::dates_of(&resolved, SourceKind::Shipment),
        );

        // ==========================================
        // 步骤 5: 聚合（稀疏）
        // ==========================================
        let aggregates: Vec<SourceAggregate> = resolved
            .iter()
            .map(|(source, records)| SourceAggregator.aggregate_by_record_period(*source, records))
            .collect();

        // ==========================================
        // 步骤 6: 主表构建（稠密）
        // ==========================================
        let aggregate_refs: Vec<&SourceAggregate> = aggregates.iter().collect();
        let build = MasterTableBuilder.build(&base_identities, &aggregate_refs, &periods);

        // ==========================================
        // 步骤 7: 异常标记
        // ==========================================
        let flagged = DiscrepancyFlagger.flag(&build.table);

        // ==========================================
        // 步骤 8: 诊断汇总
        // ==========================================
        for aggregate in &aggregates {
            let diag: &mut SourceDiagnostics = diagnostics.source_mut(aggregate.source);
            diag.undated_records = aggregate.skipped_undated;
            diag.undated_quantity = aggregate.skipped_quantity;
            diag.aggregated_total = aggregate.total();
            if let Some(unmatched) = build.unmatched.get(&aggregate.source) {
                diag.unmatched = unmatched.clone();
            }
        }
        diagnostics.base_rows = build.table.rows.len();
        diagnostics.duplicate_base_rows = build.duplicate_base_rows;
        diagnostics.period_count = periods.len();
        diagnostics.flagged_cells = flagged.len();

        info!(
            rows = diagnostics.base_rows,
            periods = diagnostics.period_count,
            flagged = diagnostics.flagged_cells,
            replaced = log.replaced.len(),
            "对账完成"
        );

        Ok(ReconcileOutput {
            table: build.table,
            flagged,
            replaced: log.replaced,
            replacements: log.replacements.into_iter().collect(),
            diagnostics,
        })
    }

    fn dates_of(
        resolved: &[(SourceKind, Vec<SourceRecord>)],
        source: SourceKind,
    ) -> Vec<Option<NaiveDate>> {
        resolved
            .iter()
            .filter(|(kind, _)| *kind == source)
            .flat_map(|(_, records)| records.iter().map(|r| r.date))
            .collect()
    }
}

impl ReconcileOutput {
    /// 主表中某行的身份
    pub fn identity_of(&self, row_index: usize) -> Option<&Identity> {
        self.table.rows.get(row_index).map(|row| &row.identity)
    }

    /// 主表行是否涉及过改写（规范品名出现在改写日志的目标中）
    pub fn row_was_rewritten(&self, row_index: usize) -> bool {
        self.identity_of(row_index)
            .map(|id| self.replacements.iter().any(|r| r.canonical == id.key()))
            .unwrap_or(false)
    }
}
