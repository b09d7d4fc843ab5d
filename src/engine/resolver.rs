// ==========================================
// 运营计划对账系统 - 身份解析器
// ==========================================
// 职责: 把数据源记录的原始品名改写为规范品名
// 顺序:
//   1. primary: 新旧料号替换（所有记录）
//   2. semi_finished: 半成品归并（所有记录）
//   3. substitute: 替代料（仅限不在基础身份集合中的孤儿品名）
//   2/3 的先后由 SemiFinishedPrecedence 决定
// 红线: 不修改映射索引；无法解析的品名原样保留，不报错
// ==========================================

use crate::config::run_config::SemiFinishedPrecedence;
use crate::domain::identity::Identity;
use crate::domain::record::{SourceKind, SourceRecord};
use crate::domain::report::{Replacement, ReplacementKind};
use crate::engine::mapping_index::MappingIndex;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, instrument};

/// 单条品名的改写上限（防止病态映射表导致长链）
const MAX_RESOLVE_ROUNDS: usize = 8;

// ==========================================
// ReplacementLog - 一次运行共享的改写记录
// ==========================================
// 预测/订单/出货共享同一个集合，供展示层高亮
#[derive(Debug, Clone, Default)]
pub struct ReplacementLog {
    pub replaced: BTreeSet<String>,
    pub replacements: BTreeSet<Replacement>,
}

impl ReplacementLog {
    pub fn record(&mut self, source: SourceKind, original: &str, resolution: &Resolution) {
        self.replaced.insert(original.to_string());
        self.replacements.insert(Replacement {
            source,
            original: original.to_string(),
            canonical: resolution.canonical.key().to_string(),
            kind: resolution.kind,
        });
    }
}

/// 单个品名的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub canonical: Identity,
    /// 第一次改写所走的视图
    pub kind: ReplacementKind,
}

/// 单个数据源的解析产物
#[derive(Debug, Clone, Default)]
pub struct ResolvedSource {
    pub records: Vec<SourceRecord>,
    pub replaced_rows: usize,
}

// ==========================================
// IdentityResolver
// ==========================================
pub struct IdentityResolver<'a> {
    index: &'a MappingIndex,
    /// 基础身份集合（主计划模板中的品名）
    universe: HashSet<String>,
    precedence: SemiFinishedPrecedence,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(
        index: &'a MappingIndex,
        universe: HashSet<String>,
        precedence: SemiFinishedPrecedence,
    ) -> Self {
        Self {
            index,
            universe,
            precedence,
        }
    }

    fn is_orphan(&self, key: &str) -> bool {
        !self.universe.contains(key)
    }

    fn substitute_step(&self, key: &str) -> Option<&Identity> {
        if self.is_orphan(key) {
            self.index.substitute_lookup(key)
        } else {
            None
        }
    }

    /// 按配置顺序执行一轮 primary → (semi, substitute)
    fn resolve_round(&self, key: &str) -> Option<(Identity, ReplacementKind)> {
        let mut current: Option<(Identity, ReplacementKind)> = self
            .index
            .primary_lookup(key)
            .map(|id| (id.clone(), ReplacementKind::Primary));

        let passes = match self.precedence {
            SemiFinishedPrecedence::BeforeSubstitute => {
                [ReplacementKind::SemiFinished, ReplacementKind::Substitute]
            }
            SemiFinishedPrecedence::AfterSubstitute => {
                [ReplacementKind::Substitute, ReplacementKind::SemiFinished]
            }
        };

        for pass in passes {
            let current_key = current
                .as_ref()
                .map(|(id, _)| id.key().to_string())
                .unwrap_or_else(|| key.to_string());

            let hit = match pass {
                ReplacementKind::SemiFinished => self.index.semi_finished_lookup(&current_key),
                ReplacementKind::Substitute => self.substitute_step(&current_key),
                ReplacementKind::Primary => None,
            };

            if let Some(target) = hit {
                let kind = current.as_ref().map(|(_, k)| *k).unwrap_or(pass);
                current = Some((target.clone(), kind));
            }
        }

        current
    }

    /// 解析单个品名；未改写返回 None
    ///
    /// 重复执行直到不动点，保证对规范品名再次解析不变。
    /// 改写路径进入环路（或超出轮数上限）时没有不动点，品名保持原样
    pub fn resolve_identity(&self, raw: &str) -> Option<Resolution> {
        if raw.is_empty() {
            return None;
        }

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(raw.to_string());

        let mut result: Option<Resolution> = None;
        let mut key = raw.to_string();

        for _ in 0..MAX_RESOLVE_ROUNDS {
            let Some((target, kind)) = self.resolve_round(&key) else {
                return result;
            };
            if target.key() == key {
                return result;
            }
            if !visited.insert(target.key().to_string()) {
                debug!(identity = %raw, via = %target.key(), "品名改写存在环路，保持原样");
                return None;
            }

            key = target.key().to_string();
            result = Some(Resolution {
                kind: result.as_ref().map(|r| r.kind).unwrap_or(kind),
                canonical: target,
            });
        }

        debug!(identity = %raw, rounds = MAX_RESOLVE_ROUNDS, "品名改写未收敛，保持原样");
        None
    }

    /// 解析一个数据源的全部记录
    ///
    /// # 参数
    /// - `source`: 数据源类别（写入改写日志）
    /// - `records`: 字段映射后的记录
    /// - `log`: 一次运行共享的改写日志
    ///
    /// # 返回
    /// 改写后的记录；被改写的记录数
    #[instrument(skip(self, records, log), fields(source = %source, records = records.len()))]
    pub fn resolve(
        &self,
        source: SourceKind,
        records: Vec<SourceRecord>,
        log: &mut ReplacementLog,
    ) -> ResolvedSource {
        let mut resolved = ResolvedSource {
            records: Vec::with_capacity(records.len()),
            replaced_rows: 0,
        };

        for mut record in records {
            if let Some(resolution) = self.resolve_identity(&record.identity) {
                debug!(
                    row = record.row_number,
                    original = %record.identity,
                    canonical = %resolution.canonical.key(),
                    kind = ?resolution.kind,
                    "品名改写"
                );
                log.record(source, &record.identity, &resolution);
                record.identity = resolution.canonical.key().to_string();
                resolved.replaced_rows += 1;
            }
            resolved.records.push(record);
        }

        info!(replaced_rows = resolved.replaced_rows, "身份解析完成");
        resolved
    }
}
