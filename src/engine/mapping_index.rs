// ==========================================
// 运营计划对账系统 - 映射索引
// ==========================================
// 输入: 新旧料号映射表条目
// 输出: 三个只读视图
//   - primary:       旧品名 → 新规范身份（改名链已展开）
//   - semi_finished: 半成品变体 → 归并后的规范身份
//   - substitute:    规范身份 → 替代候选（槽位 1..=4 顺序）
// 红线: 每次运行构建一次，构建后不可变
// ==========================================

use crate::domain::identity::{Identity, MappingEntry};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

// ==========================================
// MappingIndexStats - 构建统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingIndexStats {
    pub entries: usize,
    pub invalid_entries: usize,
    pub primary_keys: usize,
    pub semi_finished_keys: usize,
    pub substitute_keys: usize,
    pub cycles: usize,
}

// ==========================================
// MappingIndex - 映射索引
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct MappingIndex {
    primary: HashMap<String, Identity>,
    semi_finished: HashMap<String, Identity>,
    /// 规范品名 → 替代候选（按槽位顺序）
    substitutes: HashMap<String, Vec<Identity>>,
    /// 替代品名 → 规范身份（先比槽位，再比声明顺序，取第一个）
    substitute_lookup: HashMap<String, Identity>,
    stats: MappingIndexStats,
}

impl MappingIndex {
    /// 从映射条目构建索引
    ///
    /// # 规则
    /// 1. 违反不变量的条目（新品名为空且不是半成品反向记录）跳过并计数
    /// 2. 非半成品条目进入 primary；同一旧品名重复声明时第一条生效
    /// 3. 半成品条目进入 semi_finished；反向记录把旧品名登记为自身的规范身份
    /// 4. 非空替代槽位进入 substitute 视图
    /// 5. primary 的改名链展开为最终身份（A→B、B→C 得到 A→C），环路计数并截断
    #[instrument(skip(entries), fields(count = entries.len()))]
    pub fn build(entries: &[MappingEntry]) -> Self {
        let mut index = MappingIndex::default();
        index.stats.entries = entries.len();

        // (槽位, 声明顺序, 替代品名, 规范身份)
        let mut substitute_candidates: Vec<(usize, usize, String, Identity)> = Vec::new();

        for (order, entry) in entries.iter().enumerate() {
            if !entry.is_valid() {
                index.stats.invalid_entries += 1;
                warn!(
                    row = entry.row_number,
                    old = %entry.old_identity,
                    "映射条目新品名为空且不是半成品反向记录，跳过"
                );
                continue;
            }

            let canonical = match entry.canonical() {
                Some(c) => c.clone(),
                None => continue,
            };

            if entry.is_semi_finished {
                if !entry.old_identity.is_empty() {
                    index
                        .semi_finished
                        .entry(entry.old_identity.key().to_string())
                        .or_insert_with(|| canonical.clone());
                }
            } else if !entry.old_identity.is_empty()
                && entry.old_identity.key() != canonical.key()
            {
                let key = entry.old_identity.key().to_string();
                if let Some(existing) = index.primary.get(&key) {
                    if existing.key() != canonical.key() {
                        warn!(
                            row = entry.row_number,
                            old = %key,
                            kept = %existing.key(),
                            ignored = %canonical.key(),
                            "旧品名重复映射到不同新品名，保留第一条"
                        );
                    }
                } else {
                    index.primary.insert(key, canonical.clone());
                }
            }

            for (slot, substitute) in &entry.substitutes {
                index
                    .substitutes
                    .entry(canonical.key().to_string())
                    .or_default()
                    .push(substitute.clone());
                substitute_candidates.push((
                    *slot,
                    order,
                    substitute.key().to_string(),
                    canonical.clone(),
                ));
            }
        }

        index.collapse_primary_chains();

        // semi/substitute 的目标也按改名链落到最终身份
        let semi_targets: Vec<(String, Identity)> = index
            .semi_finished
            .iter()
            .map(|(k, v)| (k.clone(), index.follow_primary(v)))
            .collect();
        index.semi_finished = semi_targets.into_iter().collect();

        substitute_candidates.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        for (_, _, sub_key, canonical) in substitute_candidates {
            let target = index.follow_primary(&canonical);
            index.substitute_lookup.entry(sub_key).or_insert(target);
        }

        index.stats.primary_keys = index.primary.len();
        index.stats.semi_finished_keys = index.semi_finished.len();
        index.stats.substitute_keys = index.substitute_lookup.len();

        info!(
            primary = index.stats.primary_keys,
            semi_finished = index.stats.semi_finished_keys,
            substitute = index.stats.substitute_keys,
            invalid = index.stats.invalid_entries,
            cycles = index.stats.cycles,
            "映射索引构建完成"
        );

        index
    }

    /// 展开改名链；遇到环路时保留一跳映射
    fn collapse_primary_chains(&mut self) {
        let keys: Vec<String> = self.primary.keys().cloned().collect();
        let mut resolved: HashMap<String, Identity> = HashMap::with_capacity(keys.len());

        for key in keys {
            let mut visited: HashSet<String> = HashSet::new();
            visited.insert(key.clone());

            let first = match self.primary.get(&key) {
                Some(target) => target.clone(),
                None => continue,
            };
            let mut current = first.clone();
            let mut cyclic = false;

            while let Some(next) = self.primary.get(current.key()) {
                if !visited.insert(current.key().to_string()) || visited.contains(next.key()) {
                    cyclic = true;
                    break;
                }
                current = next.clone();
            }

            if cyclic {
                self.stats.cycles += 1;
                warn!(old = %key, "新旧料号映射存在环路，仅替换一跳");
                resolved.insert(key, first);
            } else {
                resolved.insert(key, current);
            }
        }

        self.primary = resolved;
    }

    /// 身份经 primary 视图后的最终身份（不在视图中则原样返回）
    fn follow_primary(&self, identity: &Identity) -> Identity {
        self.primary
            .get(identity.key())
            .cloned()
            .unwrap_or_else(|| identity.clone())
    }

    // ==========================================
    // 只读查询
    // ==========================================

    /// 旧品名 → 规范身份
    pub fn primary_lookup(&self, key: &str) -> Option<&Identity> {
        self.primary.get(key)
    }

    /// 半成品变体 → 归并身份（映射到自身时返回 None）
    pub fn semi_finished_lookup(&self, key: &str) -> Option<&Identity> {
        self.semi_finished.get(key).filter(|c| c.key() != key)
    }

    /// 是否登记为半成品（含反向记录）
    pub fn is_semi_finished(&self, key: &str) -> bool {
        self.semi_finished.contains_key(key)
    }

    /// 替代品名 → 规范身份（槽位顺序优先）
    pub fn substitute_lookup(&self, key: &str) -> Option<&Identity> {
        self.substitute_lookup.get(key).filter(|c| c.key() != key)
    }

    /// 规范品名的替代候选
    pub fn substitutes_of(&self, canonical_key: &str) -> &[Identity] {
        self.substitutes
            .get(canonical_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stats(&self) -> MappingIndexStats {
        self.stats
    }
}
