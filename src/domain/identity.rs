// ==========================================
// 运营计划对账系统 - 品名身份与映射条目
// ==========================================
// 身份比较: 去首尾空白后精确字符串比较，不做模糊匹配
// 匹配主键: 品名（晶圆品名/规格仅用于展示）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 替代料槽位数量（替代 1..=4）
pub const SUBSTITUTE_SLOTS: usize = 4;

// ==========================================
// Identity - 品名身份三元组
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub wafer_code: String, // 晶圆品名
    pub spec: String,       // 规格
    pub part_name: String,  // 品名（匹配主键）
}

impl Identity {
    /// 构造身份，三个字段均去首尾空白
    pub fn new(wafer_code: &str, spec: &str, part_name: &str) -> Self {
        Self {
            wafer_code: wafer_code.trim().to_string(),
            spec: spec.trim().to_string(),
            part_name: part_name.trim().to_string(),
        }
    }

    /// 仅有品名时的身份
    pub fn from_part_name(part_name: &str) -> Self {
        Self::new("", "", part_name)
    }

    /// 匹配键（品名）
    pub fn key(&self) -> &str {
        &self.part_name
    }

    /// 品名为空视为空身份
    pub fn is_empty(&self) -> bool {
        self.part_name.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.wafer_code, self.spec, self.part_name)
    }
}

// ==========================================
// MappingEntry - 新旧料号映射条目
// ==========================================
// 不变量:
// - new_identity 为空时，仅当 old_identity 非空且标记为半成品才有效（反向记录）
// - 替代槽位品名为空时不物化到 substitutes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub old_identity: Identity,
    pub new_identity: Identity,
    pub is_semi_finished: bool,
    /// (槽位号 1..=4, 替代身份)，按槽位升序
    pub substitutes: Vec<(usize, Identity)>,
    /// 源表行号（用于诊断）
    pub row_number: usize,
}

impl MappingEntry {
    /// 创建映射条目，丢弃空替代槽位
    pub fn new(
        old_identity: Identity,
        new_identity: Identity,
        is_semi_finished: bool,
        substitutes: Vec<Identity>,
        row_number: usize,
    ) -> Self {
        let substitutes = substitutes
            .into_iter()
            .take(SUBSTITUTE_SLOTS)
            .enumerate()
            .filter(|(_, identity)| !identity.is_empty())
            .map(|(idx, identity)| (idx + 1, identity))
            .collect();

        Self {
            old_identity,
            new_identity,
            is_semi_finished,
            substitutes,
            row_number,
        }
    }

    /// 反向记录：新品名为空、旧品名非空、半成品标记
    pub fn is_reverse_record(&self) -> bool {
        self.new_identity.is_empty() && !self.old_identity.is_empty() && self.is_semi_finished
    }

    /// 条目是否满足不变量
    pub fn is_valid(&self) -> bool {
        !self.new_identity.is_empty() || self.is_reverse_record()
    }

    /// 条目的规范身份：新品名优先，反向记录取旧品名
    pub fn canonical(&self) -> Option<&Identity> {
        if !self.new_identity.is_empty() {
            Some(&self.new_identity)
        } else if self.is_reverse_record() {
            Some(&self.old_identity)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_trims_fields() {
        let id = Identity::new("  W1 ", " S ", " ABC-1  ");
        assert_eq!(id.wafer_code, "W1");
        assert_eq!(id.spec, "S");
        assert_eq!(id.key(), "ABC-1");
    }

    #[test]
    fn test_identity_numeric_name_stays_string() {
        let id = Identity::from_part_name("00123");
        assert_eq!(id.key(), "00123");
    }

    #[test]
    fn test_mapping_entry_drops_empty_substitute_slots() {
        let entry = MappingEntry::new(
            Identity::from_part_name("OLD"),
            Identity::from_part_name("NEW"),
            false,
            vec![
                Identity::from_part_name(""),
                Identity::from_part_name("SUB2"),
                Identity::from_part_name("  "),
                Identity::from_part_name("SUB4"),
            ],
            2,
        );

        assert_eq!(entry.substitutes.len(), 2);
        assert_eq!(entry.substitutes[0].0, 2);
        assert_eq!(entry.substitutes[1].0, 4);
    }

    #[test]
    fn test_mapping_entry_validity() {
        let valid = MappingEntry::new(
            Identity::from_part_name("OLD"),
            Identity::from_part_name("NEW"),
            false,
            vec![],
            1,
        );
        assert!(valid.is_valid());

        let reverse = MappingEntry::new(
            Identity::from_part_name("SEMI"),
            Identity::default(),
            true,
            vec![],
            2,
        );
        assert!(reverse.is_reverse_record());
        assert!(reverse.is_valid());
        assert_eq!(reverse.canonical().unwrap().key(), "SEMI");

        let invalid = MappingEntry::new(
            Identity::from_part_name("OLD"),
            Identity::default(),
            false,
            vec![],
            3,
        );
        assert!(!invalid.is_valid());
        assert!(invalid.canonical().is_none());
    }
}
