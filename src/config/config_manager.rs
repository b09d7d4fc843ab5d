// ==========================================
// 运营计划对账系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、默认值回退
// 存储: 扁平键值 JSON 文件（{"key": "value", ...}）
// ==========================================

use crate::config::reconcile_config_trait::ReconcileConfigReader;
use crate::config::run_config::{
    DatedColumns, ForecastColumns, IdentityColumns, MappingColumns, SemiFinishedPrecedence,
};
use crate::domain::record::InputResource;
use crate::importer::error::{ImportError, ImportResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    /// 从 JSON 键值文件加载
    ///
    /// # 参数
    /// - path: 配置文件路径
    ///
    /// # 返回
    /// - Err(ConfigReadError): 文件不存在或不是 JSON 对象
    pub fn from_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// 从 JSON 字符串加载（值可以是字符串、数字或布尔）
    pub fn from_json_str(raw: &str) -> ImportResult<Self> {
        let parsed: Value = serde_json::from_str(raw)?;
        let object = parsed.as_object().ok_or_else(|| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: "配置文件顶层必须是 JSON 对象".to_string(),
        })?;

        let mut values = HashMap::new();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                other => other.to_string(),
            };
            values.insert(key.clone(), text);
        }

        Ok(Self { values })
    }

    /// 从键值对构造（测试与嵌入调用）
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 读取配置值（空白值视为未配置）
    fn get_config_value(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        let ordered: std::collections::BTreeMap<_, _> = self.values.iter().collect();
        Ok(serde_json::to_string(&ordered)?)
    }

    fn identity_columns(&self, prefix: &str, defaults: &IdentityColumns) -> IdentityColumns {
        IdentityColumns {
            wafer_code: self.get_config_or_default(
                &format!("{}.wafer_column", prefix),
                &defaults.wafer_code,
            ),
            spec: self.get_config_or_default(&format!("{}.spec_column", prefix), &defaults.spec),
            part_name: self
                .get_config_or_default(&format!("{}.part_name_column", prefix), &defaults.part_name),
        }
    }

    fn dated_columns(&self, prefix: &str, defaults: DatedColumns) -> DatedColumns {
        DatedColumns {
            identity: self
                .get_config_or_default(&format!("{}.identity_column", prefix), &defaults.identity),
            date: self.get_config_or_default(&format!("{}.date_column", prefix), &defaults.date),
            quantity: self
                .get_config_or_default(&format!("{}.quantity_column", prefix), &defaults.quantity),
        }
    }
}

// ==========================================
// ReconcileConfigReader Trait 实现
// ==========================================
impl ReconcileConfigReader for ConfigManager {
    // ===== 期间配置 =====

    fn get_forecast_reference_year(&self) -> ImportResult<i32> {
        let value = self.get_config_or_default(config_keys::FORECAST_REFERENCE_YEAR, "2025");
        value
            .parse::<i32>()
            .map_err(|_| ImportError::ConfigValueError {
                key: config_keys::FORECAST_REFERENCE_YEAR.to_string(),
                value: value.clone(),
                message: "参考年份必须是整数".to_string(),
            })
    }

    fn get_forecast_rollover_month(&self) -> ImportResult<Option<u32>> {
        let value = match self.get_config_value(config_keys::FORECAST_ROLLOVER_MONTH) {
            Some(v) => v,
            None => return Ok(None),
        };

        match value.parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => Ok(Some(m)),
            _ => Err(ImportError::ConfigValueError {
                key: config_keys::FORECAST_ROLLOVER_MONTH.to_string(),
                value,
                message: "跨年起始月必须在 1..=12".to_string(),
            }),
        }
    }

    // ===== 列名配置 =====

    fn get_forecast_columns(&self) -> ImportResult<ForecastColumns> {
        let defaults = ForecastColumns::default();
        Ok(ForecastColumns {
            identity: self.get_config_or_default(config_keys::FORECAST_IDENTITY_COLUMN, &defaults.identity),
            month_suffix: self
                .get_config_or_default(config_keys::FORECAST_MONTH_SUFFIX, &defaults.month_suffix),
        })
    }

    fn get_order_columns(&self) -> ImportResult<DatedColumns> {
        Ok(self.dated_columns("order", DatedColumns::default_order()))
    }

    fn get_shipment_columns(&self) -> ImportResult<DatedColumns> {
        Ok(self.dated_columns("shipment", DatedColumns::default_shipment()))
    }

    fn get_base_columns(&self) -> ImportResult<IdentityColumns> {
        Ok(self.identity_columns("template", &IdentityColumns::new("晶圆", "规格", "品名")))
    }

    fn get_mapping_columns(&self) -> ImportResult<MappingColumns> {
        let defaults = MappingColumns::default();
        let substitutes = defaults
            .substitutes
            .iter()
            .enumerate()
            .map(|(idx, cols)| self.identity_columns(&format!("mapping.substitute{}", idx + 1), cols))
            .collect();

        Ok(MappingColumns {
            old: self.identity_columns("mapping.old", &defaults.old),
            new: self.identity_columns("mapping.new", &defaults.new),
            semi_finished: self
                .get_config_or_default(config_keys::MAPPING_SEMI_FINISHED_COLUMN, &defaults.semi_finished),
            substitutes,
        })
    }

    fn get_sheet_name(&self, resource: InputResource) -> ImportResult<Option<String>> {
        Ok(self.get_config_value(&format!("{}.sheet_name", resource.key())))
    }

    // ===== 解析策略 =====

    fn get_semi_finished_precedence(&self) -> ImportResult<SemiFinishedPrecedence> {
        let value = self.get_config_or_default(
            config_keys::SEMI_FINISHED_PRECEDENCE,
            "before_substitute",
        );
        Ok(SemiFinishedPrecedence::parse(&value).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::SEMI_FINISHED_PRECEDENCE,
                raw_value = %value,
                "半成品归并顺序配置无法识别，使用 before_substitute"
            );
            SemiFinishedPrecedence::BeforeSubstitute
        }))
    }
}

// ==========================================
// 配置键常量
// ==========================================
// 列名键按 "{资源}.{字段}_column" 组织，例如 order.date_column、
// mapping.old.part_name_column、mapping.substitute2.spec_column
pub mod config_keys {
    // 期间
    pub const FORECAST_REFERENCE_YEAR: &str = "forecast.reference_year";
    pub const FORECAST_ROLLOVER_MONTH: &str = "forecast.rollover_month";
    pub const FORECAST_MONTH_SUFFIX: &str = "forecast.month_suffix";

    // 预测
    pub const FORECAST_IDENTITY_COLUMN: &str = "forecast.identity_column";

    // 映射
    pub const MAPPING_SEMI_FINISHED_COLUMN: &str = "mapping.semi_finished_column";
    pub const SEMI_FINISHED_PRECEDENCE: &str = "mapping.semi_finished_precedence";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::run_config::RunConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_empty() {
        let manager = ConfigManager::default();
        let config = RunConfig::from_reader(&manager).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_from_json_numbers_and_strings() {
        let manager = ConfigManager::from_json_str(
            r#"{"forecast.reference_year": 2026, "order.date_column": "下单日期", "forecast.rollover_month": "11"}"#,
        )
        .unwrap();

        assert_eq!(manager.get_forecast_reference_year().unwrap(), 2026);
        assert_eq!(manager.get_forecast_rollover_month().unwrap(), Some(11));
        assert_eq!(manager.get_order_columns().unwrap().date, "下单日期");
        assert_eq!(manager.get_order_columns().unwrap().identity, "品名");
    }

    #[test]
    fn test_config_snapshot_is_sorted_json() {
        let manager = ConfigManager::from_json_str(
            r#"{"order.date_column": "下单日期", "forecast.reference_year": 2026}"#,
        )
        .unwrap();

        let snapshot = manager.get_config_snapshot().unwrap();
        // 键按字典序输出，便于比对
        assert!(snapshot.find("forecast.reference_year") < snapshot.find("order.date_column"));
        let parsed: std::collections::BTreeMap<String, String> = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(parsed["forecast.reference_year"], "2026");
        assert_eq!(parsed["order.date_column"], "下单日期");

        assert_eq!(ConfigManager::default().get_config_snapshot().unwrap(), "{}");
    }

    #[test]
    fn test_invalid_reference_year_is_error() {
        let manager = ConfigManager::from_pairs([(config_keys::FORECAST_REFERENCE_YEAR, "twenty")]);
        assert!(matches!(
            manager.get_forecast_reference_year(),
            Err(ImportError::ConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_rollover_month_is_error() {
        let manager = ConfigManager::from_pairs([(config_keys::FORECAST_ROLLOVER_MONTH, "13")]);
        assert!(manager.get_forecast_rollover_month().is_err());
    }

    #[test]
    fn test_unknown_precedence_falls_back() {
        let manager = ConfigManager::from_pairs([(config_keys::SEMI_FINISHED_PRECEDENCE, "???")]);
        assert_eq!(
            manager.get_semi_finished_precedence().unwrap(),
            SemiFinishedPrecedence::BeforeSubstitute
        );
    }

    #[test]
    fn test_mapping_substitute_override() {
        let manager = ConfigManager::from_pairs([("mapping.substitute2.part_name_column", "替代料2")]);
        let columns = manager.get_mapping_columns().unwrap();
        assert_eq!(columns.substitutes[1].part_name, "替代料2");
        assert_eq!(columns.substitutes[0].part_name, "替代品名1");
    }

    #[test]
    fn test_sheet_name_lookup() {
        let manager = ConfigManager::from_pairs([("order.sheet_name", "Sheet")]);
        assert_eq!(
            manager.get_sheet_name(InputResource::Order).unwrap(),
            Some("Sheet".to_string())
        );
        assert_eq!(manager.get_sheet_name(InputResource::Forecast).unwrap(), None);
    }

    #[test]
    fn test_from_file_missing() {
        let result = ConfigManager::from_file("does_not_exist.json");
        assert!(matches!(result, Err(ImportError::ConfigReadError { .. })));
    }

    #[test]
    fn test_from_file_non_object() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[1, 2, 3]").unwrap();
        assert!(ConfigManager::from_file(temp_file.path()).is_err());
    }
}
