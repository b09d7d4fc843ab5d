// ==========================================
// 运营计划对账系统 - 数据清洗器实现
// ==========================================
// 职责: 身份 TRIM / 数量强制转换 / 宽松日期解析 / 标记位标准化
// 原则: 单元格级问题一律不报错，转换结果带上“是否强制”标记
// ==========================================

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// 数量解析结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoercedQuantity {
    pub value: f64,
    /// 非空但无法解析（如 "N/A"），已强制为 0
    pub coerced: bool,
}

/// 宽松日期格式（按顺序尝试）
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%Y年%m月%d日",
];

/// Excel 序列号可接受的年份区间，区间外的纯数字视为无法解析
const SERIAL_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1950..=2100;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

pub struct DataCleaner;

impl DataCleaner {
    /// 身份清洗：TRIM，空值为空字符串
    pub fn clean_identity(&self, value: &str) -> String {
        value.trim().to_string()
    }

    /// 数量强制转换
    ///
    /// - 空白 → 0（不计为强制）
    /// - 千分位 “1,200” → 1200
    /// - 无法解析 / NaN / 无穷 → 0（计为强制）
    pub fn coerce_quantity(&self, value: &str) -> CoercedQuantity {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return CoercedQuantity {
                value: 0.0,
                coerced: false,
            };
        }

        let normalized: String = trimmed
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        match normalized.parse::<f64>() {
            Ok(v) if v.is_finite() => CoercedQuantity {
                value: v,
                coerced: false,
            },
            _ => CoercedQuantity {
                value: 0.0,
                coerced: true,
            },
        }
    }

    /// 宽松日期解析，无法解析返回 None
    ///
    /// 支持: YYYY-MM-DD / YYYY/MM/DD / YYYY.MM.DD / YYYYMMDD / YYYY年M月D日，
    /// 带时间的形式，以及 Excel 序列号（如 45672）
    pub fn parse_date_lenient(&self, value: &str) -> Option<NaiveDate> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Some(date);
            }
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Some(dt.date());
            }
        }

        // RFC 3339（带时区）
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
            return Some(dt.date_naive());
        }

        // Excel 序列号（8 位数字已按 YYYYMMDD 尝试过）
        // "3" / "2025" / "202501" 这类数字换算出的年份落在区间外，按无法解析处理
        let serial = trimmed.parse::<f64>().ok()?;
        let date = excel_serial_to_datetime(serial)?.date();
        if SERIAL_YEAR_RANGE.contains(&date.year()) {
            Some(date)
        } else {
            None
        }
    }

    /// 标记位标准化（半成品等）
    ///
    /// 空白 / 0 / N / 否 / FALSE → false，其他非空值 → true
    pub fn normalize_flag(&self, value: &str) -> bool {
        let upper = value.trim().to_uppercase();
        !matches!(upper.as_str(), "" | "0" | "N" | "NO" | "否" | "FALSE")
    }
}

/// Excel 序列号 → 日期时间（1900 日期系统，基准 1899-12-30）
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    // 上限 2958465 = 9999-12-31
    if !serial.is_finite() || !(0.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    base.checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clean_identity() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_identity("  ABC-1 "), "ABC-1");
        assert_eq!(cleaner.clean_identity("   "), "");
    }

    #[test]
    fn test_coerce_quantity_valid() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.coerce_quantity("100").value, 100.0);
        assert_eq!(cleaner.coerce_quantity(" 2.5 ").value, 2.5);
        assert_eq!(cleaner.coerce_quantity("1,200").value, 1200.0);
        assert!(!cleaner.coerce_quantity("-3").coerced);
    }

    #[test]
    fn test_coerce_quantity_invalid_is_zero() {
        let cleaner = DataCleaner;
        let q = cleaner.coerce_quantity("N/A");
        assert_eq!(q.value, 0.0);
        assert!(q.coerced);

        let q = cleaner.coerce_quantity("NaN");
        assert_eq!(q.value, 0.0);
        assert!(q.coerced);
    }

    #[test]
    fn test_coerce_quantity_blank_not_counted() {
        let cleaner = DataCleaner;
        let q = cleaner.coerce_quantity("");
        assert_eq!(q.value, 0.0);
        assert!(!q.coerced);
    }

    #[test]
    fn test_parse_date_lenient_formats() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_date_lenient("2025-01-15"), Some(ymd(2025, 1, 15)));
        assert_eq!(cleaner.parse_date_lenient("2025/3/2"), Some(ymd(2025, 3, 2)));
        assert_eq!(cleaner.parse_date_lenient("20250120"), Some(ymd(2025, 1, 20)));
        assert_eq!(cleaner.parse_date_lenient("2025年4月1日"), Some(ymd(2025, 4, 1)));
        assert_eq!(
            cleaner.parse_date_lenient("2025-06-30 13:45:00"),
            Some(ymd(2025, 6, 30))
        );
        assert_eq!(
            cleaner.parse_date_lenient("2025-06-30T13:45:00"),
            Some(ymd(2025, 6, 30))
        );
    }

    #[test]
    fn test_parse_date_lenient_excel_serial() {
        let cleaner = DataCleaner;
        // 45658 = 2025-01-01
        assert_eq!(cleaner.parse_date_lenient("45658"), Some(ymd(2025, 1, 1)));
    }

    #[test]
    fn test_parse_date_lenient_rejects_implausible_serial() {
        let cleaner = DataCleaner;
        // 1900-01-02 / 1905-07-17 / 2454 年：均不是有效业务日期
        assert_eq!(cleaner.parse_date_lenient("3"), None);
        assert_eq!(cleaner.parse_date_lenient("2025"), None);
        assert_eq!(cleaner.parse_date_lenient("202501"), None);
        // 区间边界：18264 = 1950-01-01，73415 = 2100-12-31
        assert_eq!(cleaner.parse_date_lenient("18264"), Some(ymd(1950, 1, 1)));
        assert_eq!(cleaner.parse_date_lenient("18263"), None);
        assert_eq!(cleaner.parse_date_lenient("73415"), Some(ymd(2100, 12, 31)));
        assert_eq!(cleaner.parse_date_lenient("73416"), None);
        assert_eq!(cleaner.parse_date_lenient("1e20"), None);
    }

    #[test]
    fn test_parse_date_lenient_garbage() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_date_lenient("not a date"), None);
        assert_eq!(cleaner.parse_date_lenient(""), None);
        assert_eq!(cleaner.parse_date_lenient("2025-13-01"), None);
    }

    #[test]
    fn test_normalize_flag() {
        let cleaner = DataCleaner;
        assert!(cleaner.normalize_flag("Y"));
        assert!(cleaner.normalize_flag("是"));
        assert!(cleaner.normalize_flag("半成品"));
        assert!(!cleaner.normalize_flag(""));
        assert!(!cleaner.normalize_flag("否"));
        assert!(!cleaner.normalize_flag("0"));
    }

    #[test]
    fn test_excel_serial_with_time() {
        let dt = excel_serial_to_datetime(45658.5).unwrap();
        assert_eq!(dt.date(), ymd(2025, 1, 1));
        assert_eq!(dt.format("%H:%M").to_string(), "12:00");
    }
}
