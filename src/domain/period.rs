// ==========================================
// 运营计划对账系统 - 期间（自然月）
// ==========================================
// 规范形式: YYYY-MM
// 用途: 主表列分组、聚合键
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Period - 自然月
// ==========================================
// 排序: 先年后月（派生 Ord 依赖字段顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// 创建期间，月份必须在 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 日期截断到自然月
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 下一个自然月（12 月滚动到次年 1 月）
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// 闭区间 [start, end] 内的全部自然月，按时间升序
    ///
    /// start > end 时返回空列表
    pub fn range_inclusive(start: Period, end: Period) -> Vec<Period> {
        let mut periods = Vec::new();
        let mut current = start;
        while current <= end {
            periods.push(current);
            current = current.succ();
        }
        periods
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("期间格式错误（期望 YYYY-MM）: {}", s))?;

        let year = year
            .parse::<i32>()
            .map_err(|_| format!("期间年份无效: {}", s))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| format!("期间月份无效: {}", s))?;

        Period::new(year, month).ok_or_else(|| format!("期间月份超出范围: {}", s))
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

// ==========================================
// ForecastCalendar - 预测月份列头 → 期间
// ==========================================
// 列头形如 “6月预测”：1~2 位整数 + 固定后缀
// 年份来自显式配置的参考年份，不从数据推断
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastCalendar {
    pub reference_year: i32,
    /// 月份 < rollover_month 的列归属 reference_year + 1
    pub rollover_month: Option<u32>,
    pub month_suffix: String,
}

impl ForecastCalendar {
    pub fn new(reference_year: i32, rollover_month: Option<u32>, month_suffix: &str) -> Self {
        Self {
            reference_year,
            rollover_month,
            month_suffix: month_suffix.to_string(),
        }
    }

    /// 解析列头中的月份（1..=12），不匹配返回 None
    ///
    /// 匹配从列头开头进行：“6月预测(调整)” 也视为 6 月
    pub fn parse_month_label(&self, header: &str) -> Option<u32> {
        let header = header.trim();
        let digits: String = header.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() || digits.len() > 2 {
            return None;
        }

        let rest = &header[digits.len()..];
        if !rest.starts_with(self.month_suffix.as_str()) {
            return None;
        }

        digits.parse::<u32>().ok().filter(|m| (1..=12).contains(m))
    }

    /// 月份 → 期间（按参考年份与跨年起始月）
    pub fn period_for_month(&self, month: u32) -> Option<Period> {
        let year = match self.rollover_month {
            Some(start) if month < start => self.reference_year + 1,
            _ => self.reference_year,
        };
        Period::new(year, month)
    }

    /// 列头 → 期间
    pub fn period_for_label(&self, header: &str) -> Option<Period> {
        self.parse_month_label(header)
            .and_then(|m| self.period_for_month(m))
    }
}
