// ==========================================
// 运营计划对账系统 - 期间提取
// ==========================================
// 来源:
// - 预测: “N月预测” 列头 + 参考年份
// - 订单/出货: 日期截断到自然月（无法解析的日期已为 None，直接忽略）
// 输出: 全局最小到最大期间的连续闭区间（中间无数据的月份也保留）
// ==========================================

use crate::domain::period::{ForecastCalendar, Period};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, info};

pub struct PeriodExtractor<'a> {
    calendar: &'a ForecastCalendar,
}

impl<'a> PeriodExtractor<'a> {
    pub fn new(calendar: &'a ForecastCalendar) -> Self {
        Self { calendar }
    }

    /// 提取连续期间序列
    ///
    /// # 参数
    /// - `forecast_columns`: 预测表全部列头（非月份列自动忽略）
    /// - `order_dates`: 订单日期（None 表示无法解析）
    /// - `sales_dates`: 出货日期
    ///
    /// # 返回
    /// 按时间升序的连续期间；任何来源都没有期间时为空
    pub fn extract_periods(
        &self,
        forecast_columns: &[String],
        order_dates: &[Option<NaiveDate>],
        sales_dates: &[Option<NaiveDate>],
    ) -> Vec<Period> {
        let mut observed: BTreeSet<Period> = forecast_columns
            .iter()
            .filter_map(|header| self.calendar.period_for_label(header))
            .collect();
        let forecast_count = observed.len();

        observed.extend(
            order_dates
                .iter()
                .chain(sales_dates.iter())
                .flatten()
                .map(|date| Period::from_date(*date)),
        );

        debug!(
            forecast_periods = forecast_count,
            observed = observed.len(),
            "期间去重完成"
        );

        let (Some(first), Some(last)) = (observed.first().copied(), observed.last().copied())
        else {
            info!("未发现任何期间，输出空期间序列");
            return Vec::new();
        };

        let periods = Period::range_inclusive(first, last);
        info!(
            start = %first,
            end = %last,
            count = periods.len(),
            "期间区间确定"
        );
        periods
    }
}
