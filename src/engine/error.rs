// ==========================================
// 运营计划对账系统 - 对账流程错误类型
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

/// 对账流程错误类型
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// 输入读取/结构校验/配置错误
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("结果写出失败: {0}")]
    Render(String),
}

impl From<csv::Error> for ReconcileError {
    fn from(err: csv::Error) -> Self {
        ReconcileError::Render(err.to_string())
    }
}

impl From<std::io::Error> for ReconcileError {
    fn from(err: std::io::Error) -> Self {
        ReconcileError::Render(err.to_string())
    }
}

/// Result 类型别名
pub type ReconcileResult<T> = Result<T, ReconcileError>;
