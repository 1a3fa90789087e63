// ==========================================
// 仓储货位规划引擎 - 导入层错误
// ==========================================
// 文件级 / 表结构级错误整体失败；行级数据问题进入 DqReport,不走错误通道
// ==========================================

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("不支持的文件扩展名 '{0}'（目录/订单仅支持 .xlsx/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("读取文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 读取失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("工作簿读取失败: {0}")]
    Workbook(String),

    #[error("工作簿中找不到工作表 '{sheet}'（现有: {available}）")]
    SheetMissing { sheet: String, available: String },

    #[error("工作表 '{0}' 没有表头行")]
    EmptySheet(String),

    // ===== 表结构 =====
    #[error("{table} 表缺少必需列: {column}")]
    RequiredColumnMissing { table: String, column: String },

    #[error("第 {row} 行字段 {field} 无法转换为数值: {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    pub fn file_not_found(path: &Path) -> Self {
        ImportError::FileNotFound(path.display().to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::Workbook(err.to_string())
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
