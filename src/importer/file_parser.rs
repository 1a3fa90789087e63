// ==========================================
// 仓储货位规划引擎 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls/.ods，按名称选工作表) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始数据行
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub row_number: usize, // 文件行号（表头为第 1 行）
    pub values: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// 原始表：表头 + 非空数据行
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// 由 (行号, 单元格) 序列构造,跳过完全空白的行
    fn from_rows<I>(headers: Vec<String>, data_rows: I) -> Self
    where
        I: IntoIterator<Item = (usize, Vec<String>)>,
    {
        let mut rows = Vec::new();
        for (row_number, cells) in data_rows {
            let mut values = HashMap::new();
            for (col_idx, value) in cells.into_iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if !header.is_empty() {
                        values.insert(header.clone(), value.trim().to_string());
                    }
                }
            }

            if values.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow { row_number, values });
        }
        Self { headers, rows }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::file_not_found(path));
    }
    Ok(())
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_table(&self, file_path: &Path, _sheet: Option<&str>) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !ext.is_empty() && ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut data_rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record.position().map_or(idx + 2, |p| p.line() as usize);
            data_rows.push((row_number, record.iter().map(str::to_string).collect::<Vec<_>>()));
        }

        Ok(RawTable::from_rows(headers, data_rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    const EXTENSIONS: [&'static str; 4] = ["xlsx", "xlsm", "xls", "ods"];

    pub fn is_workbook(path: &Path) -> bool {
        Self::EXTENSIONS.contains(&extension_of(path).as_str())
    }
}

impl FileParser for ExcelParser {
    fn parse_table(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        if !Self::is_workbook(file_path) {
            return Err(ImportError::UnsupportedFormat(extension_of(file_path)));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(ImportError::Workbook("工作簿中没有任何工作表".to_string()));
        }

        // 工作表名称忽略大小写与首尾空白；未指定时取第一个
        let sheet_name = match sheet {
            Some(wanted) => sheet_names
                .iter()
                .find(|name| name.trim().eq_ignore_ascii_case(wanted.trim()))
                .cloned()
                .ok_or_else(|| ImportError::SheetMissing {
                    sheet: wanted.to_string(),
                    available: sheet_names.join(", "),
                })?,
            None => sheet_names[0].clone(),
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::EmptySheet(sheet_name.clone()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let data_rows = rows
            .enumerate()
            .map(|(idx, row)| (idx + 2, row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>()));
        Ok(RawTable::from_rows(headers, data_rows))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_table(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<RawTable> {
        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => CsvParser.parse_table(file_path, sheet),
            _ if ExcelParser::is_workbook(file_path) => ExcelParser.parse_table(file_path, sheet),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
