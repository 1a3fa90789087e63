// ==========================================
// 仓储货位规划引擎 - 导入层
// ==========================================
// 职责: 外部目录 / 订单数据导入,生成引擎输入
// 支持: Excel (.xlsx/.xls/.ods), CSV
// ==========================================

// 模块声明
pub mod catalog_importer;
pub mod derivation;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;

// 重导出核心类型
pub use catalog_importer::{CatalogImporter, ImportedDataset};
pub use derivation::DerivationService as DerivationServiceImpl;
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{CatalogColumns, FieldMapper as FieldMapperImpl, OrderColumns};
pub use file_parser::{CsvParser, ExcelParser, RawRow, RawTable, UniversalFileParser};

// 重导出 Trait 接口
pub use importer_trait::{DerivationService, DqValidator, FieldMapper, FileParser};
