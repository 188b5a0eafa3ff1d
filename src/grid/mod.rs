//! Feed-ledger grid codec
//!
//! Turns a period's feed amounts into a spreadsheet grid and back:
//! `layout` plans the rows, `builder` fills a `GridDocument`, `xlsx` moves it
//! in and out of workbook files and `parser` validates an edited document
//! and recovers its records.

pub mod builder;
pub mod coord;
pub mod document;
pub mod layout;
pub mod parser;
pub mod template;
pub mod xlsx;

pub use builder::{AmountMap, DocumentBuilder, LedgerMetadata};
pub use coord::GridCoordinate;
pub use document::{Cell, CellStyle, CellValue, GridDocument, MergeRegion};
pub use layout::{LayoutPlan, MonthBlock};
pub use parser::{DocumentParser, ParsedDocument};
pub use template::TemplateDescriptor;
