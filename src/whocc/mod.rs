// WHO CC 力價表：擷取、資料修正、torg 匯出與 ace 名稱修正

pub mod ace_fix;
pub mod data_fix;
pub mod extractor;
pub mod table_dir;
pub mod torg;

pub use ace_fix::AceDataFixer;
pub use data_fix::{DataFix, NoDataFix, RuleDataFix};
pub use extractor::{JsonTableExtractor, TableExtractor};
pub use table_dir::TableDir;
pub use torg::TorgInfo;
