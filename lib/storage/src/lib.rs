pub mod layout;
pub mod report;

pub use layout::EvalLayout;
pub use report::{render_csv, write_report, ReportRow, RunSummary};
