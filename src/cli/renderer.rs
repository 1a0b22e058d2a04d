use colored::{control, Colorize};

use crate::core::formatter::format_body;
use crate::core::models::report::Report;

const SEPARATOR: &str = "------------------------------------------------------";

/// Render one report block for the console.
///
/// Layout:
/// ```text
/// ------------------------------------------------------
/// 12/01～12/27のクレジット適用後費用は、50.00 USD です。
/// - Amazon EC2: 30.00 USD
/// - Amazon S3: 20.00 USD
/// ------------------------------------------------------
///
/// ```
pub fn render_report(report: &Report, use_color: bool) -> String {
    control::set_override(use_color);

    let title = if report.include_credit {
        report.title.bold().green()
    } else {
        report.title.bold()
    };

    format!(
        "{SEPARATOR}\n{title}\n{}\n{SEPARATOR}\n",
        format_body(&report.lines)
    )
}
