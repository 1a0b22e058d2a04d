use tracing::debug;

use crate::core::models::report::{Report, ServiceCost};

/// Amounts below this are not worth a line.
pub const MIN_REPORTED_BILLING: f64 = 0.01;

/// Shown in place of the breakdown when no service survives filtering.
pub const NO_DATA_MESSAGE: &str = "サービスごとの費用データはありません。";

/// Returns "- {service}: {billing:.2} USD" for every entry at or above one
/// cent, in input order. Zero, negative and sub-cent entries are dropped.
pub fn format_lines(costs: &[ServiceCost]) -> Vec<String> {
    costs
        .iter()
        .filter_map(|cost| {
            if cost.billing >= MIN_REPORTED_BILLING {
                Some(format!("- {}: {:.2} USD", cost.service_name, cost.billing))
            } else {
                debug!(
                    service = %cost.service_name,
                    billing = %format!("{:.5}", cost.billing),
                    "Excluded negligible cost"
                );
                None
            }
        })
        .collect()
}

/// Returns the report title, e.g. "12/01～12/27のクレジット適用後費用は、50.00 USD です。".
pub fn format_title(include_credit: bool, total: f64, start_label: &str, end_label: &str) -> String {
    let credit_text = if include_credit { "後" } else { "前" };
    format!("{start_label}～{end_label}のクレジット適用{credit_text}費用は、{total:.2} USD です。")
}

pub fn build_report(
    include_credit: bool,
    total: f64,
    costs: &[ServiceCost],
    start_label: &str,
    end_label: &str,
) -> Report {
    Report {
        title: format_title(include_credit, total, start_label, end_label),
        lines: format_lines(costs),
        total,
        include_credit,
    }
}

/// Breakdown text: one line per service, or [`NO_DATA_MESSAGE`].
pub fn format_body(lines: &[String]) -> String {
    if lines.is_empty() {
        NO_DATA_MESSAGE.to_string()
    } else {
        lines.join("\n")
    }
}
