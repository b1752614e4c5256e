use crate::delta::{DeltaResult, NOT_APPLICABLE, ReleaseDelta};

/// Renders `value` with comma grouping, e.g. `1234567` as `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// `"<emoji> <label>  >>  <current>"`, followed by ` (+<pct>%)` only when the
/// count actually grew.
pub fn format_count_message(emoji: &str, label: &str, delta: &DeltaResult) -> String {
    let mut message = format!("{emoji} {label}  >>  {}", group_thousands(delta.current));
    if delta.percent_change.is_applicable() && delta.increase > 0 {
        message.push_str(&format!(" (+{}%)", delta.percent_change));
    }
    message
}

pub fn format_release_message(emoji: &str, label: &str, delta: &ReleaseDelta) -> String {
    let tag = if delta.current.is_empty() {
        NOT_APPLICABLE
    } else {
        delta.current.as_str()
    };
    format!("{emoji} {label}  >>  {tag}")
}

pub fn format_new_release(tag: &str) -> String {
    format!("🚀 New Release: Version **{tag}** is now available on GitHub!")
}

pub fn format_milestone(label: &str, threshold: u64) -> String {
    format!(
        "🎉 Milestone Reached! {label} has hit {}!",
        group_thousands(threshold)
    )
}

pub fn error_placeholder(label: &str) -> String {
    format!("❌ Error fetching {label}.")
}
