//! Count and label formatting shared by seed labels and the presenter.

/// Formats a count with `,` thousands separators.
#[must_use]
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `"1 region"`, `"3 regions"`, `"1,200 simulated users"`.
#[must_use]
pub fn pluralize(count: u64, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{} {noun}{suffix}", format_count(count))
}

/// Tooltip text for a bar segment: `"<label> (<count>)"`.
#[must_use]
pub fn tooltip_with_count(label: &str, count: u64) -> String {
    format!("{label} ({})", format_count(count))
}
