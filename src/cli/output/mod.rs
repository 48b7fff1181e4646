pub mod csv;

use ansi_term::Style;

use crate::report::score::{efficiency_grade, EfficiencyGrade};

/// Compact duration used across all views. Days with nothing tracked render
/// as "0m", same as the dashboard's empty state.
pub fn format_seconds(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = seconds % 3600 / 60;
    let rest = seconds % 60;
    if hours > 0 {
        format!("{hours}h{minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else if rest > 0 {
        format!("{rest}s")
    } else {
        "0m".to_string()
    }
}

/// `score` painted in its grade colour, e.g. "87% (A)".
pub fn paint_score(score: u8) -> String {
    let EfficiencyGrade { grade, colour } = efficiency_grade(score);
    colour.paint(format!("{score}% ({grade})")).to_string()
}

/// Fixed-width meter for a 0..=100 value, in the grade colour.
pub fn score_meter(score: u8, width: usize) -> String {
    let filled = (score as usize * width).div_ceil(100).min(width);
    let meter = format!("{}{}", "█".repeat(filled), "░".repeat(width - filled));
    efficiency_grade(score).colour.paint(meter).to_string()
}

/// Bar scaled against the largest value in the surrounding chart.
pub fn scaled_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return " ".repeat(width);
    }
    let filled = ((value as f64 / max as f64) * width as f64).round() as usize;
    format!(
        "{}{}",
        "▇".repeat(filled.min(width)),
        " ".repeat(width - filled.min(width))
    )
}

pub fn heading(text: &str) -> String {
    Style::new().bold().paint(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_seconds, scaled_bar};

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0), "0m");
        assert_eq!(format_seconds(59), "59s");
        assert_eq!(format_seconds(60), "1m");
        assert_eq!(format_seconds(3600), "1h0m");
        assert_eq!(format_seconds(3 * 3600 + 25 * 60 + 59), "3h25m");
    }

    #[test]
    fn test_scaled_bar() {
        assert_eq!(scaled_bar(0, 0, 4), "    ");
        assert_eq!(scaled_bar(2, 4, 4), "▇▇  ");
        assert_eq!(scaled_bar(4, 4, 4), "▇▇▇▇");
    }
}
