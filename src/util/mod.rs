//
//  gitlab-tools
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Small formatting helpers used when building tool summaries.
//!
//! ## Categories
//!
//! - **Time Utilities**: [`format_duration`], [`format_seconds`]
//! - **Size Utilities**: [`format_size`]
//! - **String Utilities**: [`count_noun`]
//!
//! ## Example
//!
//! ```rust
//! use gitlab_tools::util::{count_noun, format_size};
//!
//! assert_eq!(format_size(1536), "1.5 KB");
//! assert_eq!(count_noun(3, "project"), "3 projects");
//! ```

use std::time::Duration;

/// Formats a duration into a compact human-readable string.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use gitlab_tools::util::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
/// assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m");
/// assert_eq!(format_duration(Duration::from_secs(90000)), "1d 1h");
/// ```
///
/// # Notes
///
/// - Under a minute shows seconds only, under an hour minutes and seconds.
/// - Under a day shows hours and minutes, beyond that days and hours.
/// - Sub-second precision is dropped.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Formats the fractional seconds GitLab reports for pipeline and job
/// durations. Negative, non-finite or unrepresentably large values read as
/// zero.
pub fn format_seconds(seconds: f64) -> String {
    format_duration(Duration::try_from_secs_f64(seconds).unwrap_or_default())
}

/// Formats a byte count using binary units.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::util::format_size;
///
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.0 KB");
/// assert_eq!(format_size(1048576), "1.0 MB");
/// assert_eq!(format_size(1610612736), "1.5 GB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// `"1 project"`, `"2 projects"`, `"2 statuses"`.
pub fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else if noun.ends_with('s') {
        format!("{count} {noun}es")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(42.7), "42s");
        assert_eq!(format_seconds(3725.0), "1h 2m");
        assert_eq!(format_seconds(-3.0), "0s");
        assert_eq!(format_seconds(f64::NAN), "0s");
        assert_eq!(format_seconds(f64::INFINITY), "0s");
        assert_eq!(format_seconds(1e20), "0s");
    }

    #[test]
    fn test_count_noun() {
        assert_eq!(count_noun(0, "tag"), "0 tags");
        assert_eq!(count_noun(1, "tag"), "1 tag");
        assert_eq!(count_noun(12, "member"), "12 members");
        assert_eq!(count_noun(2, "status"), "2 statuses");
    }
}
