//! Resubmission diff generator.
//!
//! When a resident resubmits a previously rejected request, the engine
//! compares the tracked fields against the stored snapshot and produces a
//! synthetic audit message summarizing what changed. The comparison order
//! is fixed and the generator never looks at fields outside this set
//! (free-text notes are intentionally excluded).

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Line emitted when a resubmission changes nothing in the tracked set.
pub const UNCHANGED_FALLBACK: &str =
    "Request resubmitted with no changes to the reviewed fields.";

/// Attachment references carry a fixed-length internal upload prefix
/// (millisecond timestamp plus underscore, e.g. `1700000000000_`) before
/// the user-facing file name.
pub const ATTACHMENT_PREFIX_LEN: usize = 14;

/// The subset of request fields the diff generator inspects, in the order
/// they are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFields {
    pub art_number: String,
    pub provider_name: String,
    pub service_categories: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub attachment_refs: Vec<String>,
}

/// Strip the internal upload prefix from a stored attachment reference,
/// yielding the display name. References too short to carry the prefix are
/// returned unchanged.
pub fn attachment_display_name(reference: &str) -> &str {
    if reference.len() > ATTACHMENT_PREFIX_LEN {
        // get() also covers a prefix boundary falling inside a multi-byte
        // character; such a reference never carried the upload prefix.
        reference.get(ATTACHMENT_PREFIX_LEN..).unwrap_or(reference)
    } else {
        reference
    }
}

/// Compute the ordered, human-readable change lines between two snapshots.
///
/// Comparison order: technical-responsibility number, provider name,
/// service categories (additions, then removals), schedule (one line if
/// either date differs), attachments (additions, then removals). Set
/// comparisons ignore ordering.
pub fn diff_lines(prev: &TrackedFields, next: &TrackedFields) -> Vec<String> {
    let mut lines = Vec::new();

    if prev.art_number != next.art_number {
        lines.push(format!(
            "Technical responsibility number changed from {} to {}",
            prev.art_number, next.art_number
        ));
    }

    if prev.provider_name != next.provider_name {
        lines.push(format!(
            "Provider changed from {} to {}",
            prev.provider_name, next.provider_name
        ));
    }

    let (added, removed) = set_diff(&prev.service_categories, &next.service_categories);
    if !added.is_empty() {
        lines.push(format!("Service categories added: {}", added.join(", ")));
    }
    if !removed.is_empty() {
        lines.push(format!("Service categories removed: {}", removed.join(", ")));
    }

    if prev.start_date != next.start_date || prev.end_date != next.end_date {
        lines.push(format!(
            "Work schedule changed to {} - {}",
            next.start_date, next.end_date
        ));
    }

    let (added, removed) = set_diff(&prev.attachment_refs, &next.attachment_refs);
    if !added.is_empty() {
        let names: Vec<&str> = added.iter().map(|r| attachment_display_name(r)).collect();
        lines.push(format!("Attachments added: {}", names.join(", ")));
    }
    if !removed.is_empty() {
        let names: Vec<&str> = removed.iter().map(|r| attachment_display_name(r)).collect();
        lines.push(format!("Attachments removed: {}", names.join(", ")));
    }

    lines
}

/// Build the body of the synthetic audit message for a resubmission.
///
/// One line per tracked-field change, or the fallback line when nothing in
/// the tracked set differs.
pub fn audit_message_body(prev: &TrackedFields, next: &TrackedFields) -> String {
    let lines = diff_lines(prev, next);
    if lines.is_empty() {
        UNCHANGED_FALLBACK.to_string()
    } else {
        lines.join("\n")
    }
}

/// Order-insensitive set difference: items only in `next` (added, in `next`
/// order) and items only in `prev` (removed, in `prev` order).
fn set_diff<'a>(prev: &'a [String], next: &'a [String]) -> (Vec<&'a str>, Vec<&'a str>) {
    let prev_set: HashSet<&str> = prev.iter().map(String::as_str).collect();
    let next_set: HashSet<&str> = next.iter().map(String::as_str).collect();
    let added = next
        .iter()
        .map(String::as_str)
        .filter(|v| !prev_set.contains(v))
        .collect();
    let removed = prev
        .iter()
        .map(String::as_str)
        .filter(|v| !next_set.contains(v))
        .collect();
    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TrackedFields {
        TrackedFields {
            art_number: "ART-1234".to_string(),
            provider_name: "Acme Renovations".to_string(),
            service_categories: vec!["plumbing".to_string(), "electrical".to_string()],
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            attachment_refs: vec!["1700000000000_floorplan.pdf".to_string()],
        }
    }

    #[test]
    fn identical_snapshots_produce_no_lines_and_fallback_body() {
        let prev = base();
        let next = base();
        assert!(diff_lines(&prev, &next).is_empty());
        assert_eq!(audit_message_body(&prev, &next), UNCHANGED_FALLBACK);
    }

    #[test]
    fn art_number_change_is_reported_first() {
        let prev = base();
        let mut next = base();
        next.art_number = "ART-9999".to_string();
        next.provider_name = "Other Provider".to_string();

        let lines = diff_lines(&prev, &next);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Technical responsibility number"));
        assert!(lines[0].contains("ART-9999"));
        assert!(lines[1].contains("Provider"));
    }

    #[test]
    fn provider_change_produces_exactly_one_line() {
        let prev = base();
        let mut next = base();
        next.provider_name = "Beta Builders".to_string();

        let lines = diff_lines(&prev, &next);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            "Provider changed from Acme Renovations to Beta Builders"
        );
    }

    #[test]
    fn category_additions_and_removals_are_separate_lines() {
        let prev = base();
        let mut next = base();
        next.service_categories = vec!["plumbing".to_string(), "painting".to_string()];

        let lines = diff_lines(&prev, &next);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Service categories added: painting");
        assert_eq!(lines[1], "Service categories removed: electrical");
    }

    #[test]
    fn category_order_changes_are_not_differences() {
        let prev = base();
        let mut next = base();
        next.service_categories = vec!["electrical".to_string(), "plumbing".to_string()];

        assert!(diff_lines(&prev, &next).is_empty());
    }

    #[test]
    fn schedule_reported_as_a_single_line_when_either_date_differs() {
        let prev = base();
        let mut next = base();
        next.start_date = NaiveDate::from_ymd_opt(2026, 9, 15).unwrap();
        next.end_date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();

        let lines = diff_lines(&prev, &next);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Work schedule changed"));
    }

    #[test]
    fn end_date_alone_still_counts_as_schedule_change() {
        let prev = base();
        let mut next = base();
        next.end_date = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();

        assert_eq!(diff_lines(&prev, &next).len(), 1);
    }

    #[test]
    fn attachment_lines_use_display_names() {
        let prev = base();
        let mut next = base();
        next.attachment_refs = vec![
            "1700000000000_floorplan.pdf".to_string(),
            "1712345678901_art-document.pdf".to_string(),
        ];

        let lines = diff_lines(&prev, &next);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "Attachments added: art-document.pdf");
    }

    #[test]
    fn display_name_with_prefix_boundary_inside_a_character() {
        // 13 ASCII bytes, then a two-byte character straddling the prefix
        // boundary. The reference is returned whole instead of panicking.
        let reference = "1234567890123á.pdf";
        assert_eq!(attachment_display_name(reference), reference);
    }

    #[test]
    fn display_name_strips_the_upload_prefix() {
        assert_eq!(
            attachment_display_name("1700000000000_floorplan.pdf"),
            "floorplan.pdf"
        );
        assert_eq!(attachment_display_name("short.pdf"), "short.pdf");
    }

    #[test]
    fn multiple_category_changes_join_with_commas() {
        let prev = base();
        let mut next = base();
        next.service_categories = vec![
            "plumbing".to_string(),
            "painting".to_string(),
            "masonry".to_string(),
        ];

        let lines = diff_lines(&prev, &next);
        assert_eq!(lines[0], "Service categories added: painting, masonry");
    }

    #[test]
    fn attachment_removal_line() {
        let prev = base();
        let mut next = base();
        next.attachment_refs = vec![];

        let lines = diff_lines(&prev, &next);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "Attachments removed: floorplan.pdf");
    }

    #[test]
    fn every_tracked_field_changed_yields_seven_lines() {
        let prev = base();
        let next = TrackedFields {
            art_number: "ART-0001".to_string(),
            provider_name: "Gamma Works".to_string(),
            service_categories: vec!["masonry".to_string()],
            start_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2027, 2, 1).unwrap(),
            attachment_refs: vec!["1799999999999_permit.pdf".to_string()],
        };

        // art + provider + cat added + cat removed + schedule + att added + att removed
        let lines = diff_lines(&prev, &next);
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn body_joins_lines_with_newlines() {
        let prev = base();
        let mut next = base();
        next.art_number = "ART-2".to_string();
        next.provider_name = "P2".to_string();

        let body = audit_message_body(&prev, &next);
        assert_eq!(body.lines().count(), 2);
    }

    #[test]
    fn short_references_are_displayed_verbatim() {
        assert_eq!(attachment_display_name("notes.pdf"), "notes.pdf");
        assert_eq!(attachment_display_name(""), "");
        assert_eq!(
            attachment_display_name("1700000000000_a.png"),
            "a.png"
        );
    }
}
