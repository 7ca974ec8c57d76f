use crate::models::{count_all, MeritBadge, Requirement};
use crate::source::BadgesByDepartment;

/// Longest requirement description shown in previews
const PREVIEW_DESCRIPTION_LEN: usize = 100;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a yes/no flag for display
pub fn format_flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Render a badge and its requirement tree, one line per node, nested
/// requirements indented one tab per level.
pub fn format_badge(badge: &MeritBadge) -> String {
    let mut out = format!(
        "{}\n\t{}\n\tEagle required: {}\n\tDepartment: {}\n",
        badge.name,
        truncate_string(&badge.description, PREVIEW_DESCRIPTION_LEN),
        format_flag(badge.eagle_required),
        badge.department_name
    );
    push_requirements(&mut out, &badge.requirements, 1);
    out
}

fn push_requirements(out: &mut String, requirements: &[Requirement], depth: usize) {
    let indent = "\t".repeat(depth);
    for requirement in requirements {
        out.push_str(&format!(
            "{}{}. {}\n",
            indent,
            requirement.identifier,
            truncate_string(&requirement.description, PREVIEW_DESCRIPTION_LEN)
        ));
        push_requirements(out, &requirement.requirements, depth + 1);
    }
}

/// Render every badge grouped by department, followed by totals.
pub fn format_preview(badges: &BadgesByDepartment) -> String {
    let mut out = String::new();
    let mut badge_total = 0;
    let mut requirement_total = 0;

    for (department, list) in badges {
        out.push_str(&format!("== {} ({} badges)\n", department, list.len()));
        for badge in list {
            out.push_str(&format_badge(badge));
            badge_total += 1;
            requirement_total += count_all(&badge.requirements);
        }
    }

    out.push_str(&format!(
        "{} departments, {} badges, {} requirements\n",
        badges.len(),
        badge_total,
        requirement_total
    ));
    out
}
