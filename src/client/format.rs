//! Presentation helpers shared by the admin views

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::UserRole;

/// Colour family of a role badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Green,
    Blue,
}

/// Role pill: admins green, clients blue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

impl RoleBadge {
    pub fn for_role(role: UserRole) -> Self {
        let tone = if role.is_admin() {
            BadgeTone::Green
        } else {
            BadgeTone::Blue
        };

        Self {
            label: role.as_str(),
            tone,
        }
    }
}

/// Join date as `M/D/YYYY`, on the calendar of the given time zone
pub fn format_join_date<Tz>(created_at: DateTime<Utc>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    created_at.with_timezone(zone).format("%-m/%-d/%Y").to_string()
}

/// Render rows as a left-aligned plain-text table
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = vec![render_line(headers, &widths)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push(render_line(&cells, &widths));
    }

    out.join("\n")
}

fn render_line(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
