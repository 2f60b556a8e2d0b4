//! Text output formatting with progress bars and colors.

use courier_core::{
    ChartDay, DeliveryLogEntry, DeliveryStatus, HealthStatus, RangeStats, ServiceHealth,
    TodayStats,
};
use courier_relay::{AttemptResult, DispatchResult};

use super::ProviderRow;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Formats the outcome of a send or replay.
    pub fn format_dispatch(&self, result: &DispatchResult) -> String {
        let mut lines = Vec::new();

        let id = result
            .log_id
            .map_or_else(|| "-".to_string(), |id| format!("#{id}"));
        let headline = match (result.status, result.provider) {
            (DeliveryStatus::Sent, Some(provider)) => {
                format!("{} via {}", self.green("Sent"), self.bold(provider.display_name()))
            }
            _ => self.red("Failed"),
        };
        lines.push(format!("{headline} (log {id}, {} ms)", result.duration.as_millis()));

        for attempt in &result.attempts {
            let name = attempt.provider.display_name();
            let line = match &attempt.result {
                AttemptResult::Skipped { reason } => self.dim(&format!("{reason}")),
                AttemptResult::Sent { message_id } => match message_id {
                    Some(id) => format!("{} {}", self.green("accepted"), self.dim(id)),
                    None => self.green("accepted"),
                },
                AttemptResult::Failed { error } => format!("{} {error}", self.red("failed")),
            };
            lines.push(format!("  {name:<10} {line}"));
        }

        if let Some(detail) = &result.error_detail {
            lines.push(String::new());
            lines.push(format!("Detail: {detail}"));
        }

        lines.join("\n")
    }

    /// Formats the result of a retention sweep.
    pub fn format_purge(&self, deleted: u64, older_than_days: u32) -> String {
        format!(
            "Deleted {} delivery log entr{} older than {older_than_days} days",
            self.bold(&deleted.to_string()),
            if deleted == 1 { "y" } else { "ies" }
        )
    }

    // ========================================================================
    // Providers
    // ========================================================================

    /// Formats provider list header.
    pub fn format_providers_header(&self) -> String {
        format!(
            "{:<12} {:<9} {:<8} {:<9} {}",
            self.bold("Provider"),
            self.bold("Priority"),
            self.bold("Quota"),
            self.bold("Enabled"),
            self.bold("Missing")
        )
    }

    /// Formats a single provider line.
    pub fn format_provider_line(&self, row: &ProviderRow) -> String {
        let enabled = if row.provider.enabled {
            self.green("✓")
        } else {
            self.dim("−")
        };
        let missing = if row.missing.is_empty() {
            self.dim("−")
        } else {
            self.yellow(&row.missing.join(", "))
        };

        format!(
            "{:<12} {:<9} {:<8} {:<9} {}",
            row.descriptor.display_name(),
            row.provider.priority,
            row.provider.daily_quota,
            enabled,
            missing
        )
    }

    // ========================================================================
    // Stats
    // ========================================================================

    /// Formats today's usage with a quota bar per provider.
    pub fn format_today(&self, stats: &TodayStats) -> String {
        let mut lines = Vec::new();
        lines.push(self.bold(&format!("Today ({})", stats.date)));
        lines.push("─".repeat(50));

        for row in &stats.providers {
            let name = row.provider.display_name();
            if !row.enabled {
                lines.push(format!("{name:<10} {}", self.dim("not configured")));
                continue;
            }
            let bar = self.progress_bar(row.percentage);
            let used = self.color_for_used(
                row.percentage,
                &format!("{}/{}", row.attempted, row.daily_quota),
            );
            lines.push(format!(
                "{name:<10} {bar} {used} {}",
                self.dim(&format!("({} ok, {} failed)", row.succeeded, row.failed))
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "Total: {} attempted, {} succeeded, {} failed, {} remaining",
            stats.total.attempted, stats.total.succeeded, stats.total.failed, stats.total.remaining
        ));
        if let Some(hour) = stats.hourly.peak_hour() {
            lines.push(format!(
                "Busiest hour: {hour:02}:00 UTC ({} attempts)",
                stats.hourly.get(hour)
            ));
        }

        lines.join("\n")
    }

    /// Formats totals over a date range.
    pub fn format_range(&self, title: &str, stats: &RangeStats) -> String {
        let mut lines = Vec::new();
        lines.push(self.bold(&format!("{title} ({} to {})", stats.from, stats.to)));
        lines.push("─".repeat(50));
        lines.push(format!(
            "{:<10} {:>9} {:>9} {:>7}",
            "Provider", "Attempted", "Succeeded", "Failed"
        ));
        for row in &stats.providers {
            lines.push(format!(
                "{:<10} {:>9} {:>9} {:>7}",
                row.provider.display_name(),
                row.attempted,
                row.succeeded,
                row.failed
            ));
        }
        lines.push(format!(
            "{:<10} {:>9} {:>9} {:>7}",
            "Total",
            stats.total_attempted(),
            stats.total_succeeded(),
            stats.total_failed()
        ));
        lines.join("\n")
    }

    /// Formats the seven-day chart, one row per day.
    pub fn format_chart(&self, days: &[ChartDay]) -> String {
        let mut lines = Vec::new();
        lines.push(self.bold("Last 7 days (sent / ok / failed)"));
        lines.push("─".repeat(50));

        for day in days {
            let cells: Vec<String> = day
                .points
                .iter()
                .map(|p| {
                    format!(
                        "{} {}/{}/{}",
                        p.provider.as_str(),
                        p.sent,
                        p.success,
                        self.failed_count(p.failed)
                    )
                })
                .collect();
            lines.push(format!("{}  {}", day.date.format("%a %m-%d"), cells.join("  ")));
        }
        lines.join("\n")
    }

    /// Formats recent delivery log entries.
    pub fn format_recent(&self, entries: &[DeliveryLogEntry]) -> String {
        if entries.is_empty() {
            return self.dim("No deliveries recorded");
        }

        let mut lines = Vec::new();
        lines.push(format!(
            "{:<7} {:<20} {:<8} {:<9} {:<16} {}",
            "Id", "Created (UTC)", "Status", "Provider", "Type", "Recipient"
        ));
        for entry in entries {
            let status = match entry.status {
                DeliveryStatus::Sent => self.green("sent    "),
                DeliveryStatus::Failed => self.red("failed  "),
                DeliveryStatus::Pending => self.yellow("pending "),
            };
            lines.push(format!(
                "{:<7} {:<20} {} {:<9} {:<16} {}",
                entry.id,
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                status,
                entry.provider.map_or("-", |p| p.as_str()),
                entry.message_type.as_str(),
                self.cyan(entry.recipient.as_str())
            ));
            if let Some(detail) = &entry.error_detail {
                lines.push(format!("        {}", self.dim(detail)));
            }
        }
        lines.join("\n")
    }

    /// Formats provider health for today.
    pub fn format_health(&self, health: &[ServiceHealth]) -> String {
        let mut lines = Vec::new();
        lines.push(self.bold("Provider health"));
        lines.push("─".repeat(50));
        for h in health {
            let label = self.color_for_status(h.status, h.status.label());
            lines.push(format!(
                "{} {:<10} {:<18} {}/{} ({:.0}%)",
                h.status.emoji(),
                h.provider.display_name(),
                label,
                h.today_usage,
                h.daily_quota,
                h.percentage
            ));
        }
        lines.join("\n")
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    /// Formats a progress bar filled to `percent_used`.
    pub fn progress_bar(&self, percent_used: f64) -> String {
        let ratio = (percent_used / 100.0).clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let filled = (ratio * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_used(percent_used, &bar)
    }

    fn color_for_used(&self, percent_used: f64, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if percent_used >= 100.0 {
            self.red(text)
        } else if percent_used >= 80.0 {
            self.yellow(text)
        } else {
            self.green(text)
        }
    }

    fn color_for_status(&self, status: HealthStatus, text: &str) -> String {
        match status {
            HealthStatus::Exhausted => self.red(text),
            HealthStatus::Warning => self.yellow(text),
            HealthStatus::Active => self.green(text),
            HealthStatus::Idle | HealthStatus::Inactive => self.dim(text),
        }
    }

    fn failed_count(&self, failed: u64) -> String {
        if failed > 0 {
            self.red(&failed.to_string())
        } else {
            failed.to_string()
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_empty() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(0.0), "░░░░░░░░░░");
    }

    #[test]
    fn test_progress_bar_clamps_overflow() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.progress_bar(130.0), "██████████");
    }

    #[test]
    fn test_color_for_used() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.color_for_used(100.0, "x").contains(RED));
        assert!(formatter.color_for_used(80.0, "x").contains(YELLOW));
        assert!(formatter.color_for_used(79.0, "x").contains(GREEN));
    }

    #[test]
    fn test_purge_pluralization() {
        let formatter = TextFormatter::new(false);
        assert_eq!(
            formatter.format_purge(1, 30),
            "Deleted 1 delivery log entry older than 30 days"
        );
        assert!(formatter.format_purge(0, 7).contains("entries"));
    }
}
