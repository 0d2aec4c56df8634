//! Output formatting for CLI operations.

use serde_json::json;
use unipkg::{Asset, AssetPath, GuidChange};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the asset listing of a package
    fn format_list<'a>(&self, assets: &mut dyn Iterator<Item = &'a Asset>) -> String;

    /// Formats the outcome of a rename
    fn format_rename(&self, from: &str, to: &str) -> String;

    /// Formats the outcome of a GUID replacement
    fn format_guid_change(&self, path: &str, change: &GuidChange) -> String;

    /// Formats the assets referencing a GUID
    fn format_refs(&self, guid: &str, paths: &[&AssetPath]) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list<'a>(&self, assets: &mut dyn Iterator<Item = &'a Asset>) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{:<32} {:>10} {:>4} {:>4} {}\n",
            "GUID", "Size", "Meta", "Prev", "Path"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        let mut count = 0;
        let mut total_size: u64 = 0;
        for asset in assets {
            count += 1;
            total_size += asset.payload.len() as u64;
            output.push_str(&format!(
                "{:<32} {:>10} {:>4} {:>4} {}\n",
                asset.guid(),
                humanize_bytes(asset.payload.len() as u64),
                if asset.meta.is_some() { "yes" } else { "-" },
                if asset.preview.is_some() { "yes" } else { "-" },
                asset.path()
            ));
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{} assets, {} total\n",
            count,
            humanize_bytes(total_size)
        ));
        output
    }

    fn format_rename(&self, from: &str, to: &str) -> String {
        format!("Renamed {} -> {}\n", from, to)
    }

    fn format_guid_change(&self, path: &str, change: &GuidChange) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", path));
        output.push_str(&format!("  Old GUID:     {}\n", change.old));
        output.push_str(&format!("  New GUID:     {}\n", change.new));
        output.push_str(&format!(
            "  Rewritten:    {} payloads, {} sidecars ({} occurrences)\n",
            change.report.payloads_rewritten, change.report.metas_rewritten, change.report.occurrences
        ));
        output
    }

    fn format_refs(&self, guid: &str, paths: &[&AssetPath]) -> String {
        if paths.is_empty() {
            return format!("No references to {}\n", guid);
        }
        let mut output = format!("{} assets reference {}:\n", paths.len(), guid);
        for path in paths {
            output.push_str(&format!("  {}\n", path));
        }
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list<'a>(&self, assets: &mut dyn Iterator<Item = &'a Asset>) -> String {
        let items: Vec<_> = assets
            .map(|a| {
                json!({
                    "guid": a.guid().as_str(),
                    "path": a.path().as_str(),
                    "size": a.payload.len(),
                    "has_meta": a.meta.is_some(),
                    "has_preview": a.preview.is_some(),
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_rename(&self, from: &str, to: &str) -> String {
        let obj = json!({ "renamed": true, "from": from, "to": to });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_guid_change(&self, path: &str, change: &GuidChange) -> String {
        let obj = json!({
            "path": path,
            "old_guid": change.old.as_str(),
            "new_guid": change.new.as_str(),
            "payloads_rewritten": change.report.payloads_rewritten,
            "metas_rewritten": change.report.metas_rewritten,
            "occurrences": change.report.occurrences,
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_refs(&self, guid: &str, paths: &[&AssetPath]) -> String {
        let obj = json!({
            "guid": guid,
            "referenced_by": paths.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
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
