//! Table rendering for directory listings

use comfy_table::{Table, presets};
use jiff::Timestamp;
use ns_core::Attributes;

/// Render `dir` entries as a type/size/mtime/name table
pub fn entries_table(entries: &[&Attributes]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_header(vec!["TYPE", "SIZE", "MODIFIED", "NAME"]);

    for entry in entries {
        let kind = entry.get("type").map(String::as_str).unwrap_or("-");
        let name = entry.get("name").map(String::as_str).unwrap_or("");
        let size = match kind {
            "file" => entry.get("size").map(|s| format_size(s)).unwrap_or_default(),
            _ => String::new(),
        };
        let mtime = entry.get("mtime").map(|m| format_mtime(m)).unwrap_or_default();
        let name = match (kind, entry.get("target")) {
            ("symlink", Some(target)) => format!("{name} -> {target}"),
            ("dir", _) => format!("{name}/"),
            _ => name.to_string(),
        };
        table.add_row(vec![kind.to_string(), size, mtime, name]);
    }

    table
}

/// Human size for a byte count attribute; unparseable values pass through
pub fn format_size(bytes: &str) -> String {
    match bytes.parse::<u64>() {
        Ok(n) => humansize::format_size(n, humansize::BINARY),
        Err(_) => bytes.to_string(),
    }
}

/// UTC date for a unix-seconds attribute; unparseable values pass through
pub fn format_mtime(seconds: &str) -> String {
    seconds
        .parse::<i64>()
        .ok()
        .and_then(|s| Timestamp::from_second(s).ok())
        .map(|ts| ts.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size("1024"), "1 KiB");
        assert_eq!(format_size("12"), "12 B");
        assert_eq!(format_size("n/a"), "n/a");
    }

    #[test]
    fn test_format_mtime() {
        assert_eq!(format_mtime("0"), "1970-01-01 00:00:00");
        assert_eq!(format_mtime("1700000000"), "2023-11-14 22:13:20");
        assert_eq!(format_mtime("yesterday"), "yesterday");
    }

    #[test]
    fn test_entries_table() {
        let file = entry(&[
            ("type", "file"),
            ("name", "FILE.jpg"),
            ("size", "2048"),
            ("mtime", "0"),
        ]);
        let dir = entry(&[("type", "dir"), ("name", "images"), ("mtime", "0")]);
        let link = entry(&[("type", "symlink"), ("name", "latest"), ("target", "FILE.jpg")]);

        let rendered = entries_table(&[&file, &dir, &link]).to_string();
        assert!(rendered.contains("FILE.jpg"));
        assert!(rendered.contains("2 KiB"));
        assert!(rendered.contains("images/"));
        assert!(rendered.contains("latest -> FILE.jpg"));
    }
}
