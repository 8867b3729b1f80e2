use colored::Colorize;
use unicode_width::UnicodeWidthStr;

/// Column-aligned plain text table with a header row
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.width());
                }
            }
        }
        widths
    }

    fn format_row(cells: &[String], widths: &[usize]) -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.width());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }

    /// Render without colors, one line per row
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = Self::format_row(&self.headers, &widths);
        out.push('\n');
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&Self::format_row(row, &widths));
        }
        out
    }

    /// Print to stdout with a bold header row
    pub fn print(&self) {
        let widths = self.widths();
        println!("{}", Self::format_row(&self.headers, &widths).bold());
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total));
        for row in &self.rows {
            println!("{}", Self::format_row(row, &widths));
        }
    }
}

/// Human readable byte size, 1 KB = 1024 bytes
pub fn human_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_align_to_widest_cell() {
        let mut table = Table::new(["NAME", "STATE"]);
        table.row(["very-long-instance-name", "running"]);
        table.row(["web", "stopped"]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[2].starts_with("very-long-instance-name  running"));
        assert!(lines[3].starts_with("web                      stopped"));
    }

    #[test]
    fn test_empty_table_renders_header_only() {
        let table = Table::new(["A", "B"]);
        assert!(table.is_empty());
        assert_eq!(table.render().lines().count(), 2);
    }

    #[test]
    fn test_human_size_units() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(1024 * 1024), "1.0 MB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.0 GB");
    }
}
