/// Plain-text table for terminal output
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
    right_aligned: Vec<bool>,
}

/// Cells longer than this are cut with an ellipsis
const MAX_CELL_WIDTH: usize = 40;

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            col_widths: headers.iter().map(|h| h.chars().count()).collect(),
            right_aligned: vec![false; headers.len()],
        }
    }

    /// Right-align the given columns (prices, percentages)
    pub fn align_right(mut self, columns: &[usize]) -> Self {
        for &col in columns {
            if let Some(flag) = self.right_aligned.get_mut(col) {
                *flag = true;
            }
        }
        self
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        let row: Vec<String> = row.into_iter().map(truncate).collect();

        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = self.col_widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }

        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(self.render_row(&self.headers));
        lines.push(
            self.col_widths
                .iter()
                .map(|&w| "-".repeat(w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &self.rows {
            lines.push(self.render_row(row));
        }
        lines.join("\n")
    }

    fn render_row(&self, row: &[String]) -> String {
        self.col_widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let pad = " ".repeat(width.saturating_sub(cell.chars().count()));
                if self.right_aligned[i] {
                    format!("{}{}", pad, cell)
                } else {
                    format!("{}{}", cell, pad)
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    }
}

fn truncate(cell: String) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell;
    }
    let mut cut: String = cell.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(&["Item", "Market", "Price"]).align_right(&[2]);
        table.add_row(vec!["Onion".into(), "Karwan Bazar".into(), "45.00".into()]);
        table.add_row(vec!["Rice".into(), "New Market".into(), "120.50".into()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Item  | Market"));
        assert!(lines[2].ends_with(" 45.00"));
        assert!(lines[3].ends_with("120.50"));
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let mut table = Table::new(&["Description"]);
        table.add_row(vec!["x".repeat(100)]);

        let rendered = table.render();
        let last = rendered.lines().last().unwrap();
        assert_eq!(last.chars().count(), MAX_CELL_WIDTH);
        assert!(last.ends_with('…'));
    }
}
