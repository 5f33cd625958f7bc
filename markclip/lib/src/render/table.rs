//! Pipe tables.

use crate::dom::Element;

use super::{RenderContext, Renderer};

impl Renderer<'_> {
    /// Renders a `<table>` as a pipe table whose first row is the header.
    pub(super) fn table(&self, table: &mut Element, ctx: &mut RenderContext<'_>) -> String {
        let mut rows: Vec<Vec<String>> = Vec::new();
        for section in table.child_elements_mut() {
            match section.name.as_str() {
                "tr" => rows.push(self.row(section, ctx)),
                "thead" | "tbody" | "tfoot" => {
                    for row in section.child_elements_mut().filter(|el| el.name == "tr") {
                        rows.push(self.row(row, ctx));
                    }
                }
                _ => {}
            }
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return String::new();
        }

        let line = |cells: &[String]| {
            let mut out = String::from("|");
            for column in 0..width {
                let cell = cells.get(column).map_or("", String::as_str);
                out.push(' ');
                out.push_str(cell);
                out.push_str(" |");
            }
            out
        };

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(line(&rows[0]));
        lines.push(line(&vec!["---".to_string(); width]));
        lines.extend(rows[1..].iter().map(|row| line(row)));

        format!("\n\n{}\n\n", lines.join("\n"))
    }

    fn row(&self, row: &mut Element, ctx: &mut RenderContext<'_>) -> Vec<String> {
        row.child_elements_mut()
            .filter(|cell| cell.name == "td" || cell.name == "th")
            .map(|cell| {
                self.process(cell, false, ctx)
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .replace('|', "\\|")
            })
            .collect()
    }
}
