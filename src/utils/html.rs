// src/utils/html.rs

//! Conversion of rendered schedule pages into parser tables.

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{AppError, Result};
use crate::models::{Cell, Row, ScheduleConfig, Table};

/// Parse a CSS selector, mapping failures to [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Extract every table matched by the configured selector, in page order.
pub fn extract_tables(document: &Html, schedule: &ScheduleConfig) -> Result<Vec<Table>> {
    let table_sel = parse_selector(&schedule.table_selector)?;
    let row_sel = parse_selector("tr")?;

    let tables = document
        .select(&table_sel)
        .map(|table| extract_table(table, &row_sel, &schedule.header_marker_attr))
        .collect();
    Ok(tables)
}

/// Extract the rows that belong to `table` itself, not to nested tables.
fn extract_table(table: ElementRef<'_>, row_sel: &Selector, marker_attr: &str) -> Table {
    let rows = table
        .select(row_sel)
        .filter(|row| owning_table(*row).map(|t| t.id()) == Some(table.id()))
        .map(|row| extract_row(row, marker_attr))
        .collect();
    Table::new(rows)
}

fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

fn extract_row(row: ElementRef<'_>, marker_attr: &str) -> Row {
    let cells: Vec<Cell> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(extract_cell)
        .collect();

    let marked = row.value().attr(marker_attr).is_some();
    Row {
        header: marked || cells.is_empty(),
        cells,
    }
}

/// Split a cell's text into segments at `<br>` boundaries.
fn extract_cell(cell: ElementRef<'_>) -> Cell {
    let mut segments = Vec::new();
    let mut current = String::new();

    for node in cell.descendants() {
        match node.value() {
            Node::Text(text) => current.push_str(text),
            Node::Element(el) if el.name() == "br" => {
                segments.push(std::mem::take(&mut current));
            }
            _ => {}
        }
    }
    segments.push(current);

    Cell::new(segments)
}
