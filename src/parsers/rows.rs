use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

use super::clean_text;
use crate::models::ObservationRow;

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Invalid row selector"));

static LABEL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("b, strong").expect("Invalid label selector"));

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no table rows found in page ({bytes} bytes of HTML)")]
    NoRows { bytes: usize },
}

/// Where a row keeps its status text. The listing has shipped both shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// `<th>Cyprus</th><td>03 Jun</td>`
    CellText,
    /// `<td>Cyprus</td><td><span><b>03 Jun</b> 4 slots</span></td>`
    BoldLabel,
}

impl RowLayout {
    /// Picks the layout by looking for a bold label inside any status cell.
    pub fn detect(document: &Html) -> Self {
        let has_labels = data_rows(document)
            .filter_map(split_row)
            .filter_map(|cells| cells.status)
            .any(|cell| label_text(cell).is_some());

        if has_labels {
            RowLayout::BoldLabel
        } else {
            RowLayout::CellText
        }
    }

    fn status_of(self, status_cell: Option<ElementRef<'_>>) -> String {
        let Some(cell) = status_cell else {
            return String::new();
        };

        match self {
            RowLayout::CellText => element_text(cell),
            RowLayout::BoldLabel => label_text(cell).unwrap_or_else(|| element_text(cell)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub layout: RowLayout,
    pub rows: Vec<ObservationRow>,
}

/// Parse a listing page into `(name, status)` rows, detecting the layout.
pub fn extract_rows(html: &str) -> Result<Extraction, ExtractError> {
    let document = Html::parse_document(html);
    let layout = RowLayout::detect(&document);
    let rows = extract_with_layout(&document, layout, html.len())?;
    Ok(Extraction { layout, rows })
}

pub fn extract_with_layout(
    document: &Html,
    layout: RowLayout,
    bytes: usize,
) -> Result<Vec<ObservationRow>, ExtractError> {
    if document.select(&ROW_SELECTOR).next().is_none() {
        return Err(ExtractError::NoRows { bytes });
    }

    let mut rows = Vec::new();
    for cells in data_rows(document).filter_map(split_row) {
        let name = element_text(cells.name);
        if name.is_empty() {
            debug!("Skipping row with empty name cell");
            continue;
        }
        let status = layout.status_of(cells.status);
        debug!(name = %name, status = %status, "Extracted row");
        rows.push(ObservationRow::new(name, status));
    }

    Ok(rows)
}

struct RowCells<'a> {
    name: ElementRef<'a>,
    /// First `<td>` after the name cell. Later columns never carry the status.
    status: Option<ElementRef<'a>>,
}

/// Rows outside `<thead>`.
fn data_rows(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.select(&ROW_SELECTOR).filter(|row| {
        !row.ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| el.value().name() == "thead")
    })
}

/// Name cell is the first `<th>`, else the first `<td>`; only direct cells count.
fn split_row(row: ElementRef<'_>) -> Option<RowCells<'_>> {
    let cells: Vec<ElementRef<'_>> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .collect();

    let name_idx = cells
        .iter()
        .position(|cell| cell.value().name() == "th")
        .or_else(|| (!cells.is_empty()).then_some(0))?;

    let status = cells[name_idx + 1..]
        .iter()
        .find(|cell| cell.value().name() == "td")
        .copied();

    Some(RowCells {
        name: cells[name_idx],
        status,
    })
}

fn label_text(cell: ElementRef<'_>) -> Option<String> {
    cell.select(&LABEL_SELECTOR)
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(rows: &[ObservationRow]) -> Vec<(&str, &str)> {
        rows.iter()
            .map(|r| (r.name.as_str(), r.status.as_str()))
            .collect()
    }

    const CELL_PAGE: &str = r#"
        <table>
          <thead><tr><th>Country</th><th>Earliest slot</th></tr></thead>
          <tbody>
            <tr><th>🇨🇾 Cyprus</th><td>03 Jun</td></tr>
            <tr><th>Greece 🇬🇷</th><td>No availability</td></tr>
            <tr><th>France</th></tr>
          </tbody>
        </table>"#;

    const LABEL_PAGE: &str = r#"
        <table><tbody>
          <tr>
            <td><span>🇨🇾</span> Cyprus</td>
            <td><div><b>03 Jun</b> <small>4 slots</small></div></td>
          </tr>
          <tr>
            <td>Malta</td>
            <td><div><strong>Waitlist Open</strong></div></td>
          </tr>
          <tr><td>Spain</td><td>No availability</td></tr>
          <tr><td>Italy</td></tr>
        </tbody></table>"#;

    #[test]
    fn extracts_cell_text_layout() {
        let extraction = extract_rows(CELL_PAGE).unwrap();
        assert_eq!(extraction.layout, RowLayout::CellText);
        assert_eq!(
            pairs(&extraction.rows),
            vec![
                ("🇨🇾 Cyprus", "03 Jun"),
                ("Greece 🇬🇷", "No availability"),
                ("France", ""),
            ]
        );
    }

    #[test]
    fn extracts_bold_label_layout() {
        let extraction = extract_rows(LABEL_PAGE).unwrap();
        assert_eq!(extraction.layout, RowLayout::BoldLabel);
        assert_eq!(
            pairs(&extraction.rows),
            vec![
                ("🇨🇾 Cyprus", "03 Jun"),
                ("Malta", "Waitlist Open"),
                ("Spain", "No availability"),
                ("Italy", ""),
            ]
        );
    }

    #[test]
    fn cell_layout_keeps_decorated_status_whole() {
        let document = Html::parse_document(LABEL_PAGE);
        let rows = extract_with_layout(&document, RowLayout::CellText, LABEL_PAGE.len()).unwrap();
        assert_eq!(rows[0].status, "03 Jun 4 slots");
    }

    #[test]
    fn skips_rows_without_name_cell() {
        let html = r#"<table><tr></tr><tr><td>  </td><td>03 Jun</td></tr><tr><td>Cyprus</td><td>03 Jun</td></tr></table>"#;
        let rows = extract_rows(html).unwrap().rows;
        assert_eq!(pairs(&rows), vec![("Cyprus", "03 Jun")]);
    }

    #[test]
    fn bold_text_outside_status_cell_is_ignored() {
        let html = r#"<table><tbody>
            <tr><td>Greece</td><td><b>03 Jun</b></td></tr>
            <tr><td>Cyprus</td><td>No availability</td><td><b>Notify me</b></td></tr>
        </tbody></table>"#;
        let extraction = extract_rows(html).unwrap();
        assert_eq!(extraction.layout, RowLayout::BoldLabel);
        assert_eq!(
            pairs(&extraction.rows),
            vec![("Greece", "03 Jun"), ("Cyprus", "No availability")]
        );
    }

    #[test]
    fn bold_only_in_trailing_columns_keeps_cell_layout() {
        let html = r#"<table><tbody>
            <tr><td>Cyprus</td><td>03 Jun</td><td><strong>Book</strong></td></tr>
        </tbody></table>"#;
        let extraction = extract_rows(html).unwrap();
        assert_eq!(extraction.layout, RowLayout::CellText);
        assert_eq!(pairs(&extraction.rows), vec![("Cyprus", "03 Jun")]);
    }

    #[test]
    fn page_without_rows_is_a_structural_error() {
        let err = extract_rows("<html><body><p>Loading…</p></body></html>").unwrap_err();
        assert!(matches!(err, ExtractError::NoRows { .. }));
    }

    #[test]
    fn table_with_only_header_rows_is_empty_not_error() {
        let html = "<table><thead><tr><th>Country</th><th>Slot</th></tr></thead></table>";
        assert!(extract_rows(html).unwrap().rows.is_empty());
    }
}
