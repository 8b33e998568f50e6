//! Pulls the status-change rows, the deadline, and the notification-queue
//! fault rows out of a parsed status page. All positional and marker-text
//! conventions of the page layout live here; downstream code only ever sees
//! the named row structures.

use std::sync::OnceLock;

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::domain::{ErrorSignal, StatusEvent, StatusHistory, TimestampText};

/// Marker preceding the application-properties table.
const PROPERTIES_MARKER: &str = "Основные свойства заявки";
/// Marker preceding the notification-queue table.
const ERROR_QUEUE_MARKER: &str = "Очередь уведомлений isc.kzcon.ens.MsgQueue";

/// The status-change table is always the 5th table on the page.
const STATUS_TABLE_INDEX: usize = 4;
/// New-status and creation-date positions within a status row.
const STATUS_CELL: usize = 6;
const CREATED_CELL: usize = 2;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("fewer than 5 tables in the status page (found {tables_found})")]
    MalformedDocument { tables_found: usize },
}

fn table_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("table").expect("static selector"))
}

fn row_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("tr").expect("static selector"))
}

fn data_cell_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("td").expect("static selector"))
}

fn any_cell_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("td,th").expect("static selector"))
}

fn marker_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("b,strong").expect("static selector"))
}

fn line_break_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("br").expect("static selector"))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First table at or after `node` in document order, climbing out of the
/// enclosing elements when the current level has none.
fn next_table_in_document(node: NodeRef<'_, Node>) -> Option<ElementRef<'_>> {
    let mut scope = Some(node);
    while let Some(current) = scope {
        for sibling in current.next_siblings() {
            for candidate in sibling.descendants() {
                if let Some(element) = ElementRef::wrap(candidate) {
                    if element.value().name() == "table" {
                        return Some(element);
                    }
                }
            }
        }
        scope = current.parent();
    }
    None
}

/// Ordered status transitions from the status-change table. Rows with an
/// empty new-status cell are discarded rather than stored as garbage.
pub fn status_history(doc: &Html) -> Result<StatusHistory, ExtractError> {
    let tables: Vec<ElementRef<'_>> = doc.select(table_selector()).collect();
    let Some(status_table) = tables.get(STATUS_TABLE_INDEX) else {
        return Err(ExtractError::MalformedDocument {
            tables_found: tables.len(),
        });
    };

    let mut events = Vec::new();
    for row in status_table.select(row_selector()).skip(1) {
        let cells: Vec<String> = row.select(data_cell_selector()).map(text_of).collect();
        if cells.len() <= STATUS_CELL {
            continue;
        }

        let status = cells[STATUS_CELL].clone();
        if status.is_empty() {
            continue;
        }

        events.push(StatusEvent {
            status,
            recorded_at: TimestampText::from_cell(&cells[CREATED_CELL]),
        });
    }

    Ok(StatusHistory::new(events))
}

/// Deadline cell from the application-properties table: the table following
/// the properties marker, column whose header contains `deadline`
/// (case-insensitive), first data row. Absent anywhere along the way is a
/// valid outcome, not an error.
pub fn deadline(doc: &Html) -> Option<TimestampText> {
    let marker = doc
        .select(marker_selector())
        .find(|element| text_of(*element).contains(PROPERTIES_MARKER))?;

    let table = next_table_in_document(*marker)?;
    let rows: Vec<ElementRef<'_>> = table.select(row_selector()).collect();
    if rows.len() < 2 {
        return None;
    }

    let headers: Vec<String> = rows[0].select(any_cell_selector()).map(text_of).collect();
    let column = headers
        .iter()
        .position(|header| header.to_lowercase().contains("deadline"))?;

    let cell = rows[1].select(any_cell_selector()).nth(column)?;
    TimestampText::from_cell(&text_of(cell))
}

/// Rows of the notification-queue table, projected to (QueueType, LastError)
/// by header text. No table or no matching columns means no signals.
pub fn error_signals(doc: &Html) -> Vec<ErrorSignal> {
    let Some(table) = find_error_table(doc) else {
        return Vec::new();
    };

    let rows: Vec<ElementRef<'_>> = table.select(row_selector()).collect();
    if rows.len() < 2 {
        return Vec::new();
    }

    let headers: Vec<String> = rows[0].select(any_cell_selector()).map(text_of).collect();
    let queue_type_column = headers.iter().position(|header| header.contains("QueueType"));
    let last_error_column = headers.iter().position(|header| header.contains("LastError"));
    let (Some(queue_type_column), Some(last_error_column)) = (queue_type_column, last_error_column)
    else {
        return Vec::new();
    };

    let mut signals = Vec::new();
    for row in &rows[1..] {
        let cells: Vec<String> = row.select(any_cell_selector()).map(text_of).collect();
        if cells.len() > queue_type_column.max(last_error_column) {
            signals.push(ErrorSignal {
                queue_type: cells[queue_type_column].clone(),
                message: cells[last_error_column].clone(),
            });
        }
    }
    signals
}

/// Locates the notification-queue table through either structural pattern
/// the page is known to use: a sibling table after the marker element's
/// parent, or the next table after a line break followed by the marker text.
fn find_error_table(doc: &Html) -> Option<ElementRef<'_>> {
    if let Some(marker) = doc
        .select(marker_selector())
        .find(|element| text_of(*element).contains(ERROR_QUEUE_MARKER))
    {
        if let Some(parent) = marker.parent() {
            for sibling in parent.next_siblings() {
                if let Some(element) = ElementRef::wrap(sibling) {
                    if element.value().name() == "table" {
                        return Some(element);
                    }
                }
            }
        }
    }

    for line_break in doc.select(line_break_selector()) {
        // The marker after the break may be bare text or wrapped in an
        // element such as `<b>`; match on the subtree text either way.
        let marker_follows = line_break
            .next_sibling()
            .map(|node| match ElementRef::wrap(node) {
                Some(element) => text_of(element).contains(ERROR_QUEUE_MARKER),
                None => node
                    .value()
                    .as_text()
                    .map(|text| text.contains(ERROR_QUEUE_MARKER))
                    .unwrap_or(false),
            })
            .unwrap_or(false);
        if marker_follows {
            if let Some(table) = next_table_in_document(*line_break) {
                return Some(table);
            }
        }
    }

    None
}
