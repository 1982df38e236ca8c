//! XLSX input: cell values and formula text via calamine, font flags via the
//! workbook's style part.
//!
//! calamine's value plane does not expose fonts, so the italic/bold/underline
//! flags needed by the formatting-aware interpretation are recovered directly
//! from `xl/styles.xml` (font table + cellXfs) and the sheet XML's per-cell
//! style indices. Style recovery is best-effort: a workbook without a usable
//! style part still loads, it just cannot drive description detection.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use quick_xml::events::Event;
use tracing::{debug, instrument, warn};

use crate::errors::{HierarchyError, HierarchyResult};
use crate::formula::column_index;
use crate::sheet::{Cell, CellStyle, Row, Sheet};

/// Load the first worksheet of an xlsx workbook into the in-memory model.
#[instrument(level = "debug")]
pub fn load_xlsx(path: &Path) -> HierarchyResult<Sheet> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: calamine::XlsxError| HierarchyError::Workbook(e.to_string()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| HierarchyError::NoSheets(path.to_path_buf()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| HierarchyError::Workbook(e.to_string()))?;
    let formulas = workbook
        .worksheet_formula(&sheet_name)
        .map_err(|e| HierarchyError::Workbook(e.to_string()))?;

    // (row, column) -> cell, 0-indexed absolute coordinates
    let mut cells: BTreeMap<u32, BTreeMap<u32, Cell>> = BTreeMap::new();

    if let Some((start_row, start_col)) = range.start() {
        for (i, row) in range.rows().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let text = data_to_text(value);
                if text.is_empty() {
                    continue;
                }
                cells
                    .entry(start_row + i as u32)
                    .or_default()
                    .insert(start_col + j as u32, Cell::text(text));
            }
        }
    }

    if let Some((start_row, start_col)) = formulas.start() {
        for (i, row) in formulas.rows().enumerate() {
            for (j, formula) in row.iter().enumerate() {
                if formula.is_empty() {
                    continue;
                }
                let cell = cells
                    .entry(start_row + i as u32)
                    .or_default()
                    .entry(start_col + j as u32)
                    .or_default();
                cell.formula = Some(format!("={}", formula));
            }
        }
    }

    match read_style_flags(path) {
        Ok(styles) => {
            for ((row, col), style) in styles {
                if let Some(cell) = cells.get_mut(&row).and_then(|r| r.get_mut(&col)) {
                    cell.style = style;
                }
            }
        }
        Err(e) => warn!("style recovery failed, formatting flags unavailable: {}", e),
    }

    let rows = cells
        .into_iter()
        .map(|(row0, columns)| {
            let width = columns.keys().max().map(|&c| c as usize + 1).unwrap_or(0);
            let mut row_cells = vec![Cell::default(); width];
            for (col, cell) in columns {
                row_cells[col as usize] = cell;
            }
            Row::new(row0 + 1, row_cells)
        })
        .filter(|row| !row.is_empty() || row.cells.iter().any(|c| c.formula.is_some()))
        .collect();

    let sheet = Sheet::new(rows);
    debug!(
        "loaded {} rows from sheet {:?} in {}",
        sheet.len(),
        sheet_name,
        path.display()
    );
    Ok(sheet)
}

fn data_to_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Font table entry plus the xf -> font mapping recovered from styles.xml.
struct StylePart {
    fonts: Vec<CellStyle>,
    xf_fonts: Vec<usize>,
}

/// Recover per-cell font flags: `(row, column)` (0-indexed) -> style.
/// Only cells with at least one flag set are returned.
fn read_style_flags(path: &Path) -> HierarchyResult<HashMap<(u32, u32), CellStyle>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let style_part = {
        let styles_xml = archive.by_name("xl/styles.xml")?;
        parse_style_part(BufReader::new(styles_xml))?
    };

    // First worksheet by convention; a miss just means no styling.
    let mut flags = HashMap::new();
    let sheet_xml = match archive.by_name("xl/worksheets/sheet1.xml") {
        Ok(part) => part,
        Err(_) => return Ok(flags),
    };

    let mut reader = quick_xml::Reader::from_reader(BufReader::new(sheet_xml));
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"c" => {
                let mut cell_ref = None;
                let mut style_idx = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"r" => cell_ref = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        b"s" => {
                            style_idx = String::from_utf8_lossy(&attr.value).parse::<usize>().ok()
                        }
                        _ => {}
                    }
                }
                let (cell_ref, style_idx) = match (cell_ref, style_idx) {
                    (Some(r), Some(s)) => (r, s),
                    _ => continue,
                };
                let style = style_part
                    .xf_fonts
                    .get(style_idx)
                    .and_then(|&font_idx| style_part.fonts.get(font_idx));
                if let Some(&style) = style {
                    if !style.is_plain() {
                        if let Some(coord) = parse_cell_ref(&cell_ref) {
                            flags.insert(coord, style);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(HierarchyError::WorkbookXml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(flags)
}

fn parse_style_part(reader: impl std::io::BufRead) -> HierarchyResult<StylePart> {
    let mut xml = quick_xml::Reader::from_reader(reader);
    let mut buf = Vec::new();

    let mut fonts: Vec<CellStyle> = Vec::new();
    let mut xf_fonts: Vec<usize> = Vec::new();
    let mut in_fonts = false;
    let mut in_cell_xfs = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"fonts" => in_fonts = true,
                b"cellXfs" => in_cell_xfs = true,
                b"font" if in_fonts => fonts.push(CellStyle::default()),
                b"i" if in_fonts => {
                    if let Some(font) = fonts.last_mut() {
                        font.italic = flag_value(&e);
                    }
                }
                b"b" if in_fonts => {
                    if let Some(font) = fonts.last_mut() {
                        font.bold = flag_value(&e);
                    }
                }
                b"u" if in_fonts => {
                    if let Some(font) = fonts.last_mut() {
                        font.underline = underline_value(&e);
                    }
                }
                b"xf" if in_cell_xfs => {
                    let font_idx = e
                        .try_get_attribute("fontId")
                        .ok()
                        .flatten()
                        .and_then(|attr| String::from_utf8_lossy(&attr.value).parse::<usize>().ok())
                        .unwrap_or(0);
                    xf_fonts.push(font_idx);
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"fonts" => in_fonts = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(HierarchyError::WorkbookXml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(StylePart { fonts, xf_fonts })
}

/// `<i/>` means set; `<i val="0"/>` / `<i val="false"/>` means unset.
fn flag_value(e: &quick_xml::events::BytesStart) -> bool {
    match e.try_get_attribute("val").ok().flatten() {
        Some(attr) => {
            let val = String::from_utf8_lossy(&attr.value).to_ascii_lowercase();
            val != "0" && val != "false"
        }
        None => true,
    }
}

/// Underline additionally uses `val="none"` for "not underlined".
fn underline_value(e: &quick_xml::events::BytesStart) -> bool {
    match e.try_get_attribute("val").ok().flatten() {
        Some(attr) => {
            let val = String::from_utf8_lossy(&attr.value).to_ascii_lowercase();
            val != "none" && val != "0" && val != "false"
        }
        None => true,
    }
}

/// "B5" -> (4, 1): 0-indexed (row, column).
fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let split = cell_ref.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell_ref.split_at(split);
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    let col = column_index(letters).ok()? as u32;
    Some((row - 1, col))
}
