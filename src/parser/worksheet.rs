//! Worksheet parsing - cell values, formulas, merges and data validations.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::{parse_cell_range, parse_cell_ref_bytes};
use crate::data_validation::{parse_data_validation, ParsedValidation};
use crate::error::Result;
use crate::types::{CellData, CellValue, Sheet, SheetId};
use crate::xml_helpers::{attr_string, read_text};

use super::relationships::SheetInfo;

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Default,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        _ => CellTypeTag::Default,
    }
}

/// Raw pieces of one `<c>` element before type resolution.
#[derive(Default)]
struct RawCell {
    value: Option<String>,
    inline: Option<String>,
    formula: Option<String>,
}

fn resolve_value(tag: CellTypeTag, raw: RawCell, shared_strings: &[String]) -> CellValue {
    if let Some(f) = raw.formula.filter(|f| !f.is_empty()) {
        return CellValue::Formula(format!("={f}"));
    }
    if tag == CellTypeTag::Inline {
        return raw.inline.map_or(CellValue::Empty, CellValue::Text);
    }
    let Some(v) = raw.value else {
        return CellValue::Empty;
    };
    match tag {
        CellTypeTag::Shared => v
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| shared_strings.get(idx))
            .map_or(CellValue::Empty, |s| CellValue::Text(s.clone())),
        CellTypeTag::Bool => CellValue::Boolean(v.trim() == "1"),
        CellTypeTag::Str | CellTypeTag::Error | CellTypeTag::Inline => CellValue::Text(v),
        CellTypeTag::Default => v
            .trim()
            .parse::<f64>()
            .map_or(CellValue::Text(v), CellValue::Number),
    }
}

/// Parse a single worksheet. Validations are returned separately because
/// registering their domains needs the whole workbook.
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    info: &SheetInfo,
    shared_strings: &[String],
) -> Result<(Sheet, Vec<ParsedValidation>)> {
    let file = archive.by_name(&info.path)?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);

    let mut sheet = Sheet::new(&info.name, SheetId(info.sheet_id));
    let mut validations = Vec::new();
    let mut buf = Vec::new();
    let mut cell_buf = Vec::new();
    let mut current_row: u32 = 0;
    let mut current_col: u32 = 0;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(_) | Event::Empty(_))) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                let is_start_event = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"row" => {
                        current_row = attr_string(e, b"r")
                            .and_then(|r| r.parse().ok())
                            .unwrap_or(current_row + 1);
                        current_col = 0;
                    }
                    b"c" => {
                        let mut tag = CellTypeTag::Default;
                        let mut pos = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => pos = parse_cell_ref_bytes(&attr.value),
                                b"t" => tag = parse_cell_type_tag(&attr.value),
                                _ => {}
                            }
                        }
                        let (row, col) = pos.unwrap_or((current_row, current_col + 1));
                        current_col = col;

                        // Self-closing cells like <c r="A1" s="3"/> carry no value
                        let mut raw = RawCell::default();
                        if is_start_event {
                            loop {
                                cell_buf.clear();
                                match xml.read_event_into(&mut cell_buf) {
                                    Ok(Event::Start(ref inner)) => {
                                        match inner.local_name().as_ref() {
                                            b"v" => raw.value = Some(read_text(&mut xml, b"v")),
                                            b"f" => raw.formula = Some(read_text(&mut xml, b"f")),
                                            b"is" => raw.inline = Some(read_text(&mut xml, b"is")),
                                            _ => {}
                                        }
                                    }
                                    Ok(Event::End(ref inner))
                                        if inner.local_name().as_ref() == b"c" =>
                                    {
                                        break;
                                    }
                                    Ok(Event::Eof) | Err(_) => break,
                                    _ => {}
                                }
                            }
                        }

                        let value = resolve_value(tag, raw, shared_strings);
                        if row > 0 && col > 0 && !value.is_empty() {
                            sheet.cells.push(CellData { r: row, c: col, value });
                        }
                    }
                    b"mergeCell" => {
                        if let Some(range) = attr_string(e, b"ref").and_then(|r| parse_cell_range(&r))
                        {
                            sheet.merges.push(range);
                        }
                    }
                    b"dataValidation" => {
                        let e = e.to_owned();
                        if let Some(parsed) = parse_data_validation(&e, &mut xml, !is_start_event) {
                            validations.push(parsed);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    sheet.normalize();
    Ok((sheet, validations))
}
