//! Data validation (validation domain) reading and writing.
//!
//! Each `<dataValidation>` element becomes one registered domain, and every
//! cell of its `sqref` references that same domain. Writing reverses this:
//! cells sharing a domain are grouped back into one element with a
//! multi-range `sqref`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::BufRead;

use crate::cell_ref::{parse_sqref, CellRange};
use crate::types::{
    DataValidation, DomainId, Sheet, ValidationOperator, ValidationType, Workbook,
};
use crate::xml_helpers::{attr_bool_default, attr_string, escape, read_text};

/// Largest number of cells one imported validation range may cover. Whole
/// column validations are clipped to this many rows.
pub const MAX_VALIDATION_ROWS: u32 = 10_000;

/// A parsed `<dataValidation>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedValidation {
    pub ranges: Vec<CellRange>,
    pub rule: DataValidation,
}

/// Parse a `<dataValidation>` element and its `formula1`/`formula2` children.
///
/// # Example XML
/// ```xml
/// <dataValidation type="list" allowBlank="1" showErrorMessage="1" sqref="D3:D6 D9:D11">
///   <formula1>"Yes,No"</formula1>
/// </dataValidation>
/// ```
///
/// Returns `None` when `sqref` is missing or holds no valid range.
pub fn parse_data_validation<R: BufRead>(
    e: &BytesStart,
    xml: &mut Reader<R>,
    is_empty: bool,
) -> Option<ParsedValidation> {
    let sqref = attr_string(e, b"sqref").unwrap_or_default();
    let non_empty = |s: Option<String>| s.filter(|v| !v.is_empty());
    let mut rule = DataValidation {
        validation_type: attr_string(e, b"type")
            .map_or(ValidationType::None, |s| parse_validation_type(&s)),
        operator: attr_string(e, b"operator").map(|s| parse_validation_operator(&s)),
        allow_blank: attr_bool_default(e, b"allowBlank", false),
        // showDropDown="1" means the in-cell dropdown is hidden
        show_dropdown: !attr_bool_default(e, b"showDropDown", false),
        show_input_message: attr_bool_default(e, b"showInputMessage", false),
        show_error_message: attr_bool_default(e, b"showErrorMessage", false),
        error_title: non_empty(attr_string(e, b"errorTitle")),
        error_message: non_empty(attr_string(e, b"error")),
        prompt_title: non_empty(attr_string(e, b"promptTitle")),
        prompt_message: non_empty(attr_string(e, b"prompt")),
        ..DataValidation::default()
    };

    if !is_empty {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(ref inner)) => match inner.local_name().as_ref() {
                    b"formula1" => rule.formula1 = Some(read_text(xml, b"formula1")),
                    b"formula2" => rule.formula2 = Some(read_text(xml, b"formula2")),
                    _ => {}
                },
                Ok(Event::End(ref inner)) if inner.local_name().as_ref() == b"dataValidation" => {
                    break;
                }
                Ok(Event::Eof) | Err(_) => break,
                _ => {}
            }
        }
    }

    let ranges = parse_sqref(&sqref);
    if ranges.is_empty() {
        return None;
    }
    if rule.validation_type == ValidationType::List {
        rule.list_values = rule.formula1.as_deref().and_then(parse_list_values);
    }
    Some(ParsedValidation { ranges, rule })
}

/// Register `parsed` as one domain and attach it to every cell it covers.
pub fn attach(workbook: &mut Workbook, sheet: &str, parsed: ParsedValidation) -> DomainId {
    let domain = workbook.register_domain(parsed.rule);
    if let Some(s) = workbook.sheet_mut(sheet) {
        for range in &parsed.ranges {
            let end_row = range.end_row.min(range.start_row + MAX_VALIDATION_ROWS - 1);
            if end_row < range.end_row {
                tracing::warn!(sheet, range = %range, "clipping validation range");
            }
            for row in range.start_row..=end_row {
                for col in range.start_col..=range.end_col {
                    s.put_domain(row, col, domain.id());
                }
            }
        }
    }
    domain.id()
}

/// `<dataValidations>` block for `sheet`, or an empty string when the sheet
/// has no validated cells.
#[must_use]
pub fn data_validations_xml(workbook: &Workbook, sheet: &Sheet) -> String {
    let mut by_domain: BTreeMap<DomainId, Vec<CellRange>> = BTreeMap::new();
    for cell in &sheet.validations {
        let ranges = by_domain.entry(cell.domain).or_default();
        // validations are sorted row-major: extend a vertical run when possible
        match ranges
            .iter_mut()
            .find(|r| r.start_col == cell.c && r.end_col == cell.c && r.end_row + 1 == cell.r)
        {
            Some(run) => run.end_row = cell.r,
            None => ranges.push(CellRange::cell(cell.r, cell.c)),
        }
    }
    if by_domain.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = write!(out, r#"<dataValidations count="{}">"#, by_domain.len());
    for (id, ranges) in &by_domain {
        let Some(domain) = workbook.domain(*id) else {
            continue;
        };
        let rule = domain.rule();
        let sqref = ranges
            .iter()
            .map(CellRange::to_a1)
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str("<dataValidation");
        if let Some(t) = validation_type_str(rule.validation_type) {
            let _ = write!(out, r#" type="{t}""#);
        }
        if let Some(op) = rule.operator {
            let _ = write!(out, r#" operator="{}""#, validation_operator_str(op));
        }
        let flag = |b: bool| if b { "1" } else { "0" };
        let _ = write!(
            out,
            r#" allowBlank="{}" showDropDown="{}" showInputMessage="{}" showErrorMessage="{}""#,
            flag(rule.allow_blank),
            flag(!rule.show_dropdown),
            flag(rule.show_input_message),
            flag(rule.show_error_message)
        );
        let texts = [
            ("errorTitle", &rule.error_title),
            ("error", &rule.error_message),
            ("promptTitle", &rule.prompt_title),
            ("prompt", &rule.prompt_message),
        ];
        for (name, value) in texts {
            if let Some(v) = value {
                let _ = write!(out, r#" {name}="{}""#, escape(v));
            }
        }
        let _ = write!(out, r#" sqref="{sqref}">"#);
        if let Some(f) = &rule.formula1 {
            let _ = write!(out, "<formula1>{}</formula1>", escape(f));
        }
        if let Some(f) = &rule.formula2 {
            let _ = write!(out, "<formula2>{}</formula2>", escape(f));
        }
        out.push_str("</dataValidation>");
    }
    out.push_str("</dataValidations>");
    out
}

fn parse_validation_type(s: &str) -> ValidationType {
    match s {
        "whole" => ValidationType::Whole,
        "decimal" => ValidationType::Decimal,
        "list" => ValidationType::List,
        "date" => ValidationType::Date,
        "time" => ValidationType::Time,
        "textLength" => ValidationType::TextLength,
        "custom" => ValidationType::Custom,
        _ => ValidationType::None,
    }
}

fn validation_type_str(t: ValidationType) -> Option<&'static str> {
    Some(match t {
        ValidationType::None => return None,
        ValidationType::Whole => "whole",
        ValidationType::Decimal => "decimal",
        ValidationType::List => "list",
        ValidationType::Date => "date",
        ValidationType::Time => "time",
        ValidationType::TextLength => "textLength",
        ValidationType::Custom => "custom",
    })
}

fn parse_validation_operator(s: &str) -> ValidationOperator {
    match s {
        "notBetween" => ValidationOperator::NotBetween,
        "equal" => ValidationOperator::Equal,
        "notEqual" => ValidationOperator::NotEqual,
        "lessThan" => ValidationOperator::LessThan,
        "lessThanOrEqual" => ValidationOperator::LessThanOrEqual,
        "greaterThan" => ValidationOperator::GreaterThan,
        "greaterThanOrEqual" => ValidationOperator::GreaterThanOrEqual,
        _ => ValidationOperator::Between,
    }
}

fn validation_operator_str(op: ValidationOperator) -> &'static str {
    match op {
        ValidationOperator::Between => "between",
        ValidationOperator::NotBetween => "notBetween",
        ValidationOperator::Equal => "equal",
        ValidationOperator::NotEqual => "notEqual",
        ValidationOperator::LessThan => "lessThan",
        ValidationOperator::LessThanOrEqual => "lessThanOrEqual",
        ValidationOperator::GreaterThan => "greaterThan",
        ValidationOperator::GreaterThanOrEqual => "greaterThanOrEqual",
    }
}

/// Inline list values from `formula1`, e.g. `"Yes,No"`. Cell-range sources
/// like `$A$1:$A$10` are kept only as the formula.
fn parse_list_values(formula: &str) -> Option<Vec<String>> {
    let inner = formula.trim().strip_prefix('"')?.strip_suffix('"')?;
    let values: Vec<String> = inner
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}
