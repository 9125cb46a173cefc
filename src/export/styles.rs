//! Style table built from the format runs of every sheet.
//!
//! Each distinct effective [`RangeFormat`] becomes one `cellXfs` entry;
//! fonts, fills and borders are deduplicated the same way.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::types::{Border, RangeFormat, Sheet};
use crate::xml_helpers::escape;

const DEFAULT_FONT: &str = "Calibri";
const DEFAULT_SIZE: f64 = 11.0;

#[derive(Debug, Clone, PartialEq)]
struct Font {
    family: String,
    size: f64,
    bold: bool,
}

/// Interned formats; index 0 is the unstyled default.
#[derive(Debug, Default)]
pub(crate) struct StyleTable {
    formats: Vec<RangeFormat>,
}

impl StyleTable {
    pub(crate) fn new() -> Self {
        Self {
            formats: vec![RangeFormat::default()],
        }
    }

    fn intern(&mut self, format: RangeFormat) -> u32 {
        let idx = match self.formats.iter().position(|f| *f == format) {
            Some(idx) => idx,
            None => {
                self.formats.push(format);
                self.formats.len() - 1
            }
        };
        u32::try_from(idx).unwrap_or(0)
    }

    /// Style index per cell of `sheet`, applying its runs in order.
    pub(crate) fn resolve_sheet(&mut self, sheet: &Sheet) -> BTreeMap<(u32, u32), u32> {
        let mut effective: BTreeMap<(u32, u32), RangeFormat> = BTreeMap::new();
        for run in &sheet.formats {
            for row in run.range.start_row..=run.range.end_row {
                for col in run.range.start_col..=run.range.end_col {
                    effective
                        .entry((row, col))
                        .or_default()
                        .overlay(&run.format);
                }
            }
        }
        effective
            .into_iter()
            .map(|(pos, format)| (pos, self.intern(format)))
            .collect()
    }

    /// Complete `xl/styles.xml`.
    pub(crate) fn to_xml(&self) -> String {
        let mut fonts: Vec<Font> = vec![Font {
            family: DEFAULT_FONT.to_string(),
            size: DEFAULT_SIZE,
            bold: false,
        }];
        let mut fills: Vec<String> = Vec::new();
        let mut borders: Vec<Border> = Vec::new();
        let mut xfs = String::new();

        for format in &self.formats {
            let font = Font {
                family: format
                    .font_family
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FONT.to_string()),
                size: format.font_size.unwrap_or(DEFAULT_SIZE),
                bold: format.bold.unwrap_or(false),
            };
            let font_id = position_or_push(&mut fonts, font);
            // fills 0 and 1 are the reserved none / gray125 patterns
            let fill_id = format
                .background
                .as_ref()
                .map_or(0, |bg| position_or_push(&mut fills, bg.clone()) + 2);
            let border_id = format
                .bottom_border
                .as_ref()
                .map_or(0, |b| position_or_push(&mut borders, b.clone()) + 1);

            let _ = write!(
                xfs,
                r#"<xf numFmtId="0" fontId="{font_id}" fillId="{fill_id}" borderId="{border_id}" xfId="0""#
            );
            if font_id > 0 {
                xfs.push_str(r#" applyFont="1""#);
            }
            if fill_id > 0 {
                xfs.push_str(r#" applyFill="1""#);
            }
            if border_id > 0 {
                xfs.push_str(r#" applyBorder="1""#);
            }
            if format.h_align.is_none() && format.v_align.is_none() {
                xfs.push_str("/>");
                continue;
            }
            xfs.push_str(r#" applyAlignment="1"><alignment"#);
            if let Some(h) = format.h_align {
                let _ = write!(xfs, r#" horizontal="{}""#, h.as_str());
            }
            if let Some(v) = format.v_align {
                let _ = write!(xfs, r#" vertical="{}""#, v.as_xlsx());
            }
            xfs.push_str("/></xf>");
        }

        let mut out = String::with_capacity(2048);
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        let _ = write!(out, r#"<fonts count="{}">"#, fonts.len());
        for font in &fonts {
            out.push_str("<font>");
            if font.bold {
                out.push_str("<b/>");
            }
            let _ = write!(
                out,
                r#"<sz val="{}"/><name val="{}"/></font>"#,
                font.size,
                escape(&font.family)
            );
        }
        out.push_str("</fonts>");

        let _ = write!(
            out,
            r#"<fills count="{}"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill>"#,
            fills.len() + 2
        );
        for bg in &fills {
            let _ = write!(
                out,
                r#"<fill><patternFill patternType="solid"><fgColor rgb="{}"/><bgColor indexed="64"/></patternFill></fill>"#,
                argb(bg)
            );
        }
        out.push_str("</fills>");

        let _ = write!(
            out,
            r#"<borders count="{}"><border><left/><right/><top/><bottom/><diagonal/></border>"#,
            borders.len() + 1
        );
        for border in &borders {
            let _ = write!(
                out,
                r#"<border><left/><right/><top/><bottom style="{}"><color rgb="{}"/></bottom><diagonal/></border>"#,
                border.style.as_str(),
                argb(&border.color)
            );
        }
        out.push_str("</borders>");

        out.push_str(
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
        );
        let _ = write!(out, r#"<cellXfs count="{}">{xfs}</cellXfs>"#, self.formats.len());
        out.push_str(
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
        );
        out.push_str("</styleSheet>");
        out
    }
}

fn position_or_push<T: PartialEq>(items: &mut Vec<T>, item: T) -> usize {
    if let Some(idx) = items.iter().position(|i| *i == item) {
        return idx;
    }
    items.push(item);
    items.len() - 1
}

/// `#d9ead3` -> `FFD9EAD3`
fn argb(color: &str) -> String {
    let hex = color.trim_start_matches('#').to_ascii_uppercase();
    if hex.len() == 6 {
        format!("FF{hex}")
    } else {
        hex
    }
}
