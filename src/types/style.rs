use serde::{Deserialize, Serialize};

use crate::cell_ref::CellRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HAlign {
    Left,
    Center,
    Right,
}

impl HAlign {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

impl VAlign {
    /// XLSX spelling (`center` rather than `middle`).
    #[must_use]
    pub fn as_xlsx(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "center",
            Self::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderStyle {
    Thin,
    Medium,
    Thick,
}

impl BorderStyle {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Thick => "thick",
        }
    }
}

/// Bottom edge border
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub style: BorderStyle,
    /// RGB hex color like `#000000`
    pub color: String,
}

/// Cosmetic attributes applied to a range. `None` leaves an attribute as-is.
///
/// Formats carry no data semantics; they only feed the XLSX style table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h_align: Option<HAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_align: Option<VAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    /// RGB hex color like `#d9ead3`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_border: Option<Border>,
}

impl RangeFormat {
    /// Alignment + font, the common base applied to every formatted range.
    #[must_use]
    pub fn basic(h_align: HAlign, v_align: VAlign, font_family: &str, font_size: f64) -> Self {
        Self {
            h_align: Some(h_align),
            v_align: Some(v_align),
            font_family: Some(font_family.to_string()),
            font_size: Some(font_size),
            ..Self::default()
        }
    }

    /// Layer `other` on top of `self`; set attributes in `other` win.
    pub fn overlay(&mut self, other: &RangeFormat) {
        if other.h_align.is_some() {
            self.h_align = other.h_align;
        }
        if other.v_align.is_some() {
            self.v_align = other.v_align;
        }
        if other.font_family.is_some() {
            self.font_family.clone_from(&other.font_family);
        }
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.background.is_some() {
            self.background.clone_from(&other.background);
        }
        if other.bottom_border.is_some() {
            self.bottom_border.clone_from(&other.bottom_border);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A format applied to a range, in application order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatRun {
    pub range: CellRange,
    pub format: RangeFormat,
}
