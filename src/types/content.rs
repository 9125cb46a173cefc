use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Type of data validation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ValidationType {
    #[default]
    None,
    Whole,   // Whole number
    Decimal, // Decimal number
    List,    // Dropdown list
    Date,
    Time,
    TextLength,
    Custom, // Custom formula
}

/// Operator for data validation comparisons
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ValidationOperator {
    #[default]
    Between,
    NotBetween,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

/// Data validation rule (a validation domain definition)
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataValidation {
    pub validation_type: ValidationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<ValidationOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula2: Option<String>,
    pub allow_blank: bool,
    pub show_dropdown: bool, // For list type
    pub show_input_message: bool,
    pub show_error_message: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_values: Option<Vec<String>>, // For list type with explicit values (parsed from formula1)
}

impl DataValidation {
    /// A dropdown list domain with inline values.
    #[must_use]
    pub fn list(values: &[&str]) -> Self {
        Self {
            validation_type: ValidationType::List,
            formula1: Some(format!("\"{}\"", values.join(","))),
            allow_blank: true,
            show_dropdown: true,
            show_error_message: true,
            list_values: Some(values.iter().map(|v| (*v).to_string()).collect()),
            ..Self::default()
        }
    }
}

/// Identity of a validation domain registered in a workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainId(pub u32);

/// Opaque handle to a registered validation domain.
///
/// Two handles are equal only when they name the same registered domain
/// object; structurally identical rules registered twice stay distinct.
#[derive(Debug, Clone)]
pub struct DomainRef {
    id: DomainId,
    rule: Rc<DataValidation>,
}

impl DomainRef {
    pub(crate) fn new(id: DomainId, rule: Rc<DataValidation>) -> Self {
        Self { id, rule }
    }

    #[must_use]
    pub fn id(&self) -> DomainId {
        self.id
    }

    #[must_use]
    pub fn rule(&self) -> &DataValidation {
        &self.rule
    }

    /// Whether both handles point at the very same domain object.
    #[must_use]
    pub fn same_object(&self, other: &DomainRef) -> bool {
        Rc::ptr_eq(&self.rule, &other.rule)
    }
}

impl PartialEq for DomainRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.same_object(other)
    }
}

impl Eq for DomainRef {}

/// Validation domain attached to one cell (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCell {
    pub r: u32,
    pub c: u32,
    pub domain: DomainId,
}
