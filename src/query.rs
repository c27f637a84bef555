//! Query intermediate representation
//!
//! The abstract query produced by the rule parser and consumed by the
//! relational translator: subject, modifier, filter tree, sorts, pager and
//! table, plus the value-binding machinery.
//!
//! Binding walks the filter tree in left-to-right depth-first order; the
//! translator renders placeholders in the same order, so the k-th supplied
//! value aligns with the k-th placeholder of the generated SQL.

use crate::error::{FillError, FillResult};
use crate::vocab::{Direction, FilterModifier, LogicOperator, Predicate, Subject, SubjectModifier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar bind value attached to a filter slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Collection value, used with `In` / `NotIn`.
    List(Vec<Scalar>),
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<Vec<Scalar>> for Scalar {
    fn from(values: Vec<Scalar>) -> Self {
        Scalar::List(values)
    }
}

/// Bind slots carried by a filter.
///
/// Positional values and named arguments are mutually exclusive; a later fill
/// replaces whatever binding the filter held before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    Absent,
    Single(Scalar),
    Pair(Scalar, Scalar),
    NamedSingle(String),
    NamedPair(String, String),
}

impl FilterValue {
    /// Whether the slots render as named placeholders.
    pub fn is_named(&self) -> bool {
        matches!(self, FilterValue::NamedSingle(_) | FilterValue::NamedPair(_, _))
    }

    /// Named argument for the given slot index, if any.
    pub fn named_arg(&self, index: usize) -> Option<&str> {
        match (self, index) {
            (FilterValue::NamedSingle(name), 0) => Some(name),
            (FilterValue::NamedPair(name, _), 0) => Some(name),
            (FilterValue::NamedPair(_, name), 1) => Some(name),
            _ => None,
        }
    }
}

/// A single field comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    field_name: String,
    predicate: Predicate,
    modifier: Option<FilterModifier>,
    value: FilterValue,
}

impl Filter {
    /// Creates an unbound filter.
    pub fn new(field_name: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field_name: field_name.into(),
            predicate,
            modifier: None,
            value: FilterValue::Absent,
        }
    }

    /// Attaches a filter modifier, consuming the filter.
    pub fn with_modifier(mut self, modifier: FilterModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    pub fn filter_modifier(&self) -> Option<FilterModifier> {
        self.modifier
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Number of bind-value slots this filter consumes.
    pub fn num_values(&self) -> usize {
        self.predicate.arity()
    }

    /// Binds positional values to this filter alone.
    pub fn fill_values(&mut self, values: Vec<Scalar>) -> FillResult<()> {
        let expected = self.num_values();
        if expected != values.len() {
            return Err(FillError::ArityMismatch {
                expected,
                actual: values.len(),
            });
        }
        self.fill(&mut values.into_iter());
        Ok(())
    }

    fn fill(&mut self, values: &mut std::vec::IntoIter<Scalar>) {
        match self.predicate.arity() {
            0 => {}
            1 => {
                if let Some(value) = values.next() {
                    self.value = FilterValue::Single(value);
                }
            }
            _ => {
                if let (Some(low), Some(high)) = (values.next(), values.next()) {
                    self.value = FilterValue::Pair(low, high);
                }
            }
        }
    }

    fn fill_named(&mut self, names: &mut std::vec::IntoIter<String>) {
        match self.predicate.arity() {
            0 => {}
            1 => {
                if let Some(name) = names.next() {
                    self.value = FilterValue::NamedSingle(name);
                }
            }
            _ => {
                if let (Some(low), Some(high)) = (names.next(), names.next()) {
                    self.value = FilterValue::NamedPair(low, high);
                }
            }
        }
    }

    fn collect_values<'a>(&'a self, out: &mut Vec<&'a Scalar>) {
        match &self.value {
            FilterValue::Single(value) => out.push(value),
            FilterValue::Pair(low, high) => {
                out.push(low);
                out.push(high);
            }
            _ => {}
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field_name, self.predicate)?;
        if let Some(modifier) = self.modifier {
            write!(f, "({modifier})")?;
        }
        Ok(())
    }
}

/// A node of the filter tree
///
/// A leaf joins filters with one logic operator; a group joins sub-groups.
/// A single node never mixes the two shapes, which keeps operator precedence
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterGroup {
    Leaf {
        op: LogicOperator,
        filters: Vec<Filter>,
    },
    Group {
        op: LogicOperator,
        children: Vec<FilterGroup>,
    },
}

impl FilterGroup {
    /// Creates a leaf group of filters.
    pub fn leaf(filters: Vec<Filter>, op: LogicOperator) -> Self {
        FilterGroup::Leaf { op, filters }
    }

    /// Creates a composite group of sub-groups.
    pub fn group(children: Vec<FilterGroup>, op: LogicOperator) -> Self {
        FilterGroup::Group { op, children }
    }

    /// The operator joining this node's direct members.
    pub fn op(&self) -> LogicOperator {
        match self {
            FilterGroup::Leaf { op, .. } => *op,
            FilterGroup::Group { op, .. } => *op,
        }
    }

    /// Number of direct members.
    pub fn len(&self) -> usize {
        match self {
            FilterGroup::Leaf { filters, .. } => filters.len(),
            FilterGroup::Group { children, .. } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of predicate arities over the subtree.
    pub fn num_values(&self) -> usize {
        match self {
            FilterGroup::Leaf { filters, .. } => filters.iter().map(Filter::num_values).sum(),
            FilterGroup::Group { children, .. } => {
                children.iter().map(FilterGroup::num_values).sum()
            }
        }
    }

    /// Binds positional values to the leaf filters in left-to-right
    /// depth-first order. Each filter consumes exactly its predicate arity.
    pub fn fill_values(&mut self, values: Vec<Scalar>) -> FillResult<()> {
        let expected = self.num_values();
        if expected != values.len() {
            return Err(FillError::ArityMismatch {
                expected,
                actual: values.len(),
            });
        }
        self.fill(&mut values.into_iter());
        Ok(())
    }

    /// Binds identifier names instead of values, same ordering and arity
    /// rules as [`fill_values`](Self::fill_values).
    pub fn fill_named_args(&mut self, names: &[&str]) -> FillResult<()> {
        let expected = self.num_values();
        if expected != names.len() {
            return Err(FillError::ArityMismatch {
                expected,
                actual: names.len(),
            });
        }
        let owned: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        self.fill_named(&mut owned.into_iter());
        Ok(())
    }

    fn fill(&mut self, values: &mut std::vec::IntoIter<Scalar>) {
        match self {
            FilterGroup::Leaf { filters, .. } => {
                for filter in filters {
                    filter.fill(values);
                }
            }
            FilterGroup::Group { children, .. } => {
                for child in children {
                    child.fill(values);
                }
            }
        }
    }

    fn fill_named(&mut self, names: &mut std::vec::IntoIter<String>) {
        match self {
            FilterGroup::Leaf { filters, .. } => {
                for filter in filters {
                    filter.fill_named(names);
                }
            }
            FilterGroup::Group { children, .. } => {
                for child in children {
                    child.fill_named(names);
                }
            }
        }
    }

    /// Bound positional values in depth-first order, matching the placeholder
    /// order of the translated SQL.
    pub fn values(&self) -> Vec<&Scalar> {
        let mut out = Vec::new();
        self.collect_values(&mut out);
        out
    }

    fn collect_values<'a>(&'a self, out: &mut Vec<&'a Scalar>) {
        match self {
            FilterGroup::Leaf { filters, .. } => {
                for filter in filters {
                    filter.collect_values(out);
                }
            }
            FilterGroup::Group { children, .. } => {
                for child in children {
                    child.collect_values(out);
                }
            }
        }
    }

    /// Whether any filter in the subtree carries `modifier`.
    pub fn contains_modifier(&self, modifier: FilterModifier) -> bool {
        match self {
            FilterGroup::Leaf { filters, .. } => filters
                .iter()
                .any(|filter| filter.filter_modifier() == Some(modifier)),
            FilterGroup::Group { children, .. } => children
                .iter()
                .any(|child| child.contains_modifier(modifier)),
        }
    }
}

/// Sort entry of an ORDER BY clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    field_name: String,
    direction: Direction,
}

impl Sort {
    pub fn new(field_name: impl Into<String>, direction: Direction) -> Self {
        Self {
            field_name: field_name.into(),
            direction,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field_name, self.direction)
    }
}

/// Target table, optionally schema-qualified
///
/// A query without a table renders the sentinel `$$_table_$$` so the caller
/// can substitute the real name at a later stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    schema: Option<String>,
    name: String,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Qualifies the table with a schema, consuming it.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Page window of a query
///
/// The pager declares two placeholder positions; it does not own bind values.
/// The caller supplies `offset()` and `page_size()` at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
    search_count: bool,
}

impl PageRequest {
    /// Creates a pager. `page` is 1-based.
    pub fn new(page: u64, page_size: u64, search_count: bool) -> Self {
        Self {
            page,
            page_size,
            search_count,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn search_count(&self) -> bool {
        self.search_count
    }

    /// Row offset of the window start.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Limit {}, {}", self.offset(), self.page_size)
    }
}

/// The abstract query
///
/// Immutable after construction except for the value-fill step on contained
/// filters. The `with_*` methods return a copy with one field replaced; the
/// receiver is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    table: Option<Table>,
    subject: Subject,
    modifier: Option<SubjectModifier>,
    limit: Option<u64>,
    filter_group: Option<FilterGroup>,
    sorts: Vec<Sort>,
    pager: Option<PageRequest>,
}

impl Query {
    pub fn new(subject: Subject) -> Self {
        Self {
            table: None,
            subject,
            modifier: None,
            limit: None,
            filter_group: None,
            sorts: Vec::new(),
            pager: None,
        }
    }

    pub fn with_table(&self, table: Table) -> Query {
        Query {
            table: Some(table),
            ..self.clone()
        }
    }

    pub fn with_modifier(&self, modifier: SubjectModifier) -> Query {
        Query {
            modifier: Some(modifier),
            ..self.clone()
        }
    }

    /// Sets the `Top` row limit.
    pub fn with_limit(&self, limit: u64) -> Query {
        Query {
            limit: Some(limit),
            ..self.clone()
        }
    }

    pub fn with_filter_group(&self, filter_group: FilterGroup) -> Query {
        Query {
            filter_group: Some(filter_group),
            ..self.clone()
        }
    }

    pub fn with_sorts(&self, sorts: Vec<Sort>) -> Query {
        Query {
            sorts,
            ..self.clone()
        }
    }

    pub fn with_pager(&self, pager: PageRequest) -> Query {
        Query {
            pager: Some(pager),
            ..self.clone()
        }
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn modifier(&self) -> Option<SubjectModifier> {
        self.modifier
    }

    /// Row limit carried by the `Top` modifier.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn filter_group(&self) -> Option<&FilterGroup> {
        self.filter_group.as_ref()
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn pager(&self) -> Option<&PageRequest> {
        self.pager.as_ref()
    }

    /// Sum of predicate arities over the filter tree.
    pub fn num_values(&self) -> usize {
        self.filter_group
            .as_ref()
            .map_or(0, FilterGroup::num_values)
    }

    /// Binds positional values to the filter tree. See
    /// [`FilterGroup::fill_values`].
    pub fn fill_values(&mut self, values: Vec<Scalar>) -> FillResult<()> {
        match self.filter_group.as_mut() {
            Some(group) => group.fill_values(values),
            None if values.is_empty() => Ok(()),
            None => Err(FillError::ArityMismatch {
                expected: 0,
                actual: values.len(),
            }),
        }
    }

    /// Binds identifier names to the filter tree. See
    /// [`FilterGroup::fill_named_args`].
    pub fn fill_named_args(&mut self, names: &[&str]) -> FillResult<()> {
        match self.filter_group.as_mut() {
            Some(group) => group.fill_named_args(names),
            None if names.is_empty() => Ok(()),
            None => Err(FillError::ArityMismatch {
                expected: 0,
                actual: names.len(),
            }),
        }
    }

    /// Bound positional values in placeholder order.
    pub fn values(&self) -> Vec<&Scalar> {
        self.filter_group
            .as_ref()
            .map_or_else(Vec::new, FilterGroup::values)
    }
}
