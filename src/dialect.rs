//! Dialect engine
//!
//! Per-backend lexical policy used by the relational translator: identifier
//! quoting, column-name casing, LIKE construction and LIMIT rendering. Every
//! operation is a pure string builder and never fails.
//!
//! Dialects register themselves in a process-wide registry populated at
//! startup; lookups after that point are read-only.

use convert_case::{Case, Casing};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::RwLock;

/// SQL dialect trait for backend-specific text policy
///
/// # Examples
///
/// ```rust
/// use rulesql::{Dialect, MySqlDialect};
///
/// let dialect = MySqlDialect::new();
/// assert_eq!(dialect.escape("user"), "`user`");
/// assert_eq!(dialect.build_column("FirstName"), "first_name");
/// assert_eq!(dialect.build_limit("?", "?"), "LIMIT ?, ?");
/// ```
pub trait Dialect: Send + Sync {
    /// Short dialect identifier used as the registry key (e.g. `"mysql"`).
    fn name(&self) -> &'static str;

    /// Wraps an identifier in backend quoting.
    ///
    /// Idempotent: input that already begins with the quote character is
    /// returned unchanged.
    fn escape(&self, identifier: &str) -> String;

    /// Converts a camel-case field name to the backend column convention.
    fn build_column(&self, field_name: &str) -> String;

    /// Builds the RHS of a substring `LIKE` comparison.
    fn build_contains(&self, expr: &str) -> String;

    /// Builds the RHS of a prefix `LIKE` comparison.
    fn build_starts_with(&self, expr: &str) -> String;

    /// Builds the RHS of a suffix `LIKE` comparison.
    fn build_ends_with(&self, expr: &str) -> String;

    /// Renders a row window clause from already-rendered operands.
    fn build_limit(&self, offset: &str, limit: &str) -> String;

    /// Case-folding wrapper applied for case-insensitive comparisons.
    fn build_ignore_case(&self, expr: &str) -> String {
        format!("LOWER({expr})")
    }

    /// Emptiness test for a column, or `None` when the backend has no
    /// deterministic rendering for it.
    fn build_is_empty(&self, _column: &str, _negated: bool) -> Option<String> {
        None
    }

    /// Regex match expression, or `None` when the backend has no regex
    /// operator.
    fn build_regexp(&self, _column: &str, _expr: &str) -> Option<String> {
        None
    }

    /// Creates a boxed clone of this dialect.
    fn clone_box(&self) -> Box<dyn Dialect>;
}

/// MySQL dialect implementation
///
/// Backtick-quoted identifiers, snake_case columns, `CONCAT`-based LIKE
/// patterns and `LIMIT offset, count` windows.
///
/// # Examples
///
/// ```rust
/// use rulesql::{Dialect, MySqlDialect};
///
/// let dialect = MySqlDialect::new();
/// assert_eq!(dialect.build_contains("?"), "LIKE CONCAT('%',?,'%')");
/// assert_eq!(dialect.escape("`already`"), "`already`");
/// ```
#[derive(Debug, Clone)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn escape(&self, identifier: &str) -> String {
        if identifier.starts_with('`') {
            return identifier.to_string();
        }
        format!("`{identifier}`")
    }

    fn build_column(&self, field_name: &str) -> String {
        field_name.to_case(Case::Snake)
    }

    fn build_contains(&self, expr: &str) -> String {
        format!("LIKE CONCAT('%',{expr},'%')")
    }

    fn build_starts_with(&self, expr: &str) -> String {
        format!("LIKE CONCAT({expr},'%')")
    }

    fn build_ends_with(&self, expr: &str) -> String {
        format!("LIKE CONCAT('%',{expr})")
    }

    fn build_limit(&self, offset: &str, limit: &str) -> String {
        format!("LIMIT {offset}, {limit}")
    }

    fn build_is_empty(&self, column: &str, negated: bool) -> Option<String> {
        let operator = if negated { ">" } else { "=" };
        Some(format!("CHAR_LENGTH({column}) {operator} 0"))
    }

    fn build_regexp(&self, column: &str, expr: &str) -> Option<String> {
        Some(format!("{column} REGEXP {expr}"))
    }

    fn clone_box(&self) -> Box<dyn Dialect> {
        Box::new(self.clone())
    }
}

lazy_static! {
    static ref DIALECTS: RwLock<HashMap<String, Box<dyn Dialect>>> = {
        let mut dialects: HashMap<String, Box<dyn Dialect>> = HashMap::new();
        let mysql = MySqlDialect::new();
        dialects.insert(mysql.name().to_string(), Box::new(mysql));
        RwLock::new(dialects)
    };
}

/// Registers a dialect under its `name()`, replacing any previous entry.
///
/// Intended for startup wiring; registration during steady-state operation is
/// not supported.
pub fn register_dialect(dialect: Box<dyn Dialect>) {
    let mut dialects = DIALECTS.write().expect("dialect registry poisoned");
    dialects.insert(dialect.name().to_string(), dialect);
}

/// Looks up a registered dialect, returning a boxed clone.
pub fn lookup_dialect(name: &str) -> Option<Box<dyn Dialect>> {
    let dialects = DIALECTS.read().expect("dialect registry poisoned");
    dialects.get(name).map(|dialect| dialect.clone_box())
}
