//! # rulesql
//!
//! A derived-query engine: parses structured method-name rules such as
//! `FindDistinctByIdAndNameContainsOrAgeGTEOrderByFirstnameAscLastnameDesc`
//! into an abstract query representation and translates it into
//! dialect-specific SQL with bind placeholders.
//!
//! ## Usage Example
//!
//! ```rust
//! use rulesql::{Deriver, MySqlDialect};
//!
//! // Create a deriver using the MySQL dialect
//! let deriver = Deriver::new(Box::new(MySqlDialect));
//!
//! // Derive SQL from a method name; without a table the sentinel is emitted
//! let sql = deriver.derive("FindByIdAndName").unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM `$$_table_$$` WHERE ((`id` = ?) AND (`name` = ?))"
//! );
//! ```
//!
//! The pipeline has three independent phases: parse a method name to a
//! [`Query`], optionally fill it with values or named arguments, then
//! translate it through a [`Dialect`]. The [`rewrite_named`] helper converts
//! `:name` placeholders into a driver-native binding scheme afterwards.

pub mod dialect;
pub mod error;
pub mod named;
pub mod parser;
pub mod query;
pub mod translator;
pub mod vocab;

// Re-export public API
pub use crate::dialect::{lookup_dialect, register_dialect, Dialect, MySqlDialect};
pub use crate::error::{
    DeriveError, DeriveResult, FillError, ParseError, RewriteError, TranslateError,
};
pub use crate::named::{bind_type, compile_named, rewrite_named, BindType};
pub use crate::parser::RuleParser;
pub use crate::query::{
    Filter, FilterGroup, FilterValue, PageRequest, Query, Scalar, Sort, Table,
};
pub use crate::translator::RdbTranslator;
pub use crate::vocab::{
    Direction, FilterModifier, LogicOperator, Predicate, Subject, SubjectModifier,
};

/// Main deriver struct
///
/// Provides the primary interface for turning method-name rules into SQL.
pub struct Deriver {
    parser: RuleParser,
    translator: RdbTranslator,
}

impl Deriver {
    /// Creates a new deriver instance.
    ///
    /// # Arguments
    ///
    /// * `dialect` - The SQL dialect to render for
    pub fn new(dialect: Box<dyn Dialect>) -> Self {
        Self {
            parser: RuleParser::new(),
            translator: RdbTranslator::new(dialect),
        }
    }

    /// Creates a deriver from the dialect registry, if the dialect is known.
    pub fn for_dialect(name: &str) -> Option<Self> {
        RdbTranslator::for_dialect(name).map(|translator| Self {
            parser: RuleParser::new(),
            translator,
        })
    }

    /// Derives SQL from a method name.
    ///
    /// # Arguments
    ///
    /// * `method_name` - The method-name rule to convert
    ///
    /// # Returns
    ///
    /// Returns the SQL string on success, DeriveError on failure.
    pub fn derive(&self, method_name: &str) -> DeriveResult<String> {
        let query = self.parse(method_name)?;
        Ok(self.translate(&query)?)
    }

    /// Parses a method name into a query IR.
    pub fn parse(&self, method_name: &str) -> Result<Query, ParseError> {
        self.parser.parse(method_name)
    }

    /// Translates a query IR to SQL.
    pub fn translate(&self, query: &Query) -> Result<String, TranslateError> {
        self.translator.translate(query)
    }
}
