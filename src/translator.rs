//! Relational translator
//!
//! Renders a [`Query`] IR into a dialect-specific SQL string with positional
//! or named bind placeholders. The translator is stateless and re-entrant;
//! placeholders appear in the same left-to-right depth-first order the
//! value-fill step walks the filter tree.

use crate::dialect::{lookup_dialect, Dialect};
use crate::error::{TranslateError, TranslateResult};
use crate::query::{Filter, FilterGroup, PageRequest, Query, Sort, Table};
use crate::vocab::{FilterModifier, Predicate, Subject, SubjectModifier};

/// Translator for relational backends
///
/// # Examples
///
/// ```rust
/// use rulesql::{MySqlDialect, RdbTranslator, RuleParser};
///
/// let query = RuleParser::new().parse("CountByIdAndName").unwrap();
/// let translator = RdbTranslator::new(Box::new(MySqlDialect));
/// let sql = translator.translate(&query).unwrap();
/// assert_eq!(
///     sql,
///     "SELECT COUNT(*) FROM `$$_table_$$` WHERE ((`id` = ?) AND (`name` = ?))"
/// );
/// ```
pub struct RdbTranslator {
    dialect: Box<dyn Dialect>,
}

impl RdbTranslator {
    /// Creates a translator over the given dialect.
    pub fn new(dialect: Box<dyn Dialect>) -> Self {
        Self { dialect }
    }

    /// Creates a translator from the dialect registry.
    pub fn for_dialect(name: &str) -> Option<Self> {
        lookup_dialect(name).map(Self::new)
    }

    /// The dialect this translator renders for.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Renders the query to SQL.
    pub fn translate(&self, query: &Query) -> TranslateResult<String> {
        match query.subject() {
            Subject::Find => self.translate_find(query),
            Subject::Count => self.translate_count(query),
            Subject::Exists => self.translate_exists(query),
            Subject::Delete => self.translate_delete(query),
        }
    }

    fn translate_find(&self, query: &Query) -> TranslateResult<String> {
        let select = match query.modifier() {
            Some(SubjectModifier::Distinct) => "SELECT DISTINCT * FROM ",
            _ => "SELECT * FROM ",
        };
        Ok(assemble(
            select,
            &self.translate_table(query.table()),
            &self.translate_filters(query)?,
            &self.translate_sorts(query.sorts()),
            &self.translate_pager(query.pager()),
        ))
    }

    fn translate_count(&self, query: &Query) -> TranslateResult<String> {
        let select = match query.modifier() {
            Some(SubjectModifier::Distinct) => "SELECT COUNT(DISTINCT *) FROM ",
            _ => "SELECT COUNT(*) FROM ",
        };
        Ok(assemble(
            select,
            &self.translate_table(query.table()),
            &self.translate_filters(query)?,
            "",
            "",
        ))
    }

    fn translate_exists(&self, query: &Query) -> TranslateResult<String> {
        Ok(assemble(
            "SELECT 1 FROM ",
            &self.translate_table(query.table()),
            &self.translate_filters(query)?,
            "",
            &self.dialect.build_limit("0", "1"),
        ))
    }

    fn translate_delete(&self, query: &Query) -> TranslateResult<String> {
        Ok(assemble(
            "DELETE FROM ",
            &self.translate_table(query.table()),
            &self.translate_filters(query)?,
            &self.translate_sorts(query.sorts()),
            &self.translate_pager(query.pager()),
        ))
    }

    /// Renders the table reference, or the `$$_table_$$` sentinel when the
    /// query has no table yet.
    pub fn translate_table(&self, table: Option<&Table>) -> String {
        let dialect = self.dialect.as_ref();
        match table {
            None => dialect.escape("$$_table_$$"),
            Some(table) => match table.schema() {
                Some(schema) => format!(
                    "{}.{}",
                    dialect.escape(schema),
                    dialect.escape(table.name())
                ),
                None => dialect.escape(table.name()),
            },
        }
    }

    fn translate_filters(&self, query: &Query) -> TranslateResult<String> {
        let Some(group) = query.filter_group() else {
            return Ok(String::new());
        };
        let fold_all = group.contains_modifier(FilterModifier::AllIgnoreCase);
        self.translate_filter_group(group, fold_all)
    }

    /// Renders a filter group. Empty groups short-circuit to the empty string
    /// before any operator handling.
    pub fn translate_filter_group(
        &self,
        group: &FilterGroup,
        fold_all: bool,
    ) -> TranslateResult<String> {
        if group.is_empty() {
            return Ok(String::new());
        }

        let mut rendered = Vec::with_capacity(group.len());
        match group {
            FilterGroup::Leaf { filters, .. } => {
                for filter in filters {
                    rendered.push(self.translate_filter(filter, fold_all)?);
                }
            }
            FilterGroup::Group { children, .. } => {
                for child in children {
                    rendered.push(self.translate_filter_group(child, fold_all)?);
                }
            }
        }
        rendered.retain(|fragment| !fragment.is_empty());

        let joined = rendered.join(&format!(" {} ", group.op().sql()));
        if rendered.len() > 1 {
            Ok(format!("({joined})"))
        } else {
            Ok(joined)
        }
    }

    /// Renders one filter, always inside its own parentheses.
    pub fn translate_filter(&self, filter: &Filter, fold_all: bool) -> TranslateResult<String> {
        let dialect = self.dialect.as_ref();
        let column = dialect.escape(&dialect.build_column(filter.field_name()));
        let fold = fold_all || filter.filter_modifier().is_some();
        let folded = |expr: &str| -> String {
            if fold {
                dialect.build_ignore_case(expr)
            } else {
                expr.to_string()
            }
        };

        let rendered = match filter.predicate() {
            Predicate::Is => format!(
                "({} = {})",
                folded(&column),
                folded(&placeholder(filter, 0))
            ),
            Predicate::IsNot => format!(
                "({} != {})",
                folded(&column),
                folded(&placeholder(filter, 0))
            ),
            Predicate::GT => format!("({column} > {})", placeholder(filter, 0)),
            Predicate::LT => format!("({column} < {})", placeholder(filter, 0)),
            Predicate::GTE => format!("({column} >= {})", placeholder(filter, 0)),
            Predicate::LTE => format!("({column} <= {})", placeholder(filter, 0)),
            Predicate::Between => format!(
                "({column} >= {} AND {column} <= {})",
                placeholder(filter, 0),
                placeholder(filter, 1)
            ),
            Predicate::In => format!("({column} in ({}))", placeholder(filter, 0)),
            Predicate::NotIn => format!("({column} NOT IN ({}))", placeholder(filter, 0)),
            Predicate::Contains => format!(
                "({} {})",
                folded(&column),
                dialect.build_contains(&folded(&placeholder(filter, 0)))
            ),
            Predicate::StartsWith => format!(
                "({} {})",
                folded(&column),
                dialect.build_starts_with(&folded(&placeholder(filter, 0)))
            ),
            Predicate::EndsWith => format!(
                "({} {})",
                folded(&column),
                dialect.build_ends_with(&folded(&placeholder(filter, 0)))
            ),
            Predicate::IsNull => format!("({column} IS NULL)"),
            Predicate::IsNotNull => format!("({column} IS NOT NULL)"),
            Predicate::IsTrue => format!("({column})"),
            Predicate::IsFalse => format!("(!{column})"),
            Predicate::IsEmpty => {
                let check = self
                    .dialect
                    .build_is_empty(&column, false)
                    .ok_or_else(|| self.not_implemented(filter.predicate()))?;
                format!("({check})")
            }
            Predicate::IsNotEmpty => {
                let check = self
                    .dialect
                    .build_is_empty(&column, true)
                    .ok_or_else(|| self.not_implemented(filter.predicate()))?;
                format!("({check})")
            }
            Predicate::Matches => {
                let matched = self
                    .dialect
                    .build_regexp(&column, &placeholder(filter, 0))
                    .ok_or_else(|| self.not_implemented(filter.predicate()))?;
                format!("({matched})")
            }
        };
        Ok(rendered)
    }

    fn translate_sorts(&self, sorts: &[Sort]) -> String {
        if sorts.is_empty() {
            return String::new();
        }
        let dialect = self.dialect.as_ref();
        let rendered: Vec<String> = sorts
            .iter()
            .map(|sort| {
                format!(
                    "{} {}",
                    dialect.escape(&dialect.build_column(sort.field_name())),
                    sort.direction().sql()
                )
            })
            .collect();
        format!("ORDER BY {}", rendered.join(", "))
    }

    /// A pager renders two positional placeholders; the caller supplies
    /// offset and page size at execution time.
    fn translate_pager(&self, pager: Option<&PageRequest>) -> String {
        match pager {
            Some(_) => self.dialect.build_limit("?", "?"),
            None => String::new(),
        }
    }

    fn not_implemented(&self, predicate: Predicate) -> TranslateError {
        TranslateError::NotImplemented {
            predicate: predicate.to_string(),
            dialect: self.dialect.name().to_string(),
        }
    }
}

/// Placeholder for one bind slot: `:name` when the filter carries named
/// arguments, `?` otherwise.
fn placeholder(filter: &Filter, index: usize) -> String {
    match filter.value().named_arg(index) {
        Some(name) => format!(":{name}"),
        None => "?".to_string(),
    }
}

fn assemble(select: &str, table: &str, filters: &str, sorts: &str, pager: &str) -> String {
    let mut sql = String::with_capacity(
        select.len() + table.len() + filters.len() + sorts.len() + pager.len() + 8,
    );
    sql.push_str(select);
    sql.push_str(table);
    if !filters.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(filters);
    }
    if !sorts.is_empty() {
        sql.push(' ');
        sql.push_str(sorts);
    }
    if !pager.is_empty() {
        sql.push(' ');
        sql.push_str(pager);
    }
    sql
}
