//! Named-parameter rewriter
//!
//! Converts `:name` placeholders in a SQL string into the bind-variable
//! scheme native to a database driver, returning the rewritten query plus the
//! parameter names in binding order.
//!
//! `::` is an escape for a literal colon and `:=` stays a two-character
//! literal; any other stray `:` is malformed.

use crate::error::{RewriteError, RewriteResult};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Placeholder scheme a driver expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindType {
    /// `?` — mysql, sqlite3 and friends.
    Question,
    /// `$1, $2, …` — the postgres family.
    Dollar,
    /// `:name` preserved — the oracle family.
    Named,
    /// `@p1, @p2, …` — sqlserver.
    At,
}

lazy_static! {
    static ref DRIVER_BINDS: HashMap<&'static str, BindType> = {
        let mut drivers = HashMap::new();
        for driver in ["mysql", "sqlite3", "nrmysql", "nrsqlite3"] {
            drivers.insert(driver, BindType::Question);
        }
        for driver in [
            "postgres",
            "pgx",
            "pq-timeouts",
            "cloudsqlpostgres",
            "ql",
            "nrpostgres",
            "cockroach",
        ] {
            drivers.insert(driver, BindType::Dollar);
        }
        for driver in ["oci8", "ora", "goracle", "godror"] {
            drivers.insert(driver, BindType::Named);
        }
        drivers.insert("sqlserver", BindType::At);
        drivers
    };
}

/// Returns the bind type for a driver name. Unknown drivers fall back to
/// positional `?` placeholders.
pub fn bind_type(driver: &str) -> BindType {
    DRIVER_BINDS.get(driver).copied().unwrap_or(BindType::Question)
}

/// Rewrites `:name` placeholders to the scheme of `driver`.
///
/// Returns the rewritten query and the parameter names in the order a caller
/// must bind values for positional schemes.
///
/// # Examples
///
/// ```rust
/// use rulesql::rewrite_named;
///
/// let (sql, names) =
///     rewrite_named("SELECT * FROM `user` WHERE (`id` = :id)", "postgres").unwrap();
/// assert_eq!(sql, "SELECT * FROM `user` WHERE (`id` = $1)");
/// assert_eq!(names, vec!["id".to_string()]);
/// ```
pub fn rewrite_named(sql: &str, driver: &str) -> RewriteResult<(String, Vec<String>)> {
    compile_named(sql, bind_type(driver))
}

/// Rewrites `:name` placeholders to an explicit bind type.
pub fn compile_named(sql: &str, bind: BindType) -> RewriteResult<(String, Vec<String>)> {
    let mut rebound = String::with_capacity(sql.len());
    let mut names = Vec::new();
    let mut ordinal = 1usize;
    let mut chars = sql.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        if c != ':' {
            rebound.push(c);
            continue;
        }
        // '::' escapes to a single literal ':'
        if matches!(chars.peek(), Some((_, ':'))) {
            chars.next();
            rebound.push(':');
            continue;
        }
        // ':=' is an assignment operator, not a parameter start
        if matches!(chars.peek(), Some((_, '='))) {
            chars.next();
            rebound.push_str(":=");
            continue;
        }

        let mut name = String::new();
        while let Some((_, next)) = chars.peek() {
            if next.is_alphanumeric() || *next == '_' || *next == '.' {
                name.push(*next);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(RewriteError::MalformedName { position });
        }
        // a ':' directly after a name is an error, not a new parameter
        if let Some((next_position, ':')) = chars.peek() {
            return Err(RewriteError::MalformedName {
                position: *next_position,
            });
        }

        match bind {
            BindType::Named => {
                rebound.push(':');
                rebound.push_str(&name);
            }
            BindType::Question => rebound.push('?'),
            BindType::Dollar => {
                rebound.push('$');
                rebound.push_str(&ordinal.to_string());
                ordinal += 1;
            }
            BindType::At => {
                rebound.push_str("@p");
                rebound.push_str(&ordinal.to_string());
                ordinal += 1;
            }
        }
        names.push(name);
    }

    Ok((rebound, names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const QUERY: &str = "SELECT * FROM `user` WHERE (`id` = :id) AND (`name` = :name)";

    #[test]
    fn test_question_bind() {
        let (sql, names) = rewrite_named(QUERY, "mysql").unwrap();
        assert_eq!(sql, "SELECT * FROM `user` WHERE (`id` = ?) AND (`name` = ?)");
        assert_eq!(names, vec!["id".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_dollar_bind() {
        let (sql, names) = rewrite_named(QUERY, "pgx").unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `user` WHERE (`id` = $1) AND (`name` = $2)"
        );
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_named_bind_is_preserved() {
        let (sql, names) = rewrite_named(QUERY, "oci8").unwrap();
        assert_eq!(sql, QUERY);
        assert_eq!(names, vec!["id".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_at_bind() {
        let (sql, _) = rewrite_named(QUERY, "sqlserver").unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `user` WHERE (`id` = @p1) AND (`name` = @p2)"
        );
    }

    #[test]
    fn test_unknown_driver_defaults_to_question() {
        assert_eq!(bind_type("no-such-driver"), BindType::Question);
        let (sql, _) = rewrite_named("WHERE a = :a", "no-such-driver").unwrap();
        assert_eq!(sql, "WHERE a = ?");
    }

    #[test]
    fn test_driver_table() {
        for driver in ["mysql", "sqlite3", "nrmysql", "nrsqlite3"] {
            assert_eq!(bind_type(driver), BindType::Question, "{driver}");
        }
        for driver in [
            "postgres",
            "pgx",
            "pq-timeouts",
            "cloudsqlpostgres",
            "ql",
            "nrpostgres",
            "cockroach",
        ] {
            assert_eq!(bind_type(driver), BindType::Dollar, "{driver}");
        }
        for driver in ["oci8", "ora", "goracle", "godror"] {
            assert_eq!(bind_type(driver), BindType::Named, "{driver}");
        }
        assert_eq!(bind_type("sqlserver"), BindType::At);
    }

    #[test]
    fn test_double_colon_is_literal() {
        let (sql, names) = rewrite_named("SELECT a::text FROM t WHERE b = :b", "postgres").unwrap();
        assert_eq!(sql, "SELECT a:text FROM t WHERE b = $1");
        assert_eq!(names, vec!["b".to_string()]);
    }

    #[test]
    fn test_colon_equals_is_literal() {
        let (sql, names) = rewrite_named("SET @x := 1 WHERE a = :a", "mysql").unwrap();
        assert_eq!(sql, "SET @x := 1 WHERE a = ?");
        assert_eq!(names, vec!["a".to_string()]);
    }

    #[test]
    fn test_name_at_end_of_input() {
        let (sql, names) = rewrite_named("WHERE a = :a", "mysql").unwrap();
        assert_eq!(sql, "WHERE a = ?");
        assert_eq!(names, vec!["a".to_string()]);
    }

    #[test]
    fn test_dotted_and_underscored_names() {
        let (sql, names) = rewrite_named("WHERE u.name = :u.first_name", "mysql").unwrap();
        assert_eq!(sql, "WHERE u.name = ?");
        assert_eq!(names, vec!["u.first_name".to_string()]);
    }

    #[test]
    fn test_unicode_names() {
        let (sql, names) = rewrite_named("WHERE name = :名前", "postgres").unwrap();
        assert_eq!(sql, "WHERE name = $1");
        assert_eq!(names, vec!["名前".to_string()]);
    }

    #[test]
    fn test_stray_colon_is_malformed() {
        assert_eq!(
            rewrite_named("WHERE a = : 1", "mysql").unwrap_err(),
            RewriteError::MalformedName { position: 10 }
        );
        assert!(rewrite_named("WHERE a = :", "mysql").is_err());
    }

    #[test]
    fn test_colon_inside_name_is_malformed() {
        assert!(rewrite_named("WHERE a = :a:b", "mysql").is_err());
    }

    #[test]
    fn test_repeated_name_binds_twice() {
        let (sql, names) =
            rewrite_named("WHERE a = :v OR b = :v", "postgres").unwrap();
        assert_eq!(sql, "WHERE a = $1 OR b = $2");
        assert_eq!(names, vec!["v".to_string(), "v".to_string()]);
    }
}
