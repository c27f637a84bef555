//! Method-name vocabulary
//!
//! The closed sets recognised by the rule parser: subjects, subject modifiers,
//! predicates, filter modifiers, logic operators and sort directions. Every
//! entry carries its grammar aliases so the parser never hardcodes keywords.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level verb of a derived-query method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Find,
    Count,
    Exists,
    Delete,
}

impl Subject {
    /// All subjects in declaration order.
    pub const ALL: [Subject; 4] = [
        Subject::Find,
        Subject::Count,
        Subject::Exists,
        Subject::Delete,
    ];

    /// Keyword aliases accepted by the grammar. The first alias is canonical.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Subject::Find => &["Find", "Query", "Get", "Search"],
            Subject::Count => &["Count"],
            Subject::Exists => &["Exists"],
            Subject::Delete => &["Delete", "Remove"],
        }
    }

    /// Canonical grammar keyword.
    pub fn keyword(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Whether the subject accepts an ORDER BY segment.
    pub fn sortable(&self) -> bool {
        matches!(self, Subject::Find | Subject::Delete)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Secondary qualifier of a subject
///
/// `Top` limits the result set to the first N rows; its count is carried on
/// the [`Query`](crate::query::Query) rather than the modifier itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectModifier {
    Distinct,
    Top,
}

impl SubjectModifier {
    /// All subject modifiers in declaration order.
    pub const ALL: [SubjectModifier; 2] = [SubjectModifier::Distinct, SubjectModifier::Top];

    /// Keyword aliases accepted by the grammar.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            SubjectModifier::Distinct => &["Distinct"],
            SubjectModifier::Top => &["Top"],
        }
    }

    /// Canonical grammar keyword.
    pub fn keyword(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Whether the modifier may legally qualify `subject`.
    pub fn applies_to(&self, subject: Subject) -> bool {
        match self {
            SubjectModifier::Distinct => matches!(subject, Subject::Find | Subject::Count),
            SubjectModifier::Top => matches!(subject, Subject::Find | Subject::Delete),
        }
    }
}

impl fmt::Display for SubjectModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Comparison operator on a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    IsFalse,
    IsTrue,
    Matches,
    /// Inclusive on both ends.
    Between,
    NotIn,
    In,
    GT,
    LT,
    GTE,
    LTE,
    IsNot,
    Is,
}

impl Predicate {
    /// All predicates in declaration order.
    pub const ALL: [Predicate; 19] = [
        Predicate::Contains,
        Predicate::StartsWith,
        Predicate::EndsWith,
        Predicate::IsNull,
        Predicate::IsNotNull,
        Predicate::IsEmpty,
        Predicate::IsNotEmpty,
        Predicate::IsFalse,
        Predicate::IsTrue,
        Predicate::Matches,
        Predicate::Between,
        Predicate::NotIn,
        Predicate::In,
        Predicate::GT,
        Predicate::LT,
        Predicate::GTE,
        Predicate::LTE,
        Predicate::IsNot,
        Predicate::Is,
    ];

    /// Keyword aliases accepted by the grammar. The first alias is canonical;
    /// the empty alias of `Is` makes it the implicit default predicate.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Predicate::Contains => &["Contains"],
            Predicate::StartsWith => &["StartsWith"],
            Predicate::EndsWith => &["EndsWith"],
            Predicate::IsNull => &["IsNull"],
            Predicate::IsNotNull => &["IsNotNull"],
            Predicate::IsEmpty => &["IsEmpty"],
            Predicate::IsNotEmpty => &["IsNotEmpty"],
            Predicate::IsFalse => &["IsFalse"],
            Predicate::IsTrue => &["IsTrue"],
            Predicate::Matches => &["Matches"],
            Predicate::Between => &["Between"],
            Predicate::NotIn => &["NotIn"],
            Predicate::In => &["In"],
            Predicate::GT => &["GT"],
            Predicate::LT => &["LT"],
            Predicate::GTE => &["GTE"],
            Predicate::LTE => &["LTE"],
            Predicate::IsNot => &["IsNot", "NotEquals", "NE"],
            Predicate::Is => &["Is", "Equals", "EQ", ""],
        }
    }

    /// Canonical grammar keyword.
    pub fn keyword(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Number of bind-value slots the predicate consumes.
    pub fn arity(&self) -> usize {
        match self {
            Predicate::IsNull
            | Predicate::IsNotNull
            | Predicate::IsEmpty
            | Predicate::IsNotEmpty
            | Predicate::IsFalse
            | Predicate::IsTrue => 0,
            Predicate::Between => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Adjustment of comparison semantics, currently case folding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterModifier {
    IgnoreCase,
    AllIgnoreCase,
}

impl FilterModifier {
    /// All filter modifiers in declaration order.
    pub const ALL: [FilterModifier; 2] = [FilterModifier::IgnoreCase, FilterModifier::AllIgnoreCase];

    /// Keyword aliases accepted by the grammar.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            FilterModifier::IgnoreCase => &["IgnoreCase", "IC"],
            FilterModifier::AllIgnoreCase => &["AllIgnoreCase", "AllIC"],
        }
    }

    /// Canonical grammar keyword.
    pub fn keyword(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Whether the modifier applies to every suitable filter of the query
    /// instead of only the filter it is attached to.
    pub fn global(&self) -> bool {
        matches!(self, FilterModifier::AllIgnoreCase)
    }
}

impl fmt::Display for FilterModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Operator joining the members of a filter group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOperator {
    And,
    Or,
}

impl LogicOperator {
    /// Grammar keyword (`And` / `Or`).
    pub fn keyword(&self) -> &'static str {
        match self {
            LogicOperator::And => "And",
            LogicOperator::Or => "Or",
        }
    }

    /// SQL rendering (`AND` / `OR`).
    pub fn sql(&self) -> &'static str {
        match self {
            LogicOperator::And => "AND",
            LogicOperator::Or => "OR",
        }
    }
}

impl fmt::Display for LogicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Sort direction of an ORDER BY entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Grammar keyword (`Asc` / `Desc`).
    pub fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "Asc",
            Direction::Desc => "Desc",
        }
    }

    /// SQL rendering (`ASC` / `DESC`).
    pub fn sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}
