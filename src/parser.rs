//! Rule parser
//!
//! Recognises the method-name grammar and emits a [`Query`] IR:
//!
//! ```text
//! Rule        := Subject [SubjectModifier] [ "By" Filters ] [ "OrderBy" Sorts ]
//! Subject     := one of the Subject keyword aliases
//! SubjectMod  := "Distinct" | ( "Top" <integer> )
//! Filters     := AndGroup ( "Or" AndGroup )*
//! AndGroup    := Filter ( "And" Filter )*
//! Filter      := FieldName [ Predicate ] [ FilterModifier ]
//! Sorts       := ( FieldName [ Direction ] )+
//! Direction   := "Asc" | "Desc"
//! ```
//!
//! Tokenisation is longest-prefix / longest-suffix matching against the
//! closed vocabulary, operating on a single camel-case string with no
//! delimiters. The field name is whatever remains after stripping the
//! trailing modifier and predicate from an AND-part.

use crate::error::{ParseError, ParseResult};
use crate::query::{Filter, FilterGroup, Query, Sort};
use crate::vocab::{Direction, FilterModifier, LogicOperator, Predicate, Subject, SubjectModifier};
use lazy_static::lazy_static;
use regex::Regex;

const KEYWORD_BY: &str = "By";
const KEYWORD_ORDER_BY: &str = "OrderBy";

lazy_static! {
    // The uppercase tail requires the keyword to be followed by a new token,
    // so it is not taken for the prefix of a field name such as "Order".
    static ref OR_SPLIT: Regex = Regex::new("Or[A-Z]+").expect("valid split pattern");
    static ref AND_SPLIT: Regex = Regex::new("And[A-Z]+").expect("valid split pattern");
    static ref ASC_SPLIT: Regex = Regex::new("Asc[A-Z]+").expect("valid split pattern");
    static ref DESC_SPLIT: Regex = Regex::new("Desc[A-Z]+").expect("valid split pattern");

    static ref SUBJECT_PREFIXES: Vec<(&'static str, Subject)> = longest_alias_first(
        Subject::ALL
            .iter()
            .flat_map(|subject| subject.aliases().iter().map(move |alias| (*alias, *subject)))
            .collect(),
    );
    static ref MODIFIER_SUFFIXES: Vec<(&'static str, FilterModifier)> = longest_alias_first(
        FilterModifier::ALL
            .iter()
            .flat_map(|modifier| modifier.aliases().iter().map(move |alias| (*alias, *modifier)))
            .collect(),
    );
    static ref PREDICATE_SUFFIXES: Vec<(&'static str, Predicate)> = longest_alias_first(
        Predicate::ALL
            .iter()
            .flat_map(|predicate| predicate.aliases().iter().map(move |alias| (*alias, *predicate)))
            .collect(),
    );
}

/// Sorts alias tables so the longest alias always wins a match; ties keep
/// declaration order. This keeps suffix matching stable under vocabulary
/// extension.
fn longest_alias_first<T: Copy>(mut aliases: Vec<(&'static str, T)>) -> Vec<(&'static str, T)> {
    aliases.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.len()));
    aliases
}

/// Splits `input` at every non-overlapping `keyword` occurrence that is
/// followed by an uppercase run. A match at position 0 is not a separator,
/// so field names starting with the keyword stay attached. No characters of
/// the non-keyword text are ever dropped.
fn split_by_keyword<'a>(input: &'a str, pattern: &Regex, keyword: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(input) {
        if found.start() == 0 {
            continue;
        }
        parts.push(&input[last..found.start()]);
        last = found.start() + keyword.len();
    }
    parts.push(&input[last..]);
    parts
}

/// Parser of method-name rules
///
/// # Examples
///
/// ```rust
/// use rulesql::{RuleParser, Subject};
///
/// let query = RuleParser::new().parse("FindByIdAndName").unwrap();
/// assert_eq!(query.subject(), Subject::Find);
/// assert_eq!(query.num_values(), 2);
/// ```
#[derive(Debug, Default)]
pub struct RuleParser;

impl RuleParser {
    /// Creates a new rule parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses a method name into a query IR.
    ///
    /// # Errors
    ///
    /// Returns `NoSubject` when the name starts with no subject alias,
    /// `BadTopN` when `Top` lacks a positive count, and `Unparsed` when
    /// trailing text remains after the grammar is consumed, including an
    /// `OrderBy` segment on a non-sortable subject.
    pub fn parse(&self, method: &str) -> ParseResult<Query> {
        let (subject, consumed) = self.parse_subject(method)?;
        let mut remaining = &method[consumed..];

        let (modifier, limit, consumed) = self.parse_subject_modifier(subject, remaining)?;
        remaining = &remaining[consumed..];

        let (filter_group, consumed) = self.parse_filters(remaining);
        remaining = &remaining[consumed..];

        let (sorts, consumed) = if subject.sortable() {
            self.parse_sorts(remaining)
        } else {
            (Vec::new(), 0)
        };
        remaining = &remaining[consumed..];

        if !remaining.is_empty() {
            return Err(ParseError::Unparsed {
                remaining: remaining.to_string(),
            });
        }

        let mut query = Query::new(subject);
        if let Some(modifier) = modifier {
            query = query.with_modifier(modifier);
        }
        if let Some(limit) = limit {
            query = query.with_limit(limit);
        }
        if let Some(group) = filter_group {
            query = query.with_filter_group(group);
        }
        if !sorts.is_empty() {
            query = query.with_sorts(sorts);
        }
        Ok(query)
    }

    fn parse_subject(&self, method: &str) -> ParseResult<(Subject, usize)> {
        for (alias, subject) in SUBJECT_PREFIXES.iter() {
            if method.starts_with(alias) {
                return Ok((*subject, alias.len()));
            }
        }
        let expected = Subject::ALL
            .iter()
            .flat_map(|subject| subject.aliases().iter().copied())
            .collect::<Vec<_>>()
            .join("|");
        Err(ParseError::NoSubject {
            method: method.to_string(),
            expected,
        })
    }

    fn parse_subject_modifier(
        &self,
        subject: Subject,
        input: &str,
    ) -> ParseResult<(Option<SubjectModifier>, Option<u64>, usize)> {
        let mut modifier = None;
        let mut consumed = 0;
        'modifiers: for candidate in SubjectModifier::ALL {
            if !candidate.applies_to(subject) {
                continue;
            }
            for alias in candidate.aliases() {
                if input.starts_with(alias) {
                    modifier = Some(candidate);
                    consumed = alias.len();
                    break 'modifiers;
                }
            }
        }

        let mut limit = None;
        if modifier == Some(SubjectModifier::Top) {
            let rest = &input[consumed..];
            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            let count = rest[..digits_end]
                .parse::<u64>()
                .ok()
                .filter(|count| *count > 0)
                .ok_or_else(|| ParseError::BadTopN {
                    input: input.to_string(),
                })?;
            limit = Some(count);
            consumed += digits_end;
        }
        Ok((modifier, limit, consumed))
    }

    fn parse_filters(&self, input: &str) -> (Option<FilterGroup>, usize) {
        if !input.starts_with(KEYWORD_BY) {
            return (None, 0);
        }
        let (filters_str, consumed) = match input.find(KEYWORD_ORDER_BY) {
            Some(order_by_index) => (&input[KEYWORD_BY.len()..order_by_index], order_by_index),
            None => (&input[KEYWORD_BY.len()..], input.len()),
        };

        let or_parts = split_by_keyword(filters_str, &OR_SPLIT, LogicOperator::Or.keyword());
        if or_parts.len() == 1 {
            return (Some(self.parse_and_group(or_parts[0])), consumed);
        }
        let groups = or_parts
            .into_iter()
            .map(|part| self.parse_and_group(part))
            .collect();
        (Some(FilterGroup::group(groups, LogicOperator::Or)), consumed)
    }

    fn parse_and_group(&self, input: &str) -> FilterGroup {
        let filters = split_by_keyword(input, &AND_SPLIT, LogicOperator::And.keyword())
            .into_iter()
            .map(|part| self.parse_filter(part))
            .collect();
        FilterGroup::leaf(filters, LogicOperator::And)
    }

    fn parse_filter(&self, input: &str) -> Filter {
        let mut rest = input;
        let mut modifier = None;
        for (alias, candidate) in MODIFIER_SUFFIXES.iter() {
            if rest.ends_with(alias) {
                modifier = Some(*candidate);
                rest = &rest[..rest.len() - alias.len()];
                break;
            }
        }

        // The empty alias of `Is` terminates the scan, so a bare field name
        // parses as an implicit equality.
        let mut predicate = Predicate::Is;
        for (alias, candidate) in PREDICATE_SUFFIXES.iter() {
            if rest.ends_with(alias) {
                predicate = *candidate;
                rest = &rest[..rest.len() - alias.len()];
                break;
            }
        }

        let filter = Filter::new(rest, predicate);
        match modifier {
            Some(modifier) => filter.with_modifier(modifier),
            None => filter,
        }
    }

    fn parse_sorts(&self, input: &str) -> (Vec<Sort>, usize) {
        if !input.starts_with(KEYWORD_ORDER_BY) {
            return (Vec::new(), 0);
        }
        let body = &input[KEYWORD_ORDER_BY.len()..];

        let mut parts = Vec::new();
        for asc_part in split_by_keyword(body, &ASC_SPLIT, Direction::Asc.keyword()) {
            for part in split_by_keyword(asc_part, &DESC_SPLIT, Direction::Desc.keyword()) {
                parts.push(part);
            }
        }

        let sorts = parts
            .into_iter()
            .map(|part| {
                if let Some(field) = part.strip_suffix(Direction::Desc.keyword()) {
                    Sort::new(field, Direction::Desc)
                } else if let Some(field) = part.strip_suffix(Direction::Asc.keyword()) {
                    Sort::new(field, Direction::Asc)
                } else {
                    Sort::new(part, Direction::Asc)
                }
            })
            .collect();
        (sorts, input.len())
    }
}
