//! Error type definitions
//!
//! Defines all error types used in rulesql.

use thiserror::Error;

/// Errors that occur while parsing a method-name rule
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no subject: '{method}' must start with one of [{expected}]")]
    NoSubject { method: String, expected: String },

    #[error("invalid top count in '{input}': n must be greater than 0")]
    BadTopN { input: String },

    #[error("unparsed trailing input: '{remaining}'")]
    Unparsed { remaining: String },
}

/// Errors that occur while binding values to a filter tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FillError {
    #[error("arity mismatch: expected {expected} values, but got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
}

/// Errors that occur during SQL translation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("unsupported subject: '{subject}'")]
    UnsupportedSubject { subject: String },

    #[error("unsupported predicate: '{predicate}'")]
    UnsupportedPredicate { predicate: String },

    #[error("unsupported logic operator: '{operator}'")]
    UnsupportedOperator { operator: String },

    #[error("predicate '{predicate}' is not implemented by dialect '{dialect}'")]
    NotImplemented { predicate: String, dialect: String },
}

/// Errors that occur while rewriting named placeholders
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("malformed named parameter at byte {position}")]
    MalformedName { position: usize },
}

/// Unified error that can occur during the entire derivation process
#[derive(Debug, Error)]
pub enum DeriveError {
    #[error("parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("fill error: {0}")]
    FillError(#[from] FillError),

    #[error("translate error: {0}")]
    TranslateError(#[from] TranslateError),

    #[error("rewrite error: {0}")]
    RewriteError(#[from] RewriteError),
}

/// Result type aliases
pub type ParseResult<T> = Result<T, ParseError>;
pub type FillResult<T> = Result<T, FillError>;
pub type TranslateResult<T> = Result<T, TranslateError>;
pub type RewriteResult<T> = Result<T, RewriteError>;
pub type DeriveResult<T> = Result<T, DeriveError>;
