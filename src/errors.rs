/*!
Structured error values for [`polemic`][crate].

There are two distinct families here. [`InvalidArgumentParams`] reports
misuse of the build API (a bad name shape, a duplicate subcommand); it's a
programmer error unrelated to user input, and should abort setup.
[`ParseError`] reports everything that can go wrong while walking a token
list, and carries enough context (the offending token, parser, and
argument) for a caller to render a precise diagnostic and echo usage text.
*/

use thiserror::Error;

use crate::{Category, argument::ArgumentId, parser::ParserRef};

/**
The build API was misused: an argument spec had an invalid name shape, a
subcommand name was registered twice, or a second subparser group was
attached to one node. These are logic errors, never triggered by the
command line being parsed.
*/
#[derive(Debug, Clone, Error)]
#[error("invalid argument parameters: {message}")]
pub struct InvalidArgumentParams {
    message: &'static str,
}

impl InvalidArgumentParams {
    pub(crate) fn new(message: &'static str) -> Self {
        Self { message }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        self.message
    }
}

/// What went wrong during a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A flag, positional, or subcommand word matched nothing visible.
    #[error("unknown argument: {token:?}")]
    UnknownArgument { token: String },

    /// A value-wanting argument reached the end of the input with no value
    /// to take.
    #[error("missing value for argument {spelling:?}")]
    MissingArgumentValue { spelling: String },

    /// A value was supplied where none was wanted, or a bare word didn't
    /// name a known subcommand.
    #[error("invalid argument value: {text:?}")]
    InvalidArgumentValue { text: String },

    /// A non-repeatable argument matched a second time.
    #[error("argument {spelling:?} was given more than once")]
    InvalidArgumentRepetition { spelling: String },

    /// A required argument or required subcommand was absent at the end of
    /// the parse.
    #[error("missing required argument {name:?}")]
    MissingArgument { name: String },

    /**
    A help trigger was found among the remaining tokens. Not a failure: a
    control signal that takes priority over every other parse error, so
    that a dangling `--help` after an otherwise-fatal token still surfaces
    help instead of the error.
    */
    #[error("usage message was requested")]
    HelpRequested { category: Category },
}

/**
An error raised partway through a parse. The parse aborts at the first
fatal token; handlers already invoked for earlier tokens are not rolled
back.
*/
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ErrorKind,

    /// The token that was being processed, when there was one. Absent for
    /// finalization errors, which are raised after the input is exhausted.
    pub word: Option<String>,

    /// The parser at the tip of the chain when the error was raised.
    pub parser: ParserRef,

    /// The offending argument, when the error involves one.
    pub argument: Option<ArgumentId>,
}

impl ParseError {
    /// The requested help category, if this "error" is actually a help
    /// request. Callers should check this before treating the parse as
    /// failed.
    #[must_use]
    pub fn help_request(&self) -> Option<Category> {
        match self.kind {
            ErrorKind::HelpRequested { category } => Some(category),
            _ => None,
        }
    }
}
