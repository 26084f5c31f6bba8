//! Error types for the Quire system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every failure in Quire is fatal to the run that produced it: compile
//! errors stop before traversal starts, and runtime errors abort the
//! traversal without emitting any pages.

use std::fmt;

use thiserror::Error;

use crate::types::Type;

/// The main error type for Quire operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating one if needed.
    #[must_use]
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an unbound variable error.
    #[must_use]
    pub fn unbound_variable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundVariable(name.into()))
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(function: impl Into<String>, expected: String, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            function: function.into(),
            expected,
            actual,
        })
    }

    /// Creates a duplicate room error.
    #[must_use]
    pub fn duplicate_room(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateRoom(name.into()))
    }

    /// Creates an unknown room error for a reference made from `from`.
    #[must_use]
    pub fn unknown_room(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownRoom {
            name: name.into(),
            from: from.into(),
        })
    }

    /// Creates a duplicate macro error.
    #[must_use]
    pub fn duplicate_macro(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateMacro(name.into()))
    }

    /// Creates a semantic limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Returns true if this error was raised before traversal began.
    #[must_use]
    pub const fn is_compile_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ParseError { .. }
                | ErrorKind::DuplicateRoom(_)
                | ErrorKind::UnknownRoom { .. }
                | ErrorKind::DuplicateMacro(_)
                | ErrorKind::UndefinedMacro(_)
                | ErrorKind::RecursiveMacro(_)
                | ErrorKind::IllegalWorldAssignment
                | ErrorKind::DuplicateMetadata(_)
                | ErrorKind::UnknownLibrary(_)
                | ErrorKind::UnknownFunction(_)
                | ErrorKind::EmptyProgram
                | ErrorKind::LimitExceeded(SemanticLimit::Nesting { .. })
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Parse error in the gamebook source.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The source line where the error occurred.
        context: String,
    },

    /// Two rooms share a name.
    #[error("duplicate room: {0}")]
    DuplicateRoom(String),

    /// A goto, option or direction names a room that does not exist.
    #[error("unknown room '{name}' referenced from {from}")]
    UnknownRoom {
        /// The room name that could not be resolved.
        name: String,
        /// The room containing the reference.
        from: String,
    },

    /// A macro was defined twice.
    #[error("duplicate macro: {0}")]
    DuplicateMacro(String),

    /// A macro was expanded before (or without) being defined.
    #[error("undefined macro: {0}")]
    UndefinedMacro(String),

    /// A macro expands itself, directly or through other macros.
    #[error("recursive macro expansion: {0}")]
    RecursiveMacro(String),

    /// Assignment to the bare `world` container rather than one of its members.
    #[error("cannot assign to the world container; assign to a member such as world.name")]
    IllegalWorldAssignment,

    /// A metadata tag appeared more than once.
    #[error("duplicate metadata entry: {0}")]
    DuplicateMetadata(String),

    /// A `Library` metadata entry names a module that is not registered.
    #[error("unknown library: {0}")]
    UnknownLibrary(String),

    /// A call names a function no imported library provides.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// The program declares no rooms.
    #[error("program contains no rooms")]
    EmptyProgram,

    /// A local variable was read before being assigned.
    #[error("unbound variable: {0}")]
    UnboundVariable(String),

    /// Type mismatch during runtime type checking.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// Wrong number of arguments to a library function.
    #[error("arity mismatch in {function}: expected {expected}, got {actual}")]
    ArityMismatch {
        /// The function being called.
        function: String,
        /// Description of expected arity.
        expected: String,
        /// Actual number of arguments.
        actual: usize,
    },

    /// Division or remainder by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Dice notation could not be parsed.
    #[error("invalid dice notation: {0}")]
    InvalidDice(String),

    /// A library function rejected its arguments.
    #[error("{function}: {message}")]
    InvalidArgument {
        /// The function being called.
        function: String,
        /// Description of the problem.
        message: String,
    },

    /// Semantic limit exceeded (fatal ceiling).
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Filesystem operation failed.
    #[error("io error: {0}")]
    IoError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Semantic limits whose breach aborts a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// Room handler nesting went past the recursion ceiling.
    RecursionDepth {
        /// The configured limit.
        limit: u32,
        /// The room whose entry breached the limit.
        room: String,
    },
    /// A goto chained into a node that is still being expanded, which
    /// would inline the node into itself forever.
    CyclicGoto {
        /// The room targeted by the goto.
        room: String,
    },
    /// Blocks nested deeper than the front end accepts, usually through
    /// macros that expand inside each other.
    Nesting {
        /// The maximum block depth.
        limit: usize,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecursionDepth { limit, room } => {
                write!(f, "recursion depth ({limit}) exceeded entering room {room}")
            }
            Self::CyclicGoto { room } => {
                write!(f, "goto into room {room} would inline a page into itself")
            }
            Self::Nesting { limit } => write!(f, "blocks nested more than {limit} deep"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Source file or room name.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Column number in source.
    pub column: Option<usize>,
    /// Chain of rooms and handlers, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            line: None,
            column: None,
            stack: Vec::new(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line and column.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let (Some(line), Some(col)) = (self.line, self.column) {
                write!(f, ":{line}:{col}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
