// Copyright (C) 2026  jmxport contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Exposition errors.

use std::fmt;
use thiserror::Error;

/// Where in the input a parse failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// 1-based line of a text format
    Line(usize),
    /// Byte offset into a binary stream
    Offset(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line(line) => write!(f, "line {}", line),
            Position::Offset(offset) => write!(f, "byte {}", offset),
        }
    }
}

/// What went wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    #[error("metric line has no value")]
    MissingValue,

    #[error("invalid sample value '{0}'")]
    InvalidValue(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("invalid metric name '{0}'")]
    InvalidName(String),

    #[error("unterminated label block")]
    UnterminatedLabels,

    #[error("malformed label: {0}")]
    MalformedLabel(String),

    #[error("unexpected trailing data '{0}'")]
    TrailingData(String),

    #[error("unsupported metric type '{0}'")]
    UnsupportedType(String),

    #[error("missing '# EOF' terminator")]
    MissingEof,

    #[error("input is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid length prefix")]
    InvalidLength,

    #[error("truncated frame: need {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("invalid protobuf message: {0}")]
    InvalidMessage(String),

    #[error("failed to encode: {0}")]
    Encode(String),
}

/// A parse or encode failure and where it happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {position}")]
pub struct FormatError {
    /// Failure kind
    pub kind: FormatErrorKind,
    /// Location in the input
    pub position: Position,
}

impl FormatError {
    /// Error at a text line
    pub fn at_line(kind: FormatErrorKind, line: usize) -> Self {
        Self {
            kind,
            position: Position::Line(line),
        }
    }

    /// Error at a byte offset
    pub fn at_offset(kind: FormatErrorKind, offset: usize) -> Self {
        Self {
            kind,
            position: Position::Offset(offset),
        }
    }
}

/// Result type for exposition operations
pub type FormatResult<T> = Result<T, FormatError>;
