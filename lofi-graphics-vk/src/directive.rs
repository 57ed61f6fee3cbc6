// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Tokenizer and parser of the `#set key = value ...` directive mini-language embedded in
//! shader sources.
//!
//! A directive occupies a whole line:
//!
//! ```text
//! #set <key> = <value> [<value> ...] [// comment]
//! ```
//!
//! Directive lines are commented out in the source that goes to the compiler, everything else
//! is passed through with the stage entry marker renamed to [`ENTRY_SYMBOL`].

use crate::error::PipelineError;
use strum_macros::{AsRefStr, EnumString, VariantNames};

/// Text that starts a directive.
pub const DIRECTIVE_MARKER: &str = "#set";

/// Name every stage entry point is renamed to before compilation.
pub const ENTRY_SYMBOL: &str = "main";

const COMMENT_MARKER: &str = "//";

/// Closed set of directive keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, AsRefStr, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum DirectiveKind {
    Topology,
    PolygonMode,
    CullMode,
    FrontFace,
    DepthWrite,
    DepthTest,
    DepthBias,
    DepthBoundsTest,
    LineWidth,
    VsLocation,
    VsBinding,
    ColorBlend,
    Rt,
    Ds,
}

/// One `#set` line split into its key and values.
#[derive(Clone, Debug, PartialEq)]
pub struct SetterDirective {
    /// 1-based line number in the stage source.
    pub line: usize,
    /// Key exactly as written.
    pub key: String,
    /// Parsed key, `None` if the key is not a known directive.
    pub kind: Option<DirectiveKind>,
    pub values: Vec<String>,
}

/// Result of running the directive parser over one stage source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedSource {
    /// Source that is fed to the compiler.
    pub code: String,
    /// Directives in source order.
    pub directives: Vec<SetterDirective>,
}

fn eat_space(s: &str) -> &str {
    s.trim_start_matches([' ', '\t'])
}

fn eat_word(s: &str) -> Option<(&str, &str)> {
    let end = s.find([' ', '\t']).unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some(s.split_at(end))
    }
}

fn syntax_error(line: usize, message: impl Into<String>) -> PipelineError {
    PipelineError::DirectiveSyntax {
        line,
        message: message.into(),
    }
}

/// Replaces the first occurrence of `entry_marker` in the line with [`ENTRY_SYMBOL`].
pub fn substitute_entry_marker(line: &str, entry_marker: &str) -> String {
    line.replacen(entry_marker, ENTRY_SYMBOL, 1)
}

/// Splits a directive line into key and values. The line must contain [`DIRECTIVE_MARKER`].
pub fn parse_directive_line(text: &str, line: usize) -> Result<SetterDirective, PipelineError> {
    let piece = eat_space(text);

    let piece = match eat_word(piece) {
        Some((DIRECTIVE_MARKER, rest)) => rest,
        _ => return Err(syntax_error(line, "Invalid #set statement.")),
    };

    let (key, piece) = eat_word(eat_space(piece))
        .ok_or_else(|| syntax_error(line, "Invalid #set statement, key is empty."))?;

    let piece = match eat_word(eat_space(piece)) {
        Some(("=", rest)) => rest,
        _ => {
            return Err(syntax_error(
                line,
                format!("Invalid #set statement, missing value after key \"{key}\"."),
            ))
        }
    };

    let mut values = Vec::new();
    let mut piece = eat_space(piece);
    while let Some((word, rest)) = eat_word(piece) {
        if word.starts_with(COMMENT_MARKER) {
            break;
        }
        values.push(word.to_owned());
        piece = eat_space(rest);
    }

    if values.is_empty() {
        return Err(syntax_error(
            line,
            format!("Invalid #set statement, value of key \"{key}\" is empty."),
        ));
    }

    Ok(SetterDirective {
        line,
        key: key.to_owned(),
        kind: key.parse().ok(),
        values,
    })
}

/// Extracts directives from a stage source and produces the code for the compiler.
///
/// Every input line is emitted followed by a newline. A line whose first `#set` is written as
/// `//#set` is kept as is, other directive lines are commented out.
pub fn parse_source(source: &str, entry_marker: &str) -> Result<ParsedSource, PipelineError> {
    let mut parsed = ParsedSource {
        code: String::with_capacity(source.len() + 64),
        directives: Vec::new(),
    };

    for (index, piece) in source.lines().enumerate() {
        let line = index + 1;

        let Some(marker) = piece.find(DIRECTIVE_MARKER) else {
            parsed
                .code
                .push_str(&substitute_entry_marker(piece, entry_marker));
            parsed.code.push('\n');
            continue;
        };

        // Already commented out directive.
        if piece[..marker].ends_with(COMMENT_MARKER) {
            parsed.code.push_str(piece);
            parsed.code.push('\n');
            continue;
        }

        parsed.code.push_str(COMMENT_MARKER);
        parsed.code.push_str(piece);
        parsed.code.push('\n');

        parsed.directives.push(parse_directive_line(piece, line)?);
    }

    Ok(parsed)
}
