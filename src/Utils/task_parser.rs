/// Parses task documents of the form
///
/// ```text
/// // comments start with //, #, % or ;
/// settings
///     loglevel: info
/// bisection
///     fx: x^2 - 2
///     a: 1
///     b: 2
///     tol: 1e-6
/// jacobi
///     A: 4, 1; 1, 3
///     b: 1, 2
/// ```
///
/// A title on a line of its own opens a section; every following `key: value` line belongs
/// to it. A title may repeat, so the document is an ordered list of sections rather than a
/// map. Values stay text until a typed accessor of [`TaskSection`] reads them: lists are
/// separated by `,`, matrix rows by `;`, and numbers may be constant expressions such as
/// `pi/4`.
use crate::numerical::solver_outcome::IterationControl;
use crate::symbolic::symbolic_engine::Expr;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, space0},
    combinator::{all_consuming, map, recognize, rest},
    multi::{many0, separated_list1},
    sequence::{delimited, pair},
};
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error("the task document has no sections")]
    Empty,
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },
    #[error("unknown task '{0}'")]
    UnknownTask(String),
    #[error("task '{task}' needs the key '{key}'")]
    MissingKey { task: String, key: String },
    #[error("task '{task}', key '{key}': {reason}")]
    InvalidValue {
        task: String,
        key: String,
        reason: String,
    },
    #[error("cannot read task file: {0}")]
    Io(String),
}

/// One line of a document after comments are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    Title(&'a str),
    Entry(&'a str, &'a str),
}

/// Parses a key or a title (word characters without spaces)
pub fn parse_key(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn parse_entry(input: &str) -> IResult<&str, Line<'_>> {
    let (input, _) = space0(input)?;
    let (input, key) = parse_key(input)?;
    let (input, _) = delimited(space0, char(':'), space0).parse(input)?;
    let (input, value) = rest(input)?;
    Ok((input, Line::Entry(key, value.trim())))
}

fn parse_title(input: &str) -> IResult<&str, Line<'_>> {
    map(delimited(space0, parse_key, space0), Line::Title).parse(input)
}

/// A whole line: either `key: value` or a bare title.
pub fn parse_line(input: &str) -> IResult<&str, Line<'_>> {
    all_consuming(alt((parse_entry, parse_title))).parse(input)
}

/// Comma separated items, each trimmed.
pub fn parse_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(','), map(is_not(",;"), str::trim)).parse(input)
}

/// Rows separated by `;`, items by `,`.
pub fn parse_rows(input: &str) -> IResult<&str, Vec<Vec<&str>>> {
    separated_list1(char(';'), parse_list).parse(input)
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with('#')
        || trimmed.starts_with('%')
        || trimmed.starts_with(';')
}

/// A titled block of `key: value` entries, in the order they were written.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSection {
    pub title: String,
    /// 1-based line of the title.
    pub line: usize,
    entries: Vec<(String, String)>,
}

impl TaskSection {
    pub fn new(title: &str, line: usize) -> Self {
        Self {
            title: title.to_string(),
            line,
            entries: Vec::new(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Raw text of an entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn required(&self, key: &str) -> Result<&str, TaskError> {
        self.get(key).ok_or_else(|| TaskError::MissingKey {
            task: self.title.clone(),
            key: key.to_string(),
        })
    }

    fn invalid(&self, key: &str, reason: impl Display) -> TaskError {
        TaskError::InvalidValue {
            task: self.title.clone(),
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    fn param(&self, key: &str, text: &str) -> Result<f64, TaskError> {
        Expr::parse_param(text).map_err(|e| self.invalid(key, e))
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    pub fn number(&self, key: &str) -> Result<Option<f64>, TaskError> {
        self.get(key).map(|text| self.param(key, text)).transpose()
    }

    pub fn integer(&self, key: &str) -> Result<Option<usize>, TaskError> {
        self.get(key)
            .map(|text| text.parse::<usize>().map_err(|e| self.invalid(key, e)))
            .transpose()
    }

    pub fn flag(&self, key: &str) -> Result<Option<bool>, TaskError> {
        self.get(key)
            .map(|text| text.parse::<bool>().map_err(|e| self.invalid(key, e)))
            .transpose()
    }

    pub fn vector(&self, key: &str) -> Result<Option<Vec<f64>>, TaskError> {
        let Some(text) = self.get(key) else {
            return Ok(None);
        };
        let (_, items) = all_consuming(parse_list)
            .parse(text)
            .map_err(|_| self.invalid(key, "expected a comma separated list"))?;
        items
            .into_iter()
            .map(|item| self.param(key, item))
            .collect::<Result<Vec<f64>, _>>()
            .map(Some)
    }

    pub fn matrix(&self, key: &str) -> Result<Option<Vec<Vec<f64>>>, TaskError> {
        let Some(text) = self.get(key) else {
            return Ok(None);
        };
        let (_, rows) = all_consuming(parse_rows)
            .parse(text)
            .map_err(|_| self.invalid(key, "expected rows separated by ';'"))?;
        rows.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|item| self.param(key, item))
                    .collect::<Result<Vec<f64>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Termination policy from `tol`, `niter` and `relative`; absent keys keep the defaults.
    pub fn control(&self) -> Result<IterationControl, TaskError> {
        let mut control = IterationControl::default();
        if let Some(tol) = self.number("tol")? {
            control.tolerance = tol;
        }
        if let Some(niter) = self.integer("niter")? {
            control.max_iterations = niter;
        }
        if let Some(relative) = self.flag("relative")? {
            control.relative_error = relative;
        }
        Ok(control)
    }
}

/// Splits a document into sections.
pub fn parse_document(input: &str) -> Result<Vec<TaskSection>, TaskError> {
    let mut sections: Vec<TaskSection> = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        if is_comment(line) {
            continue;
        }
        let syntax = |reason: String| TaskError::Syntax {
            line: number,
            reason,
        };
        match parse_line(line) {
            Ok((_, Line::Title(title))) => sections.push(TaskSection::new(title, number)),
            Ok((_, Line::Entry(key, value))) => {
                let section = sections
                    .last_mut()
                    .ok_or_else(|| syntax(format!("'{}' appears before any section title", key)))?;
                if section.get(key).is_some() {
                    return Err(syntax(format!(
                        "duplicate key '{}' in section '{}'",
                        key, section.title
                    )));
                }
                section.entries.push((key.to_string(), value.to_string()));
            }
            Err(_) => return Err(syntax(format!("cannot parse '{}'", line.trim()))),
        }
    }
    if sections.is_empty() {
        return Err(TaskError::Empty);
    }
    Ok(sections)
}
