//! Paths addressing nodes, leaves and cells of a registry
//!
//! A [`Path`] is a sequence of [`PathToken`]s describing a descent from the
//! registry root. Its text form joins names with `.`, writes list indices as
//! `[i]`, cells as `(row, col)` and column-major elements as `(k)`:
//!
//! ```
//! use varstruct_rs::structure::{Path, PathToken};
//!
//! let path: Path = "xother.b(1,1)".parse().unwrap();
//! assert_eq!(path, Path::new().name("xother").name("b").cell(1, 1));
//! assert_eq!(path.to_string(), "xother.b(1,1)");
//!
//! let path = Path::parse("b[2][0](1)").unwrap();
//! assert_eq!(path.tokens()[3], PathToken::Element(1));
//! ```

use crate::structure::error::StructureError;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{map_res, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One step of a descent through a registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathToken {
    /// Named entry of a group
    Name(String),

    /// Positional item of a list
    Index(usize),

    /// Cell `(row, col)` of a leaf
    Cell(usize, usize),

    /// Cell of a leaf addressed by its column-major dense index
    Element(usize),
}

/// A descent from the registry root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    tokens: Vec<PathToken>,
}

impl Path {
    /// The empty path, addressing the root
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Parse the text form of a path
    pub fn parse(input: &str) -> Result<Self, StructureError> {
        let trimmed = input.trim();
        match path_tokens(trimmed) {
            Ok(("", tokens)) => Ok(Self { tokens }),
            Ok((remainder, _)) => Err(StructureError::InvalidPath {
                input: input.to_string(),
                message: format!("unexpected trailing characters '{}'", remainder),
            }),
            Err(e) => Err(StructureError::InvalidPath {
                input: input.to_string(),
                message: format!("{:?}", e),
            }),
        }
    }

    /// Build a path of group names
    ///
    /// Fails with `InvalidPath` if a name is not an identifier.
    pub fn from_names<I, S>(names: I) -> Result<Self, StructureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                if is_identifier(&name) {
                    Ok(PathToken::Name(name))
                } else {
                    Err(StructureError::InvalidPath {
                        input: name,
                        message: "entry names must be identifiers".to_string(),
                    })
                }
            })
            .collect::<Result<Vec<_>, StructureError>>()?;
        Ok(Self { tokens })
    }

    /// Append a name token
    ///
    /// The name is not checked; only identifier names survive the text form.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.tokens.push(PathToken::Name(name.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.tokens.push(PathToken::Index(index));
        self
    }

    pub fn cell(mut self, row: usize, col: usize) -> Self {
        self.tokens.push(PathToken::Cell(row, col));
        self
    }

    pub fn element(mut self, index: usize) -> Self {
        self.tokens.push(PathToken::Element(index));
        self
    }

    /// A copy of this path extended by one token
    pub fn join(&self, token: PathToken) -> Self {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.extend_from_slice(&self.tokens);
        tokens.push(token);
        Self { tokens }
    }

    pub fn push(&mut self, token: PathToken) {
        self.tokens.push(token);
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether `prefix` is a (non-strict) prefix of this path
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.tokens.starts_with(&prefix.tokens)
    }

    /// The first `len` tokens
    pub fn prefix(&self, len: usize) -> Path {
        Self {
            tokens: self.tokens[..len.min(self.tokens.len())].to_vec(),
        }
    }
}

impl From<Vec<PathToken>> for Path {
    fn from(tokens: Vec<PathToken>) -> Self {
        Self { tokens }
    }
}

impl FromStr for Path {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = StructureError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Path::parse(&s)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            match token {
                PathToken::Name(name) if i == 0 => write!(f, "{}", name)?,
                PathToken::Name(name) => write!(f, ".{}", name)?,
                PathToken::Index(index) => write!(f, "[{}]", index)?,
                PathToken::Cell(row, col) => write!(f, "({},{})", row, col)?,
                PathToken::Element(index) => write!(f, "({})", index)?,
            }
        }
        Ok(())
    }
}

/// Whether `name` can be written as a name segment of a path
pub fn is_identifier(name: &str) -> bool {
    matches!(identifier(name), Ok(("", _)))
}

// Parser functions using nom

fn identifier(input: &str) -> IResult<&str, PathToken> {
    let mut parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));

    let (input, matched) = parser.parse(input)?;
    Ok((input, PathToken::Name(matched.to_string())))
}

fn number(input: &str) -> IResult<&str, usize> {
    let mut parser = delimited(
        multispace0,
        map_res(digit1, |digits: &str| digits.parse::<usize>()),
        multispace0,
    );
    parser.parse(input)
}

fn index(input: &str) -> IResult<&str, PathToken> {
    let (input, index) = delimited(char('['), number, char(']')).parse(input)?;
    Ok((input, PathToken::Index(index)))
}

fn cell(input: &str) -> IResult<&str, PathToken> {
    let mut parser = delimited(
        char('('),
        pair(number, opt(preceded(char(','), number))),
        char(')'),
    );

    let (input, (first, second)) = parser.parse(input)?;
    let token = match second {
        Some(col) => PathToken::Cell(first, col),
        None => PathToken::Element(first),
    };
    Ok((input, token))
}

fn dotted_name(input: &str) -> IResult<&str, PathToken> {
    preceded(char('.'), identifier).parse(input)
}

fn path_tokens(input: &str) -> IResult<&str, Vec<PathToken>> {
    let (input, first) = opt(alt((identifier, index, cell))).parse(input)?;
    let Some(first) = first else {
        return Ok((input, Vec::new()));
    };

    let (input, rest) = many0(alt((dotted_name, index, cell))).parse(input)?;

    let mut tokens = Vec::with_capacity(rest.len() + 1);
    tokens.push(first);
    tokens.extend(rest);
    Ok((input, tokens))
}
