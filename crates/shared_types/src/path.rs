use nom::{
    branch::alt,
    character::complete::{one_of, satisfy},
    combinator::{eof, value},
    multi::{many0, many1, separated_list0},
    sequence::tuple,
    IResult,
};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("'{0}' is not an absolute path")]
    NotAbsolute(String),
    #[error("'{path}' contains the invalid character {chr:?}")]
    InvalidCharacter { path: String, chr: char },
    #[error("'{0}' climbs above its root with '..'")]
    EscapesRoot(String),
    #[error("'{0}' is not a valid workspace relative path")]
    InvalidRelative(String),
    #[error("'{path}' is not below the working directory '{working_directory}'")]
    NotBelowWorkingDirectory {
        path: String,
        working_directory: String,
    },
}

/// Case insensitive comparison that does not depend on any locale, paths on the
/// platforms we build on compare this way.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// The key `eq_ignore_case` agrees with, for use in hash lookups.
pub fn case_fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Root {
    Unix,
    Drive(char),
}

impl std::fmt::Display for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Root::Unix => write!(f, "/"),
            Root::Drive(letter) => write!(f, "{}:/", letter),
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn is_invalid(c: char) -> bool {
    c.is_control() || matches!(c, '<' | '>' | '"' | '|' | '?' | '*')
}

fn separator(input: &str) -> IResult<&str, char> {
    one_of("/\\")(input)
}

fn unix_root(input: &str) -> IResult<&str, Root> {
    value(Root::Unix, separator)(input)
}

fn drive_root(input: &str) -> IResult<&str, Root> {
    let (input, (letter, _, _)) = tuple((
        satisfy(|c: char| c.is_ascii_alphabetic()),
        nom::character::complete::char(':'),
        separator,
    ))(input)?;
    Ok((input, Root::Drive(letter.to_ascii_uppercase())))
}

fn root(input: &str) -> IResult<&str, Root> {
    alt((drive_root, unix_root))(input)
}

fn segment(input: &str) -> IResult<&str, &str> {
    nom::bytes::complete::take_while1(|c: char| !is_separator(c) && !is_invalid(c))(input)
}

fn segments(input: &str) -> IResult<&str, Vec<&str>> {
    let (input, _) = many0(separator)(input)?;
    let (input, parts) = separated_list0(many1(separator), segment)(input)?;
    let (input, _) = many0(separator)(input)?;
    let (input, _) = eof(input)?;
    Ok((input, parts))
}

/// An absolute filesystem path as printed by the external tools, with `.` and `..`
/// resolved and separators normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbsolutePath {
    root: Root,
    segments: Vec<String>,
}

impl AbsolutePath {
    pub fn parse(input: &str) -> Result<AbsolutePath, PathError> {
        let (rest, path_root) =
            root(input).map_err(|_| PathError::NotAbsolute(input.to_string()))?;

        let parts = match segments(rest) {
            Ok((_, parts)) => parts,
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                return Err(match e.input.chars().next() {
                    Some(chr) => PathError::InvalidCharacter {
                        path: input.to_string(),
                        chr,
                    },
                    None => PathError::NotAbsolute(input.to_string()),
                })
            }
            Err(nom::Err::Incomplete(_)) => return Err(PathError::NotAbsolute(input.to_string())),
        };

        let mut normalized: Vec<String> = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                "." => (),
                ".." => {
                    if normalized.pop().is_none() {
                        return Err(PathError::EscapesRoot(input.to_string()));
                    }
                }
                other => normalized.push(other.to_string()),
            }
        }

        Ok(AbsolutePath {
            root: path_root,
            segments: normalized,
        })
    }

    pub fn root(&self) -> Root {
        self.root
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn join(&self, relative: &RelativePath) -> AbsolutePath {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments().map(|s| s.to_string()));
        AbsolutePath {
            root: self.root,
            segments,
        }
    }
}

impl std::fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.root, self.segments.join("/"))
    }
}

/// A `/` separated path relative to the working directory. This is the identity space
/// build objects live in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
    pub fn parse(input: &str) -> Result<RelativePath, PathError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.starts_with(is_separator) || root(trimmed).is_ok() {
            return Err(PathError::InvalidRelative(input.to_string()));
        }
        if let Some(chr) = trimmed.chars().find(|c| is_invalid(*c)) {
            return Err(PathError::InvalidCharacter {
                path: input.to_string(),
                chr,
            });
        }

        let mut parts: Vec<&str> = Vec::default();
        for part in trimmed.split(is_separator) {
            match part {
                "" | "." => (),
                ".." => return Err(PathError::InvalidRelative(input.to_string())),
                other => parts.push(other),
            }
        }
        if parts.is_empty() {
            return Err(PathError::InvalidRelative(input.to_string()));
        }
        Ok(RelativePath(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    pub fn eq_ignore_case(&self, other: &RelativePath) -> bool {
        eq_ignore_case(&self.0, &other.0)
    }
}

impl TryFrom<String> for RelativePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RelativePath::parse(&value)
    }
}

impl From<RelativePath> for String {
    fn from(value: RelativePath) -> Self {
        value.0
    }
}

impl std::fmt::Display for RelativePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The root every build object path is relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectory {
    root: AbsolutePath,
}

impl WorkingDirectory {
    pub fn new(root: AbsolutePath) -> Self {
        Self { root }
    }

    pub fn parse(input: &str) -> Result<WorkingDirectory, PathError> {
        Ok(Self::new(AbsolutePath::parse(input)?))
    }

    pub fn root(&self) -> &AbsolutePath {
        &self.root
    }

    /// Root segments are matched ignoring case, the remainder keeps the spelling of `path`.
    pub fn map_to_build_object_path(&self, path: &AbsolutePath) -> Result<RelativePath, PathError> {
        let not_below = || PathError::NotBelowWorkingDirectory {
            path: path.to_string(),
            working_directory: self.root.to_string(),
        };

        if path.root != self.root.root || path.segments.len() <= self.root.segments.len() {
            return Err(not_below());
        }
        let (prefix, rest) = path.segments.split_at(self.root.segments.len());
        if !prefix
            .iter()
            .zip(self.root.segments.iter())
            .all(|(a, b)| eq_ignore_case(a, b))
        {
            return Err(not_below());
        }
        Ok(RelativePath(rest.join("/")))
    }

    pub fn absolute_path_of(&self, relative: &RelativePath) -> AbsolutePath {
        self.root.join(relative)
    }
}

impl std::fmt::Display for WorkingDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}
