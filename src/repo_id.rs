//! Repository identifiers (`owner/repo`).

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Identifies one repository on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentifier {
    pub owner: String,
    pub repo: String,
}

fn repo_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = PATTERN.get() {
        return Ok(re);
    }
    let re = Regex::new(r"^([^/\s]+)/([^/\s]+)$")?;
    Ok(PATTERN.get_or_init(|| re))
}

impl RepositoryIdentifier {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses `owner/repo`, trimming surrounding whitespace.
    ///
    /// Anything else (missing slash, extra path segments, embedded
    /// whitespace) is rejected with [`Error::InvalidRepository`].
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let captures = repo_pattern()?
            .captures(trimmed)
            .ok_or_else(|| Error::InvalidRepository {
                input: input.to_string(),
            })?;
        Ok(Self::new(&captures[1], &captures[2]))
    }
}

impl FromStr for RepositoryIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = RepositoryIdentifier::parse("purduesigbots/pros-mainline").unwrap();
        assert_eq!(id.owner, "purduesigbots");
        assert_eq!(id.repo, "pros-mainline");
        assert_eq!(id.to_string(), "purduesigbots/pros-mainline");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: RepositoryIdentifier = "  owner/repo\n".parse().unwrap();
        assert_eq!(id, RepositoryIdentifier::new("owner", "repo"));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in [
            "",
            "owner",
            "owner/",
            "/repo",
            "a/b/c",
            "own er/repo",
            "owner/re\tpo",
        ] {
            let err = RepositoryIdentifier::parse(input).unwrap_err();
            assert!(
                matches!(err, Error::InvalidRepository { .. }),
                "expected InvalidRepository for {:?}, got {:?}",
                input,
                err
            );
        }
    }
}
