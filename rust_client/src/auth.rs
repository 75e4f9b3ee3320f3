//! MAST API token resolution and validation.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::warn;

use crate::error::{Error, Result};

const TOKEN_ENV_VAR: &str = "MAST_API_TOKEN";
const TOKEN_FILE_NAME: &str = ".mast_api_token";
const TOKEN_LEN: usize = 32;

/// A validated MAST API token: exactly 32 alphanumeric characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MastApiToken(String);

impl MastApiToken {
    /// Validate and wrap a token string.
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::InvalidToken("defined".to_string()));
        }
        if token.len() != TOKEN_LEN {
            return Err(Error::InvalidToken(format!(
                "{TOKEN_LEN} characters: '{token}'"
            )));
        }
        if !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidToken(format!("alphanumeric: '{token}'")));
        }
        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve a token. Precedence is argument, environment, file, prompt.
    ///
    /// The file tier reads `~/.mast_api_token` and requires exactly one
    /// line; multi-line files are ignored with a warning. The prompt tier
    /// reads one line from stdin and only runs when `prompt` is set.
    pub fn resolve(explicit: Option<&str>, prompt: bool) -> Result<Self> {
        if let Some(token) = explicit {
            return Self::new(token);
        }
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                return Self::new(&token);
            }
        }
        if let Some(token) = token_from_home_file() {
            return Self::new(&token);
        }
        if prompt {
            let token = prompt_for_token()?;
            return Self::new(&token);
        }
        Err(Error::InvalidToken("defined".to_string()))
    }
}

fn token_from_home_file() -> Option<String> {
    let path = dirs::home_dir()?.join(TOKEN_FILE_NAME);
    token_from_file(&path)
}

/// Read a token from a single-line file. Missing files are not an error;
/// files with more than one line are skipped.
fn token_from_file(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() == 1 {
        Some(lines[0].to_string())
    } else {
        warn!("ignoring {}, expected one line", path.display());
        None
    }
}

fn prompt_for_token() -> Result<String> {
    print!("Enter MAST API token: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const GOOD: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn accepts_32_alphanumeric_characters() {
        let token = MastApiToken::new(GOOD).unwrap();
        assert_eq!(token.as_str(), GOOD);
    }

    #[test]
    fn rejects_empty_wrong_length_and_symbols() {
        assert!(matches!(MastApiToken::new(""), Err(Error::InvalidToken(_))));
        assert!(matches!(
            MastApiToken::new("short"),
            Err(Error::InvalidToken(_))
        ));
        let with_symbol = format!("{}!", &GOOD[..31]);
        assert!(matches!(
            MastApiToken::new(&with_symbol),
            Err(Error::InvalidToken(_))
        ));
    }

    #[test]
    fn explicit_argument_wins() {
        let token = MastApiToken::resolve(Some(GOOD), false).unwrap();
        assert_eq!(token.as_str(), GOOD);
    }

    #[test]
    fn invalid_explicit_argument_is_not_silently_skipped() {
        assert!(MastApiToken::resolve(Some("bogus"), false).is_err());
    }

    #[test]
    fn single_line_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{GOOD}").unwrap();
        assert_eq!(token_from_file(file.path()).as_deref(), Some(GOOD));
    }

    #[test]
    fn multi_line_file_is_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{GOOD}").unwrap();
        writeln!(file, "trailing junk").unwrap();
        assert_eq!(token_from_file(file.path()), None);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(token_from_file(&dir.path().join("no-such-file")), None);
    }
}
