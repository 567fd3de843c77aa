use std::fmt;

/// A validated endpoint or action name.
///
/// Names become URL segments (an endpoint without an explicit URL is served
/// at `<base>/<name>/:id`) and lookup keys, so they are kept simple.
/// Rules:
/// 1. Must start with an alphabetic character.
/// 2. Remaining characters must be alphanumeric, `_` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

#[derive(Debug, PartialEq, Eq)]
pub enum NameError {
    Empty,
    InvalidStartCharacter,
    InvalidCharacter(char),
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name cannot be empty"),
            Self::InvalidStartCharacter => write!(f, "name must start with an alphabetic character"),
            Self::InvalidCharacter(c) => write!(f, "name contains invalid character: '{}'", c),
        }
    }
}

impl std::error::Error for NameError {}

impl Name {
    /// Creates a new Name from any type that can turn into a String.
    pub fn new<S: Into<String>>(name: S) -> Result<Self, NameError> {
        let s = name.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), NameError> {
        let mut chars = s.chars();

        match chars.next() {
            Some(c) if !c.is_alphabetic() => return Err(NameError::InvalidStartCharacter),
            None => return Err(NameError::Empty),
            _ => {}
        }

        for c in chars {
            if !c.is_alphanumeric() && c != '_' && c != '-' {
                return Err(NameError::InvalidCharacter(c));
            }
        }

        Ok(())
    }

    /// Returns a string slice reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Name {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_creation() {
        assert!(Name::new("users").is_ok());
        assert!(Name::new("user_groups").is_ok());
        assert!(Name::new("user-groups").is_ok());
        assert!(Name::new("query").is_ok());
        assert!(Name::new(String::from("Delete")).is_ok());
    }

    #[test]
    fn test_invalid_start() {
        assert_eq!(Name::new("_id"), Err(NameError::InvalidStartCharacter));
        assert_eq!(Name::new("1st"), Err(NameError::InvalidStartCharacter));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(Name::new("users/:id"), Err(NameError::InvalidCharacter('/'))));
        assert!(matches!(Name::new("user id"), Err(NameError::InvalidCharacter(' '))));
        assert!(matches!(Name::new("user@home"), Err(NameError::InvalidCharacter('@'))));
    }

    #[test]
    fn test_empty() {
        assert_eq!(Name::new(""), Err(NameError::Empty));
    }

    #[test]
    fn test_traits() {
        let name: Name = "things".try_into().unwrap();
        assert_eq!(name.to_string(), "things");

        let s: String = name.into();
        assert_eq!(s, "things");
    }
}
