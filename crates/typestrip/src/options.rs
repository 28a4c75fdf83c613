use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "typestrip.json";

/// How member modifier keywords (`public`, `private`, `protected`,
/// `readonly`, `override`, `abstract`, `declare`) are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ModifierSyntax {
    /// Modifier keywords are not type syntax; one in modifier position is an error.
    #[default]
    Off,
    /// Bare keywords in class-member or declaration-leading position, each
    /// elided as its own span.
    BareKeywordV1,
}

impl ModifierSyntax {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::BareKeywordV1 => "bare-keyword-v1",
        }
    }
}

impl std::fmt::Display for ModifierSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModifierSyntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "bare-keyword-v1" => Ok(Self::BareKeywordV1),
            other => Err(format!("unknown modifier syntax `{other}` (expected off, bare-keyword-v1)")),
        }
    }
}

/// How the null typeguard `!` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NonNullSyntax {
    /// `!` keeps its JavaScript meaning; a definite-assignment `!` before a
    /// type annotation is an error.
    #[default]
    Off,
    /// Postfix `x!` and definite-assignment `x!: T` are elided.
    PostfixBangV1,
}

impl NonNullSyntax {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::PostfixBangV1 => "postfix-bang-v1",
        }
    }
}

impl std::fmt::Display for NonNullSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NonNullSyntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "postfix-bang-v1" => Ok(Self::PostfixBangV1),
            other => Err(format!("unknown non-null syntax `{other}` (expected off, postfix-bang-v1)")),
        }
    }
}

/// Options for one strip call. These are the only toggles: the grammar areas
/// that are undecided are opted into explicitly, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct StripOptions {
    pub modifiers: ModifierSyntax,
    pub non_null: NonNullSyntax,
}

impl StripOptions {
    /// Set modifier keyword syntax.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: ModifierSyntax) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set non-null assertion syntax.
    #[must_use]
    pub fn with_non_null(mut self, non_null: NonNullSyntax) -> Self {
        self.non_null = non_null;
        self
    }

    pub(crate) fn modifiers_enabled(&self) -> bool {
        self.modifiers == ModifierSyntax::BareKeywordV1
    }

    pub(crate) fn non_null_enabled(&self) -> bool {
        self.non_null == NonNullSyntax::PostfixBangV1
    }

    /// Load options from a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `typestrip.json` from `dir` if it exists, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, Error> {
        let path: PathBuf = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_off() {
        let options = StripOptions::default();
        assert_eq!(options.modifiers, ModifierSyntax::Off);
        assert_eq!(options.non_null, NonNullSyntax::Off);
    }

    #[test]
    fn test_deserialize_config() {
        let options: StripOptions =
            serde_json::from_str(r#"{"modifiers": "bare-keyword-v1", "nonNull": "postfix-bang-v1"}"#)
                .unwrap();
        assert!(options.modifiers_enabled());
        assert!(options.non_null_enabled());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<StripOptions, _> = serde_json::from_str(r#"{"enums": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_discover_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(StripOptions::discover(dir.path()).unwrap(), StripOptions::default());
    }

    #[test]
    fn test_discover_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{not json").unwrap();
        let err = StripOptions::discover(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_from_str_round_trips_display() {
        let parsed: ModifierSyntax = "bare-keyword-v1".parse().unwrap();
        assert_eq!(parsed.to_string(), "bare-keyword-v1");
        assert!("bare".parse::<NonNullSyntax>().is_err());
    }
}
