//! Run description loading and validation.
//!
//! A run description is a small TOML document:
//!
//! ```toml
//! run_tag = "demo-1"
//! attempt_count = 2
//! prompt = "Do it"
//! cli_command = ["agent", "run"]
//! ```
//!
//! Every field is validated before anything touches the filesystem or git,
//! so a `RunDescription` that exists is internally consistent.

use crate::error::{ArenaError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use toml::{Table, Value};

/// Branch- and path-safe run tags.
static RUN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("run tag pattern is valid"));

/// Normalized, validated description of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDescription {
    run_tag: String,
    attempt_count: u32,
    command: Vec<String>,
    prompt: String,
}

impl RunDescription {
    /// Load and validate a run description from a TOML file.
    ///
    /// `attempt_override`, when given, replaces `attempt_count` from the file
    /// and must itself be positive.
    pub fn load(path: &Path, attempt_override: Option<i64>) -> Result<Self> {
        if !path.exists() {
            return Err(ArenaError::Config(format!("Config file not found: {}", path.display())));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ArenaError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let raw: Table = toml::from_str(&content)
            .map_err(|e| ArenaError::Config(format!("Failed to parse {}: {}", path.display(), e.message())))?;

        let description = Self::from_table(&raw, attempt_override)?;
        log::debug!(
            "Loaded run '{}' from {} ({} attempt(s))",
            description.run_tag,
            path.display(),
            description.attempt_count
        );
        Ok(description)
    }

    /// Validate an already parsed TOML table.
    pub fn from_table(raw: &Table, attempt_override: Option<i64>) -> Result<Self> {
        let run_tag = expect_str(raw, "run_tag")?;
        validate_run_tag(&run_tag)?;
        let prompt = expect_str(raw, "prompt")?;
        let command = expect_str_list(raw, "cli_command")?;
        let attempt_count = resolve_attempt_count(raw, attempt_override)?;

        Ok(Self {
            run_tag,
            attempt_count,
            command,
            prompt,
        })
    }

    /// Identifier used for the run directory and branch names.
    pub fn run_tag(&self) -> &str {
        &self.run_tag
    }

    /// Number of attempts to create.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Command line a downstream consumer runs inside each attempt.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Instruction text for the downstream consumer.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

fn expect_str(raw: &Table, key: &str) -> Result<String> {
    match raw.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(ArenaError::Config(format!("{} must be a non-empty string", key))),
    }
}

fn expect_str_list(raw: &Table, key: &str) -> Result<Vec<String>> {
    let items = match raw.get(key) {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => {
            return Err(ArenaError::Config(format!(
                "{} must be a non-empty array of strings",
                key
            )));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::String(s) if !s.is_empty() => Ok(s.clone()),
            _ => Err(ArenaError::Config(format!("{}[{}] must be a non-empty string", key, idx))),
        })
        .collect()
}

/// Reject run tags that are unsafe in branch names or paths.
pub fn validate_run_tag(tag: &str) -> Result<()> {
    if !RUN_TAG_RE.is_match(tag) {
        return Err(ArenaError::Config(
            "run_tag may only contain letters, numbers, '.', '_' and '-'".to_string(),
        ));
    }
    // Both match the pattern but resolve outside <runs_dir>/<run_tag>
    if tag == "." || tag == ".." {
        return Err(ArenaError::Config("run_tag cannot be '.' or '..'".to_string()));
    }
    Ok(())
}

fn resolve_attempt_count(raw: &Table, attempt_override: Option<i64>) -> Result<u32> {
    if let Some(n) = attempt_override {
        return positive(n).ok_or_else(|| {
            ArenaError::Config("attempt override must be a positive integer".to_string())
        });
    }

    match raw.get("attempt_count") {
        None => Err(ArenaError::Config("Missing required field: attempt_count".to_string())),
        Some(Value::Integer(n)) => positive(*n).ok_or_else(|| {
            ArenaError::Config("attempt_count must be a positive integer".to_string())
        }),
        Some(_) => Err(ArenaError::Config("attempt_count must be a positive integer".to_string())),
    }
}

fn positive(n: i64) -> Option<u32> {
    u32::try_from(n).ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_toml(temp: &TempDir, content: &str) -> std::path::PathBuf {
        let path = temp.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn load_str(content: &str, attempt_override: Option<i64>) -> Result<RunDescription> {
        let temp = TempDir::new().unwrap();
        let path = write_toml(&temp, content);
        RunDescription::load(&path, attempt_override)
    }

    fn config_message(result: Result<RunDescription>) -> String {
        match result {
            Err(ArenaError::Config(msg)) => msg,
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_loads_valid() {
        let desc = load_str(
            r#"
run_tag = "demo-1"
attempt_count = 2
prompt = "Do it"
cli_command = ["codex", "run"]
"#,
            None,
        )
        .unwrap();

        assert_eq!(desc.run_tag(), "demo-1");
        assert_eq!(desc.attempt_count(), 2);
        assert_eq!(desc.command(), ["codex".to_string(), "run".to_string()]);
        assert_eq!(desc.prompt(), "Do it");
    }

    #[test]
    fn test_attempt_override_wins() {
        let desc = load_str(
            r#"
run_tag = "tag"
attempt_count = 2
prompt = "p"
cli_command = ["a"]
"#,
            Some(5),
        )
        .unwrap();
        assert_eq!(desc.attempt_count(), 5);
    }

    #[test]
    fn test_attempt_override_without_file_value() {
        let desc = load_str(
            r#"
run_tag = "tag"
prompt = "p"
cli_command = ["a"]
"#,
            Some(3),
        )
        .unwrap();
        assert_eq!(desc.attempt_count(), 3);
    }

    #[test]
    fn test_attempt_override_must_be_positive() {
        for bad in [0, -1] {
            let msg = config_message(load_str(
                r#"
run_tag = "tag"
attempt_count = 2
prompt = "p"
cli_command = ["a"]
"#,
                Some(bad),
            ));
            assert!(msg.contains("attempt override"), "{}", msg);
        }
    }

    #[test]
    fn test_invalid_run_tag() {
        for bad in ["bad/tag", "has space", "*weird*"] {
            let content = format!(
                "run_tag = \"{}\"\nattempt_count = 1\nprompt = \"p\"\ncli_command = [\"x\"]\n",
                bad
            );
            let msg = config_message(load_str(&content, None));
            assert!(msg.contains("run_tag"), "{}", msg);
        }
    }

    #[test]
    fn test_run_tag_allows_dots_and_underscores() {
        let desc = load_str(
            "run_tag = \"v1.2_rc-3\"\nattempt_count = 1\nprompt = \"p\"\ncli_command = [\"x\"]\n",
            None,
        )
        .unwrap();
        assert_eq!(desc.run_tag(), "v1.2_rc-3");
    }

    #[test]
    fn test_dot_run_tags_rejected() {
        for bad in [".", ".."] {
            let content = format!(
                "run_tag = \"{}\"\nattempt_count = 1\nprompt = \"p\"\ncli_command = [\"x\"]\n",
                bad
            );
            let msg = config_message(load_str(&content, None));
            assert_eq!(msg, "run_tag cannot be '.' or '..'");
        }
        assert!(validate_run_tag("...").is_ok());
    }

    #[test]
    fn test_blank_run_tag() {
        let msg = config_message(load_str(
            "run_tag = \"   \"\nattempt_count = 1\nprompt = \"p\"\ncli_command = [\"x\"]\n",
            None,
        ));
        assert_eq!(msg, "run_tag must be a non-empty string");
    }

    #[test]
    fn test_run_tag_not_a_string() {
        let msg = config_message(load_str(
            "run_tag = 7\nattempt_count = 1\nprompt = \"p\"\ncli_command = [\"x\"]\n",
            None,
        ));
        assert_eq!(msg, "run_tag must be a non-empty string");
    }

    #[test]
    fn test_missing_prompt() {
        let msg = config_message(load_str(
            "run_tag = \"ok\"\nattempt_count = 1\ncli_command = [\"x\"]\n",
            None,
        ));
        assert_eq!(msg, "prompt must be a non-empty string");
    }

    #[test]
    fn test_missing_attempt_count() {
        let msg = config_message(load_str(
            "run_tag = \"ok\"\nprompt = \"p\"\ncli_command = [\"x\"]\n",
            None,
        ));
        assert_eq!(msg, "Missing required field: attempt_count");
    }

    #[test]
    fn test_attempt_count_must_be_positive_integer() {
        for bad in ["0", "-2", "\"three\"", "1.5", "true"] {
            let content = format!(
                "run_tag = \"ok\"\nattempt_count = {}\nprompt = \"p\"\ncli_command = [\"x\"]\n",
                bad
            );
            let msg = config_message(load_str(&content, None));
            assert_eq!(msg, "attempt_count must be a positive integer");
        }
    }

    #[test]
    fn test_cli_command_empty_element_cites_index() {
        let msg = config_message(load_str(
            "run_tag = \"ok\"\nattempt_count = 1\nprompt = \"p\"\ncli_command = [\"x\", \"\"]\n",
            None,
        ));
        assert_eq!(msg, "cli_command[1] must be a non-empty string");
    }

    #[test]
    fn test_cli_command_non_string_element() {
        let msg = config_message(load_str(
            "run_tag = \"ok\"\nattempt_count = 1\nprompt = \"p\"\ncli_command = [3]\n",
            None,
        ));
        assert_eq!(msg, "cli_command[0] must be a non-empty string");
    }

    #[test]
    fn test_cli_command_must_be_non_empty_array() {
        for bad in ["[]", "\"agent run\""] {
            let content = format!(
                "run_tag = \"ok\"\nattempt_count = 1\nprompt = \"p\"\ncli_command = {}\n",
                bad
            );
            let msg = config_message(load_str(&content, None));
            assert_eq!(msg, "cli_command must be a non-empty array of strings");
        }
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let msg = config_message(RunDescription::load(&temp.path().join("nope.toml"), None));
        assert!(msg.starts_with("Config file not found"));
    }

    #[test]
    fn test_unparseable_file() {
        let msg = config_message(load_str("run_tag = = broken", None));
        assert!(msg.starts_with("Failed to parse"), "{}", msg);
    }

    #[test]
    fn test_load_has_no_side_effects() {
        let temp = TempDir::new().unwrap();
        let path = write_toml(&temp, "run_tag = \"bad/tag\"\nattempt_count = 1\nprompt = \"p\"\ncli_command = [\"x\"]\n");
        assert!(RunDescription::load(&path, None).is_err());

        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
