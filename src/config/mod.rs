use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

use boolparse::{Facts, Grammar};

/// Prefix of environment variables that override file settings, e.g.
/// `BOOLPARSE_GRAMMAR__AND_KEYWORD=&&` or `BOOLPARSE_FACTS__STATUS=open`.
pub const ENV_PREFIX: &str = "BOOLPARSE";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub grammar: Grammar,
    pub facts: Facts,
    pub output: OutputFormat,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        let settings: Settings = settings.try_deserialize()?;
        settings.grammar.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Nested JSON arrays
    #[default]
    Json,
    Yaml,
    /// Expression text
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = settings_file(
            "grammar:\n  and_keyword: \"&&\"\n  or_keyword: \"||\"\nfacts:\n  status: open\n  priority: \"3\"\noutput: text\n",
        );
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.grammar.and_keyword, "&&");
        assert_eq!(settings.grammar.or_keyword, "||");
        assert_eq!(settings.facts.get("status"), Some("open"));
        assert_eq!(settings.facts.get("priority"), Some("3"));
        assert_eq!(settings.output, OutputFormat::Text);
    }

    #[test]
    fn test_partial_grammar_keeps_default() {
        let file = settings_file("grammar:\n  or_keyword: ORELSE\n");
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.grammar.and_keyword, "AND");
        assert_eq!(settings.grammar.or_keyword, "ORELSE");
        assert!(settings.facts.is_empty());
        assert_eq!(settings.output, OutputFormat::Json);
    }

    #[test]
    fn test_rejects_clashing_keywords() {
        let file = settings_file("grammar:\n  and_keyword: or\n");
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }
}
