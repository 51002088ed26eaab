//! Translation rules, loaded once at startup
//!
//! ```toml
//! match_unrecognized = false
//!
//! [[rule]]
//! name = "power"
//! trigger = { address = 0x10, command = 0x05 }
//! response = [
//!     { address = 0x01, command = 0x0A, delay = 40 },
//!     { address = 0x01, command = 0x0B, delay = 100 },
//! ]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use irbridge_shared::{
    EmissionSequence, RuleError, SignalCode, TimedEmission, TranslationRule, TranslatorConfig,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("rule {rule}: {source}")]
    Rule {
        rule: String,
        #[source]
        source: RuleError,
    },
    #[error("no rules configured")]
    NoRules,
}

#[derive(Debug)]
pub struct Config {
    pub translator: TranslatorConfig,
    pub rules: Vec<TranslationRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default = "default_match_unrecognized")]
    match_unrecognized: bool,
    #[serde(default, rename = "rule")]
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    name: Option<String>,
    trigger: SignalCode,
    #[serde(default)]
    response: Vec<EmissionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EmissionEntry {
    address: u16,
    command: u16,
    #[serde(default)]
    delay: u32,
}

fn default_match_unrecognized() -> bool {
    TranslatorConfig::default().match_unrecognized
}

impl Config {
    /// Load rules from `path`, or use the built in ones
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                log::info!("Loading rules from {}", path.display());
                Config::from_toml(&text)
            }
            None => Config::builtin(),
        }
    }

    pub fn from_toml(text: &str) -> Result<Config, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;

        if file.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }

        let rules = file
            .rules
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| entry.into_rule(idx))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Config {
            translator: TranslatorConfig {
                match_unrecognized: file.match_unrecognized,
            },
            rules,
        })
    }

    /// CD player remote driving a TV
    pub fn builtin() -> Result<Config, ConfigError> {
        const CD: u16 = 0x10;
        const TV: u16 = 0x01;

        let rules = vec![
            builtin_rule(
                "power",
                SignalCode::new(CD, 0x05),
                &[
                    TimedEmission::new(TV, 0x0A, 40),
                    TimedEmission::new(TV, 0x0B, 100),
                ],
            ),
            builtin_rule(
                "volume up",
                SignalCode::new(CD, 0x0C),
                &[TimedEmission::new(TV, 0x02, 0)],
            ),
            builtin_rule(
                "volume down",
                SignalCode::new(CD, 0x0D),
                &[TimedEmission::new(TV, 0x03, 0)],
            ),
            builtin_rule(
                "input",
                SignalCode::new(CD, 0x16),
                &[
                    TimedEmission::new(TV, 0x0F, 300),
                    TimedEmission::new(TV, 0x41, 200),
                    TimedEmission::new(TV, 0x44, 0),
                ],
            ),
        ];

        Ok(Config {
            translator: TranslatorConfig::default(),
            rules: rules.into_iter().collect::<Result<Vec<_>, _>>()?,
        })
    }
}

fn builtin_rule(
    name: &str,
    trigger: SignalCode,
    response: &[TimedEmission],
) -> Result<TranslationRule, ConfigError> {
    let invalid = |source| ConfigError::Rule {
        rule: format!("'{}'", name),
        source,
    };

    let response = EmissionSequence::from_slice(response).map_err(invalid)?;
    TranslationRule::named(name, trigger, response).map_err(invalid)
}

impl RuleEntry {
    fn into_rule(self, idx: usize) -> Result<TranslationRule, ConfigError> {
        let label = match &self.name {
            Some(name) => format!("'{}'", name),
            None => format!("#{}", idx + 1),
        };
        let invalid = |source| ConfigError::Rule {
            rule: label.clone(),
            source,
        };

        let emissions: Vec<TimedEmission> = self
            .response
            .iter()
            .map(|e| TimedEmission::new(e.address, e.command, e.delay))
            .collect();
        let response = EmissionSequence::from_slice(&emissions).map_err(invalid)?;

        match self.name {
            Some(name) => TranslationRule::named(&name, self.trigger, response).map_err(invalid),
            None => Ok(TranslationRule::new(self.trigger, response)),
        }
    }
}
