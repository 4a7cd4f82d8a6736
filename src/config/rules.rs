use crate::domain::services::{ProviderRule, ProviderRules};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extra provider rules loaded from TOML:
///
/// ```toml
/// replace_builtin = false
///
/// [[providers]]
/// name = "Zoho"
/// patterns = ["zoho.com", "zoho.eu"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesFile {
    #[serde(default)]
    pub replace_builtin: bool,
    #[serde(default)]
    pub providers: Vec<ProviderRule>,
}

impl RulesFile {
    pub fn from_str(content: &str) -> Result<Self> {
        let rules: RulesFile = toml::from_str(content)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| EtlError::ConfigError {
            message: format!("cannot read rules file {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_str(&content)
    }

    pub fn into_rules(self) -> ProviderRules {
        if self.replace_builtin {
            ProviderRules::from_rules(self.providers)
        } else {
            let mut rules = ProviderRules::builtin();
            rules.extend(self.providers);
            rules
        }
    }
}

impl Validate for RulesFile {
    fn validate(&self) -> Result<()> {
        for rule in &self.providers {
            validate_non_empty_string("providers.name", &rule.name)?;
            if rule.patterns.is_empty() {
                return Err(EtlError::InvalidConfigValueError {
                    field: "providers.patterns".to_string(),
                    value: rule.name.clone(),
                    reason: "a provider needs at least one pattern".to_string(),
                });
            }
            for pattern in &rule.patterns {
                validate_non_empty_string("providers.patterns", pattern)?;
            }
        }

        if self.replace_builtin && self.providers.is_empty() {
            return Err(EtlError::ConfigError {
                message: "replace_builtin = true needs at least one provider".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{HostLabel, MxRecord};

    #[test]
    fn test_rules_extend_builtin() {
        let rules = RulesFile::from_str(
            r#"
[[providers]]
name = "Zoho"
patterns = ["zoho.com"]
"#,
        )
        .unwrap()
        .into_rules();

        assert_eq!(rules.rules().len(), 12);
        assert_eq!(
            rules.classify(&[MxRecord::with_data("10 mx.zoho.com.")]),
            HostLabel::Provider("Zoho".into())
        );
        assert_eq!(
            rules.classify(&[MxRecord::with_data("1 aspmx.l.google.com.")]),
            HostLabel::Provider("Google".into())
        );
    }

    #[test]
    fn test_rules_replace_builtin() {
        let rules = RulesFile::from_str(
            r#"
replace_builtin = true

[[providers]]
name = "Internal"
patterns = ["corp.example"]
"#,
        )
        .unwrap()
        .into_rules();

        assert_eq!(rules.rules().len(), 1);
        assert_eq!(
            rules.classify(&[MxRecord::with_data("1 aspmx.l.google.com.")]),
            HostLabel::Other
        );
    }

    #[test]
    fn test_rules_reject_empty_patterns() {
        let err = RulesFile::from_str(
            r#"
[[providers]]
name = "Nothing"
patterns = []
"#,
        )
        .unwrap_err();
        assert!(matches!(err, EtlError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_rules_reject_bad_toml() {
        assert!(matches!(
            RulesFile::from_str("providers = 3").unwrap_err(),
            EtlError::RulesParseError(_)
        ));
    }
}
