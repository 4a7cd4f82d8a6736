use crate::domain::model::{HostLabel, MxRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRule {
    pub name: String,
    pub patterns: Vec<String>,
}

impl ProviderRule {
    pub fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_ascii_lowercase()).collect(),
        }
    }

    fn matches(&self, data: &str) -> bool {
        self.patterns.iter().any(|p| data.contains(p.as_str()))
    }
}

/// Ordered substring rules mapping MX hostnames to a hosting provider.
#[derive(Debug, Clone)]
pub struct ProviderRules {
    rules: Vec<ProviderRule>,
}

impl Default for ProviderRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderRules {
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                ProviderRule::new("Google", &["google"]),
                ProviderRule::new("Outlook", &["outlook.com", "office365"]),
                ProviderRule::new(
                    "Proofpoint",
                    &["pphosted.com", "ppe-hosted", "ppsmtp", "sophos.com"],
                ),
                ProviderRule::new("Mimecast", &["mimecast"]),
                ProviderRule::new("Barracuda", &["barracuda"]),
                ProviderRule::new("Fortinet", &["fortimail", "fortimailcloud.com"]),
                ProviderRule::new("Rackspace", &["emailsrvr.com"]),
                ProviderRule::new("TrendMicro", &["trendmicro.com"]),
                ProviderRule::new("SecureMX", &["securemx"]),
                ProviderRule::new("MXThunder", &["mxthunder.net"]),
                ProviderRule::new("MTARoutes", &["mtaroutes.com"]),
            ],
        }
    }

    pub fn from_rules(rules: Vec<ProviderRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| ProviderRule {
                patterns: r.patterns.iter().map(|p| p.to_ascii_lowercase()).collect(),
                name: r.name,
            })
            .collect();
        Self { rules }
    }

    /// Appends rules evaluated after the existing ones.
    pub fn extend(&mut self, extra: Vec<ProviderRule>) {
        self.rules.extend(Self::from_rules(extra).rules);
    }

    pub fn rules(&self) -> &[ProviderRule] {
        &self.rules
    }

    /// First record (in answer order) matching any rule decides the provider.
    pub fn classify(&self, records: &[MxRecord]) -> HostLabel {
        for record in records {
            let Some(data) = record.data.as_deref() else {
                continue;
            };
            let data = data.to_ascii_lowercase();
            if let Some(rule) = self.rules.iter().find(|r| r.matches(&data)) {
                return HostLabel::Provider(rule.name.clone());
            }
        }

        if records.is_empty() {
            HostLabel::NoEmail
        } else {
            HostLabel::Other
        }
    }
}
