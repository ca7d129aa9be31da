use regex::Regex;
use lazy_static::lazy_static;
use sha2::{Sha256, Digest};
use base64::{Engine as _, engine::general_purpose};

lazy_static! {
    static ref PEM_REGEX: Regex = Regex::new(r"(?s)-----BEGIN ([A-Z0-9 ]+)-----.*?-----END [A-Z0-9 ]+-----").unwrap();
    static ref SQL_PASSWORD_REGEX: Regex = Regex::new(r"(?i)(IDENTIFIED\s+BY\s+)'[^']*'").unwrap();
    static ref PASSWORD_PAIR_REGEX: Regex = Regex::new(r#"(?i)\b(password|passwd|pwd|token)("?\s*[=:]\s*)("[^"]*"|'[^']*'|[^\s,;]+)"#).unwrap();
    static ref BEARER_REGEX: Regex = Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9\-._~+/]+=*").unwrap();

    static ref DEFAULT_REDACTOR: CredentialRedactor = CredentialRedactor::new(RedactionConfig::default());
}

/// Credential redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_pem_blocks: bool,
    pub redact_sql_passwords: bool,
    pub redact_password_pairs: bool,
    pub redact_bearer_tokens: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_pem_blocks: true,
            redact_sql_passwords: true,
            redact_password_pairs: true,
            redact_bearer_tokens: true,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }
}

/// Strips certificates, keys and passwords out of text bound for the logs.
///
/// Error messages from secret stores and from vsql can echo back the material
/// they were handed, so anything derived from them goes through here first.
pub struct CredentialRedactor {
    config: RedactionConfig,
}

impl CredentialRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_pem_blocks {
            result = self.redact_pem_blocks(&result);
        }

        if self.config.redact_sql_passwords {
            result = self.redact_sql_passwords(&result);
        }

        if self.config.redact_password_pairs {
            result = self.redact_password_pairs(&result);
        }

        if self.config.redact_bearer_tokens {
            result = self.redact_bearer_tokens(&result);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn redact_pem_blocks(&self, text: &str) -> String {
        PEM_REGEX.replace_all(text, |caps: &regex::Captures| {
            let label = &caps[1];
            if self.config.hash_for_correlation {
                format!("[{} {}]", label, self.hash_value(&caps[0]))
            } else {
                format!("[REDACTED {}]", label)
            }
        }).to_string()
    }

    fn redact_sql_passwords(&self, text: &str) -> String {
        SQL_PASSWORD_REGEX.replace_all(text, |caps: &regex::Captures| {
            format!("{}'{}'", &caps[1], self.mask(&caps[0]))
        }).to_string()
    }

    fn redact_password_pairs(&self, text: &str) -> String {
        PASSWORD_PAIR_REGEX.replace_all(text, |caps: &regex::Captures| {
            format!("{}{}{}", &caps[1], &caps[2], self.mask(&caps[3]))
        }).to_string()
    }

    fn redact_bearer_tokens(&self, text: &str) -> String {
        BEARER_REGEX.replace_all(text, |caps: &regex::Captures| {
            format!("Bearer {}", self.mask(&caps[0]))
        }).to_string()
    }

    fn mask(&self, value: &str) -> String {
        if self.config.hash_for_correlation {
            format!("HASH[{}]", self.hash_value(value))
        } else {
            "[REDACTED]".to_string()
        }
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let result = hasher.finalize();
        general_purpose::STANDARD.encode(&result[..8]) // Use first 8 bytes for shorter hash
    }
}

/// Redact `text` with the default configuration.
pub fn redact(text: &str) -> String {
    DEFAULT_REDACTOR.redact(text)
}
