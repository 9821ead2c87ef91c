use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Cookie name holding the auto-reload preference.
pub const AUTO_RELOAD_COOKIE: &str = "_autoreload";
/// Preference survives roughly three years of dev-server restarts.
pub const COOKIE_MAX_AGE_SECS: u64 = 3 * 365 * 24 * 3600;
pub const COOKIE_PATH: &str = "/";

/// One persisted cookie. The jar file is a JSON array of these so records
/// written by other tools sharing the file survive our writes untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires_at: u64,
}

/// Reads and writes the `_autoreload` cookie, scoped to a dot-prefixed
/// parent domain so every subdomain of the configured domain shares it.
pub struct PreferenceStore {
    file: PathBuf,
    domain: String,
}

impl PreferenceStore {
    /// `parent_domain` is the bare host ("example.com"); records are written
    /// with the dot-prefixed form (".example.com").
    pub fn new(file: PathBuf, parent_domain: &str) -> Self {
        let domain = format!(".{}", parent_domain.trim().trim_start_matches('.'));
        Self { file, domain }
    }

    /// Current preference. Absent, expired, or foreign-domain records all
    /// read as off.
    pub fn auto_reload(&self) -> bool {
        let now = unix_now();
        self.load_jar()
            .iter()
            .find(|record| {
                record.name == AUTO_RELOAD_COOKIE
                    && record.expires_at > now
                    && domain_matches(self.domain.trim_start_matches('.'), &record.domain)
            })
            .map(|record| record.value == "1")
            .unwrap_or(false)
    }

    /// Upsert the `_autoreload` record with a fresh expiry. Other records in
    /// the jar are preserved; this component never deletes anything.
    pub fn set_auto_reload(&self, enabled: bool) -> Result<()> {
        let mut jar = self.load_jar();
        jar.retain(|record| !(record.name == AUTO_RELOAD_COOKIE && record.domain == self.domain));
        jar.push(CookieRecord {
            name: AUTO_RELOAD_COOKIE.to_string(),
            value: if enabled { "1" } else { "0" }.to_string(),
            domain: self.domain.clone(),
            path: COOKIE_PATH.to_string(),
            expires_at: unix_now() + COOKIE_MAX_AGE_SECS,
        });

        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(&jar)?;
        fs::write(&self.file, serialized)
            .with_context(|| format!("writing {}", self.file.display()))
    }

    /// Missing or unreadable jar files read as empty; the first toggle will
    /// recreate them.
    fn load_jar(&self) -> Vec<CookieRecord> {
        let Ok(raw) = fs::read_to_string(&self.file) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }
}

/// Cookie domain matching: a dot-prefixed cookie domain covers the parent
/// domain itself and every subdomain of it.
pub fn domain_matches(host: &str, cookie_domain: &str) -> bool {
    let host = host.trim().trim_start_matches('.').to_ascii_lowercase();
    let domain = cookie_domain.trim().trim_start_matches('.').to_ascii_lowercase();
    if host.is_empty() || domain.is_empty() {
        return false;
    }
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> PreferenceStore {
        PreferenceStore::new(dir.path().join("cookies.json"), "example.com")
    }

    #[test]
    fn test_absent_jar_reads_as_off() {
        let dir = TempDir::new().expect("temp dir");
        assert!(!store(&dir).auto_reload());
    }

    #[test]
    fn test_set_then_read_round_trips() {
        let dir = TempDir::new().expect("temp dir");
        let prefs = store(&dir);

        prefs.set_auto_reload(true).expect("write on");
        assert!(prefs.auto_reload());

        prefs.set_auto_reload(false).expect("write off");
        assert!(!prefs.auto_reload());
    }

    #[test]
    fn test_persists_across_store_instances() {
        let dir = TempDir::new().expect("temp dir");
        store(&dir).set_auto_reload(true).expect("write on");
        assert!(store(&dir).auto_reload());
    }

    #[test]
    fn test_record_carries_cookie_attributes() {
        let dir = TempDir::new().expect("temp dir");
        let prefs = store(&dir);
        prefs.set_auto_reload(true).expect("write on");

        let raw = std::fs::read_to_string(dir.path().join("cookies.json")).expect("jar file");
        let jar: Vec<CookieRecord> = serde_json::from_str(&raw).expect("jar parses");
        assert_eq!(jar.len(), 1);

        let record = &jar[0];
        assert_eq!(record.name, AUTO_RELOAD_COOKIE);
        assert_eq!(record.value, "1");
        assert_eq!(record.domain, ".example.com");
        assert_eq!(record.path, COOKIE_PATH);
        assert!(record.expires_at > unix_now() + COOKIE_MAX_AGE_SECS - 60);
    }

    #[test]
    fn test_expired_record_reads_as_off() {
        let dir = TempDir::new().expect("temp dir");
        let jar = vec![CookieRecord {
            name: AUTO_RELOAD_COOKIE.to_string(),
            value: "1".to_string(),
            domain: ".example.com".to_string(),
            path: COOKIE_PATH.to_string(),
            expires_at: unix_now().saturating_sub(1),
        }];
        std::fs::write(
            dir.path().join("cookies.json"),
            serde_json::to_string(&jar).expect("serialize"),
        )
        .expect("seed jar");

        assert!(!store(&dir).auto_reload());
    }

    #[test]
    fn test_foreign_domain_record_is_ignored_but_preserved() {
        let dir = TempDir::new().expect("temp dir");
        let foreign = CookieRecord {
            name: AUTO_RELOAD_COOKIE.to_string(),
            value: "1".to_string(),
            domain: ".other.org".to_string(),
            path: COOKIE_PATH.to_string(),
            expires_at: unix_now() + 3600,
        };
        std::fs::write(
            dir.path().join("cookies.json"),
            serde_json::to_string(&vec![foreign.clone()]).expect("serialize"),
        )
        .expect("seed jar");

        let prefs = store(&dir);
        assert!(!prefs.auto_reload());

        prefs.set_auto_reload(true).expect("write on");
        let raw = std::fs::read_to_string(dir.path().join("cookies.json")).expect("jar file");
        let jar: Vec<CookieRecord> = serde_json::from_str(&raw).expect("jar parses");
        assert!(jar.contains(&foreign));
        assert_eq!(jar.len(), 2);
    }

    #[test]
    fn test_corrupt_jar_reads_as_off_and_is_recoverable() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("cookies.json"), "{ not json").expect("seed jar");

        let prefs = store(&dir);
        assert!(!prefs.auto_reload());
        prefs.set_auto_reload(true).expect("write on");
        assert!(prefs.auto_reload());
    }

    #[test]
    fn test_domain_matches_shares_across_subdomains() {
        assert!(domain_matches("example.com", ".example.com"));
        assert!(domain_matches("dev.example.com", ".example.com"));
        assert!(domain_matches("a.b.example.com", ".example.com"));
        assert!(!domain_matches("example.org", ".example.com"));
        assert!(!domain_matches("badexample.com", ".example.com"));
        assert!(!domain_matches("", ".example.com"));
    }
}
