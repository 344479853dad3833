//! CLI configuration: thin wrapper around `chromaplay_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--url, --token, etc.).

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::{debug, warn};

use chromaplay_core::{ClientOptions, ConnectionUpdate};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use chromaplay_config::{
    Config, Profile, config_path, load_config_or_default, remember_last_used, save_config,
};

/// Everything needed to open a session against one server.
#[derive(Debug)]
pub struct Session {
    pub profile_name: String,
    pub options: ClientOptions,
    pub update: ConnectionUpdate,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Fill `--output` / `--color` from the `[defaults]` table when not given.
pub fn apply_defaults(global: &mut GlobalOpts, config: &Config) {
    if global.output.is_none() {
        global.output = parse_setting("output", &config.defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_setting("color", &config.defaults.color);
    }
}

fn parse_setting<T: ValueEnum>(key: &str, raw: &str) -> Option<T> {
    let parsed = T::from_str(raw, true).ok();
    if parsed.is_none() {
        warn!(key, value = raw, "ignoring invalid default");
    }
    parsed
}

/// Translate the active profile + global flags into a session.
///
/// Flag overrides take priority over profile values. A missing profile is
/// an error only when named explicitly; otherwise built-in defaults apply.
pub fn resolve_session(global: &GlobalOpts, config: &Config) -> Result<Session, CliError> {
    let profile_name = active_profile_name(global, config);
    let profile = match config.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(config),
            });
        }
        None => {
            debug!(profile = %profile_name, "profile not configured, using defaults");
            Profile::default()
        }
    };

    // 1. URL (flag > env > profile)
    let url = chromaplay_config::parse_url(global.url.as_deref().unwrap_or(&profile.url))?;

    // 2. Timeout (flag > profile > defaults)
    let timeout = global
        .timeout
        .or(profile.timeout)
        .or(config.defaults.timeout)
        .map(Duration::from_secs);

    // 3. Bearer token (flag > env var > keyring > plaintext)
    let auth_token = match global.token {
        Some(ref token) => Some(SecretString::from(token.clone())),
        None => chromaplay_config::resolve_auth_token(&profile, &profile_name),
    };

    // 4. Namespace
    let update = ConnectionUpdate {
        tenant: global.tenant.clone().or(profile.tenant),
        database: global.database.clone().or(profile.database),
        auth_token,
    };

    Ok(Session {
        profile_name,
        options: ClientOptions::new(url).with_timeout(timeout),
        update,
    })
}

/// Comma-separated profile names, sorted, for diagnostics.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

impl GlobalOpts {
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["chromaplay"];
        argv.extend_from_slice(args);
        argv.push("shell");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with(name: &str, profile: Profile) -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(name.into(), profile);
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with(
            "default",
            Profile {
                url: "http://profile-host:8000".into(),
                tenant: Some("acme".into()),
                database: Some("prod".into()),
                auth_token: Some("from-profile".into()),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        let g = global(&[
            "--url",
            "http://flag-host:9000",
            "--database",
            "staging",
            "--token",
            "from-flag",
            "--timeout",
            "30",
        ]);

        let session = resolve_session(&g, &cfg).unwrap();

        assert_eq!(session.options.url.as_str(), "http://flag-host:9000/");
        assert_eq!(session.options.timeout, Some(Duration::from_secs(30)));
        assert_eq!(session.update.tenant.as_deref(), Some("acme"));
        assert_eq!(session.update.database.as_deref(), Some("staging"));
        assert_eq!(
            session.update.auth_token.unwrap().expose_secret(),
            "from-flag"
        );
    }

    #[test]
    fn unnamed_missing_profile_uses_defaults() {
        let session = resolve_session(&global(&[]), &Config::default()).unwrap();
        assert_eq!(session.profile_name, "default");
        assert_eq!(session.options.url.as_str(), "http://localhost:8000/");
        assert_eq!(session.options.timeout, None);
    }

    #[test]
    fn named_missing_profile_is_an_error() {
        let cfg = config_with("local", Profile::default());
        let err = resolve_session(&global(&["--profile", "cloud"]), &cfg).unwrap_err();
        assert!(matches!(
            err,
            CliError::ProfileNotFound { ref available, .. } if available == "local"
        ));
    }

    #[test]
    fn defaults_table_fills_output_format() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        cfg.defaults.color = "bogus".into();

        let mut g = global(&[]);
        apply_defaults(&mut g, &cfg);
        assert_eq!(g.format(), OutputFormat::Yaml);
        assert_eq!(g.color_mode(), ColorMode::Auto);

        let mut explicit = global(&["-o", "json"]);
        apply_defaults(&mut explicit, &cfg);
        assert_eq!(explicit.format(), OutputFormat::Json);
    }
}
