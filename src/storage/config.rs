use vidlingo_core::fs_paths::AppPaths;
use vidlingo_core::models::settings::AppSettings;

pub const API_URL_ENV: &str = "VIDLINGO_API_URL";

/// Reads `settings.json` from the data dir. A missing file is seeded with
/// defaults, an unreadable one yields defaults; `VIDLINGO_API_URL` overrides
/// the backend url.
pub fn load_settings(paths: &dyn AppPaths) -> AppSettings {
    if !paths.settings_file().exists() {
        if let Err(e) = save_settings(paths, &AppSettings::default()) {
            tracing::warn!("Could not write default settings: {}", e);
        }
    }
    let mut settings = read_settings_file(paths);
    apply_env_overrides(&mut settings, std::env::var(API_URL_ENV).ok());
    settings
}

fn read_settings_file(paths: &dyn AppPaths) -> AppSettings {
    let path = paths.settings_file();
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(_) => return AppSettings::default(),
    };
    match serde_json::from_str::<AppSettings>(&raw) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Ignoring invalid settings at {}: {}", path.display(), e);
            AppSettings::default()
        }
    }
}

fn apply_env_overrides(settings: &mut AppSettings, api_url: Option<String>) {
    if let Some(url) = api_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
        settings.backend.base_url = url;
    }
}

pub fn save_settings(paths: &dyn AppPaths, settings: &AppSettings) -> anyhow::Result<()> {
    let path = paths.settings_file();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use vidlingo_core::fs_paths::FixedPaths;
    use vidlingo_core::models::settings::ResponseMode;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = FixedPaths {
            root: dir.path().join("none"),
        };
        let s = read_settings_file(&paths);
        assert_eq!(s.schema_version, 1);
        assert_eq!(s.backend.response_mode, ResponseMode::Redirect);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = FixedPaths {
            root: dir.path().join("cfg"),
        };
        let mut s = AppSettings::default();
        s.backend.base_url = "http://10.1.1.1:9000".into();
        s.backend.response_mode = ResponseMode::Binary;
        s.download.open_on_complete = false;
        save_settings(&paths, &s).unwrap();

        let loaded = read_settings_file(&paths);
        assert_eq!(loaded.backend.base_url, "http://10.1.1.1:9000");
        assert_eq!(loaded.backend.response_mode, ResponseMode::Binary);
        assert!(!loaded.download.open_on_complete);
    }

    #[test]
    fn first_load_seeds_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = FixedPaths {
            root: dir.path().join("fresh"),
        };
        assert!(!paths.settings_file().exists());

        let s = load_settings(&paths);
        assert!(paths.settings_file().exists());
        assert_eq!(read_settings_file(&paths).schema_version, s.schema_version);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = FixedPaths {
            root: dir.path().to_path_buf(),
        };
        std::fs::write(paths.settings_file(), "{ not json").unwrap();
        let s = read_settings_file(&paths);
        assert_eq!(s.backend.base_url, AppSettings::default().backend.base_url);
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut s = AppSettings::default();
        apply_env_overrides(&mut s, Some(" http://api.internal ".into()));
        assert_eq!(s.backend.base_url, "http://api.internal");

        let before = s.backend.base_url.clone();
        apply_env_overrides(&mut s, Some("   ".into()));
        apply_env_overrides(&mut s, None);
        assert_eq!(s.backend.base_url, before);
    }
}
