use std::path::PathBuf;

pub trait AppPaths: Send + Sync {
    fn data_dir(&self) -> PathBuf;

    fn settings_file(&self) -> PathBuf {
        self.data_dir().join("settings.json")
    }
}

#[cfg(feature = "desktop")]
pub struct DesktopPaths;

#[cfg(feature = "desktop")]
impl AppPaths for DesktopPaths {
    fn data_dir(&self) -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("vidlingo"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Rooted at a fixed directory, for portable installs and tests.
pub struct FixedPaths {
    pub root: PathBuf,
}

impl AppPaths for FixedPaths {
    fn data_dir(&self) -> PathBuf {
        self.root.clone()
    }
}
