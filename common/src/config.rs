use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_INVENTORY_FILE: &str = "veritabani.csv";
pub const DEFAULT_HELPER_SCRIPT: &str = "/usr/local/bin/kyland_check.py";
pub const DEFAULT_HELPER_INTERPRETER: &str = "python3";

/// Paths and knobs read from the environment once at startup.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Directory holding the inventory, list files and generated reports.
    ///
    /// `$TMCHECK_SOURCE_DIR`, falling back to `~/source`.
    pub source_dir: PathBuf,
    /// Inventory CSV. `$TMCHECK_INVENTORY` or `<source_dir>/veritabani.csv`.
    pub inventory: PathBuf,
    pub helper: HelperSettings,
    /// Records probed concurrently. `1` keeps the fully sequential pass.
    pub jobs: usize,
}

/// The external version/command query script.
#[derive(Clone, Debug)]
pub struct HelperSettings {
    pub interpreter: String,
    pub script: PathBuf,
}

impl HelperSettings {
    pub fn is_installed(&self) -> bool {
        self.script.exists()
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let home: PathBuf = env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let source_dir: PathBuf = env::var_os("TMCHECK_SOURCE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("source"));
        let inventory: PathBuf = env::var_os("TMCHECK_INVENTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|| source_dir.join(DEFAULT_INVENTORY_FILE));

        let helper: HelperSettings = HelperSettings {
            interpreter: env::var("TMCHECK_HELPER_INTERPRETER")
                .unwrap_or_else(|_| DEFAULT_HELPER_INTERPRETER.to_string()),
            script: env::var_os("TMCHECK_HELPER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HELPER_SCRIPT)),
        };

        let jobs: usize = env::var("TMCHECK_JOBS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(1);

        Self {
            source_dir,
            inventory,
            helper,
            jobs,
        }
    }

    /// Builds settings rooted at an explicit directory. Used by tests and by
    /// callers that do not want environment lookups.
    pub fn rooted_at(source_dir: &Path) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            inventory: source_dir.join(DEFAULT_INVENTORY_FILE),
            helper: HelperSettings {
                interpreter: DEFAULT_HELPER_INTERPRETER.to_string(),
                script: PathBuf::from(DEFAULT_HELPER_SCRIPT),
            },
            jobs: 1,
        }
    }

    /// Resolves a list or inventory file the way operators pass it: as given,
    /// or relative to the source directory.
    pub fn locate_source_file(&self, name: &str) -> Option<PathBuf> {
        let direct: PathBuf = PathBuf::from(name);
        if direct.is_file() {
            return Some(direct);
        }
        let in_source: PathBuf = self.source_dir.join(name);
        in_source.is_file().then_some(in_source)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
