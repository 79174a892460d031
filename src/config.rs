use dotenv::dotenv;
use std::{
    env::{current_exe, var},
    path::PathBuf,
};

pub struct Config {
    pub port: u16,
    pub directory: PathBuf,
    pub open_browser: bool,
}

impl Config {
    pub fn get() -> Self {
        dotenv().ok();

        Self {
            port: var("DOCS_PORT")
                .ok()
                .and_then(|port| port.trim().parse::<u16>().ok())
                .unwrap_or(8000),
            directory: var("DOCS_DIR")
                .ok()
                .map(|directory| PathBuf::from(directory.trim()))
                .unwrap_or_else(Self::default_directory),
            open_browser: var("DOCS_OPEN_BROWSER").map_or(true, |open_browser| {
                open_browser.trim().to_lowercase() != "false"
            }),
        }
    }

    // The docs live next to the binary, so lookups default to its directory.
    fn default_directory() -> PathBuf {
        current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
