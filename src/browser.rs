use anyhow::Result;

/// Best-effort launcher for the host's default web browser.
pub trait Browser: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        webbrowser::open(url)?;
        Ok(())
    }
}
