/// Why a theme switch did not complete
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    /// The id is not registered in the catalog; nothing was changed
    #[error("Theme \"{0}\" not found")]
    NotFound(String),
    /// The stylesheet fired an error event; the active id was reverted
    #[error("Failed to load theme: {0}")]
    LoadFailed(String),
    /// A later switch took over before this one settled
    #[error("Theme switch to \"{0}\" was superseded")]
    Superseded(String),
    /// The switcher went away before the stylesheet settled
    #[error("Theme switch to \"{0}\" was dropped before it settled")]
    Dropped(String),
}

impl ThemeError {
    /// Theme id the failed request targeted
    pub fn theme(&self) -> &str {
        match self {
            ThemeError::NotFound(id)
            | ThemeError::LoadFailed(id)
            | ThemeError::Superseded(id)
            | ThemeError::Dropped(id) => id,
        }
    }
}
