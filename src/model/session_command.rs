use super::ProfileUpdate;

/// Actions a presentation layer can send to the session.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    StartNewGame,
    ContinueGame,
    MakeGuess(i64),
    PauseGame,
    ResumeGame,
    RestartLevel,
    GoToMainMenu,
    UpdateProfile(ProfileUpdate),
    ResetProgress,
    Poll,
}
