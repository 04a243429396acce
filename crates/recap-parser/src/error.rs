#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty log content")]
    EmptyLog,

    #[error("no hosts found in log: no PLAY RECAP section")]
    NoRecap,
}
