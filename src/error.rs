/// Fatal startup failures. Reported on stderr; the process exits with 1.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::level::LevelError;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("terminal init failed: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("could not open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("race mode reads the opponent from stdin, but stdin is a terminal; pipe the peer in")]
    PeerIsTerminal,

    #[error("could not start the race reader: {0}")]
    Reader(#[source] std::io::Error),

    #[error(transparent)]
    Level(#[from] LevelError),
}
