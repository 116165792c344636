use rusqlite::ErrorCode;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Coarse classification used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    // -- Validation --
    #[error("players must be two distinct existing profiles")]
    InvalidPlayers,

    #[error("score must be a non-negative 32-bit integer, got {0}")]
    InvalidScore(i64),

    #[error("winner {0} did not play in any of the supplied matches")]
    WinnerNotParticipant(Uuid),

    #[error("a tournament needs at least one match")]
    EmptyMatchSet,

    #[error("a profile cannot befriend itself")]
    SelfFriend,

    #[error("a chat needs at least two distinct participants")]
    TooFewParticipants,

    #[error("profile {profile} is not a participant of chat {chat}")]
    NotAParticipant { chat: Uuid, profile: Uuid },

    #[error("message content is empty")]
    EmptyContent,

    #[error("username must be 3 to 32 characters")]
    InvalidUsername,

    #[error("email address is malformed")]
    InvalidEmail,

    // -- Not found --
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    // -- Conflict --
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("match {0} already belongs to a tournament")]
    MatchAlreadySettled(Uuid),

    #[error("match {0} already has a winner")]
    WinnerAlreadyAssigned(Uuid),

    #[error("storage stayed busy after retry")]
    StorageConflict,

    // -- Internal --
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("corrupt row: {0}")]
    CorruptRow(String),

    #[error("database lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn kind(&self) -> ErrorKind {
        use LedgerError::*;
        match self {
            InvalidPlayers
            | InvalidScore(_)
            | WinnerNotParticipant(_)
            | EmptyMatchSet
            | SelfFriend
            | TooFewParticipants
            | NotAParticipant { .. }
            | EmptyContent
            | InvalidUsername
            | InvalidEmail => ErrorKind::Validation,
            NotFound { .. } => ErrorKind::NotFound,
            DuplicateUsername(_)
            | MatchAlreadySettled(_)
            | WinnerAlreadyAssigned(_)
            | StorageConflict => ErrorKind::Conflict,
            Storage(_) | CorruptRow(_) | LockPoisoned => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable name, returned to callers alongside the message.
    pub fn code(&self) -> &'static str {
        use LedgerError::*;
        match self {
            InvalidPlayers => "InvalidPlayers",
            InvalidScore(_) => "InvalidScore",
            WinnerNotParticipant(_) => "WinnerNotParticipant",
            EmptyMatchSet => "EmptyMatchSet",
            SelfFriend => "SelfFriend",
            TooFewParticipants => "TooFewParticipants",
            NotAParticipant { .. } => "NotAParticipant",
            EmptyContent => "EmptyContent",
            InvalidUsername => "InvalidUsername",
            InvalidEmail => "InvalidEmail",
            NotFound { .. } => "NotFound",
            DuplicateUsername(_) => "DuplicateUsername",
            MatchAlreadySettled(_) => "MatchAlreadySettled",
            WinnerAlreadyAssigned(_) => "WinnerAlreadyAssigned",
            StorageConflict => "ConflictError",
            Storage(_) | CorruptRow(_) | LockPoisoned => "InternalError",
        }
    }

    /// True when SQLite gave up waiting on another writer.
    pub(crate) fn is_busy(&self) -> bool {
        match self {
            Self::Storage(rusqlite::Error::SqliteFailure(e, _)) => {
                matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            }
            _ => false,
        }
    }

    /// True for a UNIQUE constraint violation.
    pub(crate) fn is_unique_violation(&self) -> bool {
        match self {
            Self::Storage(rusqlite::Error::SqliteFailure(e, _)) => {
                e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            }
            _ => false,
        }
    }
}
