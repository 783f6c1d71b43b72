use crate::error::{ErrorKind, GameError};

/// Failures of the accrual engine's operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AccrualError {
    #[error("unknown collection source `{source_id}`")]
    UnknownSource { source_id: String },

    #[error("no collection source selected")]
    NoSourceSelected,

    #[error("daily collection limit reached ({cap_hours}h)")]
    DailyCapExhausted { cap_hours: f64 },

    #[error("collection is not running")]
    NotCollecting,

    #[error("nothing to claim")]
    NothingToClaim,
}

impl GameError for AccrualError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownSource { .. } | Self::NoSourceSelected => ErrorKind::NotFound,
            Self::DailyCapExhausted { .. } => ErrorKind::PreconditionFailed,
            Self::NotCollecting | Self::NothingToClaim => ErrorKind::NoOp,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSource { .. } => "ACCRUAL_UNKNOWN_SOURCE",
            Self::NoSourceSelected => "ACCRUAL_NO_SOURCE",
            Self::DailyCapExhausted { .. } => "ACCRUAL_DAILY_CAP",
            Self::NotCollecting => "ACCRUAL_NOT_COLLECTING",
            Self::NothingToClaim => "ACCRUAL_NOTHING_TO_CLAIM",
        }
    }
}

pub type AccrualResult<T> = Result<T, AccrualError>;
