use shelter_core::BackendFailure;
use thiserror::Error;

/// Why a position fix could not be obtained.
///
/// The `Display` text is the user-facing message for each case.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LocationFailure {
    #[error("Location permission was denied. Allow location access in your browser or device settings.")]
    PermissionDenied,

    #[error("Location information is unavailable.")]
    PositionUnavailable,

    #[error("The location request timed out.")]
    Timeout,

    #[error("An unknown error occurred while getting your location.")]
    Unknown,

    #[error("This device does not support location services.")]
    Unsupported,
}

/// A focus transition that could not be resolved to a record or marker.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LookupFailure {
    #[error("no shelter at index {0}")]
    RecordNotFound(usize),

    #[error("no map marker for shelter at index {0}")]
    MarkerNotFound(usize),

    #[error("marker {0} is not part of the current result set")]
    UnknownMarker(u64),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryFailure {
    #[error(transparent)]
    Backend(#[from] BackendFailure),

    #[error("enter a keyword to search")]
    EmptyKeyword,

    #[error("set your current location first")]
    LocationUnknown,
}

/// Failure of a composite engine operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Location(#[from] LocationFailure),

    #[error(transparent)]
    Query(#[from] QueryFailure),
}
