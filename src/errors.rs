#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status. `message` carries the
    /// backend's own `message` field when present, otherwise a generic
    /// "Request failed (status)" fallback.
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn backend(status: u16, message: Option<String>) -> Self {
        ApiError::Backend {
            status,
            message: message.unwrap_or_else(|| format!("Request failed ({status})")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Request timed out. Please try again.")]
    TimedOut,

    /// Another submission is already running; callers treat this as "ignore
    /// the click", not as a user-visible failure.
    #[error("a submission is already in flight")]
    InFlight,

    #[error("No booking data found.")]
    NoBookingData,

    #[error("Booking failed. Please try again.")]
    EmptyResponse,

    #[error("{0}")]
    Api(#[from] ApiError),
}
