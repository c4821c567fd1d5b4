use thiserror::Error;

/// Required page fields that could not be extracted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("page has no h3 title")]
    MissingTitle,
    #[error("missing or invalid release timestamp: {0:?}")]
    MissingOrInvalidTimestamp(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("link already recorded: {0}")]
    DuplicateLink(String),
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sea_orm::DbErr),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("telegram request failed: {0}")]
    Http(#[from] wreq::Error),
    #[error("telegram rejected message ({code}): {description}")]
    Rejected { code: i64, description: String },
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] wreq::Error),
    #[error("feed is not valid xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Failure to turn a feed entry into a [`crate::models::Release`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("http error: {0}")]
    Http(#[from] wreq::Error),
}

pub type AppResult<T> = Result<T, AppError>;
