use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Missing or invalid API key")]
    InvalidApiKey,

    #[error("API error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Json(String),

    #[error("Unrecognized response")]
    Unknown,
}

/// Short, user-facing rendering of an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
}

impl Error {
    pub fn alert(&self) -> Alert {
        let (title, message) = match self {
            Error::InvalidApiKey => (
                "Missing API key",
                "Set FLICKR_API_KEY before searching.".to_string(),
            ),
            Error::Api(message) => ("Flickr request failed", message.clone()),
            Error::Json(_) => (
                "Unexpected response",
                "Flickr sent a response that could not be read.".to_string(),
            ),
            Error::Unknown => ("Something went wrong", "Please try again.".to_string()),
        };

        Alert { title, message }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let mut message = err.to_string();

        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }

        Error::Api(message)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn api_alert_carries_message() {
        let alert = Error::Api("connection refused".into()).alert();
        assert_eq!(alert.title, "Flickr request failed");
        assert_eq!(alert.message, "connection refused");
    }

    #[test]
    fn every_kind_has_a_distinct_title() {
        let titles = [
            Error::InvalidApiKey.alert().title,
            Error::Api(String::new()).alert().title,
            Error::Json(String::new()).alert().title,
            Error::Unknown.alert().title,
        ];

        for (i, a) in titles.iter().enumerate() {
            for b in &titles[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn json_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(Error::from(err), Error::Json(_)));
    }
}
