use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::Photo;
use crate::flickr::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    term: String,
    photos: Vec<Photo>,
}

impl SearchResult {
    pub fn new(term: impl Into<String>, photos: Vec<Photo>) -> Self {
        Self {
            term: term.into(),
            photos,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn into_photos(self) -> Vec<Photo> {
        self.photos
    }
}

#[derive(Debug, Deserialize)]
struct Status {
    stat: String,
    #[serde(default)]
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Page {
    photos: Photos,
}

#[derive(Debug, Deserialize)]
struct Photos {
    photo: Vec<Photo>,
}

/// Maps a `flickr.photos.search` response body onto a [`SearchResult`].
pub fn parse_search_response(term: &str, body: &[u8]) -> Result<SearchResult> {
    let status: Status = serde_json::from_slice(body)?;

    match status.stat.as_str() {
        "ok" => {}
        "fail" => {
            let message = match status.message {
                Some(Value::String(message)) => message,
                Some(Value::Null) | None => "request failed".to_string(),
                Some(other) => other.to_string(),
            };

            return Err(Error::Api(message));
        }
        other => {
            debug!(stat = other, "unrecognized stat in search response");

            return Err(Error::Unknown);
        }
    }

    let page: Page = serde_json::from_slice(body)?;

    Ok(SearchResult::new(term, page.photos.photo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flickr::Size;

    #[test]
    fn single_photo_response() {
        let body = br#"{"stat":"ok","photos":{"photo":[{"id":"123","title":"cat","farm":5,"server":"9","secret":"abc"}]}}"#;

        let result = parse_search_response("cat", body).expect("parse response");
        assert_eq!(result.term(), "cat");
        assert_eq!(result.photos().len(), 1);

        let photo = &result.photos()[0];
        assert_eq!(photo.id(), "123");
        assert_eq!(photo.title(), "cat");
        assert_eq!(
            photo.image_url(Size::Thumbnail),
            "http://farm5.staticflickr.com/9/123_abc_m.jpg"
        );
    }

    #[test]
    fn keeps_response_order_and_count() {
        let body = br#"{
            "stat": "ok",
            "photos": {
                "page": 1,
                "perpage": 30,
                "photo": [
                    {"id": "3", "owner": "x", "title": "c", "farm": 1, "server": "1", "secret": "s", "ispublic": 1},
                    {"id": "1", "title": "a", "farm": 2, "server": "2", "secret": "t"},
                    {"id": "2", "title": "b", "farm": 3, "server": "3", "secret": "u"}
                ]
            }
        }"#;

        let result = parse_search_response("abc", body).expect("parse response");
        let ids: Vec<_> = result.photos().iter().map(Photo::id).collect();
        assert_eq!(ids, ["3", "1", "2"]);
    }

    #[test]
    fn missing_entry_fields_default() {
        let body = br#"{"stat":"ok","photos":{"photo":[{"id":"9"},{}]}}"#;

        let result = parse_search_response("x", body).expect("parse response");
        let second = &result.photos()[1];
        assert_eq!(second.id(), "");
        assert_eq!(second.title(), "");
        assert_eq!(second.farm(), 0);
        assert_eq!(second.server(), "");
        assert_eq!(second.secret(), "");
    }

    #[test]
    fn fail_is_an_api_error() {
        let err = parse_search_response("x", br#"{"stat":"fail"}"#).unwrap_err();
        assert_eq!(err, Error::Api("request failed".into()));

        let err = parse_search_response(
            "x",
            br#"{"stat":"fail","code":100,"message":"Invalid API Key (Key has invalid format)"}"#,
        )
        .unwrap_err();
        assert_eq!(err, Error::Api("Invalid API Key (Key has invalid format)".into()));
    }

    #[test]
    fn fail_with_odd_message_is_still_an_api_error() {
        let err = parse_search_response("x", br#"{"stat":"fail","code":105,"message":105}"#)
            .unwrap_err();
        assert_eq!(err, Error::Api("105".into()));

        let err = parse_search_response("x", br#"{"stat":"fail","message":null}"#).unwrap_err();
        assert_eq!(err, Error::Api("request failed".into()));

        let err = parse_search_response("x", br#"{"stat":"fail","message":{"text":"down"}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Api(message) if message.contains("down")));
    }

    #[test]
    fn other_stat_is_unknown() {
        let err = parse_search_response("x", br#"{"stat":"maybe"}"#).unwrap_err();
        assert_eq!(err, Error::Unknown);
    }

    #[test]
    fn malformed_bodies_are_json_errors() {
        let bodies: [&[u8]; 7] = [
            b"not json",
            b"",
            b"[]",
            br#"{"photos":{"photo":[]}}"#,
            br#"{"stat":"ok"}"#,
            br#"{"stat":"ok","photos":{"photo":{}}}"#,
            br#"{"stat":"ok","photos":{"photo":[{"id":"1","farm":"five"}]}}"#,
        ];

        for body in bodies {
            let err = parse_search_response("x", body).unwrap_err();
            assert!(matches!(err, Error::Json(_)), "{err:?} for {body:?}");
        }
    }
}
