mod photo;
mod search;

pub use photo::{ImageUrl, Photo, Size};
pub use search::{SearchResult, parse_search_response};
