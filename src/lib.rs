//! Search Flickr for photos and fetch their images.

pub mod config;
pub mod favourites;
pub mod flickr;
pub mod searcher;

pub use favourites::{FavouriteStore, FileStore, MemoryStore};
pub use flickr::{
    Alert, Client, Endpoints, Error, ImageUrl, Photo, Result, SearchResult, Size,
};
pub use searcher::{Deliveries, Delivery, Searcher};
