use bytes::Bytes;
use image::DynamicImage;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use tracing::{debug, info, warn};

pub mod error;
pub mod models;
pub mod result;

pub use error::{Alert, Error};
pub use models::{ImageUrl, Photo, SearchResult, Size, parse_search_response};
pub use result::Result;

pub const API_KEY_VAR: &str = "FLICKR_API_KEY";
pub const PER_PAGE: u32 = 30;

macro_rules! flickr_api {
    ($end_point:expr) => {
        concat!("https://api.flickr.com", $end_point)
    };
}

macro_rules! query_params {
    ($($key:expr => $value:expr),+ $(,)?) => {
        &[
            $(($key, $value.to_string())),+
        ]
    };
}

/// Where requests are sent. `image` replaces the `farmN.staticflickr.com`
/// host when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub rest: String,
    pub image: Option<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            rest: flickr_api!("/services/rest/").to_string(),
            image: None,
        }
    }
}

impl Endpoints {
    pub fn image_url(&self, photo: &Photo, size: Size) -> String {
        match &self.image {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), photo.image_path(size)),
            None => photo.image_url(size),
        }
    }
}

#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    api_key: String,
    endpoints: Endpoints,
}

impl Client {
    pub fn new<T: AsRef<str>>(api_key: T) -> Result<Self> {
        Self::with_endpoints(api_key, Endpoints::default())
    }

    pub fn new_from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| Error::InvalidApiKey)?;

        Self::new(api_key)
    }

    pub fn with_endpoints<T: AsRef<str>>(api_key: T, endpoints: Endpoints) -> Result<Self> {
        let api_key = api_key.as_ref().trim();
        if api_key.is_empty() {
            return Err(Error::InvalidApiKey);
        }

        Ok(Self {
            http: HttpClient::builder().build()?,
            api_key: api_key.to_string(),
            endpoints,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn search<T: AsRef<str>>(&self, term: T) -> Result<SearchResult> {
        let term = term.as_ref();
        debug!(term, "searching flickr");

        let request = self.http.get(&self.endpoints.rest).query(query_params!(
            "method" => "flickr.photos.search",
            "api_key" => self.api_key,
            "text" => term,
            "per_page" => PER_PAGE,
            "format" => "json",
            "nojsoncallback" => 1,
        ));

        let response = Self::send_request(request).await?;
        let body = response.bytes().await?;

        let result = parse_search_response(term, &body).inspect_err(|err| {
            warn!(term, error = %err, "search response rejected");
        })?;
        info!(term, count = result.photos().len(), "search complete");

        Ok(result)
    }

    pub async fn load_image_bytes(&self, photo: &Photo, size: Size) -> Result<Bytes> {
        let url = self.endpoints.image_url(photo, size);
        debug!(%url, photo = photo.id(), %size, "loading image");

        let response = Self::send_request(self.http.get(&url)).await?;
        let data = response.bytes().await?;

        if data.is_empty() {
            warn!(%url, "image response was empty");
            return Err(Error::Unknown);
        }

        Ok(data)
    }

    pub async fn load_image(&self, photo: &Photo, size: Size) -> Result<DynamicImage> {
        let data = self.load_image_bytes(photo, size).await?;

        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&data))
            .await
            .map_err(|_| Error::Unknown)?;

        decoded.map_err(|err| {
            warn!(photo = photo.id(), error = %err, "image could not be decoded");
            Error::Unknown
        })
    }

    async fn send_request(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.inspect_err(|err| {
            warn!(error = %err, "request failed");
        })?;

        if !response.status().is_success() {
            return Err(Error::Api(format!("HTTP error {}", response.status())));
        }

        Ok(response)
    }
}
