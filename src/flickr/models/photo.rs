use std::{
    fmt,
    hash::{Hash, Hasher},
};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::favourites::{self, FavouriteStore};

/// `_` stays encoded so it only ever appears as the file name separator.
const URL_FIELD: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    #[default]
    Thumbnail,
    Large,
}

impl Size {
    pub fn code(self) -> &'static str {
        match self {
            Size::Thumbnail => "m",
            Size::Large => "b",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Size::Thumbnail),
            "b" => Some(Size::Large),
            _ => None,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::Thumbnail => f.write_str("thumbnail"),
            Size::Large => f.write_str("large"),
        }
    }
}

/// One search hit. Absent fields fall back to empty strings and zero.
#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    #[serde(rename = "id", default)]
    photo_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    farm: u32,
    #[serde(default)]
    server: String,
    #[serde(default)]
    secret: String,
}

impl Photo {
    pub fn new(
        photo_id: impl Into<String>,
        title: impl Into<String>,
        farm: u32,
        server: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            photo_id: photo_id.into(),
            title: title.into(),
            farm,
            server: server.into(),
            secret: secret.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.photo_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn farm(&self) -> u32 {
        self.farm
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn image_url(&self, size: Size) -> String {
        format!(
            "http://farm{}.staticflickr.com/{}",
            self.farm,
            self.image_path(size)
        )
    }

    /// Path below the static host, e.g. `9/123_abc_m.jpg`.
    pub fn image_path(&self, size: Size) -> String {
        format!(
            "{}/{}_{}_{}.jpg",
            utf8_percent_encode(&self.server, URL_FIELD),
            utf8_percent_encode(&self.photo_id, URL_FIELD),
            utf8_percent_encode(&self.secret, URL_FIELD),
            size.code()
        )
    }

    pub fn is_favourite<S: FavouriteStore + ?Sized>(&self, store: &S) -> bool {
        store.get(&self.photo_id)
    }

    pub fn set_favourite<S: FavouriteStore + ?Sized>(
        &self,
        store: &S,
        favourite: bool,
    ) -> favourites::Result<()> {
        store.set(&self.photo_id, favourite)
    }
}

impl PartialEq for Photo {
    fn eq(&self, other: &Self) -> bool {
        self.photo_id == other.photo_id
    }
}

impl Eq for Photo {}

impl Hash for Photo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.photo_id.hash(state);
    }
}

/// The pieces of a static image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrl {
    pub farm: u32,
    pub server: String,
    pub photo_id: String,
    pub secret: String,
    pub size: Size,
}

impl ImageUrl {
    pub fn parse(url: &str) -> Option<Self> {
        let url = Url::parse(url).ok()?;

        let farm = url
            .host_str()?
            .strip_suffix(".staticflickr.com")?
            .strip_prefix("farm")?
            .parse()
            .ok()?;

        let mut segments = url.path_segments()?;
        let server = decode(segments.next()?)?;
        let file = segments.next()?;
        if segments.next().is_some() {
            return None;
        }

        let mut parts = file.strip_suffix(".jpg")?.split('_');
        let photo_id = decode(parts.next()?)?;
        let secret = decode(parts.next()?)?;
        let size = Size::from_code(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            farm,
            server,
            photo_id,
            secret,
            size,
        })
    }
}

fn decode(field: &str) -> Option<String> {
    percent_decode_str(field)
        .decode_utf8()
        .ok()
        .map(|field| field.into_owned())
}
