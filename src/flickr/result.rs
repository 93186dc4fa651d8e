use super::Error;

pub type Result<T> = core::result::Result<T, Error>;
