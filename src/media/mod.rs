//! Media host abstraction for report photos.

pub mod http;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::Result;

/// Remote image storage.
pub trait MediaHost: Send + Sync {
    /// Store `bytes` under `folder` and return the public URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Media`](crate::AppError::Media) if the upload is
    /// refused or the response carries no URL.
    fn upload(
        &self,
        folder: &str,
        file_name: &str,
        bytes: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;
}
