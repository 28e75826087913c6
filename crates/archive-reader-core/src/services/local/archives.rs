use super::LocalLibrary;
use crate::services::{ArchiveService, FileId};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use url::Url;

pub const ARCHIVE_URL_SCHEME: &str = "zim";

/// Resolves opened archives to the URL of their main page.
#[derive(Debug, Clone)]
pub struct LocalArchives {
    library: Arc<LocalLibrary>,
}

impl LocalArchives {
    pub fn new(library: Arc<LocalLibrary>) -> Self {
        Self { library }
    }
}

#[async_trait]
impl ArchiveService for LocalArchives {
    async fn main_page_url(&self, file: &FileId) -> Option<Url> {
        if !self.library.is_opened(file) {
            return None;
        }
        match Url::parse(&format!("{ARCHIVE_URL_SCHEME}://{file}/")) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(%file, "Could not build main page URL: {err}");
                None
            }
        }
    }
}
