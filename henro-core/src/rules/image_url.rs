/// Default download host for storage objects.
pub const DEFAULT_BASE_URL: &str = "https://firebasestorage.googleapis.com";

/// Builds public download URLs for images kept in a storage bucket.
///
/// Objects are laid out as `<folder>/<id>/<filename>`; the whole object path
/// is percent-encoded into a single URL segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUrlTemplate {
    pub base_url: String,
    pub bucket: String,
    pub folder: String,
    pub token: Option<String>,
}

impl ImageUrlTemplate {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bucket: bucket.into(),
            folder: String::new(),
            token: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn url(&self, id: &str, filename: &str) -> String {
        let folder = self.folder.trim_matches('/');
        let object = if folder.is_empty() {
            format!("{}/{}", id, filename)
        } else {
            format!("{}/{}/{}", folder, id, filename)
        };

        let mut url = format!(
            "{}/v0/b/{}/o/{}?alt=media",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            urlencoding::encode(&object)
        );
        if let Some(token) = &self.token {
            url.push_str("&token=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }
}
