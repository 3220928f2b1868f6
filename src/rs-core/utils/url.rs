use std::fmt::Display;
use thiserror::Error;

/// Abstraction allowing to help with the handling of the manifest URL a session plays.
///
/// The URL is expected to be already fully resolved by the caller (authentication query
/// parameters included), so the only processing done here is validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Url {
    inner: String,
}

/// Error returned when a manifest URL cannot be used to start a session.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManifestUrlError {
    #[error("The manifest URL is empty.")]
    Empty,
    #[error("Unsupported `{scheme}` scheme in manifest URL: only http and https are playable.")]
    UnsupportedScheme { scheme: String },
}

impl Url {
    /// Validate a manifest URL given by the JavaScript-side.
    ///
    /// Surrounding whitespace is trimmed. Relative URLs are accepted as-is since the media
    /// element resolves them against the page.
    pub fn parse_manifest(url: &str) -> Result<Self, ManifestUrlError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ManifestUrlError::Empty);
        }
        let url = Self {
            inner: trimmed.to_owned(),
        };
        if let Some(scheme) = url.scheme() {
            if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
                return Err(ManifestUrlError::UnsupportedScheme {
                    scheme: scheme.to_owned(),
                });
            }
        }
        Ok(url)
    }

    pub fn get_ref(&self) -> &str {
        self.inner.as_str()
    }

    pub fn is_absolute(&self) -> bool {
        is_absolute_url(self.inner.as_bytes())
    }

    /// Scheme of an absolute URL, without the trailing `:`.
    fn scheme(&self) -> Option<&str> {
        if !self.is_absolute() {
            return None;
        }
        self.inner.find(':').map(|idx| &self.inner[..idx])
    }
}

impl Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_ref())
    }
}

fn is_absolute_url(bytes: &[u8]) -> bool {
    let mut offset = 0;
    loop {
        if bytes.len() < offset + 1 {
            return false;
        }
        if bytes[offset].is_ascii_alphabetic() {
            offset += 1;
            continue;
        } else if bytes[offset] == b':' {
            if offset == 0 {
                return false;
            }
            offset += 1;
            break;
        } else {
            return false;
        }
    }

    bytes.len() >= offset + 2 && &bytes[offset..offset + 2] == b"//"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts_http_urls() {
        let url = Url::parse_manifest("  https://cam.local/hls/front/index.m3u8?token=a ").unwrap();
        assert_eq!(url.get_ref(), "https://cam.local/hls/front/index.m3u8?token=a");
        assert!(url.is_absolute());
    }

    #[test]
    fn accepts_relative_urls() {
        let url = Url::parse_manifest("/hls/front/index.m3u8").unwrap();
        assert!(!url.is_absolute());
    }

    #[test]
    fn rejects_empty_urls() {
        assert_eq!(Url::parse_manifest(""), Err(ManifestUrlError::Empty));
        assert_eq!(Url::parse_manifest(" \t"), Err(ManifestUrlError::Empty));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert!(Url::parse_manifest("HTTPS://cam.local/index.m3u8").is_ok());
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert_eq!(
            Url::parse_manifest("ftp://cam.local/index.m3u8"),
            Err(ManifestUrlError::UnsupportedScheme {
                scheme: "ftp".to_owned()
            })
        );
    }
}
