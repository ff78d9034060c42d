//! APKMirror page navigation for base binaries
//!
//! Markup matching is regex based and best-effort: when the site layout
//! changes, resolution fails with [`FetchError::Resolve`] rather than
//! downloading the wrong file.

use crate::download::FetchError;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://www.apkmirror.com";

/// How the release page of a target is located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageFlow {
    /// Release page built from a pinned version under a vendor slug
    Versioned { vendor: &'static str },
    /// Newest upload on the app listing page
    Latest { listing: &'static str },
}

fn page_flow(target: &str) -> Option<PageFlow> {
    match target {
        "youtube" | "youtube-music" => Some(PageFlow::Versioned {
            vendor: "google-inc",
        }),
        "reddit" => Some(PageFlow::Latest {
            listing: "redditinc/reddit",
        }),
        "twitter" => Some(PageFlow::Latest {
            listing: "twitter-inc/twitter",
        }),
        _ => None,
    }
}

/// Rewrites `17.4.3` into the `17-04-03` form used in release page slugs
pub fn version_slug(version: &str) -> String {
    version
        .split('.')
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_string()
            } else {
                format!("{:0>2}", part)
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Path of the release download page for a pinned version
pub fn versioned_page_path(vendor: &str, target: &str, version: &str) -> String {
    let slug = version_slug(version);
    format!(
        "/apk/{vendor}/{target}/{target}-{slug}-release/{target}-{slug}-android-apk-download/"
    )
}

/// Derives the variant download page from a release page path
///
/// `/apk/redditinc/reddit/reddit-2023-05-0-release/` becomes
/// `/apk/redditinc/reddit/reddit-2023-05-0-release/reddit-2023-05-0-2-android-apk-download/`.
pub fn variant_page_path(release_path: &str) -> Option<String> {
    let trimmed = release_path.strip_suffix('/')?;
    let (_, release_slug) = trimmed.rsplit_once('/')?;
    let (stem, _) = release_slug.rsplit_once('-')?;
    Some(format!("{release_path}{stem}-2-android-apk-download/"))
}

fn anchor_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?is)<a\s[^>]*>"#).expect("valid regex"))
}

fn class_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)\sclass\s*=\s*"([^"]*)""#).expect("valid regex"))
}

fn href_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)\shref\s*=\s*"([^"]*)""#).expect("valid regex"))
}

fn attribute(tag: &str, re: &Regex) -> Option<String> {
    re.captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
}

/// First `<a>` whose class list contains `class_name`
pub fn href_with_class(html: &str, class_name: &str) -> Option<String> {
    anchor_tag().find_iter(html).find_map(|tag| {
        let tag = tag.as_str();
        let classes = attribute(tag, class_attr())?;
        if classes.split_whitespace().any(|c| c == class_name) {
            attribute(tag, href_attr())
        } else {
            None
        }
    })
}

/// First `<a>` whose href contains `needle`
pub fn href_containing(html: &str, needle: &str) -> Option<String> {
    anchor_tag()
        .find_iter(html)
        .filter_map(|tag| attribute(tag.as_str(), href_attr()))
        .find(|href| href.contains(needle))
}

const DOWNLOAD_BUTTON_CLASS: &str = "accent_bg";
const LATEST_LINK_CLASS: &str = "downloadLink";
const DIRECT_LINK_MARKER: &str = "download.php";

pub struct ApkMirror {
    client: Client,
    base_url: String,
}

impl ApkMirror {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn resolve(&self, target: &str, version: Option<&str>) -> Result<String, FetchError> {
        let flow = page_flow(target).ok_or_else(|| FetchError::Resolve {
            asset: target.to_string(),
            message: "no APKMirror listing known for this target".to_string(),
        })?;

        let download_page = match flow {
            PageFlow::Versioned { vendor } => {
                let version = version.ok_or_else(|| FetchError::Resolve {
                    asset: target.to_string(),
                    message: "a version is required to locate the release page".to_string(),
                })?;
                versioned_page_path(vendor, target, version)
            }
            PageFlow::Latest { listing } => {
                let listing_url = format!("{}/apk/{}/", self.base_url, listing);
                let html = self.page(&listing_url).await?;
                let release = href_with_class(&html, LATEST_LINK_CLASS)
                    .ok_or_else(|| self.missing(target, LATEST_LINK_CLASS))?;
                variant_page_path(&release).ok_or_else(|| FetchError::Resolve {
                    asset: target.to_string(),
                    message: format!("unexpected release path {}", release),
                })?
            }
        };

        self.follow_download_button(target, &download_page).await
    }

    async fn follow_download_button(&self, target: &str, page_path: &str) -> Result<String, FetchError> {
        let page_url = format!("{}{}", self.base_url, page_path);
        debug!(app = target, page = %page_url, "Opening APKMirror download page");
        let html = self.page(&page_url).await?;
        let button = href_with_class(&html, DOWNLOAD_BUTTON_CLASS)
            .ok_or_else(|| self.missing(target, DOWNLOAD_BUTTON_CLASS))?;

        let html = self.page(&format!("{}{}", self.base_url, button)).await?;
        let direct = href_containing(&html, DIRECT_LINK_MARKER)
            .ok_or_else(|| self.missing(target, DIRECT_LINK_MARKER))?;

        Ok(format!("{}{}", self.base_url, direct))
    }

    async fn page(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }

    fn missing(&self, target: &str, what: &str) -> FetchError {
        FetchError::Resolve {
            asset: target.to_string(),
            message: format!("no link matching '{}' on the page", what),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_slug_pads_minor_components() {
        assert_eq!(version_slug("17.4.3"), "17-04-03");
        assert_eq!(version_slug("5.39.52"), "5-39-52");
        assert_eq!(version_slug("6"), "6");
    }

    #[test]
    fn test_versioned_page_path() {
        assert_eq!(
            versioned_page_path("google-inc", "youtube-music", "5.3.50"),
            "/apk/google-inc/youtube-music/youtube-music-5-03-50-release/\
             youtube-music-5-03-50-android-apk-download/"
        );
    }

    #[test]
    fn test_variant_page_path() {
        assert_eq!(
            variant_page_path("/apk/redditinc/reddit/reddit-2023-05-0-release/").as_deref(),
            Some(
                "/apk/redditinc/reddit/reddit-2023-05-0-release/\
                 reddit-2023-05-0-2-android-apk-download/"
            )
        );
        assert_eq!(variant_page_path("no-slash"), None);
    }

    #[test]
    fn test_href_with_class_ignores_attribute_order() {
        let html = r#"
            <a href="/other/">Other</a>
            <a href="/apk/x/download/?key=1&amp;forcebaseapk=true" class="btn accent_bg">Download</a>
        "#;
        assert_eq!(
            href_with_class(html, "accent_bg").as_deref(),
            Some("/apk/x/download/?key=1&forcebaseapk=true")
        );
    }

    #[test]
    fn test_href_with_class_requires_whole_class() {
        let html = r#"<a class="accent_bg_dark" href="/nope/">x</a>"#;
        assert_eq!(href_with_class(html, "accent_bg"), None);
    }

    #[test]
    fn test_attribute_lookup_spans_lines_and_case() {
        let html = "<a\n  CLASS=\"downloadLink\"\n  HREF=\"/apk/x/\">x</a><a class=\"downloadLink\" href=\"/apk/y/\">y</a>";
        assert_eq!(href_with_class(html, "downloadLink").as_deref(), Some("/apk/x/"));
        assert_eq!(href_containing(html, "/y/").as_deref(), Some("/apk/y/"));
    }

    #[test]
    fn test_href_containing() {
        let html = r#"<p class="notes"><span><a rel="nofollow" href="/wp-content/themes/APKMirror/download.php?id=42">here</a></span></p>"#;
        assert_eq!(
            href_containing(html, "download.php").as_deref(),
            Some("/wp-content/themes/APKMirror/download.php?id=42")
        );
    }

    #[test]
    fn test_unknown_target_has_no_flow() {
        assert_eq!(page_flow("spotify"), None);
        assert!(matches!(
            page_flow("reddit"),
            Some(PageFlow::Latest { .. })
        ));
    }
}
