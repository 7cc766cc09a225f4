use async_trait::async_trait;
use futures::StreamExt;
use hyper::{Body, Client, HeaderMap, Request, StatusCode, Uri};
use hyper::client::HttpConnector;
use hyper::header::{LOCATION, USER_AGENT};
use hyper_tls::HttpsConnector;
use tracing::{debug, trace};

use crate::util::blob::Blob;
use crate::util::transport::Transport;
use crate::util::validating_body::{parse_md5, parse_sha1};

pub type HttpClient = Client<HttpsConnector<HttpConnector>>;

/// One client is meant to be shared by all repositories - it does connection caching internally.
pub fn new_http_client() -> HttpClient {
    Client::builder()
        .build::<_, Body>(HttpsConnector::new())
}

/// Downloads files relative to a fixed base URI, reporting the checksums announced in response
///  headers.
pub struct HttpDownloader {
    client: HttpClient,
    base_uri: String, // with trailing '/'
    user_agent: String,
}
impl HttpDownloader {
    pub fn new(client: HttpClient, base_uri: String, user_agent: String) -> anyhow::Result<HttpDownloader> {
        let mut base_uri = base_uri;
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }

        // check that the base URI is valid
        Uri::try_from(base_uri.clone())?;

        Ok(HttpDownloader {
            client,
            base_uri,
            user_agent,
        })
    }
}

/// Hops followed before a download is given up
const MAX_REDIRECTS: usize = 5;

#[async_trait]
impl Transport for HttpDownloader {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Blob>> {
        let mut uri = Uri::try_from(format!("{}{}", self.base_uri, path))?;

        for _ in 0..=MAX_REDIRECTS {
            let request = Request::builder()
                .method("GET")
                .uri(uri.clone())
                // Maven Central returns a 403 without a user agent
                .header(USER_AGENT, self.user_agent.as_str())
                .body(Body::empty())?;

            trace!("getting {:?}", request);

            let response = self.client.request(request)
                .await?;

            if is_redirect(response.status()) {
                let location = response.headers().get(LOCATION)
                    .and_then(|l| l.to_str().ok())
                    .ok_or_else(|| anyhow::anyhow!("GET {} returned {} without a Location header", uri, response.status()))?;
                let target = resolve_location(&uri, location)?;
                debug!("{} redirects to {}", uri, target);
                uri = target;
                continue;
            }

            if response.status() == StatusCode::NOT_FOUND {
                debug!("{} not found", uri);
                return Ok(None);
            }
            if !response.status().is_success() {
                return Err(anyhow::anyhow!("GET {} failed: {}", uri, response.status()));
            }

            let sha1 = announced_sha1(response.headers());
            let md5 = announced_md5(response.headers());

            let data = response.into_body()
                .map(|chunk| chunk.map_err(anyhow::Error::from));

            return Ok(Some(Blob {
                data: Box::pin(data),
                md5,
                sha1,
            }));
        }

        Err(anyhow::anyhow!("GET {}{} exceeded {} redirects", self.base_uri, path, MAX_REDIRECTS))
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(status,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER |
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT)
}

/// `location` may be absolute, host-relative ("/x/y") or relative to the request's directory
fn resolve_location(request_uri: &Uri, location: &str) -> anyhow::Result<Uri> {
    if location.contains("://") {
        return Ok(Uri::try_from(location)?);
    }

    let scheme = request_uri.scheme_str().unwrap_or("http");
    let authority = request_uri.authority()
        .ok_or_else(|| anyhow::anyhow!("no authority in {}", request_uri))?;

    let path_and_query = if location.starts_with('/') {
        location.to_string()
    }
    else {
        let request_path = request_uri.path();
        let directory = &request_path[..request_path.rfind('/').map(|idx| idx + 1).unwrap_or(0)];
        format!("{}{}", directory, location)
    };

    Ok(Uri::try_from(format!("{}://{}{}", scheme, authority, path_and_query))?)
}

fn announced_sha1(headers: &HeaderMap) -> Option<[u8;20]> {
    // NB: invalid header content is ignored, the ETag in particular is not a checksum for every server
    ["x-checksum-sha1", "x-goog-meta-checksum-sha1", "etag"].iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|h| h.to_str().ok())
        .find_map(parse_sha1)
}

fn announced_md5(headers: &HeaderMap) -> Option<[u8;16]> {
    ["x-checksum-md5", "x-goog-meta-checksum-md5"].iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|h| h.to_str().ok())
        .find_map(parse_md5)
}
