use crate::{GoogleAPIRequestFields, HttpsClient, YouTubeError};
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const QUOTA_EXCEEDED_PREFIX: &str = "The request cannot be completed because you have exceeded your";

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Appends `&name=value` with the value percent-encoded.
pub(crate) fn push_query(url: &mut String, name: &str, value: &str) {
    url.push('&');
    url.push_str(name);
    url.push('=');
    url.push_str(&urlencoding::encode(value));
}

/// Issues a GET, maps the status to a `YouTubeError` and decodes the body as `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &HttpsClient,
    mut url: String,
    fields: &GoogleAPIRequestFields<'_>,
) -> Result<T, YouTubeError> {
    if let Some(key) = fields.key {
        push_query(&mut url, "key", key);
    }

    tracing::debug!(url = %redact_key(&url), "GET");

    let mut request_builder = Request::builder()
        .method(Method::GET)
        .uri(url);

    if let Some(bearer_token) = fields.bearer_token {
        request_builder = request_builder.header("Authorization", format!("Bearer {}", bearer_token));
    }

    if let Some(referrer) = fields.referrer {
        request_builder = request_builder.header("Referer", referrer);
    }

    let req = request_builder
        .body(Empty::<Bytes>::new())
        .map_err(|e| YouTubeError::Other(Box::new(e)))?;

    let resp = client.request(req).await?;

    match resp.status() {
        StatusCode::OK => (),
        StatusCode::TOO_MANY_REQUESTS => return Err(YouTubeError::Ratelimited),
        StatusCode::FORBIDDEN => {
            let body_bytes = resp.into_body().collect().await?.to_bytes();
            match serde_json::from_slice::<ErrorResponse>(&body_bytes) {
                Ok(error_response) if error_response.error.message.starts_with(QUOTA_EXCEEDED_PREFIX) => {
                    return Err(YouTubeError::Ratelimited)
                },
                Ok(error_response) => {
                    tracing::warn!("Unknown forbidden error message: {}", error_response.error.message);
                    return Err(YouTubeError::Forbidden)
                },
                Err(e) => {
                    let body_str = String::from_utf8_lossy(&body_bytes);
                    tracing::warn!("Failed to parse error response: {}\nResponse body: {}", e, body_str);
                    return Err(YouTubeError::Forbidden)
                }
            }
        },
        StatusCode::NOT_FOUND => return Err(YouTubeError::NotFound),
        StatusCode::UNAUTHORIZED => {
            let body_bytes = resp.into_body().collect().await?.to_bytes();
            tracing::warn!("Unauthorized error response: {}", String::from_utf8_lossy(&body_bytes));
            return Err(YouTubeError::Unauthorized);
        },
        StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE => {
            return Err(YouTubeError::InternalServerError)
        },
        status => {
            let body_bytes = resp.into_body().collect().await?.to_bytes();
            tracing::warn!("Unknown status code {}: {}", status.as_u16(), String::from_utf8_lossy(&body_bytes));
            return Err(YouTubeError::UnknownStatusCode(status));
        },
    };

    let body_bytes = resp.into_body().collect().await?.to_bytes();
    serde_json::from_slice::<T>(&body_bytes).map_err(|e| YouTubeError::ParseError(e.to_string()))
}

fn redact_key(url: &str) -> String {
    match url.find("&key=") {
        Some(index) => {
            let rest = &url[index + "&key=".len()..];
            let tail = rest.find('&').map(|i| &rest[i..]).unwrap_or("");
            format!("{}&key=***{}", &url[..index], tail)
        }
        None => url.to_string(),
    }
}
