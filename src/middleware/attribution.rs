use axum::extract::{Request, State};
use axum::http::header::{HOST, REFERER};
use axum::http::{HeaderMap, Uri};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use url::Url;

use super::config::GateConfig;
use super::cookies::CookieStore;
use crate::attribution::Landing;

/// Capture first-touch attribution for the request's browsing session.
///
/// The record is kept in a session cookie and handed to handlers through
/// request extensions (read it with [`Attribution`](super::Attribution)).
/// A visitor who already has the cookie gets the stored record back and no
/// new cookie is set.
///
/// ```rust,ignore
/// let profile = Router::new()
///     .route("/{username}", get(profile))
///     .layer(axum::middleware::from_fn_with_state(config, track_attribution));
/// ```
pub async fn track_attribution(
    State(config): State<GateConfig>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> (CookieJar, Response) {
    let landing = landing_from_request(&config, request.uri(), request.headers());
    let store = CookieStore::encoded(jar, config.secure_cookies);

    let record = config
        .attribution_tracker(&store)
        .initialize_session_tracking(&landing);
    request.extensions_mut().insert(record);

    let response = next.run(request).await;
    (store.into_jar(), response)
}

/// Rebuild the landing URL from the configured origin (or `Host`) and the
/// request target, and take the referrer from `Referer`.
pub(super) fn landing_from_request(config: &GateConfig, uri: &Uri, headers: &HeaderMap) -> Landing {
    let referrer = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .trim();
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());

    let url = match &config.public_origin {
        Some(origin) => origin.join(target).ok(),
        None => headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .and_then(|host| {
                let scheme = if config.secure_cookies { "https" } else { "http" };
                Url::parse(&format!("{scheme}://{host}{target}")).ok()
            }),
    };

    Landing::new(url, referrer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), value.parse().unwrap());
        }
        map
    }

    #[test]
    fn uses_host_header() {
        let uri: Uri = "/jane?utm_source=x".parse().unwrap();
        let landing = landing_from_request(
            &GateConfig::new(),
            &uri,
            &headers(&[(HOST, "bio.example"), (REFERER, "https://t.co/abc")]),
        );
        assert_eq!(
            landing.url.as_ref().map(Url::as_str),
            Some("https://bio.example/jane?utm_source=x")
        );
        assert_eq!(landing.referrer, "https://t.co/abc");
    }

    #[test]
    fn public_origin_wins_over_host() {
        let config = GateConfig::new()
            .with_public_origin("https://bio.example".parse().unwrap())
            .with_secure_cookies(false);
        let uri: Uri = "/jane".parse().unwrap();
        let landing = landing_from_request(&config, &uri, &headers(&[(HOST, "10.0.0.5:8080")]));
        assert_eq!(landing.path(), "/jane");
        assert_eq!(
            landing.url.as_ref().and_then(Url::host_str),
            Some("bio.example")
        );
    }

    #[test]
    fn nothing_known() {
        let uri: Uri = "/jane".parse().unwrap();
        let landing = landing_from_request(&GateConfig::new(), &uri, &HeaderMap::new());
        assert_eq!(landing, Landing::default());
    }
}
