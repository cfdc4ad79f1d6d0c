use std::sync::Mutex;

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::Error;
use crate::storage::KeyValueStore;

/// Largest `Set-Cookie` value browsers reliably keep.
const MAX_COOKIE_BYTES: usize = 4096;

#[derive(Debug, Clone, Copy)]
enum Encoding {
    Plain,
    Base64,
}

/// [`KeyValueStore`] over a request's cookies.
///
/// Writes become session cookies (no `Max-Age`), so they last exactly as
/// long as the browsing session. Collect them for the response with
/// [`into_jar`](CookieStore::into_jar).
#[derive(Debug)]
pub struct CookieStore {
    jar: Mutex<CookieJar>,
    encoding: Encoding,
    secure: bool,
}

impl CookieStore {
    /// Values stored as-is. Used for the session cookie written by the
    /// login flow.
    #[must_use]
    pub fn plain(jar: CookieJar, secure: bool) -> Self {
        Self::with_encoding(jar, Encoding::Plain, secure)
    }

    /// Values stored base64url-encoded, for JSON payloads.
    #[must_use]
    pub fn encoded(jar: CookieJar, secure: bool) -> Self {
        Self::with_encoding(jar, Encoding::Base64, secure)
    }

    fn with_encoding(jar: CookieJar, encoding: Encoding, secure: bool) -> Self {
        Self {
            jar: Mutex::new(jar),
            encoding,
            secure,
        }
    }

    /// The jar with every write applied.
    #[must_use]
    pub fn into_jar(self) -> CookieJar {
        self.jar
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn decode(&self, raw: &str) -> Result<String, Error> {
        match self.encoding {
            Encoding::Plain => Ok(raw.to_owned()),
            Encoding::Base64 => {
                let bytes = URL_SAFE_NO_PAD
                    .decode(raw)
                    .map_err(|e| Error::StorageRead(format!("malformed cookie: {e}")))?;
                String::from_utf8(bytes)
                    .map_err(|e| Error::StorageRead(format!("malformed cookie: {e}")))
            }
        }
    }

    fn encode(&self, value: &str) -> String {
        match self.encoding {
            Encoding::Plain => value.to_owned(),
            Encoding::Base64 => URL_SAFE_NO_PAD.encode(value),
        }
    }

    fn update(&self, apply: impl FnOnce(CookieJar) -> CookieJar) -> Result<(), Error> {
        let mut jar = self
            .jar
            .lock()
            .map_err(|e| Error::StorageWrite(e.to_string()))?;
        *jar = apply(jar.clone());
        Ok(())
    }
}

impl KeyValueStore for CookieStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let raw = {
            let jar = self
                .jar
                .lock()
                .map_err(|e| Error::StorageRead(e.to_string()))?;
            jar.get(key).map(|c| c.value().to_owned())
        };
        raw.map(|raw| self.decode(&raw)).transpose()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let cookie = session_scoped_cookie(key, self.encode(value), self.secure);
        let len = cookie.to_string().len();
        if len > MAX_COOKIE_BYTES {
            return Err(Error::StorageWrite(format!(
                "cookie {key} is {len} bytes, limit is {MAX_COOKIE_BYTES}"
            )));
        }
        self.update(|jar| jar.add(cookie))
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let cookie = Cookie::build((key.to_owned(), "")).path("/");
        self.update(|jar| jar.remove(cookie))
    }
}

/// Cookie without `Max-Age`/`Expires`: dropped when the browser session ends.
pub(super) fn session_scoped_cookie(name: &str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderMap;
    use axum::http::header::COOKIE;

    use super::*;

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie.parse().unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn plain_reads_request_cookie() {
        let store = CookieStore::plain(jar_with("session_user=abc123; theme=dark"), true);
        assert_eq!(store.get("session_user").unwrap().as_deref(), Some("abc123"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn encoded_round_trips_json() {
        let store = CookieStore::encoded(CookieJar::new(), true);
        let json = r#"{"source":"google","medium":"cpc"}"#;
        store.set("attr", json).unwrap();
        assert_eq!(store.get("attr").unwrap().as_deref(), Some(json));

        let jar = store.into_jar();
        let cookie = jar.get("attr").unwrap();
        assert!(!cookie.value().contains('"'));
        assert_eq!(cookie.max_age(), None);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn oversized_cookie_is_refused() {
        let store = CookieStore::encoded(CookieJar::new(), true);
        let json = format!(r#"{{"referrer":"{}"}}"#, "a".repeat(3200));
        assert!(matches!(store.set("attr", &json), Err(Error::StorageWrite(_))));
        assert_eq!(store.get("attr").unwrap(), None);
        assert!(store.into_jar().get("attr").is_none());
    }

    #[test]
    fn malformed_encoded_cookie_is_a_read_error() {
        let store = CookieStore::encoded(jar_with("attr=not*base64"), true);
        assert!(matches!(store.get("attr"), Err(Error::StorageRead(_))));
    }

    #[test]
    fn remove_drops_value() {
        let store = CookieStore::plain(jar_with("attr=x"), false);
        store.remove("attr").unwrap();
        assert_eq!(store.get("attr").unwrap(), None);
    }
}
