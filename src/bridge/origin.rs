//! Trusted message origins.

use rustc_hash::FxHashSet;
use url::Url;

/// Local dev-server ports trusted on `localhost` and `127.0.0.1`.
const LOCAL_PORTS: &[u16] = &[3000, 5173, 8080];

/// Normalize an origin or URL to `scheme://host[:port]`.
///
/// Default ports are dropped and the host is lowercased, so
/// `HTTPS://Example.com:443/x` and `https://example.com` compare equal.
/// Returns `None` for values without a tuple origin (`null`, `file:`, junk).
pub fn normalize_origin(value: &str) -> Option<String> {
    let url = Url::parse(value.trim()).ok()?;
    let origin = url.origin();
    origin
        .is_tuple()
        .then(|| origin.ascii_serialization())
}

/// Set of origins whose messages are accepted.
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    origins: FxHashSet<String>,
}

impl OriginAllowList {
    /// Built-in list: both hosts plus the usual local dev-server origins.
    pub fn new(prod_host: &str, dev_host: &str) -> Self {
        let mut list = Self::default();
        list.allow(prod_host);
        list.allow(dev_host);
        for host in ["localhost", "127.0.0.1"] {
            for port in LOCAL_PORTS {
                list.allow(&format!("http://{host}:{port}"));
            }
        }
        list
    }

    /// Trust one more origin. Invalid values are ignored.
    pub fn allow(&mut self, origin: &str) {
        match normalize_origin(origin) {
            Some(origin) => {
                self.origins.insert(origin);
            }
            None => crate::debug!("bridge"; "not an origin, ignoring: {}", origin),
        }
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for origin in extra {
            self.allow(origin.as_ref());
        }
        self
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        normalize_origin(origin).is_some_and(|o| self.origins.contains(&o))
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> OriginAllowList {
        OriginAllowList::new("https://baibian.app", "http://localhost:3000")
    }

    #[test]
    fn test_normalize_origin() {
        assert_eq!(
            normalize_origin("HTTPS://Baibian.App:443/app/x?t=1").as_deref(),
            Some("https://baibian.app")
        );
        assert_eq!(
            normalize_origin("http://localhost:5173/").as_deref(),
            Some("http://localhost:5173")
        );
        assert_eq!(normalize_origin("null"), None);
        assert_eq!(normalize_origin("file:///tmp/index.html"), None);
        assert_eq!(normalize_origin(""), None);
    }

    #[test]
    fn test_builtin_origins() {
        let list = list();
        assert!(list.is_allowed("https://baibian.app"));
        assert!(list.is_allowed("http://localhost:3000"));
        assert!(list.is_allowed("http://localhost:5173"));
        assert!(list.is_allowed("http://127.0.0.1:8080"));
        // 2 hosts (dev host duplicates localhost:3000) + 6 local
        assert_eq!(list.len(), 7);
    }

    #[test]
    fn test_rejects_untrusted() {
        let list = list();
        assert!(!list.is_allowed("https://evil.example"));
        assert!(!list.is_allowed("http://baibian.app"));
        assert!(!list.is_allowed("http://localhost:4000"));
        assert!(!list.is_allowed("https://baibian.app.evil.example"));
        assert!(!list.is_allowed("null"));
    }

    #[test]
    fn test_extra_origins() {
        let list = list().with_extra(["http://192.168.1.20:3000/", "not a url"]);
        assert!(list.is_allowed("http://192.168.1.20:3000"));
        assert_eq!(list.len(), 8);
    }
}
