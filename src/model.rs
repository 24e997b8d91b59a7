use serde_json::Value;

/// Flat key -> scalar mapping as returned by the device, plus the derived
/// keys added by `normalize`. Replaced wholesale on every successful poll.
pub type Snapshot = serde_json::Map<String, Value>;

/// One configured meter: base URL plus optional basic auth credentials.
/// Built once at startup, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Meter {
    pub base_url: String,
    pub auth: Option<(String, String)>,
}

/// Build a `Meter` from raw user input. The base URL is stripped of any
/// trailing slash. Credentials are kept only when both username and
/// password are present and non-empty; an empty string counts as absent,
/// so the auth pair is always both-or-neither.
pub fn meter(base_url: &str, username: Option<String>, password: Option<String>) -> Meter {
    let auth = match (username, password) {
        (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
        _ => None,
    };

    Meter {
        base_url: base_url.trim_end_matches('/').to_string(),
        auth,
    }
}

#[cfg(test)]
mod test {
    use super::meter;

    #[test]
    fn trailing_slash_stripped() {
        let m = meter("http://192.168.2.21/", None, None);
        assert_eq!("http://192.168.2.21", m.base_url);
    }

    #[test]
    fn auth_requires_both_credentials() {
        let m = meter("http://m", Some("admin".into()), Some("secret".into()));
        assert_eq!(Some(("admin".into(), "secret".into())), m.auth);

        let m = meter("http://m", Some("admin".into()), None);
        assert_eq!(None, m.auth);

        let m = meter("http://m", None, Some("secret".into()));
        assert_eq!(None, m.auth);
    }

    #[test]
    fn empty_credentials_count_as_absent() {
        let m = meter("http://m", Some("".into()), Some("".into()));
        assert_eq!(None, m.auth);

        let m = meter("http://m", Some("admin".into()), Some("".into()));
        assert_eq!(None, m.auth);
    }
}
