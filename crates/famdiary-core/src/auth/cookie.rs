//! The credential cookie contract.
//!
//! Issuance and clearing must render the exact same attribute set, otherwise
//! some browsers keep the old cookie around. Both go through
//! `CookieSettings::render` for that reason.

/// Name of the HTTP-only cookie holding the credential.
pub const CREDENTIAL_COOKIE: &str = "family_token";

/// Cookie path used for both issuance and clearing.
const COOKIE_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    /// `Secure` attribute; only set in production
    pub secure: bool,
}

impl CookieSettings {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// `Set-Cookie` value carrying a credential for `max_age_secs` seconds.
    pub fn issue(&self, token: &str, max_age_secs: i64) -> String {
        self.render(token, max_age_secs)
    }

    /// `Set-Cookie` value that removes the credential.
    pub fn clear(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age_secs: i64) -> String {
        let mut cookie = format!(
            "{}={}; Max-Age={}; Path={}; HttpOnly; SameSite=Strict",
            CREDENTIAL_COOKIE, value, max_age_secs, COOKIE_PATH
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Find the credential in one or more `Cookie` header values.
///
/// Empty values count as absent.
pub fn read_credential<'a, I>(cookie_headers: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    cookie_headers
        .into_iter()
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == CREDENTIAL_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(cookie: &str) -> Vec<&str> {
        cookie
            .split("; ")
            .skip(1)
            .filter(|attr| !attr.starts_with("Max-Age="))
            .collect()
    }

    #[test]
    fn test_clear_cookie() {
        let cookie = CookieSettings::new(false).clear();
        assert!(cookie.starts_with("family_token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_issue_and_clear_share_attributes() {
        for secure in [false, true] {
            let settings = CookieSettings::new(secure);
            let issued = settings.issue("abc", 3600);
            let cleared = settings.clear();
            assert_eq!(attributes(&issued), attributes(&cleared));
            assert_eq!(cleared.contains("; Secure"), secure);
        }
    }

    #[test]
    fn test_read_credential() {
        assert_eq!(read_credential(["family_token=abc"]), Some("abc".to_string()));
        assert_eq!(
            read_credential(["theme=dark; family_token=abc.def.ghi; lang=ja"]),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_read_credential_across_headers() {
        assert_eq!(
            read_credential(["theme=dark", "family_token=xyz"]),
            Some("xyz".to_string())
        );
    }

    #[test]
    fn test_read_credential_absent() {
        assert_eq!(read_credential(std::iter::empty::<&str>()), None);
        assert_eq!(read_credential(["auth_token=abc"]), None);
        assert_eq!(read_credential(["family_token="]), None);
        assert_eq!(read_credential(["my_family_token=abc"]), None);
    }
}
