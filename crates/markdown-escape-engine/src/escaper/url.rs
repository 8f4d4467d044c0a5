use std::sync::{Arc, OnceLock};

use percent_encoding::percent_encode_byte;
use regex::Regex;

use crate::context::{Context, keys};
use crate::dialect::Dialect;
use crate::error::EscapeError;

use super::query::{Params, encode};
use super::{Binding, substitute};

/// Escapes link and image destinations.
///
/// A structurally valid absolute URL is taken apart and re-encoded
/// component by component. Anything else goes through the dialect's URL
/// token table. Either way, `encode_unicode` percent-encodes what non-ASCII
/// is left.
#[derive(Debug, Clone)]
pub struct UrlEscaper {
    pub(crate) binding: Binding,
}

/// An absolute URL split into its components. Borrowed from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UrlParts<'a> {
    scheme: &'a str,
    user: Option<&'a str>,
    password: Option<&'a str>,
    host: &'a str,
    port: Option<u16>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    fn parse(url: &'a str) -> Result<Self, EscapeError> {
        static URL: OnceLock<Regex> = OnceLock::new();
        let re = URL.get_or_init(|| {
            Regex::new(
                r"(?s)^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?:(?P<user>[^:@/?#]*)(?::(?P<password>[^@/?#]*))?@)?(?P<host>\[[^\]/?#]*\]|[^:@/?#\[\]]+)(?::(?P<port>[0-9]*))?(?P<path>/[^?#]*)?(?:\?(?P<query>[^#]*))?(?:#(?P<fragment>.*))?$",
            )
            .expect("URL pattern is valid")
        });

        let malformed = |reason: String| EscapeError::MalformedInput {
            context: "url".to_string(),
            reason,
        };

        let caps = re
            .captures(url)
            .ok_or_else(|| malformed(format!("cannot decompose {url:?}")))?;
        let get = |name: &str| caps.name(name).map(|m| m.as_str());

        let port = match get("port").filter(|p| !p.is_empty()) {
            Some(p) => Some(
                p.parse::<u16>()
                    .map_err(|_| malformed(format!("port {p} out of range")))?,
            ),
            None => None,
        };

        Ok(Self {
            scheme: get("scheme").unwrap_or_default(),
            user: get("user"),
            password: get("password"),
            host: get("host").unwrap_or_default(),
            port,
            path: get("path").unwrap_or_default(),
            query: get("query"),
            fragment: get("fragment"),
        })
    }

    /// Scheme, userinfo, host and port are copied as-is; path segments,
    /// query and fragment are re-encoded.
    fn reassemble(&self) -> String {
        let mut out = format!("{}://", self.scheme);

        if let Some(user) = self.user {
            out.push_str(user);
            if let Some(password) = self.password {
                out.push(':');
                out.push_str(password);
            }
            out.push('@');
        }

        out.push_str(self.host);
        if let Some(port) = self.port {
            out.push_str(&format!(":{port}"));
        }

        let path = self.path.split('/').map(encode).collect::<Vec<_>>();
        out.push_str(&path.join("/"));

        if let Some(query) = self.query {
            out.push('?');
            out.push_str(&Params::parse(query).serialize());
        }

        if let Some(fragment) = self.fragment {
            out.push('#');
            out.push_str(&encode(fragment));
        }

        out
    }
}

/// Characters a URL may contain and still count as one.
fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=".contains(c)
}

/// Absolute URL with a scheme and a non-empty authority, built only from
/// URL characters. Whitespace or non-ASCII anywhere makes it "not a URL".
fn has_url_shape(text: &str) -> bool {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    let shape = SHAPE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^/?#]+").expect("URL shape pattern is valid")
    });

    text.chars().all(is_url_char) && shape.is_match(text)
}

/// The components of `text` if it is a URL whose authority parses too: a
/// port outside `u16`, a stray `[` in the host or a second `@` all make it
/// "not a URL".
fn valid_url_parts(text: &str) -> Option<UrlParts<'_>> {
    if !has_url_shape(text) {
        return None;
    }
    UrlParts::parse(text)
        .map_err(|err| log::debug!("{err}; escaping as plain text"))
        .ok()
}

/// Percent-encodes the UTF-8 bytes of every code point at or above U+0080.
fn encode_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for b in c.encode_utf8(&mut buf).bytes() {
                out.push_str(percent_encode_byte(b));
            }
        }
    }
    out
}

impl UrlEscaper {
    pub fn new(context: Context, dialect: Arc<Dialect>) -> Self {
        Self {
            binding: Binding::new(context, dialect),
        }
    }

    pub fn escape(&self, text: &str) -> String {
        self.escape_in(&self.binding.context, text)
    }

    pub fn escape_in(&self, context: &Context, text: &str) -> String {
        let escaped = match valid_url_parts(text) {
            Some(parts) => parts.reassemble(),
            None => substitute(&self.binding.dialect, context, text),
        };

        self.post_process(context, escaped)
    }

    fn post_process(&self, context: &Context, escaped: String) -> String {
        if context.is_enabled(keys::ENCODE_UNICODE) {
            encode_non_ascii(&escaped)
        } else {
            escaped
        }
    }
}
