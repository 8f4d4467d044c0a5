//! Query-string round trip: parse into nested key/value pairs the way form
//! decoders do (`k[]` appends, `k[x]` nests), then re-serialize with strict
//! RFC 3986 percent-encoding.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Everything except RFC 3986 unreserved characters.
pub(crate) const UNRESERVED_ONLY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED_ONLY).to_string()
}

/// Form decoding: `+` is a space, then `%XX` sequences are decoded.
fn decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Scalar(String),
    Map(Params),
}

/// Ordered parameters. Re-assigning a key keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Params {
    entries: Vec<(String, Value)>,
    next_index: usize,
}

impl Params {
    pub(crate) fn parse(query: &str) -> Self {
        let mut params = Params::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(raw_key);
            if let Some(path) = key_path(&key) {
                params.assign(&path, decode(raw_value));
            }
        }
        params
    }

    pub(crate) fn serialize(&self) -> String {
        let mut parts = Vec::new();
        self.write(None, &mut parts);
        parts.join("&")
    }

    fn write(&self, prefix: Option<&str>, parts: &mut Vec<String>) {
        for (key, value) in &self.entries {
            let name = match prefix {
                Some(p) => format!("{p}[{key}]"),
                None => key.clone(),
            };
            match value {
                Value::Scalar(s) => parts.push(format!("{}={}", encode(&name), encode(s))),
                Value::Map(map) => map.write(Some(&name), parts),
            }
        }
    }

    /// `None` segments append at the next free integer index.
    fn assign(&mut self, path: &[Option<String>], value: String) {
        let Some((first, rest)) = path.split_first() else {
            return;
        };
        let key = match first {
            Some(k) => k.clone(),
            None => self.next_index.to_string(),
        };
        // An index too large to advance past stays a plain string key.
        if let Some(next) = key.parse::<usize>().ok().and_then(|n| n.checked_add(1)) {
            self.next_index = self.next_index.max(next);
        }

        let idx = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key, Value::Scalar(String::new())));
                self.entries.len() - 1
            }
        };

        let slot = &mut self.entries[idx].1;
        if rest.is_empty() {
            *slot = Value::Scalar(value);
        } else if let Value::Map(map) = &mut *slot {
            map.assign(rest, value);
        } else {
            let mut map = Params::default();
            map.assign(rest, value);
            *slot = Value::Map(map);
        }
    }
}

/// Splits `base[a][]` into `[Some(base), Some(a), None]`.
///
/// Returns `None` for keys with an empty base name. An unclosed `[` makes
/// the whole key a plain name; anything after the last `]` is dropped.
fn key_path(key: &str) -> Option<Vec<Option<String>>> {
    let Some(open) = key.find('[') else {
        return (!key.is_empty()).then(|| vec![Some(key.to_string())]);
    };
    if open == 0 {
        return None;
    }
    if !key[open..].contains(']') {
        return Some(vec![Some(key.to_string())]);
    }

    let mut path = vec![Some(key[..open].to_string())];
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            break;
        };
        let sub = &inner[..close];
        path.push((!sub.is_empty()).then(|| sub.to_string()));
        rest = &inner[close + 1..];
    }
    Some(path)
}
