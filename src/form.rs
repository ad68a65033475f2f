//! URL-encoded form values

use std::collections::BTreeMap;
use url::Url;

/// Content type of URL-encoded form bodies
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Form values: a mapping from key to an ordered sequence of values.
///
/// Keys are kept sorted so encoding is deterministic; the values of a key keep
/// the order in which they were added.
///
/// ```
/// use httpclient::FormValues;
///
/// let mut form = FormValues::new();
/// form.add("q", "rust");
/// form.add("tag", "http");
/// form.add("tag", "client");
///
/// assert_eq!(form.encode(), "q=rust&tag=http&tag=client");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, Vec<String>>,
}

impl FormValues {
    /// Create empty form values
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to the key
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values of the key with a single value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// First value of the key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of the key, empty if the key is absent
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Remove the key and return its values
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    /// Returns true if the key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over keys and their values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Encode every value as `key=value` pairs joined by `&`, sorted by key.
    pub fn encode(&self) -> String {
        encode_pairs(
            self.values
                .iter()
                .flat_map(|(key, values)| values.iter().map(move |value| (key, value))),
        )
    }

    /// Parse an URL-encoded string such as a query string or a form body.
    pub fn parse(input: &str) -> Self {
        url::form_urlencoded::parse(input.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }
}

fn encode_pairs<'a>(pairs: impl Iterator<Item = (&'a String, &'a String)>) -> String {
    pairs
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Merge form values into the query string of `url`.
///
/// Existing parameters are kept; the first value of each key in `data` is
/// appended after the values already present for that key.
pub(crate) fn merge_query(url: &mut Url, data: &FormValues) {
    let mut query = FormValues::parse(url.query().unwrap_or_default());
    for (key, values) in data.iter() {
        if let Some(first) = values.first() {
            query.add(key, first.as_str());
        }
    }

    if query.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&query.encode()));
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormValues::new();
        form.extend(iter);
        form
    }
}

impl<K, V> Extend<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_sorts_keys_and_keeps_value_order() {
        let form = FormValues::from([("b", "2"), ("a", "1"), ("b", "1")]);
        assert_eq!(form.encode(), "a=1&b=2&b=1");
    }

    #[test]
    fn encode_percent_escapes() {
        let form = FormValues::from([("na me", "a&b=c"), ("emoji", "ü")]);
        assert_eq!(form.encode(), "emoji=%C3%BC&na%20me=a%26b%3Dc");
    }

    #[test]
    fn parse_round_trips_encode() {
        let mut form = FormValues::new();
        form.add("foo", "bar");
        form.add("foo", "baz qux");
        form.add("empty", "");
        form.add("sym", "&=?/+%");

        assert_eq!(FormValues::parse(&form.encode()), form);
    }

    #[test]
    fn parse_decodes_plus_as_space() {
        let form = FormValues::parse("q=hello+world&q=again");
        assert_eq!(form.get_all("q"), ["hello world", "again"]);
        assert_eq!(form.get("q"), Some("hello world"));
        assert_eq!(form.get("missing"), None);
        assert!(form.get_all("missing").is_empty());
    }

    #[test]
    fn set_replaces_values() {
        let mut form = FormValues::from([("k", "1"), ("k", "2")]);
        form.set("k", "3");
        assert_eq!(form.get_all("k"), ["3"]);
        assert_eq!(form.remove("k"), Some(vec!["3".to_owned()]));
        assert!(form.is_empty());
    }

    #[test]
    fn merge_query_adds_to_empty_url() {
        let mut url = Url::parse("http://host/test").unwrap();
        merge_query(&mut url, &FormValues::from([("foo", "bar")]));
        assert_eq!(url.as_str(), "http://host/test?foo=bar");
    }

    #[test]
    fn merge_query_appends_after_existing_values() {
        let mut url = Url::parse("http://host/test?foo=old&keep=1").unwrap();
        let data = FormValues::from([("foo", "new"), ("foo", "ignored"), ("zed", "z")]);
        merge_query(&mut url, &data);
        assert_eq!(url.query(), Some("foo=old&foo=new&keep=1&zed=z"));
    }

    #[test]
    fn merge_query_with_nothing_clears_empty_query() {
        let mut url = Url::parse("http://host/test?").unwrap();
        merge_query(&mut url, &FormValues::new());
        assert_eq!(url.as_str(), "http://host/test");
    }
}
