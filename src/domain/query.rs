//! Query-string parameters as the front end hands them to the pipeline.

use url::form_urlencoded;

/// Ordered query parameters; a key written without `=` maps to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let pairs = raw
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let has_value = pair.contains('=');
                let (key, value) = form_urlencoded::parse(pair.as_bytes()).next()?;
                let value = has_value.then(|| value.into_owned());
                Some((key.into_owned(), value))
            })
            .collect();

        Self { pairs }
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(candidate, _)| candidate == key)
    }

    /// Value of the first occurrence of `key`, if it carried one.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == key)
            .and_then(|(_, value)| value.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;

    #[test]
    fn keys_without_equals_have_no_value() {
        let params = QueryParams::parse(Some("md&ref=HEAD~1&empty="));
        assert!(params.contains_key("md"));
        assert_eq!(params.value("md"), None);
        assert_eq!(params.value("ref"), Some("HEAD~1"));
        assert_eq!(params.value("empty"), Some(""));
        assert!(!params.contains_key("html"));
    }

    #[test]
    fn values_are_percent_decoded() {
        let params = QueryParams::parse(Some("ref=v1%2E0&x+y=a+b"));
        assert_eq!(params.value("ref"), Some("v1.0"));
        assert_eq!(params.value("x y"), Some("a b"));
    }

    #[test]
    fn missing_query_is_empty() {
        assert_eq!(QueryParams::parse(None), QueryParams::default());
        assert_eq!(QueryParams::parse(Some("")), QueryParams::default());
    }
}
