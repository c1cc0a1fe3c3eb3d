/// A header after normalization: trimmed and lower-cased on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

/// Headers in the form the TC3 signature covers.
///
/// DNSPod recomputes this on its side and compares byte for byte, so the
/// transform is fixed: trim, lowercase, then a stable sort on the key bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalHeaders(Vec<HeaderPair>);

impl CanonicalHeaders {
    pub fn normalize<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries: Vec<HeaderPair> = pairs
            .into_iter()
            .map(|(key, value)| HeaderPair {
                key: key.as_ref().to_lowercase().trim().to_string(),
                value: value.as_ref().to_lowercase().trim().to_string(),
            })
            .collect();

        entries.sort_by(|a, b| a.key.as_bytes().cmp(b.key.as_bytes()));

        Self(entries)
    }

    pub fn entries(&self) -> &[HeaderPair] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `key:value\n` for every entry.
    pub fn canonical_headers(&self) -> String {
        self.0
            .iter()
            .map(|h| format!("{}:{}\n", h.key, h.value))
            .collect()
    }

    /// Keys joined with `;`.
    pub fn signed_headers(&self) -> String {
        self.0
            .iter()
            .map(|h| h.key.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}
