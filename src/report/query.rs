use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::data::deserialize::coerce;
use crate::data::model::CellValue;

use super::{ProjectInfo, ProjectReport};

/// Parameter order used when encoding a report.
pub const REPORT_KEYS: [&str; 10] = [
    "name",
    "description",
    "client",
    "contractor",
    "minimumX",
    "maximumX",
    "minimumY",
    "maximumY",
    "minimumZ",
    "maximumZ",
];

/// `?k=v&k=v` with percent-encoded values. No pairs gives `"?"`.
pub fn encode<'a>(pairs: impl IntoIterator<Item = (&'a str, Cow<'a, str>)>) -> String {
    let body: Vec<String> = pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(&v)))
        .collect();
    format!("?{}", body.join("&"))
}

/// Parameters after the first `?` of `url`. Pairs without `=` are skipped;
/// a value that fails to decode is kept as written.
pub fn parse(url: &str) -> BTreeMap<String, String> {
    let Some((_, query)) = url.split_once('?') else {
        return BTreeMap::new();
    };
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            let value = urlencoding::decode(v)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| v.to_string());
            (k.to_string(), value)
        })
        .collect()
}

impl ProjectReport {
    pub fn to_query_string(&self) -> String {
        let r = &self.range;
        let values: [Cow<'_, str>; 10] = [
            Cow::Borrowed(self.info.name.as_str()),
            Cow::Borrowed(self.info.description.as_str()),
            Cow::Borrowed(self.info.client.as_str()),
            Cow::Borrowed(self.info.contractor.as_str()),
            Cow::Owned(r.minimum_x.to_string()),
            Cow::Owned(r.maximum_x.to_string()),
            Cow::Owned(r.minimum_y.to_string()),
            Cow::Owned(r.maximum_y.to_string()),
            Cow::Owned(r.minimum_z.to_string()),
            Cow::Owned(r.maximum_z.to_string()),
        ];
        encode(REPORT_KEYS.into_iter().zip(values))
    }

    /// Rebuild a report from a URL. Missing keys keep their defaults;
    /// range values go through the same coercion as CSV cells.
    pub fn from_query_string(url: &str) -> Self {
        let params = parse(url);
        let text = |key: &str| params.get(key).cloned().unwrap_or_default();
        let mut report = ProjectReport {
            info: ProjectInfo {
                name: text("name"),
                description: text("description"),
                client: text("client"),
                contractor: text("contractor"),
            },
            ..Default::default()
        };

        let r = &mut report.range;
        let slots: [(&str, &mut CellValue); 6] = [
            ("minimumX", &mut r.minimum_x),
            ("maximumX", &mut r.maximum_x),
            ("minimumY", &mut r.minimum_y),
            ("maximumY", &mut r.maximum_y),
            ("minimumZ", &mut r.minimum_z),
            ("maximumZ", &mut r.maximum_z),
        ];
        for (key, slot) in slots {
            if let Some(value) = params.get(key) {
                *slot = coerce(value.trim());
            }
        }
        report
    }
}

/// Wizard step carried as `step=<n>`; anything unparsable means step 0.
pub fn parse_step(url: &str) -> usize {
    parse(url)
        .get("step")
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}
