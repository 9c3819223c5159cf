//! [`TrendsSource`] backed by a trends proxy speaking JSON over HTTP.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET /api/session`: any 2xx means the proxy can serve queries.
//! - `GET /api/interest_over_time?keyword=a&keyword=b&geo=..&timeframe=..&hl=..`
//!   returns `{"timeline":[{"date":"2024-01-07","values":{"a":12,"b":null}}]}`.
//! - `GET /api/related_queries?keyword=a&geo=..&timeframe=..&hl=..` returns
//!   `{"top":[{"query":"a tilbehør","value":100}]}`, most popular first.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;

use crate::error::TrendsError;
use crate::retry::retry_with_backoff;
use crate::source::{InterestFrame, TrendsSource};

const SESSION_PATH: &str = "api/session";
const INTEREST_PATH: &str = "api/interest_over_time";
const RELATED_PATH: &str = "api/related_queries";

#[derive(Debug, Clone)]
pub struct HttpSourceSettings {
    pub base_url: String,
    /// Host language forwarded as `hl`.
    pub hl: String,
    pub timeout_secs: u64,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub user_agent: String,
}

impl Default for HttpSourceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8085".to_owned(),
            hl: "da-DK".to_owned(),
            timeout_secs: 20,
            max_retries: 3,
            backoff_base_ms: 1_000,
            user_agent: concat!("trendseo/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    #[serde(default)]
    values: HashMap<String, Option<f64>>,
}

impl TimelineResponse {
    /// A keyword gets a column when at least one point mentions it; points
    /// that omit it contribute a missing cell.
    fn into_frame(self, keywords: &[String]) -> InterestFrame {
        let mut frame = InterestFrame::new();
        for keyword in keywords {
            if !self
                .timeline
                .iter()
                .any(|point| point.values.contains_key(keyword))
            {
                continue;
            }
            let column = self
                .timeline
                .iter()
                .map(|point| point.values.get(keyword).copied().flatten())
                .collect();
            frame.insert(keyword.clone(), column);
        }
        frame
    }
}

#[derive(Debug, Deserialize)]
struct RelatedResponse {
    #[serde(default)]
    top: Vec<RelatedQuery>,
}

#[derive(Debug, Deserialize)]
struct RelatedQuery {
    query: String,
}

pub struct HttpTrendsSource {
    client: Client,
    base_url: Url,
    hl: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpTrendsSource {
    /// Build a source with the configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`TrendsError::InvalidBaseUrl`] when the base URL does not parse
    /// as an absolute http(s) URL, or [`TrendsError::Http`] when the client
    /// cannot be constructed.
    pub fn new(settings: &HttpSourceSettings) -> Result<Self, TrendsError> {
        let base_url = parse_base_url(&settings.base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&settings.user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            hl: settings.hl.clone(),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TrendsError> {
        self.base_url
            .join(path)
            .map_err(|e| TrendsError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn query_url(
        &self,
        path: &str,
        keywords: &[String],
        geo: &str,
        timeframe: &str,
    ) -> Result<Url, TrendsError> {
        let mut url = self.endpoint(path)?;
        {
            let mut query = url.query_pairs_mut();
            for keyword in keywords {
                query.append_pair("keyword", keyword);
            }
            query
                .append_pair("geo", geo)
                .append_pair("timeframe", timeframe)
                .append_pair("hl", &self.hl);
        }
        Ok(url)
    }

    async fn get_json<T>(&self, url: &Url, context: &str) -> Result<T, TrendsError>
    where
        T: serde::de::DeserializeOwned,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self.client.get(url.clone()).send().await?;
            check_status(&response, url)?;
            let body = response.text().await?;
            serde_json::from_str::<T>(&body).map_err(|e| TrendsError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
        })
        .await
    }
}

impl TrendsSource for HttpTrendsSource {
    /// Any failure after retries is reported as [`TrendsError::Unavailable`].
    async fn open_session(&self) -> Result<(), TrendsError> {
        let url = self.endpoint(SESSION_PATH)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                check_status(&response, &url)?;
                Ok(())
            }
        })
        .await
        .map_err(|e| TrendsError::Unavailable(e.to_string()))
    }

    async fn interest_over_time(
        &self,
        keywords: &[String],
        geo: &str,
        timeframe: &str,
    ) -> Result<InterestFrame, TrendsError> {
        let url = self.query_url(INTEREST_PATH, keywords, geo, timeframe)?;
        tracing::debug!(
            keywords = keywords.len(),
            geo,
            timeframe,
            "requesting interest over time"
        );

        let context = format!("interest over time for {}", keywords.join(", "));
        let parsed: TimelineResponse = self.get_json(&url, &context).await?;
        Ok(parsed.into_frame(keywords))
    }

    async fn related_queries(
        &self,
        keyword: &str,
        geo: &str,
        timeframe: &str,
    ) -> Result<Vec<String>, TrendsError> {
        let url = self.query_url(RELATED_PATH, &[keyword.to_owned()], geo, timeframe)?;
        tracing::debug!(keyword, geo, "requesting related queries");

        let context = format!("related queries for {keyword}");
        let parsed: RelatedResponse = self.get_json(&url, &context).await?;
        Ok(parsed.top.into_iter().map(|related| related.query).collect())
    }
}

fn check_status(response: &Response, url: &Url) -> Result<(), TrendsError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(TrendsError::RateLimited { retry_after_secs });
    }
    if status == StatusCode::NOT_FOUND {
        return Err(TrendsError::NotFound {
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(TrendsError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Parse the base URL and make sure it ends with `/` so `join` appends paths.
fn parse_base_url(base_url: &str) -> Result<Url, TrendsError> {
    let invalid = |reason: String| TrendsError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason,
    };
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash_and_keeps_path_prefix() {
        let url = parse_base_url("http://proxy.local:8085/trends").unwrap();
        assert_eq!(url.as_str(), "http://proxy.local:8085/trends/");
        assert_eq!(
            url.join(SESSION_PATH).unwrap().as_str(),
            "http://proxy.local:8085/trends/api/session"
        );
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        assert!(matches!(
            parse_base_url("ftp://proxy.local"),
            Err(TrendsError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(TrendsError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn interest_url_repeats_keyword_param() {
        let source = HttpTrendsSource::new(&HttpSourceSettings::default()).unwrap();
        let url = source
            .query_url(
                INTEREST_PATH,
                &["kaffe".to_owned(), "te kop".to_owned()],
                "DK",
                "today 12-m",
            )
            .unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("keyword".to_owned(), "kaffe".to_owned()),
                ("keyword".to_owned(), "te kop".to_owned()),
                ("geo".to_owned(), "DK".to_owned()),
                ("timeframe".to_owned(), "today 12-m".to_owned()),
                ("hl".to_owned(), "da-DK".to_owned()),
            ]
        );
    }

    #[test]
    fn timeline_maps_to_columns_for_requested_keywords() {
        let body = r#"{"timeline":[
            {"date":"2024-01-07","values":{"a":12,"b":null}},
            {"date":"2024-01-14","values":{"a":14}}
        ]}"#;
        let parsed: TimelineResponse = serde_json::from_str(body).unwrap();
        let frame = parsed.into_frame(&["a".to_owned(), "b".to_owned(), "c".to_owned()]);
        assert_eq!(frame.series("a"), Some(&[Some(12.0), Some(14.0)][..]));
        assert_eq!(frame.series("b"), Some(&[None, None][..]));
        assert_eq!(frame.series("c"), None);
    }

    #[test]
    fn related_response_keeps_top_order_and_ignores_rising() {
        let body = r#"{"top":[{"query":"kageform","value":100},{"query":"bageplade","value":40}],
            "rising":[{"query":"airfryer","value":250}]}"#;
        let parsed: RelatedResponse = serde_json::from_str(body).unwrap();
        let queries: Vec<String> = parsed.top.into_iter().map(|r| r.query).collect();
        assert_eq!(queries, vec!["kageform", "bageplade"]);

        let empty: RelatedResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.top.is_empty());
    }
}
