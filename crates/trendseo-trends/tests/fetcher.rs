use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::Instant;
use trendseo_trends::{
    FetcherSettings, InterestFrame, Reliability, TrendDirection, TrendsBatchFetcher, TrendsError,
    TrendsSource,
};

/// Fake source answering requests from a queue of scripted outcomes.
///
/// When the queue runs dry every requested keyword gets a flat series of 40.
#[derive(Default)]
struct ScriptedSource {
    session_down: bool,
    responses: Mutex<VecDeque<Result<InterestFrame, TrendsError>>>,
    requests: Mutex<Vec<(Vec<String>, Instant)>>,
    sessions_opened: Mutex<u32>,
    /// `None` makes every related-queries request fail.
    related: Option<Vec<String>>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self::default()
    }

    fn unreachable() -> Self {
        Self {
            session_down: true,
            ..Self::default()
        }
    }

    fn then(self, response: Result<InterestFrame, TrendsError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    fn with_related(mut self, related: &[&str]) -> Self {
        self.related = Some(kws(related));
        self
    }

    fn requested(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(keywords, _)| keywords.clone())
            .collect()
    }

    fn request_instants(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

impl TrendsSource for ScriptedSource {
    async fn open_session(&self) -> Result<(), TrendsError> {
        *self.sessions_opened.lock().unwrap() += 1;
        if self.session_down {
            Err(TrendsError::Unavailable("connection refused".to_owned()))
        } else {
            Ok(())
        }
    }

    async fn interest_over_time(
        &self,
        keywords: &[String],
        _geo: &str,
        _timeframe: &str,
    ) -> Result<InterestFrame, TrendsError> {
        self.requests
            .lock()
            .unwrap()
            .push((keywords.to_vec(), Instant::now()));
        let scripted = self.responses.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(keywords.iter().fold(InterestFrame::new(), |frame, keyword| {
                frame.with_series(keyword, &[40.0; 12])
            }))
        })
    }

    async fn related_queries(
        &self,
        keyword: &str,
        _geo: &str,
        _timeframe: &str,
    ) -> Result<Vec<String>, TrendsError> {
        self.requests
            .lock()
            .unwrap()
            .push((vec![keyword.to_owned()], Instant::now()));
        self.related.clone().ok_or_else(upstream_error)
    }
}

fn kws(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_owned()).collect()
}

fn settings(batch_size: usize) -> FetcherSettings {
    FetcherSettings {
        batch_size,
        min_delay: Duration::ZERO,
        cache: false,
    }
}

fn fetcher(
    source: ScriptedSource,
    settings: FetcherSettings,
) -> TrendsBatchFetcher<ScriptedSource> {
    TrendsBatchFetcher::with_rng(source, settings, StdRng::seed_from_u64(1))
}

fn upstream_error() -> TrendsError {
    TrendsError::UnexpectedStatus {
        status: 500,
        url: "http://proxy/api/interest_over_time".to_owned(),
    }
}

#[tokio::test]
async fn returns_one_record_per_keyword_when_every_batch_succeeds() {
    let fetcher = fetcher(ScriptedSource::new(), settings(3));
    let keywords = kws(&["a", "b", "c", "d", "e", "f", "g"]);

    let records = fetcher.fetch_batch(&keywords, "DK", "today 12-m").await;

    assert_eq!(records.len(), 7);
    for keyword in &keywords {
        let record = &records[keyword];
        assert_eq!(&record.keyword, keyword);
        assert_eq!(record.reliability, Reliability::High);
        assert!((record.interest - 40.0).abs() < f64::EPSILON);
        assert_eq!(record.data_points, 12);
    }
    assert_eq!(
        fetcher.source().requested(),
        vec![kws(&["a", "b", "c"]), kws(&["d", "e", "f"]), kws(&["g"])]
    );
}

#[tokio::test]
async fn failed_second_batch_only_affects_its_keywords() {
    let first = InterestFrame::new()
        .with_series("x", &[10.0, 20.0, 30.0, 40.0])
        .with_series("y", &[5.0, 5.0, 5.0, 5.0]);
    let source = ScriptedSource::new().then(Ok(first)).then(Err(upstream_error()));
    let fetcher = fetcher(source, settings(2));

    let records = fetcher
        .fetch_batch(&kws(&["x", "y", "z", "w"]), "DK", "today 12-m")
        .await;

    assert_eq!(records.len(), 4);
    assert_eq!(records["x"].reliability, Reliability::Medium);
    assert!((records["x"].interest - 25.0).abs() < 1e-9);
    assert!((records["x"].peak_interest - 40.0).abs() < 1e-9);
    assert_eq!(records["y"].reliability, Reliability::Medium);
    for keyword in ["z", "w"] {
        let record = &records[keyword];
        assert_eq!(record.reliability, Reliability::Estimated);
        assert!((15.0..=60.0).contains(&record.interest));
        assert!((40.0..=80.0).contains(&record.peak_interest));
        assert!(matches!(
            record.trend_direction,
            TrendDirection::Stable | TrendDirection::Rising
        ));
        assert_eq!(record.data_points, 52);
    }
}

#[tokio::test]
async fn failure_with_default_batch_size_marks_trailing_keyword() {
    let first = InterestFrame::new()
        .with_series("x", &[10.0; 4])
        .with_series("y", &[10.0; 4])
        .with_series("z", &[10.0; 4]);
    let source = ScriptedSource::new().then(Ok(first)).then(Err(upstream_error()));
    let fetcher = fetcher(source, settings(3));

    let records = fetcher
        .fetch_batch(&kws(&["x", "y", "z", "w"]), "DK", "today 12-m")
        .await;

    assert_eq!(records.len(), 4);
    assert_eq!(records["z"].reliability, Reliability::Medium);
    assert_eq!(records["w"].reliability, Reliability::Estimated);
}

#[tokio::test]
async fn unreachable_source_yields_demo_records_for_everything() {
    let fetcher = fetcher(ScriptedSource::unreachable(), settings(3));
    let keywords = kws(&["a", "b", "c", "d", "e"]);

    let records = fetcher.fetch_batch(&keywords, "DK", "today 12-m").await;

    assert_eq!(records.len(), 5);
    for record in records.values() {
        assert_eq!(record.reliability, Reliability::Demo);
        assert!((20.0..=70.0).contains(&record.interest));
        assert!((50.0..=90.0).contains(&record.peak_interest));
        assert_eq!(record.data_points, 52);
    }
    assert!(fetcher.source().requested().is_empty());
}

#[tokio::test]
async fn keyword_without_points_or_column_is_no_data() {
    let mut frame = InterestFrame::new().with_series("kaffe", &[30.0; 4]);
    frame.insert("tom", vec![None, None, None]);
    let fetcher = fetcher(ScriptedSource::new().then(Ok(frame)), settings(3));

    let records = fetcher
        .fetch_batch(&kws(&["kaffe", "tom", "mangler"]), "DK", "today 12-m")
        .await;

    for keyword in ["tom", "mangler"] {
        let record = &records[keyword];
        assert_eq!(record.reliability, Reliability::Low);
        assert_eq!(record.trend_direction, TrendDirection::NoData);
        assert_eq!(record.data_points, 0);
        assert!(record.interest.abs() < f64::EPSILON);
    }
    assert_eq!(records["kaffe"].reliability, Reliability::Medium);
}

#[tokio::test]
async fn duplicate_keywords_are_requested_once() {
    let fetcher = fetcher(ScriptedSource::new(), settings(3));

    let records = fetcher
        .fetch_batch(&kws(&["a", "b", "a", "c", "b"]), "DK", "today 12-m")
        .await;

    assert_eq!(records.len(), 3);
    assert_eq!(fetcher.source().requested(), vec![kws(&["a", "b", "c"])]);
}

#[tokio::test]
async fn empty_input_makes_no_requests() {
    let fetcher = fetcher(ScriptedSource::new(), settings(3));
    let records = fetcher.fetch_batch(&[], "DK", "today 12-m").await;
    assert!(records.is_empty());
    assert!(fetcher.source().requested().is_empty());
}

#[tokio::test]
async fn zero_batch_size_is_treated_as_one() {
    let fetcher = fetcher(ScriptedSource::new(), settings(0));
    let records = fetcher.fetch_batch(&kws(&["a", "b"]), "DK", "today 12-m").await;
    assert_eq!(records.len(), 2);
    assert_eq!(fetcher.source().requested(), vec![kws(&["a"]), kws(&["b"])]);
}

#[tokio::test]
async fn session_is_opened_once_per_fetcher() {
    let fetcher = fetcher(ScriptedSource::new(), settings(3));
    fetcher.fetch_batch(&kws(&["a"]), "DK", "today 12-m").await;
    fetcher.fetch_batch(&kws(&["b"]), "DK", "today 12-m").await;
    assert_eq!(*fetcher.source().sessions_opened.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn requests_are_spaced_by_min_delay() {
    let settings = FetcherSettings {
        batch_size: 2,
        min_delay: Duration::from_secs(3),
        cache: false,
    };
    let fetcher = fetcher(ScriptedSource::new(), settings);
    let start = Instant::now();

    fetcher
        .fetch_batch(&kws(&["a", "b", "c", "d", "e"]), "DK", "today 12-m")
        .await;
    fetcher.fetch_batch(&kws(&["f"]), "DK", "today 12-m").await;

    let instants = fetcher.source().request_instants();
    assert_eq!(instants.len(), 4);
    assert_eq!(instants[0], start, "first request is not delayed");
    for pair in instants.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(3));
    }
}

#[tokio::test]
async fn seeded_fallbacks_are_reproducible() {
    let run = || async {
        let fetcher = fetcher(ScriptedSource::unreachable(), settings(3));
        fetcher
            .fetch_batch(&kws(&["a", "b", "c"]), "DK", "today 12-m")
            .await
    };
    assert_eq!(run().await, run().await);
}

#[tokio::test]
async fn cache_serves_real_records_without_new_requests() {
    let mut settings = settings(3);
    settings.cache = true;
    let fetcher = fetcher(ScriptedSource::new(), settings);

    let first = fetcher.fetch_batch(&kws(&["a", "b"]), "DK", "today 12-m").await;
    let second = fetcher.fetch_batch(&kws(&["a", "b"]), "DK", "today 12-m").await;

    assert_eq!(first, second);
    assert_eq!(fetcher.source().requested().len(), 1);

    fetcher.fetch_batch(&kws(&["a"]), "SE", "today 12-m").await;
    assert_eq!(fetcher.source().requested().len(), 2, "geo is part of the key");
}

#[tokio::test]
async fn cache_never_keeps_estimated_records() {
    let mut settings = settings(3);
    settings.cache = true;
    let source = ScriptedSource::new().then(Err(upstream_error()));
    let fetcher = fetcher(source, settings);

    let first = fetcher.fetch_batch(&kws(&["a"]), "DK", "today 12-m").await;
    assert_eq!(first["a"].reliability, Reliability::Estimated);

    let second = fetcher.fetch_batch(&kws(&["a"]), "DK", "today 12-m").await;
    assert_eq!(second["a"].reliability, Reliability::High);
    assert_eq!(fetcher.source().requested().len(), 2);
}

#[tokio::test]
async fn fetch_single_uses_quick_summary() {
    let frame = InterestFrame::new().with_series(
        "kaffe",
        &[40.0, 40.0, 40.0, 40.0, 50.0, 50.0, 50.0, 50.5],
    );
    let fetcher = fetcher(ScriptedSource::new().then(Ok(frame)), settings(3));

    let record = fetcher
        .fetch_single("kaffe", "DK", "today 12-m")
        .await
        .unwrap()
        .expect("series has points");

    assert!((record.interest - 45.0).abs() < f64::EPSILON);
    assert!((record.peak_interest - 50.0).abs() < f64::EPSILON);
    assert_eq!(record.trend_direction, TrendDirection::Rising);
}

#[tokio::test]
async fn fetch_single_failed_request_is_none() {
    let fetcher = fetcher(ScriptedSource::new().then(Err(upstream_error())), settings(3));
    let record = fetcher.fetch_single("kaffe", "DK", "today 12-m").await.unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn fetch_single_without_session_is_an_error() {
    let fetcher = fetcher(ScriptedSource::unreachable(), settings(3));
    let result = fetcher.fetch_single("kaffe", "DK", "today 12-m").await;
    assert!(matches!(result, Err(TrendsError::Unavailable(_))));
}

#[tokio::test]
async fn fetch_related_keeps_source_order() {
    let source = ScriptedSource::new().with_related(&["kageform", "bageplade", "dejskraber"]);
    let fetcher = fetcher(source, settings(3));

    let related = fetcher
        .fetch_related("kageskraber", "DK", "today 12-m")
        .await
        .unwrap();

    assert_eq!(related, kws(&["kageform", "bageplade", "dejskraber"]));
    assert_eq!(fetcher.source().requested(), vec![kws(&["kageskraber"])]);
}

#[tokio::test]
async fn fetch_related_failed_request_is_empty() {
    let fetcher = fetcher(ScriptedSource::new(), settings(3));
    let related = fetcher.fetch_related("kaffe", "DK", "today 12-m").await.unwrap();
    assert!(related.is_empty());
}

#[tokio::test]
async fn fetch_related_without_session_is_an_error() {
    let fetcher = fetcher(ScriptedSource::unreachable(), settings(3));
    let result = fetcher.fetch_related("kaffe", "DK", "today 12-m").await;
    assert!(matches!(result, Err(TrendsError::Unavailable(_))));
    assert!(fetcher.source().requested().is_empty());
}

#[tokio::test(start_paused = true)]
async fn related_requests_share_the_request_spacing() {
    let settings = FetcherSettings {
        batch_size: 3,
        min_delay: Duration::from_secs(3),
        cache: false,
    };
    let fetcher = fetcher(ScriptedSource::new().with_related(&["te"]), settings);

    fetcher.fetch_single("kaffe", "DK", "today 12-m").await.unwrap();
    fetcher.fetch_related("kaffe", "DK", "today 12-m").await.unwrap();
    fetcher.fetch_single("te", "DK", "today 12-m").await.unwrap();

    let instants = fetcher.source().request_instants();
    assert_eq!(instants.len(), 3);
    for pair in instants.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(3));
    }
}
