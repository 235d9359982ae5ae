use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc::{Receiver, Sender, channel},
    },
    time::{Duration, Instant},
};

use comment_predictor::classifier::{ClassificationService, ClientError, RawPrediction};
use comment_predictor::config::SessionSettings;
use comment_predictor::labels::{Emotion, Label, LikeCountBucket, Sentiment};
use comment_predictor::model::{DebugInfo, HistoryEntry, ModelHealth, ServiceHealth};
use comment_predictor::session::SessionController;
use comment_predictor::stats::StatsSummary;

/// Blocks a call until the test releases it.
#[derive(Default)]
pub struct Gate {
    rx: Mutex<Option<Receiver<()>>>,
}

impl Gate {
    /// Every later call waits for one send, or for the sender to drop.
    pub fn hold(&self) -> Sender<()> {
        let (tx, rx) = channel();
        *self.rx.lock().unwrap() = Some(rx);
        tx
    }

    fn pass(&self) {
        let guard = self.rx.lock().unwrap();
        if let Some(rx) = guard.as_ref() {
            let _ = rx.recv();
        }
    }
}

/// Scripted classification service that records what it was asked.
pub struct MockService {
    pub health: Mutex<Result<ServiceHealth, ClientError>>,
    pub predictions: Mutex<VecDeque<Result<RawPrediction, ClientError>>>,
    pub history: Mutex<Result<Vec<HistoryEntry>, ClientError>>,
    pub stats: Mutex<Result<Option<StatsSummary>, ClientError>>,
    pub delete_result: Mutex<Result<(), ClientError>>,
    pub clear_result: Mutex<Result<(), ClientError>>,
    pub predict_gate: Gate,
    pub history_gate: Gate,
    pub predicted_texts: Mutex<Vec<String>>,
    /// Makes `predict` panic on its worker thread.
    pub predict_panics: AtomicBool,
    pub health_calls: AtomicUsize,
    pub predict_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub stats_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub clear_calls: AtomicUsize,
}

impl Default for MockService {
    fn default() -> Self {
        Self {
            health: Mutex::new(Ok(healthy())),
            predictions: Mutex::new(VecDeque::new()),
            history: Mutex::new(Ok(Vec::new())),
            stats: Mutex::new(Ok(None)),
            delete_result: Mutex::new(Ok(())),
            clear_result: Mutex::new(Ok(())),
            predict_gate: Gate::default(),
            history_gate: Gate::default(),
            predicted_texts: Mutex::new(Vec::new()),
            predict_panics: AtomicBool::new(false),
            health_calls: AtomicUsize::new(0),
            predict_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            stats_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            clear_calls: AtomicUsize::new(0),
        }
    }
}

impl MockService {
    pub fn queue_prediction(&self, reply: Result<RawPrediction, ClientError>) {
        self.predictions.lock().unwrap().push_back(reply);
    }

    pub fn set_history(&self, history: Result<Vec<HistoryEntry>, ClientError>) {
        *self.history.lock().unwrap() = history;
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl ClassificationService for MockService {
    fn check_health(&self) -> Result<ServiceHealth, ClientError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.health.lock().unwrap().clone()
    }

    fn predict(&self, text: &str) -> Result<RawPrediction, ClientError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        if self.predict_panics.load(Ordering::SeqCst) {
            panic!("classifier backend crashed");
        }
        self.predicted_texts.lock().unwrap().push(text.to_string());
        self.predict_gate.pass();
        self.predictions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(raw_prediction("joy", "positive", "high")))
    }

    fn fetch_history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.history.lock().unwrap().clone();
        self.history_gate.pass();
        reply
    }

    fn fetch_stats(&self) -> Result<Option<StatsSummary>, ClientError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.lock().unwrap().clone()
    }

    fn delete_history_entry(&self, _id: u64) -> Result<(), ClientError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.delete_result.lock().unwrap().clone()
    }

    fn clear_history(&self) -> Result<(), ClientError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        self.clear_result.lock().unwrap().clone()
    }

    fn fetch_debug_info(&self) -> Result<DebugInfo, ClientError> {
        Ok(DebugInfo {
            emotion_model_loaded: true,
            ..DebugInfo::default()
        })
    }
}

pub fn healthy() -> ServiceHealth {
    ServiceHealth {
        healthy: true,
        message: Some("All local AI models ready".to_string()),
        models: ModelHealth {
            emotion_loaded: true,
            sentiment_loaded: true,
            like_count_loaded: true,
            like_count_submodels: None,
        },
    }
}

pub fn not_ready() -> ServiceHealth {
    ServiceHealth {
        healthy: false,
        message: Some("Some models are not loaded".to_string()),
        models: ModelHealth {
            emotion_loaded: true,
            sentiment_loaded: false,
            like_count_loaded: false,
            like_count_submodels: None,
        },
    }
}

pub fn raw_prediction(emotion: &str, sentiment: &str, like_count: &str) -> RawPrediction {
    serde_json::from_value(serde_json::json!({
        "emotion": emotion,
        "sentiment": sentiment,
        "like_count": like_count,
    }))
    .unwrap()
}

pub fn entry(id: u64, emotion: Emotion, sentiment: Sentiment, like_count: LikeCountBucket) -> HistoryEntry {
    HistoryEntry {
        id,
        timestamp: None,
        comment_text: format!("comment {id}"),
        comment_preview: format!("comment {id}"),
        emotion: Label::Known(emotion),
        sentiment: Label::Known(sentiment),
        like_count: Label::Known(like_count),
    }
}

/// Poll until every started job has reported back.
pub fn settle(controller: &mut SessionController) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while controller.is_busy() {
        assert!(Instant::now() < deadline, "background jobs did not settle");
        controller.poll_jobs();
        std::thread::sleep(Duration::from_millis(2));
    }
    controller.poll_jobs();
}

/// Poll until `done` holds for the session state.
pub fn poll_until(controller: &mut SessionController, done: impl Fn(&SessionController) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(controller) {
        assert!(Instant::now() < deadline, "condition not reached in time");
        controller.poll_jobs();
        std::thread::sleep(Duration::from_millis(2));
    }
}

/// A session that has passed a health check against a fresh mock.
pub fn connected_controller() -> (Arc<MockService>, SessionController) {
    let service = Arc::new(MockService::default());
    let mut controller = SessionController::new(service.clone(), SessionSettings::default());
    controller.check_health();
    settle(&mut controller);
    (service, controller)
}
