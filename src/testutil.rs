//! Scripted search-index double for unit tests

use crate::elastic::SearchIndex;
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory stand-in for a search cluster
///
/// Responses are scripted per call; every call is counted and search bodies
/// are captured so tests can assert the exact wire shapes a traversal
/// produced.
pub struct MockIndex {
    searches: Mutex<VecDeque<Result<JsonValue>>>,
    opens: Mutex<VecDeque<Result<String>>>,
    fail_next_close: AtomicBool,
    /// Captured `(index, body)` pairs, one per search call
    pub captured: Mutex<Vec<(Option<String>, JsonValue)>>,
    /// Number of open-pit calls
    pub open_count: AtomicUsize,
    /// Number of close-pit calls
    pub close_count: AtomicUsize,
    /// Ids passed to close-pit, in call order
    pub closed_ids: Mutex<Vec<String>>,
}

impl MockIndex {
    pub fn new() -> Self {
        Self {
            searches: Mutex::new(VecDeque::new()),
            opens: Mutex::new(VecDeque::new()),
            fail_next_close: AtomicBool::new(false),
            captured: Mutex::new(Vec::new()),
            open_count: AtomicUsize::new(0),
            close_count: AtomicUsize::new(0),
            closed_ids: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response for the next unscripted search call
    pub fn enqueue_search(&self, response: Result<JsonValue>) {
        self.searches.lock().unwrap().push_back(response);
    }

    /// Queue a result for the next open-pit call
    ///
    /// Unscripted opens succeed with generated ids (`pit-1`, `pit-2`, ...).
    pub fn enqueue_open(&self, result: Result<String>) {
        self.opens.lock().unwrap().push_back(result);
    }

    /// Make the next close-pit call fail
    pub fn fail_next_close(&self) {
        self.fail_next_close.store(true, Ordering::SeqCst);
    }

    /// Number of search calls made so far
    pub fn search_count(&self) -> usize {
        self.captured.lock().unwrap().len()
    }

    /// Build a response carrying one document per id, in order
    ///
    /// Each hit's `sort` value is its id, so cursor chaining is observable.
    pub fn page(ids: &[u64], pit_id: Option<&str>) -> JsonValue {
        let hits: Vec<JsonValue> = ids
            .iter()
            .map(|id| {
                json!({
                    "_index": "resources",
                    "_id": id.to_string(),
                    "_source": { "id": id },
                    "sort": [id],
                })
            })
            .collect();

        let mut body = json!({
            "hits": {
                "total": { "value": ids.len(), "relation": "eq" },
                "hits": hits,
            }
        });
        if let Some(pit_id) = pit_id {
            body["pit_id"] = json!(pit_id);
        }
        body
    }
}

impl Default for MockIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchIndex for MockIndex {
    async fn search(&self, index: Option<&str>, body: &JsonValue) -> Result<JsonValue> {
        self.captured
            .lock()
            .unwrap()
            .push((index.map(ToString::to_string), body.clone()));
        self.searches
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted search call")
    }

    async fn open_pit(&self, _index: &str, _keep_alive: &str) -> Result<String> {
        let n = self.open_count.fetch_add(1, Ordering::SeqCst) + 1;
        match self.opens.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(format!("pit-{n}")),
        }
    }

    async fn close_pit(&self, pit_id: &str) -> Result<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        self.closed_ids.lock().unwrap().push(pit_id.to_string());
        if self.fail_next_close.swap(false, Ordering::SeqCst) {
            return Err(crate::error::Error::status(500, "close failed"));
        }
        Ok(())
    }
}
