//! Scripted content source for policy and resolver tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use refill_core::{ContentRecord, Sections};
use tokio::sync::Semaphore;

use crate::source::{ContentSource, Lookup, ResolveError, ResolvedFrom};

#[derive(Clone)]
pub(crate) enum Reply {
    Content(ContentRecord),
    Empty,
    Fail,
}

#[derive(Default)]
pub(crate) struct ScriptedSource {
    replies: Mutex<HashMap<(String, String), Reply>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply(&self, date: &str, cohort: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .insert((date.to_string(), cohort.to_string()), reply);
    }

    /// Lookups for `date` block until a permit is added to the returned semaphore.
    pub(crate) fn gate(&self, date: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .unwrap()
            .insert(date.to_string(), gate.clone());
        gate
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn lookup(&self, date: &str, cohort: &str) -> Result<Lookup, ResolveError> {
        self.calls
            .lock()
            .unwrap()
            .push((date.to_string(), cohort.to_string()));

        let gate = self.gates.lock().unwrap().get(date).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&(date.to_string(), cohort.to_string()))
            .cloned()
            .unwrap_or(Reply::Empty);

        match reply {
            Reply::Content(content) => Ok(Lookup::found(content, ResolvedFrom::Admin)),
            Reply::Empty => Ok(Lookup::none()),
            Reply::Fail => Err(ResolveError::HttpError { status: 503 }),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub(crate) fn record(title: &str) -> ContentRecord {
    ContentRecord {
        title: Some(title.to_string()),
        sections: Sections { past: "P".into(), change: "C".into(), detail: "D".into() },
        ..Default::default()
    }
}
