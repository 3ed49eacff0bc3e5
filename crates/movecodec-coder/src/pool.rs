//! Per-endpoint coder cache.
//!
//! A coder owns its schema cache, so callers talking to several networks
//! keep one coder per endpoint and reuse it across requests.

use crate::coder::MoveCoder;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Factory = dyn Fn(&str) -> MoveCoder + Send + Sync;

#[derive(Clone)]
pub struct CoderPool {
    factory: Arc<Factory>,
    coders: Arc<Mutex<HashMap<String, Arc<MoveCoder>>>>,
}

impl CoderPool {
    /// `factory` builds a fresh coder for an endpoint seen for the first time.
    pub fn new(factory: impl Fn(&str) -> MoveCoder + Send + Sync + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
            coders: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The coder bound to `endpoint`, created on first use.
    pub fn get_or_create(&self, endpoint: &str) -> Arc<MoveCoder> {
        let mut coders = self.coders.lock().unwrap();
        coders
            .entry(endpoint.to_string())
            .or_insert_with(|| Arc::new((self.factory)(endpoint)))
            .clone()
    }

    pub fn get(&self, endpoint: &str) -> Option<Arc<MoveCoder>> {
        self.coders.lock().unwrap().get(endpoint).cloned()
    }

    pub fn len(&self) -> usize {
        self.coders.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CoderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoderPool").field("endpoints", &self.len()).finish()
    }
}
