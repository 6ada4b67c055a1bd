//! In-memory ObjectStore for unit tests

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::{ListOptions, ListResult, ObjectInfo, ObjectStore};

#[derive(Debug, Clone)]
pub(crate) struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    page_size: Option<usize>,
    failing_gets: HashSet<String>,
}

impl MemoryStore {
    pub fn with_objects(objects: &[(&str, &str)]) -> Self {
        let objects = objects
            .iter()
            .map(|(key, data)| {
                (
                    key.to_string(),
                    StoredObject {
                        data: data.as_bytes().to_vec(),
                        content_type: None,
                    },
                )
            })
            .collect();

        Self {
            objects: Mutex::new(objects),
            ..Default::default()
        }
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn failing_get(mut self, key: &str) -> Self {
        self.failing_gets.insert(key.to_string());
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(&self, _bucket: &str, options: ListOptions) -> Result<ListResult> {
        let objects = self.objects.lock().unwrap();
        let prefix = options.prefix.unwrap_or_default();
        let after = options.continuation_token;

        let mut matching = objects
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| after.as_ref().is_none_or(|after| key.as_str() > after.as_str()));

        let items: Vec<ObjectInfo> = matching
            .by_ref()
            .take(self.page_size.unwrap_or(usize::MAX))
            .map(|(key, _)| ObjectInfo::new(key.clone()))
            .collect();
        let truncated = matching.next().is_some();
        let continuation_token = if truncated {
            items.last().map(|item| item.key.clone())
        } else {
            None
        };

        Ok(ListResult {
            items,
            truncated,
            continuation_token,
        })
    }

    async fn get_object(&self, _bucket: &str, key: &str) -> Result<Vec<u8>> {
        if self.failing_gets.contains(key) {
            return Err(Error::Network(format!("simulated failure for {key}")));
        }

        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn put_object(
        &self,
        _bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let info = ObjectInfo::new(key).with_etag(format!("etag-{}", data.len()));

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), StoredObject { data, content_type });

        Ok(info)
    }
}
