use std::future::Future;

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::{
    data::schema::{PropertyDef, Schema, fallback_global_properties, fallback_properties},
    error::FetchError,
};

type FetchResult = Result<Schema, FetchError>;

/// Where the schema currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// No fetch was started; the fallback field set is in use.
    Offline,
    /// A fetch is running on a worker.
    Pending,
    /// The schema arrived and is in use.
    Loaded,
    /// The fetch failed; the fallback field set is in use.
    Failed(String),
}

/// Holds the schema once it has been delivered to the UI thread.
///
/// The fetch itself runs as a tokio task. Its result travels through a
/// one-shot channel and is only taken out by [`SchemaCache::poll`], which the
/// owner calls on its own turn, so the cache is never written from two
/// threads.
#[derive(Debug)]
pub struct SchemaCache {
    schema: Option<Schema>,
    status: SchemaStatus,
    pending: Option<oneshot::Receiver<FetchResult>>,
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCache {
    /// Empty cache serving the fallback field set.
    pub fn new() -> Self {
        Self {
            schema: None,
            status: SchemaStatus::Offline,
            pending: None,
        }
    }

    /// Start fetching in the background.
    ///
    /// At most one fetch runs per cache; later calls are ignored. `notify`
    /// runs on the worker after the result has been queued, and should only
    /// wake the owner so it calls [`SchemaCache::poll`].
    pub fn request_fetch<F, N>(&mut self, fetch: F, notify: N)
    where
        F: Future<Output = FetchResult> + Send + 'static,
        N: FnOnce() + Send + 'static,
    {
        if self.pending.is_some() || self.schema.is_some() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            self.install(Err(FetchError::Transport(
                "no async runtime available".to_string(),
            )));
            return;
        };

        let (tx, rx) = oneshot::channel();
        handle.spawn(async move {
            let result = fetch.await;
            if tx.send(result).is_ok() {
                notify();
            }
        });
        self.pending = Some(rx);
        self.status = SchemaStatus::Pending;
        info!("schema fetch started");
    }

    /// Take a delivered result, if any. Returns the new status when it changed.
    pub fn poll(&mut self) -> Option<&SchemaStatus> {
        let rx = self.pending.as_mut()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(FetchError::Cancelled),
        };
        self.pending = None;
        self.install(result);
        Some(&self.status)
    }

    /// Store a fetch outcome.
    pub fn install(&mut self, result: FetchResult) {
        match result {
            Ok(schema) => {
                info!("schema loaded");
                self.schema = Some(schema);
                self.status = SchemaStatus::Loaded;
            }
            Err(e) => {
                warn!("schema unavailable, using fallback fields: {e}");
                self.status = SchemaStatus::Failed(e.to_string());
            }
        }
    }

    /// Current status.
    pub fn status(&self) -> &SchemaStatus {
        &self.status
    }

    /// The loaded schema, if any.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Property definitions for a module.
    ///
    /// Schema-derived when the schema is loaded and knows the module,
    /// otherwise the fallback field set.
    pub fn lookup(&self, module: &str) -> Vec<PropertyDef> {
        self.schema
            .as_ref()
            .and_then(|s| s.module(module))
            .map(<[PropertyDef]>::to_vec)
            .unwrap_or_else(fallback_properties)
    }

    /// Property definitions for the global settings panel.
    pub fn lookup_global(&self) -> Vec<PropertyDef> {
        self.schema
            .as_ref()
            .map(Schema::global)
            .filter(|global| !global.is_empty())
            .map(<[PropertyDef]>::to_vec)
            .unwrap_or_else(fallback_global_properties)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use indexmap::IndexMap;

    use super::*;
    use crate::data::schema::PropertyType;

    fn one_module_schema() -> Schema {
        let mut modules = IndexMap::new();
        modules.insert(
            "time".to_string(),
            vec![PropertyDef::new("time_format", PropertyType::String)],
        );
        Schema::new(modules, Vec::new())
    }

    async fn wait_for(cache: &mut SchemaCache) -> SchemaStatus {
        for _ in 0..200 {
            if let Some(status) = cache.poll() {
                return status.clone();
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("schema fetch never completed");
    }

    #[test]
    fn test_fallback_until_loaded() {
        let mut cache = SchemaCache::new();
        assert_eq!(cache.lookup("time"), fallback_properties());
        assert_eq!(cache.lookup_global(), fallback_global_properties());

        cache.install(Ok(one_module_schema()));
        assert_eq!(cache.lookup("time")[0].name, "time_format");
        assert_eq!(cache.lookup("rust"), fallback_properties());
        assert_eq!(cache.lookup_global(), fallback_global_properties());
    }

    #[test]
    fn test_failure_keeps_fallback() {
        let mut cache = SchemaCache::new();
        cache.install(Err(FetchError::Transport("offline".into())));
        assert!(matches!(cache.status(), SchemaStatus::Failed(_)));
        assert_eq!(cache.lookup("time"), fallback_properties());
    }

    #[test]
    fn test_fetch_without_runtime_fails_softly() {
        let mut cache = SchemaCache::new();
        cache.request_fetch(async { Ok(Schema::default()) }, || {});
        assert!(matches!(cache.status(), SchemaStatus::Failed(_)));
        assert!(cache.poll().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_delivers_through_poll() {
        let mut cache = SchemaCache::new();
        let (woke_tx, woke_rx) = std::sync::mpsc::channel();
        cache.request_fetch(async { Ok(one_module_schema()) }, move || {
            woke_tx.send(()).unwrap();
        });
        assert_eq!(cache.status(), &SchemaStatus::Pending);

        assert_eq!(wait_for(&mut cache).await, SchemaStatus::Loaded);
        assert!(woke_rx.recv_timeout(Duration::from_secs(1)).is_ok());
        assert_eq!(cache.lookup("time")[0].name, "time_format");

        cache.request_fetch(async { Err(FetchError::Cancelled) }, || {});
        assert_eq!(cache.status(), &SchemaStatus::Loaded);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_error_delivered() {
        let mut cache = SchemaCache::new();
        cache.request_fetch(
            async { Err(FetchError::Transport("404".into())) },
            || {},
        );
        assert!(matches!(wait_for(&mut cache).await, SchemaStatus::Failed(_)));
    }
}
