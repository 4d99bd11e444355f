//! Type-safe hub of in-process clients.
//!
//! Providers register an implementation once under its interface type;
//! consumers fetch it with `get::<dyn my::Api>()`. Re-registering overwrites
//! the previous value; Arcs already handed out remain valid.

use parking_lot::RwLock;
use std::{any::Any, collections::HashMap, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum ClientHubError {
    #[error("client not found: type={0}")]
    NotFound(&'static str),

    #[error("type mismatch in hub for type={0}")]
    TypeMismatch(&'static str),
}

type Boxed = Box<dyn Any + Send + Sync>;

/// Registry of clients keyed by interface type name.
#[derive(Default)]
pub struct ClientHub {
    map: RwLock<HashMap<&'static str, Boxed>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under the interface type `T` (usually `dyn SomeApi`).
    pub fn register<T>(&self, client: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.map
            .write()
            .insert(std::any::type_name::<T>(), Box::new(client));
    }

    /// Fetch a client by interface type `T`.
    pub fn get<T>(&self) -> Result<Arc<T>, ClientHubError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = std::any::type_name::<T>();
        let r = self.map.read();
        let boxed = r.get(key).ok_or(ClientHubError::NotFound(key))?;

        boxed
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ClientHubError::TypeMismatch(key))
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[async_trait::async_trait]
    trait TestApi: Send + Sync {
        async fn id(&self) -> usize;
    }

    struct ImplA(usize);

    #[async_trait::async_trait]
    impl TestApi for ImplA {
        async fn id(&self) -> usize {
            self.0
        }
    }

    #[tokio::test]
    async fn register_and_get_dyn_trait() {
        let hub = ClientHub::new();
        let api: Arc<dyn TestApi> = Arc::new(ImplA(7));
        hub.register::<dyn TestApi>(api.clone());

        let got = hub.get::<dyn TestApi>().unwrap();
        assert_eq!(got.id().await, 7);
        assert!(Arc::ptr_eq(&api, &got));
        assert_eq!(hub.len(), 1);
    }

    #[tokio::test]
    async fn reregister_overwrites() {
        let hub = ClientHub::new();
        hub.register::<dyn TestApi>(Arc::new(ImplA(1)));
        hub.register::<dyn TestApi>(Arc::new(ImplA(2)));

        assert_eq!(hub.get::<dyn TestApi>().unwrap().id().await, 2);
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn missing_client_is_an_error() {
        let hub = ClientHub::new();
        assert!(hub.is_empty());
        assert!(matches!(
            hub.get::<dyn TestApi>(),
            Err(ClientHubError::NotFound(_))
        ));
    }
}
