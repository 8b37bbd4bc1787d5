//! Loader capability
//!
//! The user-supplied computation a group falls back to on a miss.

use std::future::Future;

use async_trait::async_trait;

/// Loads the value for a key from the source of truth.
///
/// Called at most once at a time per key and group on this node. It may be
/// called concurrently for different keys and again for the same key after
/// an earlier call finished, so it must tolerate retries.
///
/// Any `Fn(String) -> impl Future<Output = anyhow::Result<Vec<u8>>>` closure
/// is a `Getter`.
#[async_trait]
pub trait Getter: Send + Sync + 'static {
    /// Returns the bytes for `key`, or an error that is handed verbatim to
    /// every caller waiting on this key.
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

#[async_trait]
impl<F, Fut> Getter for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
{
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapGetter(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl Getter for MapGetter {
        async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
            self.0
                .get(key)
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
        }
    }

    #[tokio::test]
    async fn test_closure_is_a_getter() {
        let getter = |key: String| async move { Ok::<_, anyhow::Error>(key.into_bytes()) };

        let value = Getter::get(&getter, "key").await.unwrap();

        assert_eq!(value, b"key".to_vec());
    }

    #[tokio::test]
    async fn test_struct_getter() {
        let getter = MapGetter(HashMap::from([("Tom", "630")]));

        assert_eq!(getter.get("Tom").await.unwrap(), b"630".to_vec());
        assert_eq!(
            getter.get("kkk").await.unwrap_err().to_string(),
            "kkk not exist"
        );
    }
}
