//! Loader Module
//!
//! The source of truth a group falls back to on a miss.

use async_trait::async_trait;

// == Loader Trait ==
/// Produces the value for a key that neither the cache nor a peer holds.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

// == Loader Fn ==
/// Adapts a plain function or closure into a [`Loader`].
pub struct LoaderFn<F>(pub F);

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_fn_passes_key_through() {
        let loader = LoaderFn(|key: &str| -> anyhow::Result<Vec<u8>> { Ok(key.as_bytes().to_vec()) });
        let value = tokio_test::block_on(loader.load("key")).unwrap();
        assert_eq!(value, b"key".to_vec());
    }

    #[test]
    fn test_loader_fn_propagates_error() {
        let loader = LoaderFn(|key: &str| -> anyhow::Result<Vec<u8>> {
            Err(anyhow::anyhow!("{} not exist", key))
        });
        let err = tokio_test::block_on(loader.load("unknown")).unwrap_err();
        assert_eq!(err.to_string(), "unknown not exist");
    }
}
