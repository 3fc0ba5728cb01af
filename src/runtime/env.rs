use chrono::{DateTime, Utc};
use futures::Future;
use http::Request;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

pub use conditional_types::{ConditionalSend, EnvFuture, EnvFutureExt};

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum EnvError {
    /// Error returned on [`Env::fetch`]
    #[error("Failed to fetch: {0}")]
    Fetch(String),
    /// Serde error when (de)serializing
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Storage is not available")]
    StorageUnavailable,
    #[error("Storage read error: {0}")]
    StorageReadError(String),
    #[error("Storage write error: {0}")]
    StorageWriteError(String),
    #[error("Other error: {0}")]
    Other(String),
}

impl EnvError {
    pub fn message(&self) -> String {
        self.to_string()
    }
    pub fn code(&self) -> u32 {
        match &self {
            EnvError::Fetch(_) => 1,
            EnvError::Serde(_) => 3,
            EnvError::StorageUnavailable => 4,
            EnvError::StorageReadError(_) => 7,
            EnvError::StorageWriteError(_) => 8,
            EnvError::Other(_) => 1001,
        }
    }
}

impl Serialize for EnvError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("EnvError", 2)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

impl From<serde_json::Error> for EnvError {
    fn from(error: serde_json::Error) -> Self {
        EnvError::Serde(error.to_string())
    }
}

#[cfg(not(feature = "env-future-send"))]
/// Only for wasm or when `env-future-send` is not enabled
mod conditional_types {
    use futures::{future::LocalBoxFuture, Future, FutureExt};

    pub type EnvFuture<'a, T> = LocalBoxFuture<'a, T>;

    pub trait ConditionalSend {}

    impl<T> ConditionalSend for T {}

    pub trait EnvFutureExt: Future {
        fn boxed_env<'a>(self) -> EnvFuture<'a, Self::Output>
        where
            Self: Sized + 'a,
        {
            self.boxed_local()
        }
    }
}

#[cfg(feature = "env-future-send")]
/// Enabled with the feature `env-future-send` but it requires a non-wasm target!
mod conditional_types {
    use futures::{future::BoxFuture, Future, FutureExt};

    pub type EnvFuture<'a, T> = BoxFuture<'a, T>;

    pub trait ConditionalSend: Send {}

    impl<T> ConditionalSend for T where T: Send {}

    pub trait EnvFutureExt: Future {
        fn boxed_env<'a>(self) -> EnvFuture<'a, Self::Output>
        where
            Self: Sized + Send + 'a,
        {
            self.boxed()
        }
    }
}

impl<T: ?Sized> EnvFutureExt for T where T: Future {}

pub type TryEnvFuture<T> = EnvFuture<'static, Result<T, EnvError>>;

/// Capabilities the host provides to the core.
///
/// `fetch` resolves with the deserialized JSON body and fails with
/// [`EnvError::Fetch`] on transport errors and non-2xx statuses.
/// `set_storage` with `None` removes the key.
pub trait Env {
    fn fetch<
        IN: Serialize + ConditionalSend + 'static,
        OUT: for<'de> Deserialize<'de> + ConditionalSend + 'static,
    >(
        request: Request<IN>,
    ) -> TryEnvFuture<OUT>;
    fn get_storage<T: for<'de> Deserialize<'de> + ConditionalSend + 'static>(
        key: &str,
    ) -> TryEnvFuture<Option<T>>;
    fn set_storage<T: Serialize>(key: &str, value: Option<&T>) -> TryEnvFuture<()>;
    fn exec_concurrent<F: Future<Output = ()> + ConditionalSend + 'static>(future: F);
    fn exec_sequential<F: Future<Output = ()> + ConditionalSend + 'static>(future: F);
    fn now() -> DateTime<Utc>;
}
