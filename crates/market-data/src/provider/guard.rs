//! Panic containment around source calls.
//!
//! A misbehaving [`TokenDataSource`](super::TokenDataSource) must not take
//! the aggregation down with it. Calls are polled under `catch_unwind` and a
//! panic is reported as its message.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

/// Await `future`, converting a panic into `Err(message)`.
pub async fn catch_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "source panicked".to_string()
    }
}
