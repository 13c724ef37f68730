use once_cell::sync::Lazy;
use tokio::runtime::{self, Handle};

use crate::errors::HydrateError;
use crate::node::HydrateNode;

static RUNTIME: Lazy<runtime::Runtime> = Lazy::new(|| {
    runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("cloudsecrets-rt")
        .build()
        .expect("build cloudsecrets runtime")
});

/// Run a future to completion from synchronous code without nesting
/// runtimes.
fn sync_await<F>(fut: F) -> F::Output
where
    F: std::future::Future,
{
    if let Ok(handle) = Handle::try_current() {
        tokio::task::block_in_place(|| handle.block_on(fut))
    } else {
        RUNTIME.block_on(fut)
    }
}

/// Blocking form of [`hydrate`](crate::hydrate) for callers without an
/// async runtime of their own.
pub fn hydrate_blocking<T>(selector: &str, config: &mut T) -> Result<(), HydrateError>
where
    T: HydrateNode,
{
    sync_await(crate::hydrate(selector, config))
}
