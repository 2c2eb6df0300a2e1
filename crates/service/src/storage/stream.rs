//! Helpers for building the lazy `find_all` streams.

use std::future::Future;

use futures_util::stream::{self, BoxStream, StreamExt};

use crate::errors::ServiceError;

/// Turn a future that loads a whole batch into a lazy item stream.
///
/// The future is not started until the stream is first polled; a load
/// error is yielded as the single item.
pub fn lazy_batch<T, Fut>(load: Fut) -> BoxStream<'static, Result<T, ServiceError>>
where
    T: Send + 'static,
    Fut: Future<Output = Result<Vec<T>, ServiceError>> + Send + 'static,
{
    stream::once(load)
        .flat_map(|res| {
            let items: Vec<Result<T, ServiceError>> = match res {
                Ok(items) => items.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            stream::iter(items)
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn nothing_loads_until_polled() {
        let started = Arc::new(AtomicBool::new(false));
        let flag = started.clone();
        let s = lazy_batch(async move {
            flag.store(true, Ordering::SeqCst);
            Ok(vec![1, 2, 3])
        });
        assert!(!started.load(Ordering::SeqCst));
        let all: Vec<i32> = s.try_collect().await.unwrap();
        assert!(started.load(Ordering::SeqCst));
        assert_eq!(all, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn load_error_is_yielded() {
        let s = lazy_batch::<i32, _>(async { Err(ServiceError::Db("down".into())) });
        let res: Result<Vec<i32>, _> = s.try_collect().await;
        assert!(matches!(res, Err(ServiceError::Db(_))));
    }
}
