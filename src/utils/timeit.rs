use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

/// 計時並記錄一段工作，失敗時連同錯誤一併記錄
pub fn timeit<T, E: Display>(name: &str, work: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let start = Instant::now();
    let result = work();
    report(name, start, result.as_ref().err());
    result
}

pub async fn timeit_async<T, E: Display, F>(name: &str, work: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let result = work.await;
    report(name, start, result.as_ref().err());
    result
}

fn report<E: Display>(name: &str, start: Instant, error: Option<&E>) {
    match error {
        Some(err) => tracing::warn!("⏱️ {} <{:?}> with error {}", name, start.elapsed(), err),
        None => tracing::info!("⏱️ {} <{:?}>", name, start.elapsed()),
    }
}
