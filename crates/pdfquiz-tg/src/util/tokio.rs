/// Same as [`tokio::task::spawn_blocking`], but propagates panics in the spawned
/// task to the caller that will await the returned future.
pub(crate) async fn spawn_blocking<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(output) => output,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => panic!("Blocking task finished with an error: {err:#?}"),
    }
}
