use anyhow::Result;

/// The session and the reminder timer share one thread, neither of them does heavy work.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
