/// Read-through caching around an async computation.
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, queues the result for caching with `$ttl` seconds and returns it.
/// Errors from `$block` propagate and are never cached.
///
/// # Example
/// ```rust,ignore
/// let genres: Vec<Genre> = cached!(self.cache, CacheKey::GenreList, GENRE_CACHE_TTL, async move {
///     self.fetch_genres().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            Ok(None) => match $block.await {
                Ok(value) => {
                    $cache.set_in_background(&key, &value, $ttl);
                    Ok(value)
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    }};
}
