/// Read-through caching for an async computation returning `AppResult<T>`.
///
/// Looks `$key` up in `$cache` first. On a miss the `$block` future is awaited,
/// its value is queued for storage with `$ttl` seconds to live, and returned.
/// Redis failures on the read path are logged and treated as a miss, so an
/// unavailable cache only costs an upstream call. Errors from `$block` are
/// propagated with `?`.
///
/// With `keep_if = pred`, a fresh value is only stored when `pred(&value)`
/// holds. It is returned either way.
///
/// ```rust,ignore
/// let page: OmdbSearchResponse = cached!(self.cache, key, SEARCH_TTL, async {
///     self.fetch_search_page(title, page).await
/// }, keep_if = OmdbSearchResponse::is_success)?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {
        $crate::cached!($cache, $key, $ttl, $block, keep_if = |_| true)
    };
    ($cache:expr, $key:expr, $ttl:expr, $block:expr, keep_if = $keep:expr) => {{
        let cache_key = $key;
        match $cache.get_from_cache(&cache_key).await {
            Ok(Some(hit)) => Ok(hit),
            miss_or_error => {
                if let Err(e) = miss_or_error {
                    tracing::warn!(error = %e, key = %cache_key, "Cache read failed");
                }
                let value = $block.await?;
                if ($keep)(&value) {
                    $cache.set_in_background(&cache_key, &value, $ttl);
                } else {
                    tracing::debug!(key = %cache_key, "Not caching unsuccessful response");
                }
                Ok(value)
            }
        }
    }};
}
