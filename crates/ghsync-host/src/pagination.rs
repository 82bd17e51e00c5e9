use serde::de::DeserializeOwned;

use ghsync_core::error::GhSyncError;

use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Cursor over a `Link`-paginated listing.
///
/// Each call to [`PageCursor::next_page`] fetches one page and remembers the
/// `rel="next"` link it carried. The cursor is exhausted once a page arrives
/// without one.
pub struct PageCursor {
    next: Option<String>,
    headers: Vec<(String, String)>,
    pages_fetched: u32,
}

impl PageCursor {
    pub fn new(first_url: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        Self {
            next: Some(first_url.into()),
            headers,
            pages_fetched: 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Fetch the next page. `Ok(None)` once exhausted.
    ///
    /// A non-2xx page is handed to `on_error` to build the error returned.
    pub async fn next_page<T, F>(
        &mut self,
        transport: &dyn Transport,
        on_error: F,
    ) -> Result<Option<Vec<T>>, GhSyncError>
    where
        T: DeserializeOwned,
        F: FnOnce(&str, &ApiResponse) -> GhSyncError,
    {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        let mut request = ApiRequest::get(url.clone());
        for (name, value) in &self.headers {
            request = request.header(name, value.clone());
        }

        tracing::debug!("GET {url} (page {})", self.pages_fetched + 1);
        let resp = transport.send(request).await?;
        if !resp.is_success() {
            return Err(on_error(&url, &resp));
        }

        self.next = resp.header("link").and_then(next_link);
        self.pages_fetched += 1;
        Ok(Some(resp.parse()?))
    }
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
