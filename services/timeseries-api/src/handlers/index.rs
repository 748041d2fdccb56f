//! Index page handler.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET / - Upload form, coverage map frame and charts
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_wires_endpoints() {
        let Html(page) = index_handler().await;
        assert!(page.contains("/upload"));
        assert!(page.contains("/get_timeseries"));
        assert!(page.contains("/download_timeseries_csv"));
        assert!(page.contains("handleGridClick"));
    }
}
