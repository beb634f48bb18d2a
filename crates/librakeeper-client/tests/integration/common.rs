use std::time::Duration;

use librakeeper_client::{FindbookConfig, FindbookFetcher};
use librakeeper_core::retry::RetryPolicy;
use wiremock::MockServer;

/// A fetcher pointed at the mock server, with fast retries.
pub fn fetcher_for(server: &MockServer) -> FindbookFetcher {
    fetcher_with(server, |config| config)
}

pub fn fetcher_with(
    server: &MockServer,
    customize: impl FnOnce(FindbookConfig) -> FindbookConfig,
) -> FindbookFetcher {
    let config = FindbookConfig::default()
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(5))
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)));
    FindbookFetcher::with_config(customize(config)).expect("Failed to build fetcher")
}

/// One row on a results page: (title, shop, cover src).
pub struct Row<'a> {
    pub title: &'a str,
    pub shop: &'a str,
    pub cover: &'a str,
}

pub fn row<'a>(title: &'a str, shop: &'a str) -> Row<'a> {
    Row {
        title,
        shop,
        cover: "https://covers.test/book.jpg",
    }
}

/// Render a results page shaped like the aggregator's markup.
pub fn results_page(rows: &[Row<'_>], next_href: Option<&str>) -> String {
    let lines: String = rows
        .iter()
        .map(|r| {
            format!(
                r#"<div class="row results__line">
                     <a class="results__image" href="/go"><img src="{cover}"></a>
                     <div class="results__book-name"><a href="/go">{title}</a></div>
                     <div class="results__authors">Бхаргава А.</div>
                     <div class="results__publishing">Питер, 2024</div>
                     <div class="results__shop-name"><a href="/shop">{shop}</a></div>
                   </div>"#,
                cover = r.cover,
                title = r.title,
                shop = r.shop,
            )
        })
        .collect();

    let pager = next_href
        .map(|href| {
            format!(
                r#"<div class="pagination__pages">
                     <a href="{href}">2</a>
                     <a href="{href}"><i class="icon-angle-right"></i></a>
                   </div>"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"<html><body>
           <section class="container results">{lines}</section>
           {pager}
           </body></html>"#
    )
}
