pub mod findbook;
pub mod parser;

pub use findbook::{FindbookConfig, FindbookFetcher};
pub use parser::{ResultsPage, parse_results_page};
