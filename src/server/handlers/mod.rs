//! HTTP request handlers for the web server.

mod extract;
mod pages;

// Re-export handlers for use by the router
pub use extract::{
    api_download_results, api_extraction_records, api_extraction_status, api_start_extraction,
};
pub use pages::upload_page;
