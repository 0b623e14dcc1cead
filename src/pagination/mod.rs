mod config;
mod page;
mod urls;

pub use config::PageRequest;
pub use page::{Page, paginate, total_pages};
pub use urls::build_query_url;
