pub mod list_renderer;
pub mod post_renderer;

use chrono::{Datelike, Local};

use crate::post::DEFAULT_AUTHOR;

/// Organization details printed in page headers and footers.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    pub organization: String,
    pub organization_full: String,
    pub copyright_year: i32,
}

impl Default for SiteInfo {
    fn default() -> Self {
        SiteInfo {
            organization: DEFAULT_AUTHOR.to_string(),
            organization_full: "Associazione Rete di Cittadinanza Solidale".to_string(),
            copyright_year: Local::now().year(),
        }
    }
}
