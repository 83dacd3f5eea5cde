use serde::{Deserialize, Serialize};
use strum_macros::Display;

pub const CORE_TABLES: [&str; 12] = [
    "wp_commentmeta",
    "wp_comments",
    "wp_links",
    "wp_options",
    "wp_postmeta",
    "wp_posts",
    "wp_terms",
    "wp_termmeta",
    "wp_term_relationships",
    "wp_term_taxonomy",
    "wp_usermeta",
    "wp_users",
];

pub const MULTISITE_TABLES: [&str; 7] = [
    "wp_blogs",
    "wp_blogmeta",
    "wp_blog_versions",
    "wp_registration_log",
    "wp_signups",
    "wp_site",
    "wp_sitemeta",
];

/// Fixed table lists a dump is expected to drop and create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReferenceSet {
    Core,
    Multisite,
}

impl ReferenceSet {
    pub fn tables(&self) -> &'static [&'static str] {
        match self {
            ReferenceSet::Core => &CORE_TABLES,
            ReferenceSet::Multisite => &MULTISITE_TABLES,
        }
    }

    /// Reference tables absent from `present`, in reference order.
    pub fn missing(&self, present: &[&str]) -> Vec<&'static str> {
        self.tables()
            .iter()
            .copied()
            .filter(|table| !present.contains(table))
            .collect()
    }
}
