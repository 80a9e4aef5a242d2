// doc constants
pub const DOC_REVISION: &str = "_revision";
pub const DOC_MODIFIED: &str = "_modified";
pub const DOC_SOURCE: &str = "_source";
pub const DOC_ID: &str = "_id";
pub const RESERVED_FIELDS: [&str; 4] = [DOC_ID, DOC_REVISION, DOC_MODIFIED, DOC_SOURCE];

// index constants
pub const UNIQUE_INDEX: &str = "unique";
pub const NON_UNIQUE_INDEX: &str = "non-unique";
pub const FULL_TEXT_INDEX: &str = "full-text";

pub const NAME_SEPARATOR: &str = "|";

// planner constants
pub const DEFAULT_PLAN_CACHE_SIZE: usize = 100;

pub const NO2: &str = "NO\u{2082}";
