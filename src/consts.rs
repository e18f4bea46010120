/// Partition key prefix grouping every notification of one user.
pub const USER_KEY_PREFIX: &str = "USER#";
/// Prefix shared by sort keys and the by-id index keys.
pub const NOTIF_KEY_PREFIX: &str = "NOTIF#";
/// Name of the by-id global secondary index.
pub const GSI1_INDEX_NAME: &str = "GSI1";

pub const DEFAULT_PAGE_LIMIT: i32 = 20;

pub const SMS_MAX_CONTENT_CHARS: usize = 160;
pub const PUSH_TOKEN_MIN_LEN: usize = 10;
pub const PUSH_TOKEN_MAX_LEN: usize = 4096;
