/// Application name
pub const APP_NAME: &str = "Plaza";

/// Joins the two sorted participant ids of a conversation id
pub const CONVERSATION_ID_SEPARATOR: char = '_';

/// Avatar service used when a user skips the profile photo
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://i.pravatar.cc/150";

/// Number of BLAKE3 output bytes used as the avatar seed
pub const AVATAR_SEED_BYTES: usize = 8;
