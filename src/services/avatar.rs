//! Generated-initials avatar fallback.

/// Size used for profile images returned by sign-in.
pub const PROFILE_AVATAR_SIZE: u32 = 150;

/// Size used by the header avatar when the profile image fails to load.
pub const HEADER_AVATAR_SIZE: u32 = 40;

/// Deterministic initials avatar URL for `username`.
pub fn generate_avatar(username: &str, size: u32) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=8b5cf6&color=fff&size={}",
        urlencoding::encode(username),
        size
    )
}
