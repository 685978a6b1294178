use serde::{Deserialize, Serialize};

/// Avatar path used when the server sends none
pub const DEFAULT_AVATAR: &str = "/default-image.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub avatar: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl ProfileResponse {
    pub(crate) fn to_profile(&self) -> UserProfile {
        let avatar = self
            .avatar
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_AVATAR)
            .to_string();

        UserProfile {
            username: self.username.clone(),
            email: self.email.clone(),
            avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_avatar_uses_default() {
        let resp: ProfileResponse =
            serde_json::from_str(r#"{"username": "bob", "email": "b@x.com"}"#).unwrap();
        let profile = resp.to_profile();
        assert_eq!(profile.username, "bob");
        assert_eq!(profile.email, "b@x.com");
        assert_eq!(profile.avatar, DEFAULT_AVATAR);
    }

    #[test]
    fn test_empty_or_null_avatar_uses_default() {
        for json in [
            r#"{"username": "bob", "email": "b@x.com", "avatar": ""}"#,
            r#"{"username": "bob", "email": "b@x.com", "avatar": null}"#,
        ] {
            let resp: ProfileResponse = serde_json::from_str(json).unwrap();
            assert_eq!(resp.to_profile().avatar, "/default-image.png");
        }
    }

    #[test]
    fn test_avatar_kept_when_present() {
        let resp: ProfileResponse = serde_json::from_str(
            r#"{"username": "bob", "email": "b@x.com", "avatar": "/u/bob.png"}"#,
        )
        .unwrap();
        assert_eq!(resp.to_profile().avatar, "/u/bob.png");
    }
}
