use url::form_urlencoded;

use crate::catalog::{chapter_or_default, ChapterConfig};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchParams {
    pub setup: bool,
    pub token: Option<String>,
    pub image: Option<String>,
    pub chapter: Option<String>,
}

impl LaunchParams {
    pub fn from_query(search: &str) -> Self {
        let raw = search.trim().trim_start_matches('?');
        let mut params = LaunchParams::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "setup" => params.setup = value == "1",
                "token" | "pass" => {
                    if !value.is_empty() && params.token.is_none() {
                        params.token = Some(value.to_string());
                    }
                }
                "img" | "image" => {
                    if !value.is_empty() && params.image.is_none() {
                        params.image = Some(value.to_string());
                    }
                }
                "chapter" => {
                    if !value.is_empty() {
                        params.chapter = Some(value.to_string());
                    }
                }
                _ => {}
            }
        }
        params
    }

    pub fn chapter(&self) -> &'static ChapterConfig {
        chapter_or_default(self.chapter.as_deref())
    }

    pub fn token_or<'a>(&'a self, default_token: &'a str) -> &'a str {
        self.token.as_deref().unwrap_or(default_token)
    }

    pub fn image_or<'a>(&'a self, default_src: &'a str) -> &'a str {
        self.image.as_deref().unwrap_or(default_src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_setup_token_and_image() {
        let params = LaunchParams::from_query("?setup=1&token=%E5%A4%A9+moon&img=art%2Fa.png");
        assert!(params.setup);
        assert_eq!(params.token.as_deref(), Some("天 moon"));
        assert_eq!(params.image.as_deref(), Some("art/a.png"));
    }

    #[test]
    fn setup_requires_exact_flag() {
        assert!(!LaunchParams::from_query("setup=true").setup);
        assert!(!LaunchParams::from_query("").setup);
    }

    #[test]
    fn blank_values_are_absent() {
        let params = LaunchParams::from_query("?token=%20%20&pass=sun&image=");
        assert_eq!(params.token.as_deref(), Some("sun"));
        assert_eq!(params.image, None);
        assert_eq!(params.token_or("fallback"), "sun");
        assert_eq!(params.image_or("image.png"), "image.png");
    }
}
