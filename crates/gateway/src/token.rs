use async_trait::async_trait;

/// Supplies the identity token issued by the external sign-in provider.
///
/// Called before every request so a refreshed session is picked up.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn id_token(&self) -> Option<String>;
}

/// A token fixed at construction, e.g. from the environment or a CLI flag.
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.trim().is_empty()))
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.0.is_some() { "set" } else { "unset" };
        write!(f, "StaticToken({state})")
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn id_token(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_token_counts_as_missing() {
        assert_eq!(StaticToken::new(Some("  ".into())).id_token().await, None);
        assert_eq!(
            StaticToken::new(Some("abc".into())).id_token().await.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn debug_hides_the_token() {
        assert_eq!(
            format!("{:?}", StaticToken::new(Some("secret".into()))),
            "StaticToken(set)"
        );
    }
}
