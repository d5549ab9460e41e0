//! Activity System
//!
//! The scheduling core: the registry maps names to handlers, the
//! manager decides what runs next and tracks cooldowns and energy
//! cost, and the handlers implement the five scripted activities.

pub mod handlers;
pub mod manager;
pub mod registry;

pub use manager::{ActivityManager, ActivityStatus, FALLBACK_ACTIVITY, NAP_ENERGY_REFUND};
pub use registry::ActivityRegistry;

#[cfg(test)]
pub(crate) mod testutil {
    //! Shared fakes for activity tests: inert collaborators and
    //! canned handlers.

    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::state::BeingState;
    use crate::types::{
        ActivityContext, ActivityHandler, ActivityResult, CharacterConfig, ImageClient,
        ImageOutcome, PostOutcome, PostingClient, Reflection, ReflectionSource,
    };

    pub struct StaticReflection;

    #[async_trait]
    impl ReflectionSource for StaticReflection {
        async fn reflect(&self, topic: Option<&str>) -> anyhow::Result<Reflection> {
            Ok(Reflection {
                thought: "a canned thought".to_string(),
                topic: topic.unwrap_or("existence").to_string(),
            })
        }

        async fn reflect_on_prompt(&self, _prompt: &str) -> anyhow::Result<String> {
            Ok("a canned reflection".to_string())
        }

        async fn compose_tweet(&self, _recent_thoughts: &[String]) -> anyhow::Result<String> {
            Ok("a canned tweet".to_string())
        }
    }

    pub struct StaticPosting;

    #[async_trait]
    impl PostingClient for StaticPosting {
        async fn post_tweet(
            &self,
            _text: &str,
            _media_urls: &[String],
        ) -> anyhow::Result<PostOutcome> {
            Ok(PostOutcome {
                tweet_id: Some("1".to_string()),
                tweet_link: Some("https://x.com/being/status/1".to_string()),
            })
        }
    }

    pub struct FailingPosting;

    #[async_trait]
    impl PostingClient for FailingPosting {
        async fn post_tweet(
            &self,
            _text: &str,
            _media_urls: &[String],
        ) -> anyhow::Result<PostOutcome> {
            anyhow::bail!("relay unreachable")
        }
    }

    pub struct NoImages;

    #[async_trait]
    impl ImageClient for NoImages {
        async fn generate_image(
            &self,
            _prompt: &str,
            _size: (u32, u32),
        ) -> anyhow::Result<ImageOutcome> {
            anyhow::bail!("image generation disabled in tests")
        }
    }

    pub fn test_context() -> ActivityContext {
        ActivityContext {
            character: CharacterConfig::default(),
            reflection: Arc::new(StaticReflection),
            posting: Arc::new(StaticPosting),
            images: Arc::new(NoImages),
        }
    }

    /// Handler that succeeds with a fixed message.
    pub struct RecordingHandler {
        message: String,
    }

    impl RecordingHandler {
        pub fn new(message: &str) -> Self {
            Self {
                message: message.to_string(),
            }
        }
    }

    #[async_trait]
    impl ActivityHandler for RecordingHandler {
        async fn execute(
            &self,
            _state: &mut BeingState,
            _ctx: &ActivityContext,
        ) -> anyhow::Result<ActivityResult> {
            Ok(ActivityResult::ok(self.message.clone()))
        }
    }

    /// Handler that always returns an error.
    pub struct FailingHandler;

    #[async_trait]
    impl ActivityHandler for FailingHandler {
        async fn execute(
            &self,
            _state: &mut BeingState,
            _ctx: &ActivityContext,
        ) -> anyhow::Result<ActivityResult> {
            anyhow::bail!("handler exploded")
        }
    }
}
