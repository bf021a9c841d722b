use crate::config::AnimationSettings;
use async_trait::async_trait;
use std::time::Duration;

/// Gate that runs before a list -> detail navigation. `play` completes when
/// the animation signals it is done.
#[async_trait]
pub trait AnimationGate: Send + Sync {
    async fn play(&self);
}

/// The pokeball animation: a shake, then the top half opens.
#[derive(Debug, Clone)]
pub struct TimedAnimation {
    shake: Duration,
    open: Duration,
}

impl TimedAnimation {
    pub fn new(shake: Duration, open: Duration) -> Self {
        Self { shake, open }
    }

    pub fn from_settings(settings: &AnimationSettings) -> Self {
        Self::new(settings.shake(), settings.open())
    }

    pub fn total(&self) -> Duration {
        self.shake + self.open
    }
}

#[async_trait]
impl AnimationGate for TimedAnimation {
    async fn play(&self) {
        tokio::time::sleep(self.shake).await;
        log::trace!("Pokeball opening");
        tokio::time::sleep(self.open).await;
    }
}

/// Completes immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnimation;

#[async_trait]
impl AnimationGate for NoAnimation {
    async fn play(&self) {}
}
