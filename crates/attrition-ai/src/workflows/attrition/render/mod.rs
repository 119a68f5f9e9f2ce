//! Presentation layer: a capability trait for the UI substrate plus the
//! session that drives it and owns the live chart handles.

mod memory;
mod terminal;

pub use memory::{MemorySurface, SurfaceEvent};
pub use terminal::TerminalSurface;

use std::io;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::client::PredictionError;
use super::domain::HealthStatus;
use super::interpret::{
    GaugeSpec, ProgressBar, RecommendedAction, RenderModel, RiskBadge, SatisfactionVector,
    SignalChip, Verdict,
};

/// Delay before the probability bar fills, so the transition is visible.
pub const BAR_TRANSITION_DELAY: Duration = Duration::from_millis(100);

/// Identifier handed out by surfaces that track charts by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartId(pub u64);

/// Widgets the result panel is made of.
pub trait UiSurface: Send {
    /// Handle for a drawn chart; given back to `destroy_chart` before its slot is redrawn.
    type Chart: Send;

    fn show_health(&mut self, status: &HealthStatus) -> io::Result<()>;
    fn set_loading(&mut self, visible: bool) -> io::Result<()>;
    fn set_submit_enabled(&mut self, enabled: bool) -> io::Result<()>;
    fn show_risk(&mut self, badge: &RiskBadge, probability_percent: i64) -> io::Result<()>;
    fn fill_bar(&mut self, bar: &ProgressBar) -> io::Result<()>;
    fn draw_gauge(&mut self, gauge: &GaugeSpec) -> io::Result<Self::Chart>;
    fn draw_radar(&mut self, satisfaction: &SatisfactionVector) -> io::Result<Self::Chart>;
    fn destroy_chart(&mut self, chart: Self::Chart) -> io::Result<()>;
    fn show_verdict(&mut self, verdict: &Verdict) -> io::Result<()>;
    /// Clears the action list ahead of `count` staggered reveals.
    fn begin_actions(&mut self, count: usize) -> io::Result<()>;
    fn reveal_action(&mut self, action: &RecommendedAction) -> io::Result<()>;
    fn show_signals(&mut self, signals: &[SignalChip]) -> io::Result<()>;
    fn alert(&mut self, message: &str) -> io::Result<()>;
}

/// Drives a surface through submissions. At most one gauge and one radar
/// chart are alive at a time.
pub struct RenderSession<S: UiSurface> {
    surface: S,
    gauge: Option<S::Chart>,
    radar: Option<S::Chart>,
    bar_delay: Duration,
    stagger_actions: bool,
}

impl<S: UiSurface> RenderSession<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            gauge: None,
            radar: None,
            bar_delay: BAR_TRANSITION_DELAY,
            stagger_actions: true,
        }
    }

    pub fn with_bar_delay(mut self, delay: Duration) -> Self {
        self.bar_delay = delay;
        self
    }

    /// When off, every action is revealed at once regardless of its delay.
    pub fn with_action_stagger(mut self, enabled: bool) -> Self {
        self.stagger_actions = enabled;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn live_charts(&self) -> usize {
        usize::from(self.gauge.is_some()) + usize::from(self.radar.is_some())
    }

    pub fn begin_submission(&mut self) -> io::Result<()> {
        self.surface.set_loading(true)?;
        self.surface.set_submit_enabled(false)
    }

    /// Attempts both resets even if the first one fails.
    pub fn end_submission(&mut self) -> io::Result<()> {
        let loading = self.surface.set_loading(false);
        let submit = self.surface.set_submit_enabled(true);
        loading.and(submit)
    }

    pub fn show_health(&mut self, status: &HealthStatus) -> io::Result<()> {
        self.surface.show_health(status)
    }

    pub async fn present(&mut self, model: &RenderModel) -> io::Result<()> {
        self.surface
            .show_risk(&model.risk, model.probability_percent)?;

        if let Some(previous) = self.gauge.take() {
            debug!("tearing down previous gauge chart");
            self.surface.destroy_chart(previous)?;
        }
        self.gauge = Some(self.surface.draw_gauge(&model.gauge)?);

        self.surface.show_verdict(&model.verdict)?;
        self.reveal_actions(&model.actions).await?;

        if let Some(previous) = self.radar.take() {
            debug!("tearing down previous radar chart");
            self.surface.destroy_chart(previous)?;
        }
        self.radar = Some(self.surface.draw_radar(&model.satisfaction)?);

        self.surface.show_signals(&model.signals)?;

        if !self.bar_delay.is_zero() {
            tokio::time::sleep(self.bar_delay).await;
        }
        self.surface.fill_bar(&model.bar)
    }

    /// Each action appears `reveal_delay` after the list was started.
    async fn reveal_actions(&mut self, actions: &[RecommendedAction]) -> io::Result<()> {
        self.surface.begin_actions(actions.len())?;
        let started = Instant::now();
        for action in actions {
            if self.stagger_actions && !action.reveal_delay.is_zero() {
                tokio::time::sleep_until(started + action.reveal_delay).await;
            }
            self.surface.reveal_action(action)?;
        }
        Ok(())
    }

    /// Reports a failed submission; the previous result stays on screen.
    pub fn fail(&mut self, err: &PredictionError) -> io::Result<()> {
        self.surface.alert(&err.alert_text())
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
