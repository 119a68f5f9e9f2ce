use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::client::{PredictionError, PredictionService};
use super::domain::HealthStatus;
use super::interpret::{interpret, RenderModel};
use super::profile::EmployeeProfile;
use super::render::{RenderSession, UiSurface};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("a prediction is already in flight")]
    InFlight,
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error("failed to render result: {0}")]
    Render(#[from] std::io::Error),
}

/// The submit control: disabled while a prediction is outstanding.
#[derive(Debug, Default)]
pub struct SubmitControl {
    busy: AtomicBool,
}

impl SubmitControl {
    pub fn is_enabled(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }

    pub fn try_acquire(&self) -> Option<SubmitPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitPermit { control: self })
    }
}

/// Re-enables the submit control when dropped, whatever the outcome.
pub struct SubmitPermit<'a> {
    control: &'a SubmitControl,
}

impl Drop for SubmitPermit<'_> {
    fn drop(&mut self) {
        self.control.busy.store(false, Ordering::Release);
    }
}

/// Form submission flow: predict, interpret, render.
///
/// A failed submission raises an alert and leaves the last result panel as it
/// was. Loading and submit affordances are reset either way.
pub struct Dashboard<P, S: UiSurface> {
    predictor: Arc<P>,
    session: Mutex<RenderSession<S>>,
    submit: SubmitControl,
}

impl<P, S> Dashboard<P, S>
where
    P: PredictionService,
    S: UiSurface,
{
    pub fn new(predictor: Arc<P>, session: RenderSession<S>) -> Self {
        Self {
            predictor,
            session: Mutex::new(session),
            submit: SubmitControl::default(),
        }
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit.is_enabled()
    }

    pub async fn submit(&self, profile: EmployeeProfile) -> Result<RenderModel, SubmitError> {
        let _permit = self.submit.try_acquire().ok_or_else(|| {
            debug!("submission ignored while a prediction is in flight");
            SubmitError::InFlight
        })?;

        let unknown = profile.unknown_fields();
        if !unknown.is_empty() {
            warn!(fields = ?unknown, "profile contains fields outside the service schema");
        }

        {
            let mut session = self.session.lock().await;
            if let Err(err) = session.begin_submission() {
                if let Err(reset) = session.end_submission() {
                    warn!(error = %reset, "failed to reset submit controls");
                }
                return Err(SubmitError::from(err));
            }
        }
        let outcome = self.predictor.predict(&profile).await;

        let mut session = self.session.lock().await;
        let rendered = match outcome {
            Ok(result) => {
                if !result.risk_level.is_recognized() {
                    warn!(
                        tier = %result.risk_level,
                        "unrecognized risk tier, styling as High"
                    );
                }
                info!(
                    tier = %result.risk_level,
                    probability = result.attrition_probability,
                    will_attrite = result.will_attrite,
                    "prediction received"
                );
                let model = interpret(&result, &profile);
                session
                    .present(&model)
                    .await
                    .map(|()| model)
                    .map_err(SubmitError::from)
            }
            Err(err) => {
                warn!(error = %err, "prediction failed");
                match session.fail(&err) {
                    Ok(()) => Err(SubmitError::from(err)),
                    Err(io) => Err(SubmitError::from(io)),
                }
            }
        };
        let reset = session.end_submission();

        let model = rendered?;
        reset?;
        Ok(model)
    }

    pub async fn show_health(&self, status: &HealthStatus) -> Result<(), SubmitError> {
        self.session.lock().await.show_health(status)?;
        Ok(())
    }

    pub async fn live_charts(&self) -> usize {
        self.session.lock().await.live_charts()
    }

    pub fn into_session(self) -> RenderSession<S> {
        self.session.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::attrition::domain::{PredictionResult, RiskTier};
    use crate::workflows::attrition::interpret::{
        GaugeSpec, ProgressBar, RecommendedAction, RiskBadge, SatisfactionVector, SignalChip,
        Verdict,
    };
    use crate::workflows::attrition::render::{ChartId, MemorySurface, SurfaceEvent};
    use std::future::Future;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct GatedPredictor {
        release: Notify,
        calls: AtomicUsize,
        responses: StdMutex<Vec<Result<PredictionResult, PredictionError>>>,
    }

    impl GatedPredictor {
        fn new(responses: Vec<Result<PredictionResult, PredictionError>>) -> Arc<Self> {
            Arc::new(Self {
                release: Notify::new(),
                calls: AtomicUsize::new(0),
                responses: StdMutex::new(responses),
            })
        }
    }

    impl PredictionService for GatedPredictor {
        fn predict(
            &self,
            _profile: &EmployeeProfile,
        ) -> impl Future<Output = Result<PredictionResult, PredictionError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move {
                self.release.notified().await;
                self.responses.lock().expect("responses mutex").remove(0)
            }
        }
    }

    fn prediction(tier: &str, probability: f64) -> PredictionResult {
        PredictionResult {
            will_attrite: probability >= 0.5,
            attrition_probability: probability,
            risk_level: RiskTier::from(tier),
            recommended_actions: vec!["Check manager relationship health".to_string()],
            status: Some("success".to_string()),
        }
    }

    fn dashboard(predictor: Arc<GatedPredictor>) -> Dashboard<GatedPredictor, MemorySurface> {
        let session = RenderSession::new(MemorySurface::default()).with_bar_delay(Duration::ZERO);
        Dashboard::new(predictor, session)
    }

    #[tokio::test]
    async fn resubmission_is_blocked_until_prediction_resolves() {
        let predictor = GatedPredictor::new(vec![
            Ok(prediction("High", 0.81)),
            Ok(prediction("Low", 0.12)),
        ]);
        let dashboard = dashboard(predictor.clone());

        let first = dashboard.submit(EmployeeProfile::sample());
        let second = async {
            tokio::task::yield_now().await;
            assert!(!dashboard.submit_enabled());
            let outcome = dashboard.submit(EmployeeProfile::sample()).await;
            predictor.release.notify_one();
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.expect("first submission renders").probability_percent, 81);
        assert!(matches!(second, Err(SubmitError::InFlight)));
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 1);
        assert!(dashboard.submit_enabled());

        predictor.release.notify_one();
        let third = dashboard
            .submit(EmployeeProfile::sample())
            .await
            .expect("submission after completion renders");
        assert_eq!(third.probability_percent, 12);
        assert_eq!(dashboard.live_charts().await, 2);
    }

    #[tokio::test]
    async fn service_failure_alerts_and_restores_controls() {
        let predictor = GatedPredictor::new(vec![
            Ok(prediction("Medium", 0.44)),
            Err(PredictionError::Service {
                status: 503,
                message: "model not loaded".to_string(),
            }),
        ]);
        let dashboard = dashboard(predictor.clone());

        predictor.release.notify_one();
        dashboard
            .submit(EmployeeProfile::sample())
            .await
            .expect("first submission renders");

        predictor.release.notify_one();
        let err = dashboard
            .submit(EmployeeProfile::sample())
            .await
            .expect_err("second submission fails");
        assert_eq!(err.to_string(), "model not loaded");

        assert!(dashboard.submit_enabled());
        let session = dashboard.into_session();
        let surface = session.surface();
        assert!(surface.submit_enabled());
        assert!(!surface.loading());
        assert_eq!(surface.alerts().len(), 1);
        assert!(surface.alerts()[0].starts_with("Error: model not loaded"));

        let risk_panels = surface
            .events()
            .iter()
            .filter(|event| matches!(event, SurfaceEvent::Risk { .. }))
            .count();
        assert_eq!(risk_panels, 1, "failed submission must not redraw the panel");
        assert_eq!(session.live_charts(), 2);
    }

    /// Recording surface whose submit control refuses to be disabled.
    #[derive(Default)]
    struct StuckSubmitSurface {
        inner: MemorySurface,
    }

    impl UiSurface for StuckSubmitSurface {
        type Chart = ChartId;

        fn show_health(&mut self, status: &HealthStatus) -> std::io::Result<()> {
            self.inner.show_health(status)
        }
        fn set_loading(&mut self, visible: bool) -> std::io::Result<()> {
            self.inner.set_loading(visible)
        }
        fn set_submit_enabled(&mut self, enabled: bool) -> std::io::Result<()> {
            if !enabled {
                return Err(std::io::Error::other("submit button detached"));
            }
            self.inner.set_submit_enabled(enabled)
        }
        fn show_risk(&mut self, badge: &RiskBadge, percent: i64) -> std::io::Result<()> {
            self.inner.show_risk(badge, percent)
        }
        fn fill_bar(&mut self, bar: &ProgressBar) -> std::io::Result<()> {
            self.inner.fill_bar(bar)
        }
        fn draw_gauge(&mut self, gauge: &GaugeSpec) -> std::io::Result<ChartId> {
            self.inner.draw_gauge(gauge)
        }
        fn draw_radar(&mut self, satisfaction: &SatisfactionVector) -> std::io::Result<ChartId> {
            self.inner.draw_radar(satisfaction)
        }
        fn destroy_chart(&mut self, chart: ChartId) -> std::io::Result<()> {
            self.inner.destroy_chart(chart)
        }
        fn show_verdict(&mut self, verdict: &Verdict) -> std::io::Result<()> {
            self.inner.show_verdict(verdict)
        }
        fn begin_actions(&mut self, count: usize) -> std::io::Result<()> {
            self.inner.begin_actions(count)
        }
        fn reveal_action(&mut self, action: &RecommendedAction) -> std::io::Result<()> {
            self.inner.reveal_action(action)
        }
        fn show_signals(&mut self, signals: &[SignalChip]) -> std::io::Result<()> {
            self.inner.show_signals(signals)
        }
        fn alert(&mut self, message: &str) -> std::io::Result<()> {
            self.inner.alert(message)
        }
    }

    #[tokio::test]
    async fn surface_failure_on_begin_still_clears_loading() {
        let predictor = GatedPredictor::new(vec![Ok(prediction("Low", 0.1))]);
        let session =
            RenderSession::new(StuckSubmitSurface::default()).with_bar_delay(Duration::ZERO);
        let dashboard = Dashboard::new(predictor.clone(), session);

        let err = dashboard
            .submit(EmployeeProfile::sample())
            .await
            .expect_err("surface failure is reported");
        assert!(matches!(err, SubmitError::Render(_)));

        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
        assert!(dashboard.submit_enabled());
        let surface = dashboard.into_session().into_surface().inner;
        assert!(!surface.loading());
        assert!(surface.submit_enabled());
    }

    #[tokio::test]
    async fn health_status_reaches_the_surface() {
        let dashboard = dashboard(GatedPredictor::new(Vec::new()));
        dashboard
            .show_health(&HealthStatus::offline())
            .await
            .expect("health shown");
        dashboard
            .show_health(&HealthStatus::online())
            .await
            .expect("health shown");

        let session = dashboard.into_session();
        assert_eq!(
            session.surface().events(),
            [
                SurfaceEvent::Health { online: false },
                SurfaceEvent::Health { online: true }
            ]
        );
    }

    #[tokio::test]
    async fn unrecognized_tier_still_renders() {
        let predictor = GatedPredictor::new(vec![Ok(prediction("Critical", 0.97))]);
        let dashboard = dashboard(predictor.clone());

        predictor.release.notify_one();
        let model = dashboard
            .submit(EmployeeProfile::high_risk_demo())
            .await
            .expect("renders with fallback styling");
        assert_eq!(model.risk.label, "Critical Risk");
        assert_eq!(model.risk.glyph, "⚡");
    }
}
