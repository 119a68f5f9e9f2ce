use std::io;

use tokio::time::Instant;

use super::{ChartId, UiSurface};
use crate::workflows::attrition::domain::HealthStatus;
use crate::workflows::attrition::interpret::{
    GaugeSpec, ProgressBar, RecommendedAction, RiskBadge, SatisfactionVector, SignalChip, Verdict,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Health { online: bool },
    Loading(bool),
    SubmitEnabled(bool),
    Risk { label: String, glyph: &'static str, percent: i64 },
    Bar { percent: i64, color: &'static str },
    GaugeDrawn { chart: ChartId, filled: f64, color: &'static str },
    RadarDrawn { chart: ChartId, values: Vec<f64> },
    ChartDestroyed(ChartId),
    Verdict { headline: &'static str, detail: String },
    ActionsCleared { count: usize },
    Action { position: usize, text: String },
    Signals(Vec<SignalChip>),
    Alert(String),
}

/// Headless surface that records every widget update in order.
#[derive(Debug)]
pub struct MemorySurface {
    events: Vec<SurfaceEvent>,
    next_chart: u64,
    live: Vec<ChartId>,
    submit_enabled: bool,
    loading: bool,
    action_reveals: Vec<Instant>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            next_chart: 1,
            live: Vec::new(),
            submit_enabled: true,
            loading: false,
            action_reveals: Vec::new(),
        }
    }
}

impl MemorySurface {
    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Clock reading at each action reveal, in reveal order.
    pub fn action_reveals(&self) -> &[Instant] {
        &self.action_reveals
    }

    pub fn alerts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Alert(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed_charts(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::ChartDestroyed(chart) => Some(chart.0),
                _ => None,
            })
            .collect()
    }

    pub fn live_chart_ids(&self) -> Vec<u64> {
        self.live.iter().map(|chart| chart.0).collect()
    }

    fn allocate_chart(&mut self) -> ChartId {
        let chart = ChartId(self.next_chart);
        self.next_chart += 1;
        self.live.push(chart);
        chart
    }
}

impl UiSurface for MemorySurface {
    type Chart = ChartId;

    fn show_health(&mut self, status: &HealthStatus) -> io::Result<()> {
        self.events.push(SurfaceEvent::Health {
            online: status.online,
        });
        Ok(())
    }

    fn set_loading(&mut self, visible: bool) -> io::Result<()> {
        self.loading = visible;
        self.events.push(SurfaceEvent::Loading(visible));
        Ok(())
    }

    fn set_submit_enabled(&mut self, enabled: bool) -> io::Result<()> {
        self.submit_enabled = enabled;
        self.events.push(SurfaceEvent::SubmitEnabled(enabled));
        Ok(())
    }

    fn show_risk(&mut self, badge: &RiskBadge, probability_percent: i64) -> io::Result<()> {
        self.events.push(SurfaceEvent::Risk {
            label: badge.label.clone(),
            glyph: badge.glyph,
            percent: probability_percent,
        });
        Ok(())
    }

    fn fill_bar(&mut self, bar: &ProgressBar) -> io::Result<()> {
        self.events.push(SurfaceEvent::Bar {
            percent: bar.percent,
            color: bar.color,
        });
        Ok(())
    }

    fn draw_gauge(&mut self, gauge: &GaugeSpec) -> io::Result<ChartId> {
        let chart = self.allocate_chart();
        self.events.push(SurfaceEvent::GaugeDrawn {
            chart,
            filled: gauge.filled,
            color: gauge.color,
        });
        Ok(chart)
    }

    fn draw_radar(&mut self, satisfaction: &SatisfactionVector) -> io::Result<ChartId> {
        let chart = self.allocate_chart();
        self.events.push(SurfaceEvent::RadarDrawn {
            chart,
            values: satisfaction.values(),
        });
        Ok(chart)
    }

    fn destroy_chart(&mut self, chart: ChartId) -> io::Result<()> {
        self.live.retain(|live| *live != chart);
        self.events.push(SurfaceEvent::ChartDestroyed(chart));
        Ok(())
    }

    fn show_verdict(&mut self, verdict: &Verdict) -> io::Result<()> {
        self.events.push(SurfaceEvent::Verdict {
            headline: verdict.headline,
            detail: verdict.detail.clone(),
        });
        Ok(())
    }

    fn begin_actions(&mut self, count: usize) -> io::Result<()> {
        self.action_reveals.clear();
        self.events.push(SurfaceEvent::ActionsCleared { count });
        Ok(())
    }

    fn reveal_action(&mut self, action: &RecommendedAction) -> io::Result<()> {
        self.action_reveals.push(Instant::now());
        self.events.push(SurfaceEvent::Action {
            position: action.position,
            text: action.text.clone(),
        });
        Ok(())
    }

    fn show_signals(&mut self, signals: &[SignalChip]) -> io::Result<()> {
        self.events.push(SurfaceEvent::Signals(signals.to_vec()));
        Ok(())
    }

    fn alert(&mut self, message: &str) -> io::Result<()> {
        self.events.push(SurfaceEvent::Alert(message.to_string()));
        Ok(())
    }
}
