use std::io::{self, Write};

use super::{ChartId, UiSurface};
use crate::workflows::attrition::domain::HealthStatus;
use crate::workflows::attrition::interpret::{
    GaugeSpec, ProgressBar, RecommendedAction, RiskBadge, SatisfactionVector, SignalChip,
    Verdict, SATISFACTION_SCALE_MAX,
};

const BAR_WIDTH: usize = 20;
const LABEL_WIDTH: usize = 16;

/// Plain-text result panel written to any `Write` sink (stdout for the CLI).
pub struct TerminalSurface<W> {
    out: W,
    next_chart: u64,
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out, next_chart: 1 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn next_chart(&mut self) -> ChartId {
        let chart = ChartId(self.next_chart);
        self.next_chart += 1;
        chart
    }
}

fn meter(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let filled = (fraction * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

impl<W: Write + Send> UiSurface for TerminalSurface<W> {
    type Chart = ChartId;

    fn show_health(&mut self, status: &HealthStatus) -> io::Result<()> {
        let dot = if status.online { "●" } else { "○" };
        writeln!(
            self.out,
            "[{}] {dot} {}",
            status.checked_at.format("%H:%M:%S UTC"),
            status.label()
        )
    }

    fn set_loading(&mut self, visible: bool) -> io::Result<()> {
        if visible {
            writeln!(self.out, "Scoring employee profile...")?;
        }
        self.out.flush()
    }

    fn set_submit_enabled(&mut self, _enabled: bool) -> io::Result<()> {
        Ok(())
    }

    fn show_risk(&mut self, badge: &RiskBadge, probability_percent: i64) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{} {}", badge.glyph, badge.label)?;
        writeln!(self.out, "Attrition probability: {probability_percent}%")
    }

    fn fill_bar(&mut self, bar: &ProgressBar) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{:<LABEL_WIDTH$}[{}] {}%",
            "Risk",
            meter(bar.percent as f64 / 100.0, BAR_WIDTH),
            bar.percent
        )?;
        self.out.flush()
    }

    fn draw_gauge(&mut self, gauge: &GaugeSpec) -> io::Result<ChartId> {
        writeln!(
            self.out,
            "{:<LABEL_WIDTH$}({}) {:.2}",
            "Gauge",
            meter(gauge.filled, BAR_WIDTH),
            gauge.filled
        )?;
        Ok(self.next_chart())
    }

    fn draw_radar(&mut self, satisfaction: &SatisfactionVector) -> io::Result<ChartId> {
        writeln!(self.out)?;
        writeln!(self.out, "Satisfaction (0-{SATISFACTION_SCALE_MAX})")?;
        for axis in &satisfaction.axes {
            writeln!(
                self.out,
                "  {:<LABEL_WIDTH$}{} {}",
                axis.label,
                meter(axis.value / SATISFACTION_SCALE_MAX, 4),
                axis.value
            )?;
        }
        Ok(self.next_chart())
    }

    fn destroy_chart(&mut self, _chart: ChartId) -> io::Result<()> {
        Ok(())
    }

    fn show_verdict(&mut self, verdict: &Verdict) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{} {}", verdict.icon, verdict.headline)?;
        writeln!(self.out, "   {}", verdict.detail)
    }

    fn begin_actions(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Recommended actions")?;
        if count == 0 {
            writeln!(self.out, "  (none)")?;
        }
        self.out.flush()
    }

    fn reveal_action(&mut self, action: &RecommendedAction) -> io::Result<()> {
        writeln!(self.out, "  {}. {}", action.position + 1, action.text)?;
        self.out.flush()
    }

    fn show_signals(&mut self, signals: &[SignalChip]) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Key signals")?;
        for signal in signals {
            let marker = if signal.risky { "  (risk)" } else { "" };
            writeln!(
                self.out,
                "  {:<LABEL_WIDTH$}{}{marker}",
                signal.label, signal.display_value
            )?;
        }
        Ok(())
    }

    fn alert(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{message}")?;
        self.out.flush()
    }
}
