//! Employee attrition risk: form collection, the prediction service client,
//! health monitoring, result interpretation, and presentation.

pub mod client;
pub mod domain;
pub mod form;
pub mod health;
pub mod interpret;
pub mod profile;
pub mod render;
pub mod session;

pub use client::{
    HealthProbe, PredictionClient, PredictionError, PredictionService, REMEDIATION_HINT,
};
pub use domain::{HealthStatus, PredictionResult, RiskTier};
pub use form::FormError;
pub use health::{HealthMonitor, HealthMonitorHandle};
pub use interpret::{interpret, RenderModel, SignalChip};
pub use profile::{EmployeeProfile, FieldValue, ProfileField};
pub use render::{MemorySurface, RenderSession, TerminalSurface, UiSurface};
pub use session::{Dashboard, SubmitError};
