use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use attrition_ai::config::{AppConfig, ServiceConfig};
use attrition_ai::error::AppError;
use attrition_ai::workflows::attrition::form;
use attrition_ai::workflows::attrition::{
    interpret, Dashboard, EmployeeProfile, HealthMonitor, MemorySurface, PredictionClient,
    RenderModel, RenderSession, SubmitError, TerminalSurface, UiSurface,
};
use clap::Args;
use tracing::{info, warn};

use crate::infra::{build_profile, parse_field, Preset};

#[derive(Args, Debug, Default)]
pub(crate) struct PredictArgs {
    /// Profile to start from before applying --field overrides
    #[arg(long, value_enum, default_value_t = Preset::None)]
    pub(crate) preset: Preset,
    /// Form field as Key=Value; numeric values are sent as numbers
    #[arg(long = "field", value_parser = parse_field)]
    pub(crate) fields: Vec<(String, String)>,
    /// Print the derived render model as JSON instead of the result panel
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one employee per row; headers name the fields
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct WatchArgs {
    /// Probe cadence in seconds (defaults to the configured interval)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) interval_secs: Option<u64>,
}

fn client(service: &ServiceConfig) -> Result<Arc<PredictionClient>, AppError> {
    Ok(Arc::new(PredictionClient::new(service.clone())?))
}

pub(crate) async fn run_predict(config: &AppConfig, args: PredictArgs) -> Result<(), AppError> {
    let profile = build_profile(args.preset, &args.fields);

    if args.json {
        let model = predict_model(&config.service, profile).await?;
        let rendered = serde_json::to_string_pretty(&model).map_err(io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    let client = client(&config.service)?;
    let monitor = HealthMonitor::new(
        client.clone(),
        config.service.health_interval,
        config.service.health_timeout,
    );
    let session = RenderSession::new(TerminalSurface::new(io::stdout()));
    let dashboard = Dashboard::new(client, session);
    dashboard.show_health(&monitor.check().await).await?;
    dashboard.submit(profile).await?;
    Ok(())
}

/// Runs a submission headlessly and hands back the derived model.
pub(crate) async fn predict_model(
    service: &ServiceConfig,
    profile: EmployeeProfile,
) -> Result<RenderModel, AppError> {
    let session = RenderSession::new(MemorySurface::default())
        .with_bar_delay(Duration::ZERO)
        .with_action_stagger(false);
    let dashboard = Dashboard::new(client(service)?, session);

    match dashboard.submit(profile).await {
        Ok(model) => Ok(model),
        Err(SubmitError::Prediction(err)) => {
            eprintln!("{}", err.alert_text());
            Err(AppError::Prediction(err))
        }
        Err(err) => Err(AppError::Submit(err)),
    }
}

pub(crate) async fn run_batch(config: &AppConfig, args: BatchArgs) -> Result<(), AppError> {
    let profiles = form::profiles_from_csv_path(&args.csv)?;
    let client = client(&config.service)?;
    info!(rows = profiles.len(), path = %args.csv.display(), "scoring batch");

    println!("{:<5} {:<14} {:>5}  Verdict", "Row", "Risk", "Prob");
    let (mut scored, mut failed) = (0usize, 0usize);
    for (index, profile) in profiles.iter().enumerate() {
        let row = index + 1;
        match client.predict(profile).await {
            Ok(result) => {
                println!("{}", summary_line(row, &interpret(&result, profile)));
                scored += 1;
            }
            Err(err) => {
                warn!(row, error = %err, "batch row failed");
                println!("{row:<5} {:<14} {:>5}  error: {}", "-", "-", err.message());
                failed += 1;
            }
        }
    }

    println!();
    println!("{scored} scored, {failed} failed");
    Ok(())
}

pub(crate) fn summary_line(row: usize, model: &RenderModel) -> String {
    format!(
        "{row:<5} {:<14} {:>4}%  {}",
        model.risk.label, model.probability_percent, model.verdict.headline
    )
}

pub(crate) async fn run_health(config: &AppConfig) -> Result<(), AppError> {
    let monitor = HealthMonitor::new(
        client(&config.service)?,
        config.service.health_interval,
        config.service.health_timeout,
    );
    let status = monitor.check().await;
    TerminalSurface::new(io::stdout()).show_health(&status)?;

    if status.online {
        Ok(())
    } else {
        Err(AppError::ServiceOffline(config.service.base_url.clone()))
    }
}

pub(crate) async fn run_watch(config: &AppConfig, args: WatchArgs) -> Result<(), AppError> {
    let interval = args
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or(config.service.health_interval);
    let monitor = HealthMonitor::new(
        client(&config.service)?,
        interval,
        config.service.health_timeout,
    );
    let handle = monitor.spawn();
    let mut updates = handle.subscribe();
    let mut surface = TerminalSurface::new(io::stdout());
    let mut last_online = None;

    info!(base_url = %config.service.base_url, ?interval, "watching prediction service");
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = *updates.borrow_and_update();
                if let Some(status) = status {
                    if last_online != Some(status.online) {
                        surface.show_health(&status)?;
                        last_online = Some(status.online);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping health monitor");
                break;
            }
        }
    }

    handle.stop();
    Ok(())
}

pub(crate) async fn run_model_info(config: &AppConfig) -> Result<(), AppError> {
    let client = client(&config.service)?;
    match client.model_info().await {
        Ok(info) => {
            let rendered = serde_json::to_string_pretty(&info).map_err(io::Error::from)?;
            println!("{rendered}");
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.alert_text());
            Err(AppError::Prediction(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn stub_service(app: Router) -> ServiceConfig {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub service");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub service runs");
        });
        ServiceConfig {
            base_url: format!("http://{addr}"),
            ..ServiceConfig::default()
        }
    }

    #[tokio::test]
    async fn predict_model_renders_service_response() {
        let app = Router::new().route(
            "/predict",
            post(|Json(body): Json<Value>| async move {
                let overtime = body.get("OverTime").cloned().unwrap_or(Value::Null);
                Json(json!({
                    "will_attrite": overtime == json!(1),
                    "attrition_probability": 0.7342,
                    "risk_level": "High",
                    "recommended_actions": ["Assign mentor or career sponsor"],
                    "status": "success"
                }))
            }),
        );
        let service = stub_service(app).await;

        let model = predict_model(&service, EmployeeProfile::high_risk_demo())
            .await
            .expect("prediction renders");

        assert_eq!(model.probability_percent, 73);
        assert!(model.verdict.likely_to_leave);
        assert_eq!(
            summary_line(4, &model),
            "4     High Risk        73%  Employee Likely to Leave"
        );
    }

    #[tokio::test]
    async fn predict_model_surfaces_service_detail() {
        let app = Router::new().route(
            "/predict",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "detail": "model not loaded" })),
                )
            }),
        );
        let service = stub_service(app).await;

        let err = predict_model(&service, EmployeeProfile::sample())
            .await
            .expect_err("service failure propagates");
        assert_eq!(err.to_string(), "prediction error: model not loaded");
    }
}
