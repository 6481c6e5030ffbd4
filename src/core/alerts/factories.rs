// Alert factories: alerts whose content depends on live vehicle state.
//
// A factory is a pure function of the context snapshot. Catalogs refer to
// factories by name; the names are resolved against a FactoryRegistry at load.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::model::{Alert, AlertSize, AlertStatus, AudibleAlert, Priority, VisualAlert};

const MS_TO_KPH: f64 = 3.6;
const MPH_TO_MS: f64 = 1.609_344 / MS_TO_KPH;
const MS_TO_MPH: f64 = 1.0 / MPH_TO_MS;
/// Calibration only makes progress above this speed (m/s)
const CALIBRATION_MIN_SPEED: f64 = 15.0 * MPH_TO_MS;

/// Static vehicle parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleParams {
    /// Vehicle family identifier, e.g. "honda"
    pub car_name: String,
    /// Minimum speed for steering control, m/s
    pub min_steer_speed: f64,
}

/// Interface board hardware revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HardwareType {
    Unknown,
    WhitePanda,
    GreyPanda,
    BlackPanda,
    Pedal,
    Uno,
    Dos,
}

impl HardwareType {
    /// Whether the board carries its own GPS receiver
    pub fn has_integrated_gps(&self) -> bool {
        matches!(self, Self::Uno | Self::Dos)
    }
}

/// Live telemetry snapshot. Fields are optional because not every producer
/// has reported by the time a factory runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Telemetry {
    pub calibration_percent: Option<u8>,
    pub hardware_type: Option<HardwareType>,
    /// Seconds until an automatic lane change starts
    pub auto_lane_change_timer: Option<f64>,
}

/// Read-only snapshot handed to every factory invocation
#[derive(Debug, Clone, Copy)]
pub struct AlertContext<'a> {
    pub vehicle: &'a VehicleParams,
    pub telemetry: &'a Telemetry,
    pub is_metric: bool,
}

impl<'a> AlertContext<'a> {
    pub fn new(vehicle: &'a VehicleParams, telemetry: &'a Telemetry, is_metric: bool) -> Self {
        Self {
            vehicle,
            telemetry,
            is_metric,
        }
    }

    fn speed_in_units(&self, ms: f64) -> f64 {
        let factor = if self.is_metric { MS_TO_KPH } else { MS_TO_MPH };
        ms * factor
    }

    fn speed_unit(&self) -> &'static str {
        if self.is_metric {
            "km/h"
        } else {
            "mph"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    #[error("missing telemetry field: {0}")]
    MissingTelemetry(&'static str),
}

/// Signature shared by all dynamic alerts
pub type AlertFactory = Arc<dyn Fn(&AlertContext<'_>) -> Result<Alert, FactoryError> + Send + Sync>;

/// Named factories available to catalog loading.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, AlertFactory>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the stock dynamic alerts
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("belowSteerSpeed", below_steer_speed_alert);
        registry.register("calibrationIncomplete", calibration_incomplete_alert);
        registry.register("noGps", no_gps_alert);
        registry.register("wrongCarMode", wrong_car_mode_alert);
        registry.register("autoLaneChange", auto_lane_change_alert);
        registry
    }

    /// Register (or replace) a factory under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&AlertContext<'_>) -> Result<Alert, FactoryError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn get(&self, name: &str) -> Option<AlertFactory> {
        self.factories.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FactoryRegistry").field("factories", &names).finish()
    }
}

/// Steering is unavailable below the vehicle's minimum steer speed
fn below_steer_speed_alert(ctx: &AlertContext<'_>) -> Result<Alert, FactoryError> {
    let speed = ctx.speed_in_units(ctx.vehicle.min_steer_speed).round() as i64;
    Ok(Alert::new(
        "TAKE CONTROL",
        format!("Steer Unavailable Below {} {}", speed, ctx.speed_unit()),
        AlertStatus::UserPrompt,
        AlertSize::Mid,
        Priority::Mid,
        VisualAlert::SteerRequired,
        AudibleAlert::None,
        0.0,
        0.4,
        0.3,
    ))
}

fn calibration_incomplete_alert(ctx: &AlertContext<'_>) -> Result<Alert, FactoryError> {
    let percent = ctx
        .telemetry
        .calibration_percent
        .ok_or(FactoryError::MissingTelemetry("calibration_percent"))?;
    let speed = ctx.speed_in_units(CALIBRATION_MIN_SPEED) as i64;
    Ok(Alert::new(
        format!("Calibration in Progress: {percent}%"),
        format!("Drive Above {} {}", speed, ctx.speed_unit()),
        AlertStatus::Normal,
        AlertSize::Mid,
        Priority::Lowest,
        VisualAlert::None,
        AudibleAlert::None,
        0.0,
        0.0,
        0.2,
    ))
}

fn no_gps_alert(ctx: &AlertContext<'_>) -> Result<Alert, FactoryError> {
    let hardware = ctx
        .telemetry
        .hardware_type
        .ok_or(FactoryError::MissingTelemetry("hardware_type"))?;
    let hint = if hardware.has_integrated_gps() {
        "Check GPS antenna placement"
    } else {
        "Check GPS antenna"
    };
    Ok(Alert::new(
        "Poor GPS reception",
        hint,
        AlertStatus::Normal,
        AlertSize::Mid,
        Priority::Lower,
        VisualAlert::None,
        AudibleAlert::None,
        0.0,
        0.0,
        0.2,
    )
    .with_creation_delay(300.0))
}

fn wrong_car_mode_alert(ctx: &AlertContext<'_>) -> Result<Alert, FactoryError> {
    let text = if ctx.vehicle.car_name == "honda" {
        "Main Switch Off"
    } else {
        "Cruise Mode Disabled"
    };
    Ok(Alert::no_entry(text).with_duration_hud_alert(0.0))
}

fn auto_lane_change_alert(ctx: &AlertContext<'_>) -> Result<Alert, FactoryError> {
    let timer = ctx
        .telemetry
        .auto_lane_change_timer
        .ok_or(FactoryError::MissingTelemetry("auto_lane_change_timer"))?;
    Ok(Alert::new(
        format!("Auto Lane Change starts in {} seconds", timer as i64),
        "Monitor Other Vehicles",
        AlertStatus::Normal,
        AlertSize::Mid,
        Priority::Lower,
        VisualAlert::SteerRequired,
        AudibleAlert::None,
        0.0,
        0.1,
        0.1,
    )
    .with_alert_rate(0.75))
}
