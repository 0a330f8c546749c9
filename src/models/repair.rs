//! Modelo de Repair
//!
//! Reportes de averías contra una bici o una estación.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Tipo de objetivo del reporte - mapea al ENUM repair_target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "repair_target", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RepairTarget {
    Bike,
    Station,
}

/// Estado del reporte - mapea al ENUM repair_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "repair_status")]
pub enum RepairStatus {
    #[sqlx(rename = "pending")]
    #[serde(rename = "pending")]
    Pending,
    #[sqlx(rename = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,
    #[sqlx(rename = "completed")]
    #[serde(rename = "completed")]
    Completed,
}

impl RepairStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairStatus::Pending => "pending",
            RepairStatus::InProgress => "in-progress",
            RepairStatus::Completed => "completed",
        }
    }
}

/// Acción sobre un reporte
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RepairAction {
    Start,
    Complete,
}

impl RepairAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairAction::Start => "start",
            RepairAction::Complete => "complete",
        }
    }
}

/// Repair principal - mapea a la tabla repairs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Repair {
    pub id: i64,
    pub reporter_id: i64,
    pub target_type: RepairTarget,
    pub target_id: i64,
    pub category: String,
    pub description: String,
    pub status: RepairStatus,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Datos de un reporte nuevo
#[derive(Debug, Clone)]
pub struct NewRepair {
    pub reporter_id: i64,
    pub target_type: RepairTarget,
    pub target_id: i64,
    pub category: String,
    pub description: String,
}
