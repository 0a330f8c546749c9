//! Flujo de reparaciones
//!
//! `pending --start--> in-progress --complete--> completed`. Sin saltos ni
//! retrocesos; un reporte completado queda congelado.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::{NewRepair, Repair, RepairAction, RepairStatus};
use crate::services::change_set::Staged;
use crate::utils::errors::DomainError;

#[derive(Debug, Clone)]
pub struct RepairWorkflow {
    repairs: BTreeMap<i64, Repair>,
    next_id: i64,
}

impl Default for RepairWorkflow {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl RepairWorkflow {
    pub fn from_records(records: Vec<Repair>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let repairs = records.into_iter().map(|r| (r.id, r)).collect();
        Self { repairs, next_id }
    }

    pub fn get(&self, repair_id: i64) -> Result<&Repair, DomainError> {
        self.repairs
            .get(&repair_id)
            .ok_or(DomainError::RepairNotFound(repair_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Repair> {
        self.repairs.values()
    }

    /// Reportes más recientes primero, opcionalmente filtrados por estado
    pub fn list(&self, status: Option<RepairStatus>) -> Vec<Repair> {
        self.collect_recent(|r| status.map_or(true, |s| r.status == s))
    }

    pub fn list_by_reporter(&self, reporter_id: i64) -> Vec<Repair> {
        self.collect_recent(|r| r.reporter_id == reporter_id)
    }

    fn collect_recent<F>(&self, keep: F) -> Vec<Repair>
    where
        F: Fn(&Repair) -> bool,
    {
        self.repairs.values().rev().filter(|r| keep(r)).cloned().collect()
    }

    /// Crear un reporte en `pending`. El objetivo ya fue validado por quien llama.
    pub(crate) fn report(&mut self, new_repair: NewRepair, now: DateTime<Utc>) -> Staged<Repair> {
        let repair = Repair {
            id: self.next_id,
            reporter_id: new_repair.reporter_id,
            target_type: new_repair.target_type,
            target_id: new_repair.target_id,
            category: new_repair.category,
            description: new_repair.description,
            status: RepairStatus::Pending,
            admin_note: None,
            created_at: now,
            completed_at: None,
        };
        self.next_id += 1;
        self.repairs.insert(repair.id, repair.clone());
        info!(
            "🔧 Repair {} reported by user {} against {:?} {}",
            repair.id, repair.reporter_id, repair.target_type, repair.target_id
        );
        Staged::created(repair)
    }

    pub fn advance(
        &mut self,
        repair_id: i64,
        action: RepairAction,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Staged<Repair>, DomainError> {
        match action {
            RepairAction::Start => self.start(repair_id, note),
            RepairAction::Complete => self.complete(repair_id, note.unwrap_or_default(), now),
        }
    }

    /// pending -> in-progress. Una nota opcional queda como nota del administrador.
    pub fn start(&mut self, repair_id: i64, note: Option<String>) -> Result<Staged<Repair>, DomainError> {
        let repair = self.transition(repair_id, RepairAction::Start, RepairStatus::Pending)?;
        let before = repair.clone();
        repair.status = RepairStatus::InProgress;
        if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
            repair.admin_note = Some(note);
        }
        Ok(Staged::updated(before, repair.clone()))
    }

    /// in-progress -> completed, con nota obligatoria
    pub fn complete(
        &mut self,
        repair_id: i64,
        admin_note: String,
        now: DateTime<Utc>,
    ) -> Result<Staged<Repair>, DomainError> {
        let repair = self.transition(repair_id, RepairAction::Complete, RepairStatus::InProgress)?;
        if admin_note.trim().is_empty() {
            return Err(DomainError::MissingNote);
        }
        let before = repair.clone();
        repair.status = RepairStatus::Completed;
        repair.admin_note = Some(admin_note);
        repair.completed_at = Some(now);
        Ok(Staged::updated(before, repair.clone()))
    }

    fn transition(
        &mut self,
        repair_id: i64,
        action: RepairAction,
        required: RepairStatus,
    ) -> Result<&mut Repair, DomainError> {
        let repair = self
            .repairs
            .get_mut(&repair_id)
            .ok_or(DomainError::RepairNotFound(repair_id))?;
        if repair.status != required {
            return Err(DomainError::InvalidTransition {
                repair_id,
                action: action.as_str().to_string(),
                status: repair.status.as_str().to_string(),
            });
        }
        Ok(repair)
    }

    pub(crate) fn restore(&mut self, staged: &Staged<Repair>) {
        match &staged.before {
            Some(before) => {
                self.repairs.insert(before.id, before.clone());
            }
            None => {
                self.repairs.remove(&staged.after.id);
                if staged.after.id + 1 == self.next_id {
                    self.next_id = staged.after.id;
                }
            }
        }
    }
}
