use crate::domain::value_objects::{
    CustomerId, JobId, MutationKind, PaymentMethod, PaymentStatus, UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Customer fields captured by the UI when the job was completed. The processor
/// works from this copy rather than re-reading the customer remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub customer_id: CustomerId,
    pub owner_id: UserId,
    pub price: f64,
    #[serde(default)]
    pub frequency_weeks: Option<u32>,
    #[serde(default)]
    pub gocardless_customer_id: Option<String>,
    #[serde(default)]
    pub gocardless_mandate_status: Option<String>,
}

impl CustomerSnapshot {
    /// A stored customer id alone is not enough; the mandate must be active.
    pub fn has_active_mandate(&self) -> bool {
        self.gocardless_mandate_status.as_deref() == Some("active")
    }

    pub fn recurrence_weeks(&self) -> Option<u32> {
        self.frequency_weeks.filter(|weeks| *weeks > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteJob {
    pub job_id: JobId,
    #[serde(default)]
    pub custom_amount: Option<f64>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub completed_by: Option<UserId>,
    #[serde(rename = "customerData")]
    pub customer: CustomerSnapshot,
}

impl CompleteJob {
    pub fn collected_amount(&self) -> f64 {
        self.custom_amount.unwrap_or(self.customer.price)
    }

    pub fn payment_status(&self) -> PaymentStatus {
        if self.customer.has_active_mandate() {
            PaymentStatus::Processing
        } else {
            PaymentStatus::Unpaid
        }
    }

    /// The person who did the work when it was not the account owner.
    pub fn helper(&self) -> Option<&UserId> {
        self.completed_by
            .as_ref()
            .filter(|completer| **completer != self.customer.owner_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkJobPaid {
    pub job_id: JobId,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMarkPaid {
    pub job_ids: Vec<JobId>,
    pub method: PaymentMethod,
}

/// Shared by reschedule and skip; both only move the scheduled date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveJob {
    pub job_id: JobId,
    pub new_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobNotes {
    pub job_id: JobId,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum MutationPayload {
    CompleteJob(CompleteJob),
    MarkJobPaid(MarkJobPaid),
    BatchMarkPaid(BatchMarkPaid),
    RescheduleJob(MoveJob),
    SkipJob(MoveJob),
    UpdateJobNotes(UpdateJobNotes),
}

impl MutationPayload {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationPayload::CompleteJob(_) => MutationKind::CompleteJob,
            MutationPayload::MarkJobPaid(_) => MutationKind::MarkJobPaid,
            MutationPayload::BatchMarkPaid(_) => MutationKind::BatchMarkPaid,
            MutationPayload::RescheduleJob(_) => MutationKind::RescheduleJob,
            MutationPayload::SkipJob(_) => MutationKind::SkipJob,
            MutationPayload::UpdateJobNotes(_) => MutationKind::UpdateJobNotes,
        }
    }

    /// Entities whose optimistic snapshot this mutation owns.
    pub fn entity_ids(&self) -> Vec<JobId> {
        match self {
            MutationPayload::CompleteJob(p) => vec![p.job_id.clone()],
            MutationPayload::MarkJobPaid(p) => vec![p.job_id.clone()],
            MutationPayload::BatchMarkPaid(p) => p.job_ids.clone(),
            MutationPayload::RescheduleJob(p) | MutationPayload::SkipJob(p) => {
                vec![p.job_id.clone()]
            }
            MutationPayload::UpdateJobNotes(p) => vec![p.job_id.clone()],
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            MutationPayload::CompleteJob(p) => {
                if p.custom_amount.is_some_and(|amount| amount < 0.0 || !amount.is_finite()) {
                    return Err("Custom amount must be a non-negative number".to_string());
                }
                if p.customer.price < 0.0 || !p.customer.price.is_finite() {
                    return Err("Customer price must be a non-negative number".to_string());
                }
            }
            MutationPayload::BatchMarkPaid(p) => {
                if p.job_ids.is_empty() {
                    return Err("Batch mark-paid needs at least one job".to_string());
                }
            }
            MutationPayload::RescheduleJob(p) | MutationPayload::SkipJob(p) => {
                if p.new_date.trim().is_empty() {
                    return Err("Target date cannot be empty".to_string());
                }
            }
            MutationPayload::MarkJobPaid(_) | MutationPayload::UpdateJobNotes(_) => {}
        }
        Ok(())
    }

    /// Fields the UI overlays on the cached job until the write is confirmed.
    pub fn optimistic_view(&self) -> Value {
        match self {
            MutationPayload::CompleteJob(p) => json!({
                "status": "completed",
                "payment_status": p.payment_status().as_str(),
                "amount_collected": p.collected_amount(),
                "photo_url": p.photo_url,
            }),
            MutationPayload::MarkJobPaid(MarkJobPaid { method, .. })
            | MutationPayload::BatchMarkPaid(BatchMarkPaid { method, .. }) => json!({
                "payment_status": "paid",
                "payment_method": method.as_str(),
            }),
            MutationPayload::RescheduleJob(p) | MutationPayload::SkipJob(p) => json!({
                "scheduled_date": p.new_date,
            }),
            MutationPayload::UpdateJobNotes(p) => json!({ "notes": p.notes }),
        }
    }
}
