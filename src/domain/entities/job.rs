use crate::domain::value_objects::{
    CustomerId, JobId, JobStatus, PaymentMethod, PaymentStatus, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job row as held by the remote system of record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub owner_id: UserId,
    pub customer_id: CustomerId,
    pub scheduled_date: String,
    pub status: JobStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub price: f64,
    pub amount_collected: Option<f64>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<UserId>,
    pub paid_at: Option<DateTime<Utc>>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub helper_id: Option<UserId>,
    pub helper_payment: Option<f64>,
}

/// Fields written when a pending job is completed.
#[derive(Debug, Clone, PartialEq)]
pub struct JobCompletion {
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub amount_collected: f64,
    pub completed_at: DateTime<Utc>,
    pub completed_by: Option<UserId>,
    pub photo_url: Option<String>,
}

/// Next occurrence of a recurring job.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub id: JobId,
    pub owner_id: UserId,
    pub customer_id: CustomerId,
    pub scheduled_date: String,
    pub price: f64,
}
