use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct MutationRow {
    pub id: i64,
    pub kind: String,
    pub payload: String,
    pub retry_count: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRow {
    pub entity_id: String,
    pub mutation_id: i64,
    pub data: String,
    pub created_at: i64,
    pub confirmed_at: Option<i64>,
}
