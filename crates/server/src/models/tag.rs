use serde::Serialize;

pub type TagId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TagResponse {
    pub id: TagId,
    pub name: String,
}
