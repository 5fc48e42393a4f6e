use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a system configuration entry.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sys_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    name: String,
    pub(crate) value: String,
    value_type: String,
    comment: String,
    deleted_at: Option<i64>,
}

/// The relation for the system configuration model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the system configuration model.
impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Returns a new string entry.
    pub(crate) fn string(name: &str, value: &str) -> Self {
        Self {
            name: ActiveValue::Set(name.to_string()),
            value: ActiveValue::Set(value.to_string()),
            value_type: ActiveValue::Set("string".to_string()),
            comment: ActiveValue::Set(String::new()),
            deleted_at: ActiveValue::Set(None),
        }
    }
}
