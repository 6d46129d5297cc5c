//! Following set entity (who the owner follows, and who they asked to).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "following")]
pub struct Model {
    /// Owner of the set
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    /// Users the owner follows (JSON array of user IDs)
    #[sea_orm(column_type = "JsonBinary")]
    pub following: Json,

    /// Pending outbound follow requests (JSON array of user IDs)
    #[sea_orm(column_type = "JsonBinary")]
    pub requesting_to_follow: Json,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
