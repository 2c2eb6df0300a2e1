use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::order_line;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Lines }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Lines => Entity::has_many(order_line::Entity).into(),
        }
    }
}

impl Related<order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
