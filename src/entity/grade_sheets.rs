//! 成绩单实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_sheets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub instructor_id: i64,
    pub assessment_type: String,
    pub assessment_name: String,
    pub total_marks: f64,
    pub weightage: f64,
    pub status: String,
    pub submitted_at: Option<i64>,
    pub approved_at: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub approval_comments: Option<String>,
    pub rejected_at: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub published_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::grade_entries::Entity")]
    GradeEntries,
}

impl Related<super::grade_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
