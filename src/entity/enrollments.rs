//! 选课实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub semester: String,
    pub year: i32,
    pub status: String,
    pub final_grade: Option<String>,
    pub grade_points: Option<f64>,
    pub created_at: i64,
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
