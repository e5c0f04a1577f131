pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250520_000001_tracked_links;
mod m20250520_000002_link_clicks;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250520_000001_tracked_links::Migration),
            Box::new(m20250520_000002_link_clicks::Migration),
        ]
    }
}
