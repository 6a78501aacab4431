use sea_orm_migration::prelude::*;

mod initial_001;
mod unique_keys_002;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(initial_001::Migration),
            Box::new(unique_keys_002::Migration),
        ]
    }
}
