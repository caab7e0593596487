//! Common repository traits
//!
//! This module defines generic interfaces for database operations.
//! Every row exposed to a client belongs to a Supabase user, so reads,
//! listings and deletions that come from a request are scoped by `user_id`.

use uuid::Uuid;

/// Trait for creating new entities in the database
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity
/// * `CreateDTO` - DTO for creation
pub trait Create<Entity, CreateDTO> {
    /// Inserts a new row and returns the stored entity
    ///
    /// # Returns
    /// * `Ok(Entity)` - Created entity as stored by Postgres
    /// * `Err(sqlx::Error)` - Error during insertion
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Trait for reading a single entity by primary key, regardless of owner
pub trait Read<Entity, Id> {
    /// # Returns
    /// * `Ok(Some(Entity))` - Entity found
    /// * `Ok(None)` - No entity with that ID
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Trait for reading an entity only if it belongs to the given user
pub trait ReadOwned<Entity, Id> {
    /// # Returns
    /// * `Ok(None)` - Entity missing or owned by someone else (callers answer 404 either way)
    async fn read_owned(&self, id: &Id, user_id: &Uuid) -> Result<Option<Entity>, sqlx::Error>;
}

/// Trait for listing every entity owned by a user, most recent first
pub trait ListOwned<Entity> {
    async fn list_by_user(&self, user_id: &Uuid) -> Result<Vec<Entity>, sqlx::Error>;
}

/// Trait for updating existing entities owned by a user
///
/// # Type Parameters
/// * `Entity` - Type of the updated entity
/// * `UpdateDTO` - DTO for updating (optional fields for partial updates)
/// * `Id` - Type of the primary key
pub trait Update<Entity, UpdateDTO, Id> {
    /// Only `Some(_)` fields of `data` are modified
    ///
    /// # Returns
    /// * `Ok(Some(Entity))` - Updated entity
    /// * `Ok(None)` - Entity missing or not owned by `user_id`
    async fn update(
        &self,
        id: &Id,
        user_id: &Uuid,
        data: &UpdateDTO,
    ) -> Result<Option<Entity>, sqlx::Error>;
}

/// Trait for deleting entities owned by a user
pub trait Delete<Id> {
    /// # Returns
    /// * `Ok(true)` - A row was deleted
    /// * `Ok(false)` - Nothing matched the ID for that owner
    async fn delete(&self, id: &Id, user_id: &Uuid) -> Result<bool, sqlx::Error>;
}
