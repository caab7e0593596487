//! ProfileRepository - Repository per i profili utente

use super::Read;
use crate::dtos::UpsertProfileDTO;
use crate::entities::Profile;
use sqlx::{Error, PgPool};
use uuid::Uuid;

pub struct ProfileRepository {
    connection_pool: PgPool,
}

impl ProfileRepository {
    pub fn new(connection_pool: PgPool) -> Self {
        Self { connection_pool }
    }

    /// Crea il profilo se manca, altrimenti aggiorna solo i campi presenti
    pub async fn upsert(&self, user_id: &Uuid, data: &UpsertProfileDTO) -> Result<Profile, Error> {
        let province = data.province.as_ref().map(|p| p.to_ascii_uppercase());

        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, display_name, province, filing_status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = COALESCE(EXCLUDED.display_name, profiles.display_name),
                province = COALESCE(EXCLUDED.province, profiles.province),
                filing_status = COALESCE(EXCLUDED.filing_status, profiles.filing_status),
                updated_at = now()
            RETURNING user_id, display_name, province, filing_status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&data.display_name)
        .bind(province)
        .bind(&data.filing_status)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Profile, Uuid> for ProfileRepository {
    async fn read(&self, user_id: &Uuid) -> Result<Option<Profile>, Error> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, display_name, province, filing_status, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}
