//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Questo modulo organizza i repository in sotto-moduli separati per una migliore manutenibilità.
//! Ogni repository gestisce le operazioni di database per una specifica entità.

// ************************* NOTA SU SQLX ************************* //

/*
   Le query usano le funzioni runtime `sqlx::query_as::<_, T>(...)` con `#[derive(sqlx::FromRow)]`
   sulle entity, non le macro `query!`/`query_as!`: le macro vogliono il database (o la cache
   offline in `.sqlx/`) già in fase di compilazione, mentre lo schema vive su Supabase.
   Lo schema di riferimento è in `migrations/`.

   Ricordarsi i placeholder di Postgres: $1, $2, ... (non `?` come in MySQL)
   Number of Rows	Method to Call
   None	            .execute(...).await
   Zero or One	    .fetch_optional(...).await
   Exactly One	    .fetch_one(...).await
   Multiple	        .fetch_all(...).await
   Gli errori di sqlx vengono propagati con `?` fino al service, dove `AppError`
   li converte nel codice HTTP adeguato.
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod conversation;
pub mod document;
pub mod letter;
pub mod message;
pub mod profile;
pub mod traits;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, ListOwned, Read, ReadOwned, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use conversation::ConversationRepository;
pub use document::DocumentRepository;
pub use letter::LetterRepository;
pub use message::MessageRepository;
pub use profile::ProfileRepository;
