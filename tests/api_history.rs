//! Integration tests con database reale per conversazioni, messaggi e profilo
//!
//! Questi test usano `#[sqlx::test]` che:
//! - Crea automaticamente un database di test isolato
//! - Applica le migrations da `migrations/`
//! - Applica i fixtures specificati da `fixtures/`
//! - Pulisce il database al termine
//!
//! Richiedono `DATABASE_URL` verso un Postgres su cui creare database.

mod common;

#[cfg(test)]
mod history_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use axum_test::http::HeaderName;
    use chrono::{DateTime, Utc};
    use serde_json::{Value, json};
    use sqlx::PgPool;
    use taxguide::sse::parse_sse_body;
    use uuid::Uuid;

    const ALICE: Uuid = Uuid::from_u128(0x11111111_1111_1111_1111_111111111111);
    const BOB: Uuid = Uuid::from_u128(0x22222222_2222_2222_2222_222222222222);
    const ALICE_CONVERSATION: &str = "aaaaaaaa-0000-0000-0000-000000000001";

    fn authorization() -> HeaderName {
        HeaderName::from_static("authorization")
    }

    fn contents(messages: &[Value]) -> Vec<&str> {
        messages
            .iter()
            .filter_map(|m| m["content"].as_str())
            .collect()
    }

    // ============================================================
    // Appartenenza delle conversazioni
    // ============================================================

    #[sqlx::test(migrations = "./migrations", fixtures(path = "../fixtures", scripts("conversations")))]
    async fn test_conversation_of_other_user_is_not_found(pool: PgPool) -> sqlx::Result<()> {
        let (server, _) = create_test_server_with_pool(pool).await;
        let url = format!("/api/conversations/{}", ALICE_CONVERSATION);

        let response = server.get(&url).add_header(authorization(), bearer(BOB)).await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "Conversation not found");

        server
            .get(&format!("{}/messages", url))
            .add_header(authorization(), bearer(BOB))
            .await
            .assert_status_not_found();

        server
            .patch(&url)
            .add_header(authorization(), bearer(BOB))
            .json(&json!({"title": "Stolen"}))
            .await
            .assert_status_not_found();

        server
            .delete(&url)
            .add_header(authorization(), bearer(BOB))
            .await
            .assert_status_not_found();

        // la conversazione di alice è intatta
        let response = server.get(&url).add_header(authorization(), bearer(ALICE)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["title"], "RRSP questions");

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations", fixtures(path = "../fixtures", scripts("conversations")))]
    async fn test_list_conversations_only_returns_own(pool: PgPool) -> sqlx::Result<()> {
        let (server, _) = create_test_server_with_pool(pool).await;

        let response = server
            .get("/api/conversations")
            .add_header(authorization(), bearer(BOB))
            .await;

        response.assert_status_ok();
        let conversations: Vec<Value> = response.json();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0]["title"], "Moving expenses");

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_and_delete_conversation(pool: PgPool) -> sqlx::Result<()> {
        let (server, _) = create_test_server_with_pool(pool.clone()).await;
        let user = Uuid::new_v4();

        let response = server
            .post("/api/conversations")
            .add_header(authorization(), bearer(user))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["title"], "New conversation");
        let id = created["id"].as_str().expect("conversation id").to_string();

        server
            .post(&format!("/api/conversations/{}/messages", id))
            .add_header(authorization(), bearer(user))
            .json(&json!({"role": "user", "content": "Can I claim my laptop?"}))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .delete(&format!("/api/conversations/{}", id))
            .add_header(authorization(), bearer(user))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        // i messaggi spariscono con la conversazione
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&pool)
            .await?;
        assert_eq!(remaining, 0);

        Ok(())
    }

    // ============================================================
    // Messaggi: paginazione e updated_at
    // ============================================================

    #[sqlx::test(migrations = "./migrations", fixtures(path = "../fixtures", scripts("conversations")))]
    async fn test_messages_are_paged_oldest_first(pool: PgPool) -> sqlx::Result<()> {
        let (server, _) = create_test_server_with_pool(pool).await;
        let url = format!("/api/conversations/{}/messages", ALICE_CONVERSATION);

        let response = server.get(&url).add_header(authorization(), bearer(ALICE)).await;
        response.assert_status_ok();
        let page: Vec<Value> = response.json();

        // gli ultimi 50 dei 55, dal più vecchio al più recente
        assert_eq!(page.len(), 50);
        assert_eq!(page[0]["content"], "message 6");
        assert_eq!(page[49]["content"], "message 55");

        let cursor = page[0]["created_at"].as_str().expect("created_at").to_string();
        let response = server
            .get(&url)
            .add_query_param("before", &cursor)
            .add_header(authorization(), bearer(ALICE))
            .await;
        response.assert_status_ok();
        let older: Vec<Value> = response.json();
        assert_eq!(
            contents(&older),
            vec!["message 1", "message 2", "message 3", "message 4", "message 5"]
        );

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations", fixtures(path = "../fixtures", scripts("conversations")))]
    async fn test_add_message_bumps_updated_at(pool: PgPool) -> sqlx::Result<()> {
        let (server, _) = create_test_server_with_pool(pool).await;
        let url = format!("/api/conversations/{}", ALICE_CONVERSATION);

        let before: Value = server
            .get(&url)
            .add_header(authorization(), bearer(ALICE))
            .await
            .json();
        let before: DateTime<Utc> =
            serde_json::from_value(before["updated_at"].clone()).expect("updated_at");

        let response = server
            .post(&format!("{}/messages", url))
            .add_header(authorization(), bearer(ALICE))
            .json(&json!({"role": "assistant", "content": "Yes, up to your deduction limit."}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let message: Value = response.json();
        assert_eq!(message["role"], "assistant");

        let after: Value = server
            .get(&url)
            .add_header(authorization(), bearer(ALICE))
            .await
            .json();
        let after: DateTime<Utc> =
            serde_json::from_value(after["updated_at"].clone()).expect("updated_at");
        assert!(after > before);

        Ok(())
    }

    // ============================================================
    // Profilo
    // ============================================================

    #[sqlx::test(migrations = "./migrations", fixtures(path = "../fixtures", scripts("conversations")))]
    async fn test_profile_upsert_keeps_missing_fields(pool: PgPool) -> sqlx::Result<()> {
        let (server, _) = create_test_server_with_pool(pool).await;

        let response = server
            .put("/api/profile")
            .add_header(authorization(), bearer(ALICE))
            .json(&json!({"province": "bc"}))
            .await;

        response.assert_status_ok();
        let profile: Value = response.json();
        assert_eq!(profile["province"], "BC");
        assert_eq!(profile["display_name"], "Alice");
        assert_eq!(profile["filing_status"], "single");

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations", fixtures(path = "../fixtures", scripts("conversations")))]
    async fn test_profile_is_created_on_first_put(pool: PgPool) -> sqlx::Result<()> {
        let (server, _) = create_test_server_with_pool(pool).await;

        let response = server
            .get("/api/profile")
            .add_header(authorization(), bearer(BOB))
            .await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "Profile not found");

        server
            .put("/api/profile")
            .add_header(authorization(), bearer(BOB))
            .json(&json!({"display_name": "Bob"}))
            .await
            .assert_status_ok();

        let profile: Value = server
            .get("/api/profile")
            .add_header(authorization(), bearer(BOB))
            .await
            .json();
        assert_eq!(profile["display_name"], "Bob");
        assert!(profile["province"].is_null());

        Ok(())
    }

    // ============================================================
    // Assistente con conversation_id
    // ============================================================

    #[sqlx::test(migrations = "./migrations", fixtures(path = "../fixtures", scripts("conversations")))]
    async fn test_chat_stream_with_foreign_conversation(pool: PgPool) -> sqlx::Result<()> {
        let (server, upstream) = create_test_server_with_pool(pool).await;

        let response = server
            .post("/api/chat")
            .add_header(authorization(), bearer(BOB))
            .json(&json!({
                "question": "What did I ask about RRSPs?",
                "conversation_id": ALICE_CONVERSATION
            }))
            .await;

        response.assert_status_ok();
        let events = parse_sse_body(&response.text());
        let types: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
        assert_eq!(types, vec!["error", "done"]);
        assert_eq!(events[0]["message"], "Conversation not found");
        assert_eq!(upstream.llm_hits(), 0);

        Ok(())
    }

    #[sqlx::test(migrations = "./migrations", fixtures(path = "../fixtures", scripts("conversations")))]
    async fn test_ask_stores_question_and_answer(pool: PgPool) -> sqlx::Result<()> {
        let (server, _) = create_test_server_with_pool(pool.clone()).await;

        server
            .post("/api/ask")
            .add_header(authorization(), bearer(ALICE))
            .json(&json!({
                "question": "What is the TFSA limit for 2024?",
                "conversation_id": ALICE_CONVERSATION
            }))
            .await
            .assert_status_ok();

        let stored: Vec<(String,)> = sqlx::query_as(
            "SELECT content FROM messages WHERE conversation_id = $1 ORDER BY created_at DESC LIMIT 2",
        )
        .bind(Uuid::parse_str(ALICE_CONVERSATION).expect("fixture uuid"))
        .fetch_all(&pool)
        .await?;
        assert_eq!(stored[0].0, "The 2024 TFSA dollar limit is $7,000 [1].");
        assert_eq!(stored[1].0, "What is the TFSA limit for 2024?");

        Ok(())
    }
}
