//! Integration tests per gli endpoints di caricamento
//!
//! Test per:
//! - POST /api/documents/analyze
//! - POST /api/letters/analyze
//!
//! Il database non è raggiungibile: l'analisi viene restituita comunque
//! con `saved: false`.

mod common;

#[cfg(test)]
mod upload_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use axum_test::http::HeaderName;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::Value;
    use taxguide::uploads::MAX_UPLOAD_BYTES;
    use uuid::Uuid;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn authorization() -> HeaderName {
        HeaderName::from_static("authorization")
    }

    fn pdf_bytes() -> Vec<u8> {
        b"%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n%%EOF".to_vec()
    }

    fn png_bytes() -> Vec<u8> {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }

    fn form(bytes: Vec<u8>, file_name: &str, mime: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(bytes).file_name(file_name).mime_type(mime),
        )
    }

    // ============================================================
    // Test per POST /api/documents/analyze - analyze_document
    // ============================================================

    #[tokio::test]
    async fn test_analyze_document_success() {
        let (server, upstream) = create_test_server().await;

        let response = server
            .post("/api/documents/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form(pdf_bytes(), "t4-2024.pdf", "application/pdf"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["saved"], false);

        let document = &body["document"];
        assert_eq!(document["file_name"], "t4-2024.pdf");
        assert_eq!(document["mime_type"], "application/pdf");
        assert_eq!(document["document_type"], "t4");
        assert_eq!(document["tax_year"], 2024);
        assert_eq!(document["issuer"], "Maple Leaf Inc.");
        assert_eq!(document["extracted_fields"]["14"], "52000.00");
        assert!(document.get("storage_path").is_none());

        assert_eq!(upstream.storage_hits(), 1);
        assert_eq!(upstream.llm_hits(), 1);
    }

    #[tokio::test]
    async fn test_analyze_document_without_token() {
        let (server, upstream) = create_test_server().await;

        let response = server
            .post("/api/documents/analyze")
            .multipart(form(pdf_bytes(), "t4.pdf", "application/pdf"))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(upstream.storage_hits(), 0);
    }

    #[tokio::test]
    async fn test_analyze_document_rejects_oversized_file() {
        let (server, upstream) = create_test_server().await;
        let mut bytes = pdf_bytes();
        bytes.resize(MAX_UPLOAD_BYTES + 1, b' ');

        let response = server
            .post("/api/documents/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form(bytes, "huge.pdf", "application/pdf"))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid file upload");
        assert_eq!(upstream.storage_hits(), 0);
        assert_eq!(upstream.llm_hits(), 0);
    }

    #[tokio::test]
    async fn test_analyze_document_rejects_unsupported_type() {
        let (server, upstream) = create_test_server().await;

        let response = server
            .post("/api/documents/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form(b"box 14: 52000".to_vec(), "t4.txt", "text/plain"))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(
            body["details"]
                .as_str()
                .is_some_and(|d| d.contains("unsupported file type"))
        );
        assert_eq!(upstream.llm_hits(), 0);
    }

    #[tokio::test]
    async fn test_analyze_document_rejects_disguised_file() {
        let (server, upstream) = create_test_server().await;

        let response = server
            .post("/api/documents/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form(png_bytes(), "slip.pdf", "application/pdf"))
            .await;

        response.assert_status_bad_request();
        assert_eq!(upstream.storage_hits(), 0);
    }

    #[tokio::test]
    async fn test_analyze_document_requires_file_field() {
        let (server, _) = create_test_server().await;
        let form = MultipartForm::new().add_text("note", "no file here");

        let response = server
            .post("/api/documents/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form)
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_analyze_document_llm_failure() {
        let (server, upstream) = create_test_server().await;
        upstream.fail_llm();

        let response = server
            .post("/api/documents/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form(png_bytes(), "receipt.png", "image/png"))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        // il file già caricato viene rimosso dal bucket
        assert_eq!(upstream.storage_hits(), 2);
        assert_eq!(upstream.storage_deletes(), 1);
    }

    // ============================================================
    // Test per POST /api/letters/analyze - analyze_letter
    // ============================================================

    #[tokio::test]
    async fn test_analyze_letter_success() {
        let (server, upstream) = create_test_server().await;

        let response = server
            .post("/api/letters/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form(png_bytes(), "letter.png", "image/png"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["saved"], false);

        let letter = &body["letter"];
        assert_eq!(letter["letter_type"], "notice_of_reassessment");
        assert_eq!(letter["urgency"], "medium");
        assert_eq!(letter["deadlines"][0]["date"], "2099-03-31");
        assert_eq!(letter["amounts"][0]["value"], 1250.0);
        assert_eq!(
            letter["summary"],
            "Your 2023 return was reassessed and you owe $1,250.00."
        );
        assert_eq!(
            letter["explanation"],
            "The CRA changed your 2023 return after a review."
        );

        assert_eq!(upstream.storage_hits(), 1);
    }

    #[tokio::test]
    async fn test_analyze_letter_llm_failure_removes_upload() {
        let (server, upstream) = create_test_server().await;
        upstream.fail_llm();

        let response = server
            .post("/api/letters/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form(pdf_bytes(), "reassessment.pdf", "application/pdf"))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["error"], "AI service is temporarily unavailable");
        assert_eq!(upstream.llm_hits(), 1);
        assert_eq!(upstream.storage_deletes(), 1);
    }

    #[tokio::test]
    async fn test_analyze_document_success_keeps_upload() {
        let (server, upstream) = create_test_server().await;

        server
            .post("/api/documents/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form(pdf_bytes(), "t5.pdf", "application/pdf"))
            .await
            .assert_status_ok();

        assert_eq!(upstream.storage_deletes(), 0);
    }

    #[tokio::test]
    async fn test_analyze_letter_rejects_empty_file() {
        let (server, upstream) = create_test_server().await;

        let response = server
            .post("/api/letters/analyze")
            .add_header(authorization(), bearer(Uuid::new_v4()))
            .multipart(form(Vec::new(), "letter.pdf", "application/pdf"))
            .await;

        response.assert_status_bad_request();
        assert_eq!(upstream.llm_hits(), 0);
    }
}
