mod common;

use std::sync::atomic::Ordering;

use adalat::{api::create_router, AppState};
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use common::{indexed_state, test_state, MockLLMClient};

fn server_for(state: AppState) -> TestServer {
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

async fn indexed_server(dir: &TempDir, llm: MockLLMClient) -> TestServer {
    server_for(indexed_state(dir.path(), llm).await)
}

// ============= Health and UI =============

#[tokio::test]
async fn test_health_degraded_without_index() {
    let dir = TempDir::new().unwrap();
    let server = server_for(test_state(dir.path(), MockLLMClient::new("ok")));

    let response = server.get("/api/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["vector_store_ready"], false);
    assert_eq!(body["document_count"], 0);
    assert_eq!(body["llm_model"], "mock-model");
}

#[tokio::test]
async fn test_health_ok_after_build() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    let body: Value = server.get("/api/health").await.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["vector_store_ready"], true);
    // Three overviews plus four sections
    assert_eq!(body["document_count"], 7);
}

#[tokio::test]
async fn test_index_page_served() {
    let dir = TempDir::new().unwrap();
    let server = server_for(test_state(dir.path(), MockLLMClient::new("ok")));

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("Adalat"));
}

#[tokio::test]
async fn test_openapi_document() {
    let dir = TempDir::new().unwrap();
    let server = server_for(test_state(dir.path(), MockLLMClient::new("ok")));

    let response = server.get("/api/openapi.json").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/api/chat"].is_object());
    assert!(body["paths"]["/api/index/build"].is_object());
}

// ============= Chat =============

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    let response = server
        .post("/api/chat")
        .json(&json!({ "message": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_chat_without_index_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let server = server_for(test_state(dir.path(), MockLLMClient::new("ok")));

    let response = server
        .post("/api/chat")
        .json(&json!({ "message": "What is theft?" }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_chat_rejects_bad_top_k_and_strategy() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    server
        .post("/api/chat")
        .json(&json!({ "message": "theft", "top_k": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .post("/api/chat")
        .json(&json!({ "message": "theft", "top_k": 21 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .post("/api/chat")
        .json(&json!({ "message": "theft", "strategy": "fuzzy" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_answers_and_records_conversation() {
    let dir = TempDir::new().unwrap();
    let llm = MockLLMClient::new("Theft is punishable under section 379.");
    let server = indexed_server(&dir, llm.clone()).await;

    let response = server
        .post("/api/chat")
        .json(&json!({
            "message": "What is the punishment for theft?",
            "mode": "lawyer",
            "top_k": 3
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["response"], "Theft is punishable under section 379.");
    assert_eq!(body["mode"], "lawyer");
    let sources = body["sources"].as_array().unwrap();
    assert!(!sources.is_empty() && sources.len() <= 3);

    let prompt = llm.last_prompt().expect("LLM was called");
    assert!(prompt.contains("What is the punishment for theft?"));

    let conversation_id = body["conversation_id"].as_str().unwrap().to_string();
    let history: Value = server
        .get(&format!("/api/conversations/{}", conversation_id))
        .await
        .json();
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert!(messages[1]["sources"].is_array());

    // Follow-up includes the earlier turn in the prompt
    server
        .post("/api/chat")
        .json(&json!({
            "message": "And for robbery?",
            "conversation_id": conversation_id
        }))
        .await
        .assert_status_ok();
    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.contains("What is the punishment for theft?"));
    assert!(prompt.contains("And for robbery?"));

    server
        .delete(&format!("/api/conversations/{}", conversation_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/conversations/{}", conversation_id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_chat_unknown_mode_falls_back_to_general() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    let body: Value = server
        .post("/api/chat")
        .json(&json!({ "message": "working hours", "mode": "pirate" }))
        .await
        .json();
    assert_eq!(body["mode"], "general");
}

#[tokio::test]
async fn test_chat_llm_failure_is_folded_into_reply() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::failing()).await;

    let response = server
        .post("/api/chat")
        .json(&json!({ "message": "What is theft?" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["response"].as_str().unwrap().contains("Mock LLM failure"));
}

#[tokio::test]
async fn test_chat_empty_llm_reply() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("  ")).await;

    let body: Value = server
        .post("/api/chat")
        .json(&json!({ "message": "What is theft?" }))
        .await
        .json();
    assert_eq!(
        body["response"],
        adalat::rag::assistant::EMPTY_RESPONSE_REPLY
    );
}

#[tokio::test]
async fn test_unknown_conversation_delete_is_404() {
    let dir = TempDir::new().unwrap();
    let server = server_for(test_state(dir.path(), MockLLMClient::new("ok")));

    server
        .delete("/api/conversations/missing")
        .await
        .assert_status_not_found();
}

// ============= Search =============

#[tokio::test]
async fn test_search_with_filters() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    let response = server
        .post("/api/search")
        .json(&json!({
            "query": "income tax assessment",
            "top_k": 5,
            "filters": { "is_repealed": true }
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let results = body["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert_eq!(body["total"], results.len());
    assert_eq!(body["strategy"], "semantic");
    for hit in results {
        assert_eq!(hit["metadata"]["is_repealed"], true);
        assert_eq!(hit["metadata"]["act_id"], "2");
    }
}

#[tokio::test]
async fn test_search_bm25_ranks_keyword_match_first() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    let body: Value = server
        .post("/api/search")
        .json(&json!({ "query": "robbery extortion", "strategy": "bm25" }))
        .await
        .json();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["chunk_id"], "1_section_2");
}

#[tokio::test]
async fn test_search_rejects_empty_query() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    server
        .post("/api/search")
        .json(&json!({ "query": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============= Corpus =============

#[tokio::test]
async fn test_stats_after_build() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    let body: Value = server.get("/api/stats").await.json();
    assert_eq!(body["total_acts"], 3);
    assert_eq!(body["total_chunks"], 7);
    assert_eq!(body["active_acts"], 2);
    assert_eq!(body["repealed_acts"], 1);
    assert_eq!(body["years_coverage"]["earliest"], 1860);
    assert_eq!(body["years_coverage"]["latest"], 2006);
}

#[tokio::test]
async fn test_recent_acts_newest_first() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    let body: Value = server.get("/api/acts/recent?limit=2").await.json();
    let acts = body.as_array().unwrap();
    assert_eq!(acts.len(), 2);
    assert_eq!(acts[0]["act_title"], "The Labour Act");
    assert_eq!(acts[1]["act_title"], "The Income Tax Ordinance");
}

#[tokio::test]
async fn test_topics() {
    let dir = TempDir::new().unwrap();
    let server = indexed_server(&dir, MockLLMClient::new("ok")).await;

    let body: Value = server.get("/api/topics").await.json();
    let topics = body.as_array().unwrap();
    let criminal = topics.iter().find(|t| t["slug"] == "criminal").unwrap();
    assert_eq!(criminal["count"], 1);

    let body: Value = server.get("/api/topics/tax").await.json();
    assert_eq!(body["name"], "Tax Law");
    assert_eq!(body["total"], 1);
    assert_eq!(body["acts"][0]["act_id"], "2");

    server
        .get("/api/topics/maritime")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_modes_listed() {
    let dir = TempDir::new().unwrap();
    let server = server_for(test_state(dir.path(), MockLLMClient::new("ok")));

    let body: Value = server.get("/api/modes").await.json();
    let modes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["mode"].as_str().unwrap())
        .collect();
    assert_eq!(modes, ["general", "lawyer", "argument", "research", "simple"]);
}

// ============= Index build =============

#[tokio::test]
async fn test_build_index_endpoint() {
    let dir = TempDir::new().unwrap();
    let server = server_for(test_state(dir.path(), MockLLMClient::new("ok")));

    let response = server.post("/api/index/build").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["acts"], 3);
    assert_eq!(body["chunks"], 7);

    assert!(dir.path().join("data/processed_documents.json").exists());
    assert!(dir.path().join("vectorstore").is_dir());
}

#[tokio::test]
async fn test_build_index_conflict_while_running() {
    let dir = TempDir::new().unwrap();
    let state = test_state(dir.path(), MockLLMClient::new("ok"));
    state.building.store(true, Ordering::SeqCst);
    let server = server_for(state.clone());

    server
        .post("/api/index/build")
        .await
        .assert_status(StatusCode::CONFLICT);
    // The running build still owns the flag
    assert!(state.building.load(Ordering::SeqCst));
}
