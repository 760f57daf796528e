//! End-to-end pipeline tests against mocked OpenAI and Pinecone endpoints.
//!
//! Each test stands up the real ingestion and retrieval services and drives
//! them through HTTP mocks, asserting on the wire traffic as well as the
//! returned values.

use httpmock::{Method::GET, Method::POST, MockServer};
use loreforge::{
    config::Config,
    embedding::{EmbeddingClient, OpenAiEmbeddingClient},
    ingest::{IngestService, PlainTextExtractor},
    pinecone::PineconeService,
    prompt::{PromptAssembler, templates},
    retrieval::{ContextProvider, RetrievalService},
};
use std::io::Write;
use std::sync::Arc;

const INDEX: &str = "agentic-tabletop";

fn pipeline_config(openai: &MockServer, pinecone: &MockServer) -> Config {
    Config {
        rag_enabled: true,
        pinecone_api_key: "test-pinecone-key".into(),
        pinecone_api_base: pinecone.base_url(),
        pinecone_index_name: INDEX.into(),
        pinecone_cloud: "aws".into(),
        pinecone_region: "us-east-1".into(),
        openai_api_key: "test-openai-key".into(),
        openai_api_base: openai.base_url(),
        embedding_model: "text-embedding-3-small".into(),
        embedding_dimension: 4,
        retrieval_top_k: 3,
        retrieval_max_context_chars: 8000,
        chunk_size: 5,
        stride: 2,
        rules_namespace: "campaign-rules".into(),
        setting_namespace: "campaign-setting".into(),
        character_namespace: "campaign-characters".into(),
    }
}

async fn mock_ready_index(pinecone: &MockServer) -> httpmock::Mock<'_> {
    pinecone
        .mock_async(|when, then| {
            when.method(GET).path(format!("/indexes/{INDEX}"));
            then.status(200).json_body(serde_json::json!({
                "name": INDEX,
                "dimension": 4,
                "metric": "cosine",
                "host": pinecone.base_url(),
                "status": { "ready": true, "state": "Ready" }
            }));
        })
        .await
}

/// Write a document whose cleanup produces exactly five lines (three
/// paragraphs separated by blanks), which at chunk size 5 yields one chunk.
fn write_sourcebook(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("book.txt");
    let mut file = std::fs::File::create(&path).expect("create sourcebook");
    write!(
        file,
        "Stone golems guard the vault.\n\nDragons hoard gold.\n\nThe wards fail at dusk.\n"
    )
    .expect("write sourcebook");
    path
}

#[tokio::test]
async fn ingest_then_retrieve_round_trip() {
    let openai = MockServer::start_async().await;
    let pinecone = MockServer::start_async().await;
    let config = pipeline_config(&openai, &pinecone);

    let describe = mock_ready_index(&pinecone).await;
    let embed_document = openai.mock_async(|when, then| {
        when.method(POST)
            .path("/embeddings")
            .body_contains("Stone golems");
        then.status(200).json_body(serde_json::json!({
            "data": [ { "index": 0, "embedding": [0.1, 0.2, 0.3, 0.4] } ]
        }));
    })
    .await;
    let upsert = pinecone.mock_async(|when, then| {
        when.method(POST)
            .path("/vectors/upsert")
            .body_contains("book_1")
            .json_body_partial(r#"{ "namespace": "campaign-rules" }"#);
        then.status(200)
            .json_body(serde_json::json!({ "upsertedCount": 1 }));
    })
    .await;

    let dir = tempfile::tempdir().expect("temp dir");
    let document = write_sourcebook(&dir);

    let pinecone_service = Arc::new(PineconeService::new(&config).expect("pinecone client"));
    let embedding: Arc<dyn EmbeddingClient> =
        Arc::new(OpenAiEmbeddingClient::new(&config).expect("embedding client"));
    let ingest = IngestService::new(
        config.clone(),
        Box::new(PlainTextExtractor::new()),
        Arc::clone(&embedding),
        Arc::clone(&pinecone_service),
    );

    let outcome = ingest
        .upsert_document(&document, "campaign-rules", None)
        .await
        .expect("ingest");
    assert_eq!(outcome.doc_id_prefix, "book");
    assert_eq!(outcome.chunk_count, 1);
    assert_eq!(outcome.vectors_upserted, 1);

    // Re-ingesting the same document reuses the same ids (overwrite, not
    // accumulate) and is served from the readiness cache.
    ingest
        .upsert_document(&document, "campaign-rules", None)
        .await
        .expect("re-ingest");
    upsert.assert_hits(2);
    embed_document.assert_hits(2);
    describe.assert_hits(1);

    let snapshot = ingest.metrics_snapshot();
    assert_eq!(snapshot.documents_ingested, 2);
    assert_eq!(snapshot.vectors_upserted, 2);

    // Retrieval over the same namespace.
    let embed_query = openai.mock_async(|when, then| {
        when.method(POST)
            .path("/embeddings")
            .body_contains("vault guardians");
        then.status(200).json_body(serde_json::json!({
            "data": [ { "index": 0, "embedding": [0.1, 0.2, 0.3, 0.4] } ]
        }));
    })
    .await;
    let query = pinecone.mock_async(|when, then| {
        when.method(POST)
            .path("/query")
            .json_body_partial(r#"{ "namespace": "campaign-rules", "topK": 3 }"#);
        then.status(200).json_body(serde_json::json!({
            "matches": [
                {
                    "id": "book_1",
                    "score": 0.93,
                    "metadata": {
                        "text": "Stone golems guard the vault.",
                        "source": "book.txt",
                        "chunk_index": 1
                    }
                }
            ]
        }));
    })
    .await;

    let retrieval = RetrievalService::new(config, embedding, pinecone_service);
    let context = retrieval
        .retrieve_context("vault guardians", "campaign-rules")
        .await
        .expect("retrieve");
    embed_query.assert();
    query.assert();
    assert_eq!(context, "Stone golems guard the vault.");
}

#[tokio::test]
async fn retrieval_budget_joins_matches_with_dividers() {
    let openai = MockServer::start_async().await;
    let pinecone = MockServer::start_async().await;
    let config = pipeline_config(&openai, &pinecone);

    mock_ready_index(&pinecone).await;
    openai.mock_async(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(200).json_body(serde_json::json!({
            "data": [ { "index": 0, "embedding": [0.0, 0.0, 0.0, 1.0] } ]
        }));
    })
    .await;
    pinecone.mock_async(|when, then| {
        when.method(POST).path("/query");
        then.status(200).json_body(serde_json::json!({
            "matches": [
                {
                    "id": "book_1",
                    "score": 0.9,
                    "metadata": { "text": "first passage", "source": "book.txt", "chunk_index": 1 }
                },
                {
                    "id": "book_2",
                    "score": 0.8,
                    "metadata": { "text": "second passage", "source": "book.txt", "chunk_index": 2 }
                }
            ]
        }));
    })
    .await;

    let pinecone_service = Arc::new(PineconeService::new(&config).expect("pinecone client"));
    let embedding: Arc<dyn EmbeddingClient> =
        Arc::new(OpenAiEmbeddingClient::new(&config).expect("embedding client"));
    let retrieval = RetrievalService::new(config, embedding, pinecone_service);

    let context = retrieval
        .retrieve_context("passages", "campaign-rules")
        .await
        .expect("retrieve");
    assert_eq!(context, "first passage\n---\nsecond passage");
}

#[tokio::test]
async fn empty_namespace_falls_back_to_base_prompt() {
    let openai = MockServer::start_async().await;
    let pinecone = MockServer::start_async().await;
    let config = pipeline_config(&openai, &pinecone);

    mock_ready_index(&pinecone).await;
    openai.mock_async(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(200).json_body(serde_json::json!({
            "data": [ { "index": 0, "embedding": [0.5, 0.5, 0.5, 0.5] } ]
        }));
    })
    .await;
    let query = pinecone.mock_async(|when, then| {
        when.method(POST)
            .path("/query")
            .json_body_partial(r#"{ "namespace": "campaign-setting" }"#);
        then.status(200)
            .json_body(serde_json::json!({ "matches": [] }));
    })
    .await;

    let pinecone_service = Arc::new(PineconeService::new(&config).expect("pinecone client"));
    let embedding: Arc<dyn EmbeddingClient> =
        Arc::new(OpenAiEmbeddingClient::new(&config).expect("embedding client"));
    let retrieval: Arc<dyn ContextProvider> = Arc::new(RetrievalService::new(
        config.clone(),
        embedding,
        pinecone_service,
    ));

    let assembler = PromptAssembler::new(&config, retrieval);
    let template = templates::storyteller();
    let prompt = assembler
        .assemble(&template, Some("campaign-setting"), "a forgotten empire")
        .await;

    query.assert();
    assert_eq!(prompt, template.base);
}

#[tokio::test]
async fn retrieval_against_missing_index_yields_empty_context() {
    let openai = MockServer::start_async().await;
    let pinecone = MockServer::start_async().await;
    let config = pipeline_config(&openai, &pinecone);

    pinecone.mock_async(|when, then| {
        when.method(GET).path(format!("/indexes/{INDEX}"));
        then.status(404).body("not found");
    })
    .await;
    openai.mock_async(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(200).json_body(serde_json::json!({
            "data": [ { "index": 0, "embedding": [1.0, 0.0, 0.0, 0.0] } ]
        }));
    })
    .await;

    let pinecone_service = Arc::new(PineconeService::new(&config).expect("pinecone client"));
    let embedding: Arc<dyn EmbeddingClient> =
        Arc::new(OpenAiEmbeddingClient::new(&config).expect("embedding client"));
    let retrieval = RetrievalService::new(config, embedding, pinecone_service);

    let context = retrieval
        .retrieve_context("anything", "campaign-rules")
        .await
        .expect("missing index is not an error");
    assert_eq!(context, "");
}
