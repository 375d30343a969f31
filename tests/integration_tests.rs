mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{
    app_with, broken_analyzer, get, keyword_analyzer, post_json, rejecting_analyzer, tokenizer_analyzer, TOKEN_WINDOW,
};
use sentimento::api::schemas::{STATUS_MODEL_LOADED, STATUS_MODEL_MISSING};
use sentimento::db::AnalysisRepository;

#[tokio::test]
async fn test_health_check_with_model() {
    let (app, _pool) = app_with(Some(keyword_analyzer())).await;

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": STATUS_MODEL_LOADED }));
}

#[tokio::test]
async fn test_health_check_without_model() {
    let (app, _pool) = app_with(None).await;

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], STATUS_MODEL_MISSING);
}

#[tokio::test]
async fn test_positive_text() {
    let (app, _pool) = app_with(Some(keyword_analyzer())).await;

    let (status, body) = post_json(
        &app,
        "/analisar-sentimento",
        json!({ "texto": "Este produto é maravilhoso, recomendo!" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentimento"], "positivo");
    let confianca = body["confianca"].as_f64().unwrap();
    assert!(confianca > 0.0 && confianca <= 1.0);
}

#[tokio::test]
async fn test_negative_text() {
    let (app, _pool) = app_with(Some(keyword_analyzer())).await;

    let (status, body) = post_json(
        &app,
        "/analisar-sentimento",
        json!({ "texto": "Odeio este serviço, a entrega foi péssima." }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentimento"], "negativo");
}

#[tokio::test]
async fn test_response_has_only_label_and_confidence() {
    let (app, _pool) = app_with(Some(keyword_analyzer())).await;

    let (_, body) = post_json(&app, "/analisar-sentimento", json!({ "texto": "Chegou ontem." })).await;
    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(body["sentimento"], "neutro");
}

#[tokio::test]
async fn test_analysis_is_recorded_in_history() {
    let (app, _pool) = app_with(Some(keyword_analyzer())).await;
    let texto = "Atendimento excelente e entrega rápida";

    let (_, analysis) = post_json(&app, "/analisar-sentimento", json!({ "texto": texto })).await;
    let (status, history) = get(&app, "/historico").await;

    assert_eq!(status, StatusCode::OK);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry["texto"], texto);
    assert_eq!(entry["sentimento"], analysis["sentimento"]);
    assert_eq!(entry["confianca"], analysis["confianca"]);
    assert!(entry["id"].as_i64().unwrap() >= 1);
    assert!(entry["data_analise"].is_string());
}

#[tokio::test]
async fn test_history_is_capped_and_newest_first() {
    let (app, _pool) = app_with(Some(keyword_analyzer())).await;

    for i in 0..12 {
        let (status, _) = post_json(&app, "/analisar-sentimento", json!({ "texto": format!("Texto {}", i) })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, history) = get(&app, "/historico").await;
    let textos: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["texto"].as_str().unwrap())
        .collect();

    let expected: Vec<String> = (2..12).rev().map(|i| format!("Texto {}", i)).collect();
    assert_eq!(textos, expected);
}

#[tokio::test]
async fn test_empty_history() {
    let (app, _pool) = app_with(Some(keyword_analyzer())).await;

    let (status, history) = get(&app, "/historico").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_degraded_mode_answers_without_persisting() {
    let (app, pool) = app_with(None).await;

    let (status, body) = post_json(&app, "/analisar-sentimento", json!({ "texto": "Qualquer coisa" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "sentimento": "erro", "confianca": 0.0 }));

    let (_, history) = get(&app, "/historico").await;
    assert_eq!(history, json!([]));

    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(AnalysisRepository::count(&mut conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_degraded_mode_still_validates() {
    let (app, _pool) = app_with(None).await;

    let (status, body) = post_json(&app, "/analisar-sentimento", json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "texto"]));
}

#[tokio::test]
async fn test_text_longer_than_token_window_is_classified() {
    let (app, pool) = app_with(Some(tokenizer_analyzer())).await;
    // one token per character under a whitespace pre-tokenizer
    let texto = "a!".repeat(250);
    assert_eq!(texto.chars().count(), 500);

    let (status, body) = post_json(&app, "/analisar-sentimento", json!({ "texto": texto })).await;
    assert_eq!(status, StatusCode::OK);
    let confianca = body["confianca"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confianca));

    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(AnalysisRepository::count(&mut conn).await.unwrap(), 1);
}

#[tokio::test]
async fn test_only_leading_tokens_are_classified() {
    let (app, _pool) = app_with(Some(tokenizer_analyzer())).await;
    let texto = format!("{}{}", "bom ".repeat(TOKEN_WINDOW), "ruim ".repeat(TOKEN_WINDOW * 2));

    let (status, body) = post_json(&app, "/analisar-sentimento", json!({ "texto": texto })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentimento"], "positivo");
}

#[tokio::test]
async fn test_text_without_tokens_is_classified() {
    let (app, _pool) = app_with(Some(tokenizer_analyzer())).await;

    let (status, body) = post_json(&app, "/analisar-sentimento", json!({ "texto": "   " })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentimento"], "neutro");
}

#[tokio::test]
async fn test_text_the_model_rejects() {
    let (app, pool) = app_with(Some(rejecting_analyzer())).await;

    let (status, body) = post_json(&app, "/analisar-sentimento", json!({ "texto": "longo demais" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "value_error");
    assert_eq!(body["detail"][0]["loc"], json!(["body", "texto"]));

    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(AnalysisRepository::count(&mut conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_inference_failure_is_internal_error() {
    let (app, pool) = app_with(Some(broken_analyzer())).await;

    let (status, body) = post_json(&app, "/analisar-sentimento", json!({ "texto": "Tanto faz" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "Internal Server Error" }));

    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(AnalysisRepository::count(&mut conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_unavailable() {
    let (app, pool) = app_with(Some(keyword_analyzer())).await;
    pool.close().await;

    let (status, body) = get(&app, "/historico").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Internal Server Error");

    let (status, _) = post_json(&app, "/analisar-sentimento", json!({ "texto": "Muito bom, recomendo" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _pool) = app_with(None).await;

    let (status, _) = get(&app, "/inexistente").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
