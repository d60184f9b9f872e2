//! End-to-end test of the chat loop: config -> engine -> mock OpenAI endpoint

use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use travel_agent::config::Config;
use travel_agent::handlers::build_engine;
use travel_agent::repl::{Repl, BANNER_TITLE, FAREWELL};

#[tokio::test]
async fn test_chat_session_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Que tal Florianópolis?"}}]
        })))
        .mount(&server)
        .await;

    std::env::set_var("TRAVEL_AGENT_REPL_IT_KEY", "repl-key");
    let mut config = Config::default();
    config.llm.openai.base_url = server.uri();
    config.llm.openai.api_key_env = "TRAVEL_AGENT_REPL_IT_KEY".to_string();

    let engine = build_engine(&config).unwrap();
    let repl = Repl::new(&engine, "user_session", config.agent.exit_keywords.clone());

    let mut out = Vec::new();
    repl.run(&b"Quero praia no Brasil\nSAIR\n"[..], &mut out)
        .await
        .unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.starts_with(BANNER_TITLE));
    assert!(out.contains("Você: "));
    assert!(out.contains("Agente: Que tal Florianópolis?"));
    assert!(out.trim_end().ends_with(FAREWELL));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("Viagens dos Sonhos"));
    assert_eq!(body["messages"][1]["content"], "Quero praia no Brasil");

    assert_eq!(engine.store().transcript("user_session").await.len(), 2);
}

#[tokio::test]
async fn test_missing_key_is_reported_and_loop_survives() {
    let server = MockServer::start().await;

    let mut config = Config::default();
    config.llm.openai.base_url = server.uri();
    config.llm.openai.api_key_env = "TRAVEL_AGENT_REPL_IT_KEY_NEVER_SET".to_string();

    let engine = build_engine(&config).unwrap();
    let repl = Repl::new(&engine, "user_session", config.agent.exit_keywords.clone());

    let mut out = Vec::new();
    repl.run(&b"Oi\nOi de novo\nquit\n"[..], &mut out)
        .await
        .unwrap();
    let out = String::from_utf8(out).unwrap();

    assert_eq!(out.matches("Erro: Authentication failed").count(), 2);
    assert!(out.contains("Verifique se sua chave da OpenAI está configurada"));
    // The error line names the configured variable, not the default one
    assert!(out.contains("environment variable TRAVEL_AGENT_REPL_IT_KEY_NEVER_SET is not set"));
    assert!(!out.contains("OPENAI_API_KEY"));
    assert!(out.trim_end().ends_with(FAREWELL));
    assert!(engine.store().transcript("user_session").await.is_empty());
}
