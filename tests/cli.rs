use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn turnloop(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("turnloop").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("OCTOAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_tools_lists_descriptors() {
    let dir = TempDir::new().unwrap();
    turnloop(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"getCurrentWeather\""))
        .stdout(predicate::str::contains("\"brave_search\""))
        .stdout(predicate::str::contains("\"required\""));
}

#[test]
fn test_call_calculator() {
    let dir = TempDir::new().unwrap();
    turnloop(&dir)
        .args(["call", "calculator", r#"{"expression":"2+2"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"result\":4"));
}

#[test]
fn test_call_weather() {
    let dir = TempDir::new().unwrap();
    turnloop(&dir)
        .args([
            "call",
            "getCurrentWeather",
            r#"{"location":"Boston","unit":"fahrenheit"}"#,
        ])
        .assert()
        .success()
        .stdout("sunny with a high of 75°F.\n");
}

#[test]
fn test_call_unknown_tool_fails() {
    let dir = TempDir::new().unwrap();
    turnloop(&dir)
        .args(["call", "serchWeb", r#"{"query":"x"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tool not found: serchWeb"))
        .stderr(predicate::str::contains("searchWeb"));
}

#[test]
fn test_call_with_bad_json_fails() {
    let dir = TempDir::new().unwrap();
    turnloop(&dir)
        .args(["call", "calculator", "{expression"])
        .assert()
        .failure();
}

#[test]
fn test_ask_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    turnloop(&dir)
        .args(["ask", "What's the weather like in Boston today?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OCTOAI_API_KEY"));
}

#[test]
fn test_ask_rejects_broken_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("turnloop.toml"), "[driver]\nmax_turns = 0\n").unwrap();
    turnloop(&dir)
        .env("OCTOAI_API_KEY", "test-key")
        .args(["ask", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_turns"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ask_runs_tool_loop_against_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "getCurrentWeather",
                            "arguments": "{\"location\":\"Boston\",\"unit\":\"fahrenheit\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Sunny, 75°F in Boston."},
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        turnloop(&dir)
            .env("OCTOAI_API_KEY", "test-key")
            .args(["ask", "--base-url", uri.as_str(), "What's the weather like in Boston today?"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Sunny, 75°F in Boston."
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}
