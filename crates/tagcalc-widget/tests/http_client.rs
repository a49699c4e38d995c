use std::error::Error;
use std::thread;
use std::time::Duration;

use tagcalc_widget::{
    Candidate, Editor, HttpSuggestionClient, ManualClock, SequenceFallback, SuggestError,
    SuggestionView, WidgetConfig,
};
use tiny_http::{Header, Response, Server};

fn serve_once(
    status: u16,
    body: &'static str,
) -> Result<(String, thread::JoinHandle<String>), Box<dyn Error>> {
    let server = Server::http("127.0.0.1:0").map_err(|e| -> Box<dyn Error> { e })?;
    let url = format!("http://{}/autocomplete", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let requested = request.url().to_string();
        let response = Response::from_string(body)
            .with_status_code(status)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
        requested
    });

    Ok((url, handle))
}

#[tokio::test]
async fn fetch_sends_search_parameter_and_decodes_candidates() -> Result<(), Box<dyn Error>> {
    let (url, handle) = serve_once(
        200,
        r#"[{"id":"1","name":"Revenue","value":120},{"id":"2","name":"Rent"}]"#,
    )?;

    let client = HttpSuggestionClient::new(url, Duration::from_secs(2))?;
    let candidates = client.fetch("re").await?;

    assert_eq!(
        candidates,
        vec![
            Candidate::new("1", "Revenue", Some(120.0)),
            Candidate::new("2", "Rent", None),
        ]
    );
    assert_eq!(
        handle.join().expect("server thread should join"),
        "/autocomplete?search=re"
    );
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_reported() -> Result<(), Box<dyn Error>> {
    let (url, handle) = serve_once(404, r#""Not found""#)?;

    let client = HttpSuggestionClient::new(url, Duration::from_secs(2))?;
    assert_eq!(client.fetch("zzz").await, Err(SuggestError::Status(404)));

    handle.join().expect("server thread should join");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() -> Result<(), Box<dyn Error>> {
    let (url, handle) = serve_once(200, r#"{"unexpected":true}"#)?;

    let client = HttpSuggestionClient::new(url, Duration::from_secs(2))?;
    assert!(matches!(client.fetch("rev").await, Err(SuggestError::Decode(_))));

    handle.join().expect("server thread should join");
    Ok(())
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() -> Result<(), Box<dyn Error>> {
    let client =
        HttpSuggestionClient::new("http://127.0.0.1:1/autocomplete", Duration::from_millis(200))?;
    assert!(matches!(client.fetch("rev").await, Err(SuggestError::Transport(_))));
    Ok(())
}

#[tokio::test]
async fn editor_round_trip_through_http() -> Result<(), Box<dyn Error>> {
    let (url, handle) = serve_once(200, r#"[{"id":"r1","name":"Revenue","value":5}]"#)?;

    let mut editor = Editor::with_sources(
        WidgetConfig {
            suggestion_url: url,
            ..WidgetConfig::default()
        },
        SequenceFallback::new(vec![1.0]),
        ManualClock::new(0.0),
    );
    let client = HttpSuggestionClient::from_config(editor.config())?;

    editor.input("2");
    editor.key(tagcalc_widget::Key::parse("+"));
    let request = editor.input("rev").expect("typing should request suggestions");
    let result = client.fetch(&request.query).await;
    assert!(editor.receive_suggestions(&request, result));

    let candidate = match editor.suggestions() {
        SuggestionView::Ready(candidates) => candidates[0].clone(),
        other => panic!("expected suggestions, got {other:?}"),
    };
    editor.accept_suggestion(&candidate);

    assert_eq!(editor.formula().expression(), "2+5");
    assert_eq!(editor.calculate(), Some(7.0));

    handle.join().expect("server thread should join");
    Ok(())
}
