use askdocs_client::{MockBackend, ReplyGate};
use askdocs_core::{ChatConfig, Citation, ConversationError, DeliveryState, Project, ProjectId, Role};
use askdocs_ui::{ControllerEvent, ConversationController, ConversationStatus, DocumentPanel, Signal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

type Events = UnboundedReceiver<ControllerEvent>;

fn project(id: &str, name: &str) -> Project {
    Project { id: ProjectId::new(id), name: name.to_string(), description: String::new() }
}

fn seeded() -> MockBackend {
    MockBackend::new()
        .with_project("p1", "Policies")
        .with_project("p2", "Handbook")
        .with_document("p1", "d1", "PolicyDoc.pdf")
        .with_document("p2", "d2", "handbook.md")
}

fn start(backend: MockBackend) -> (ConversationController, Events) {
    ConversationController::new(Arc::new(backend), &ChatConfig::default(), Default::default())
}

async fn next_event(rx: &mut Events) -> ControllerEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("controller event in time")
        .expect("channel open")
}

async fn pump(controller: &mut ConversationController, rx: &mut Events, count: usize) {
    for _ in 0..count {
        let event = next_event(rx).await;
        let _ = controller.handle_event(event);
    }
}

async fn open(backend: MockBackend, id: &str, name: &str) -> (ConversationController, Events) {
    let (mut controller, mut rx) = start(backend);
    controller.activate_project(project(id, name));
    pump(&mut controller, &mut rx, 2).await;
    (controller, rx)
}

#[tokio::test]
async fn test_cited_answer_links_marker_to_document() {
    let backend = seeded();
    backend.push_answer(
        "Refunds: see PolicyDoc.",
        vec![Citation::new("d1").with_title("PolicyDoc").with_snippet("30 days...")],
    );
    let (mut controller, mut rx) = open(backend, "p1", "Policies").await;
    assert_eq!(controller.status(), ConversationStatus::Ready);

    controller.send_message("What is the refund policy?").unwrap();
    assert_eq!(controller.status(), ConversationStatus::Answering);
    pump(&mut controller, &mut rx, 1).await;

    let log = controller.log();
    assert_eq!(log.len(), 2);
    assert_eq!(log.get(0).unwrap().state, DeliveryState::Confirmed);
    assert_eq!(log.get(1).unwrap().role, Role::Assistant);

    let linked = controller.linked(1).unwrap();
    let references: Vec<_> = linked.references().collect();
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].document_id.as_ref().map(|d| d.as_str()), Some("d1"));
    assert_eq!(references[0].matched, "PolicyDoc");
    assert_eq!(linked.source_text(), "Refunds: see PolicyDoc.");
}

#[tokio::test]
async fn test_second_send_while_waiting_is_busy() {
    let (backend, gate): (MockBackend, ReplyGate) = seeded().gated();
    backend.push_answer("first", Vec::new());
    let probe = backend.clone();
    let (mut controller, mut rx) = open(backend, "p1", "Policies").await;

    controller.send_message("one").unwrap();
    assert_eq!(controller.send_message("two"), Err(ConversationError::Busy));
    assert_eq!(controller.log().len(), 2);
    assert_eq!(controller.notice().as_deref(), Some("Still waiting for the previous answer."));

    gate.release(1);
    pump(&mut controller, &mut rx, 1).await;
    assert_eq!(controller.log().last().unwrap().text, "first");
    assert_eq!(probe.sent_messages().len(), 1);
    assert!(controller.notice().is_none());
}

#[tokio::test]
async fn test_project_switch_discards_outstanding_reply() {
    let (backend, gate) = seeded().gated();
    backend.push_answer("late answer for p1", Vec::new());
    let (mut controller, mut rx) = open(backend, "p1", "Policies").await;

    controller.send_message("question for p1").unwrap();
    controller.activate_project(project("p2", "Handbook"));
    pump(&mut controller, &mut rx, 2).await;
    assert!(controller.log().is_empty());

    gate.release(1);
    let late = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(late.is_err(), "reply for the previous project must not arrive");
    assert!(controller.log().is_empty());
    assert_eq!(controller.project_id().map(|p| p.as_str()), Some("p2"));
}

#[tokio::test]
async fn test_document_upload_reopens_conversation() {
    let backend = seeded();
    backend.push_answer("Thirty days.", Vec::new());
    let panel_backend = Arc::new(backend.clone());
    let (mut controller, mut rx) = open(backend, "p1", "Policies").await;
    let mut signals = controller.signals().subscribe();
    let panel = DocumentPanel::new(panel_backend, controller.signals().clone());

    controller.send_message("refunds?").unwrap();
    pump(&mut controller, &mut rx, 1).await;
    assert_eq!(controller.document_count(), Some(1));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faq.md");
    std::fs::write(&path, "# FAQ").unwrap();
    panel.upload(&path, &ProjectId::new("p1")).await.unwrap();

    let signal = signals.recv().await.unwrap();
    assert_eq!(signal, Signal::DocumentsChanged { project_id: ProjectId::new("p1") });
    controller.handle_signal(signal);
    assert_eq!(controller.status(), ConversationStatus::Opening);
    pump(&mut controller, &mut rx, 2).await;

    assert_eq!(controller.status(), ConversationStatus::Ready);
    assert_eq!(controller.document_count(), Some(2));
    let texts: Vec<_> = controller.log().all().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["refunds?", "Thirty days."]);
}

#[tokio::test]
async fn test_documents_changed_during_send_reopens_after_reply() {
    let (backend, gate) = seeded().gated();
    backend.push_answer("answer", Vec::new());
    let (mut controller, mut rx) = open(backend, "p1", "Policies").await;

    controller.send_message("question").unwrap();
    controller.handle_signal(Signal::DocumentsChanged { project_id: ProjectId::new("p1") });
    assert_eq!(controller.status(), ConversationStatus::Answering);
    pump(&mut controller, &mut rx, 1).await;

    gate.release(1);
    pump(&mut controller, &mut rx, 1).await;
    assert_eq!(controller.status(), ConversationStatus::Opening);
    pump(&mut controller, &mut rx, 1).await;

    assert_eq!(controller.status(), ConversationStatus::Ready);
    let texts: Vec<_> = controller.log().all().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["question", "answer"]);
}

#[tokio::test]
async fn test_open_failure_disables_input() {
    let backend = seeded();
    backend.fail_next_opens(1);
    let probe = backend.clone();
    let (mut controller, _rx) = open(backend, "p1", "Policies").await;

    assert_eq!(controller.status(), ConversationStatus::Unavailable);
    assert!(!controller.input_enabled());
    assert_eq!(controller.notice().as_deref(), Some("Conversation unavailable. Chat input is disabled."));
    assert!(controller.send_message("hello").is_err());
    assert!(probe.sent_messages().is_empty());
}

#[tokio::test]
async fn test_project_without_documents_refuses_send() {
    let backend = MockBackend::new().with_project("p3", "Empty");
    let probe = backend.clone();
    let (mut controller, _rx) = open(backend, "p3", "Empty").await;

    assert!(!controller.input_enabled());
    assert_eq!(controller.send_message("anything?"), Err(ConversationError::NoDocuments));
    assert!(controller.log().is_empty());
    assert!(probe.sent_messages().is_empty());
    assert!(controller.notice().unwrap().starts_with("No documents uploaded yet."));
}

#[tokio::test]
async fn test_failed_send_keeps_question() {
    let backend = seeded();
    backend.push_reply(askdocs_client::MockReply::Error { status: 502, detail: "upstream".into() });
    let (mut controller, mut rx) = open(backend, "p1", "Policies").await;

    controller.send_message("will this fail?").unwrap();
    pump(&mut controller, &mut rx, 1).await;

    let log = controller.log();
    assert_eq!(log.len(), 2);
    assert_eq!(log.get(0).unwrap().text, "will this fail?");
    assert_eq!(log.get(1).unwrap().state, DeliveryState::Failed);
    assert_eq!(controller.notice().as_deref(), Some("Send failed. You can send the message again."));
    assert!(controller.input_enabled());
}
