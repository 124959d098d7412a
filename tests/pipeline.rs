//! Integration tests for the processing entry points, with a scripted
//! recognizer standing in for the remote service.

mod common;

use async_trait::async_trait;
use docvision::{
    inspect, process_document, process_document_with, process_file, Backend, DocVisionError,
    LanguageHint,
    OcrResult, ProcessingConfig, ProcessingMode, ProcessingProgressCallback, RasterImage,
    Recognizer, RemoteServiceError, UploadedDocument,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Answers pages from a script, in order, and remembers the prompts it saw.
struct ScriptedRecognizer {
    script: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    backend: Backend,
}

impl ScriptedRecognizer {
    fn new(script: Vec<Result<&str, &str>>) -> Self {
        Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
            backend: Backend::Ocr,
        }
    }

    fn answering_as(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn backend(&self) -> Backend {
        self.backend
    }

    async fn recognize(&self, _image: &RasterImage, prompt: &str) -> Result<String, RemoteServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(RemoteServiceError::MalformedResponse(msg)),
            None => Err(RemoteServiceError::MalformedResponse("script exhausted".into())),
        }
    }
}

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl ProcessingProgressCallback for RecordingCallback {
    fn on_run_start(&self, total_pages: usize) {
        self.events.lock().unwrap().push(format!("start {total_pages}"));
    }
    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.events.lock().unwrap().push(format!("page {page_num}"));
    }
    fn on_page_complete(&self, page_num: usize, _total: usize, kind: &str) {
        self.events.lock().unwrap().push(format!("ok {page_num} {kind}"));
    }
    fn on_page_error(&self, page_num: usize, _total: usize, _error: &str) {
        self.events.lock().unwrap().push(format!("err {page_num}"));
    }
    fn on_run_complete(&self, total_pages: usize, success_count: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {success_count}/{total_pages}"));
    }
}

fn three_page_docx() -> UploadedDocument {
    let bytes = common::docx_bytes(&[
        ("image1.png", common::png_bytes(8, 8)),
        ("image2.png", common::png_bytes(8, 8)),
        ("image3.png", common::png_bytes(8, 8)),
    ]);
    UploadedDocument::from_bytes("pages.docx", bytes).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_page_does_not_stop_the_run() {
    let recognizer = ScriptedRecognizer::new(vec![
        Ok("| a |\n|---|\n| 1 |"),
        Err("quota exceeded"),
        Ok("| b |\n|---|\n| 2 |"),
    ]);
    let config = ProcessingConfig::default();

    let output = process_document_with(&recognizer, three_page_docx(), &config)
        .await
        .unwrap();

    let page_nums: Vec<usize> = output.pages.iter().map(|p| p.page_num).collect();
    assert_eq!(page_nums, vec![1, 2, 3]);
    assert_eq!(recognizer.calls(), 3);

    assert_eq!(output.pages[0].result, OcrResult::Markdown("| a |\n|---|\n| 1 |".into()));
    match &output.pages[1].result {
        OcrResult::Error(msg) => {
            assert!(msg.contains("Page 2"), "got: {msg}");
            assert!(msg.contains("quota exceeded"), "got: {msg}");
        }
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(output.pages[2].result.kind(), "markdown");

    assert_eq!(output.stats.total_pages, 3);
    assert_eq!(output.stats.succeeded_pages, 2);
    assert_eq!(output.stats.failed_pages, 1);
    assert_eq!(output.filename, "pages.docx");
}

#[tokio::test]
async fn missing_api_key_is_rejected_before_loading() {
    let doc = UploadedDocument::from_bytes("scan.png", common::png_bytes(4, 4)).unwrap();
    let err = process_document(doc, &ProcessingConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DocVisionError::InvalidConfig(_)), "got: {err}");

    // Checked before the path is even read.
    let err = process_file("/definitely/not/here.png", &ProcessingConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DocVisionError::InvalidConfig(_)), "got: {err}");
}

#[tokio::test]
async fn loader_failure_is_fatal_and_reported_once() {
    let recognizer = ScriptedRecognizer::new(vec![]);
    let doc = UploadedDocument::from_bytes("broken.png", b"garbage".to_vec()).unwrap();

    let err = process_document_with(&recognizer, doc, &ProcessingConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DocVisionError::Load { ref filename, .. } if filename == "broken.png"));
    assert_eq!(recognizer.calls(), 0);
}

#[tokio::test]
async fn mode_and_languages_reach_the_recognizer() {
    let recognizer = ScriptedRecognizer::new(vec![Ok("| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |")]);
    let mut config = ProcessingConfig::default();
    config.mode = ProcessingMode::StructureAnalysis;
    config.languages = LanguageHint::parse(" French ,, German ");

    let doc = UploadedDocument::from_bytes("table.png", common::png_bytes(4, 4)).unwrap();
    let output = process_document_with(&recognizer, doc, &config).await.unwrap();

    match &output.pages[0].result {
        OcrResult::Stats { rows, cols, .. } => assert_eq!((*rows, *cols), (2, 2)),
        other => panic!("expected stats, got {:?}", other),
    }
    let prompts = recognizer.prompts.lock().unwrap();
    assert!(prompts[0].contains("French, German"), "got: {}", prompts[0]);
}

#[tokio::test]
async fn vision_structure_answers_are_read_as_json() {
    let script = vec![
        Ok("```json\n{\"rows\": 3, \"cols\": 2}\n```"),
        Ok("{\"rows\": 0, \"cols\": 0}"),
        Ok("| a | b | c |\n|---|---|---|\n| 1 | 2 | 3 |"),
    ];
    let mut config = ProcessingConfig::default();
    config.mode = ProcessingMode::StructureAnalysis;

    let vision = ScriptedRecognizer::new(script.clone()).answering_as(Backend::Vision);
    let output = process_document_with(&vision, three_page_docx(), &config)
        .await
        .unwrap();
    let dims: Vec<(usize, usize)> = output
        .pages
        .iter()
        .map(|p| match &p.result {
            OcrResult::Stats { rows, cols, .. } => (*rows, *cols),
            other => panic!("expected stats, got {:?}", other),
        })
        .collect();
    assert_eq!(dims, vec![(3, 2), (0, 0), (1, 3)]);

    // The OCR endpoint answers in Markdown; JSON-looking text has no table.
    let ocr = ScriptedRecognizer::new(script);
    let output = process_document_with(&ocr, three_page_docx(), &config)
        .await
        .unwrap();
    match &output.pages[0].result {
        OcrResult::Stats { rows, cols, .. } => assert_eq!((*rows, *cols), (0, 0)),
        other => panic!("expected stats, got {:?}", other),
    }
}

#[tokio::test]
async fn full_page_mode_classifies_each_page() {
    let recognizer = ScriptedRecognizer::new(vec![
        Ok("```html\n<table><tr><td>x</td></tr></table>\n```"),
        Ok("| a | b |\n|---|---|\n| 1 | 2 |"),
        Ok("Dear customer, thank you."),
    ]);
    let mut config = ProcessingConfig::default();
    config.mode = ProcessingMode::FullPageReconstruction;

    let output = process_document_with(&recognizer, three_page_docx(), &config)
        .await
        .unwrap();

    let kinds: Vec<&str> = output.pages.iter().map(|p| p.result.kind()).collect();
    assert_eq!(kinds, vec!["html", "html", "text"]);

    let csv = output.pages[1].csv().unwrap();
    assert_eq!(String::from_utf8(csv).unwrap(), "a,b\n1,2\n");
    assert_eq!(output.pages[2].csv(), None);
}

#[tokio::test]
async fn progress_events_arrive_in_page_order() {
    let recognizer = ScriptedRecognizer::new(vec![Ok("one"), Err("boom"), Ok("three")]);
    let callback = Arc::new(RecordingCallback::default());
    let mut config = ProcessingConfig::default();
    config.mode = ProcessingMode::FullPageReconstruction;
    config.progress_callback = Some(callback.clone());

    process_document_with(&recognizer, three_page_docx(), &config)
        .await
        .unwrap();

    let events = callback.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start 3",
            "page 1",
            "ok 1 text",
            "page 2",
            "err 2",
            "page 3",
            "ok 3 text",
            "done 2/3",
        ]
    );
}

#[tokio::test]
async fn inspect_needs_no_credential() {
    let doc = UploadedDocument::from_bytes("scan.jpeg", common::jpeg_bytes(12, 7)).unwrap();
    let summary = inspect(doc, &ProcessingConfig::default()).await.unwrap();

    assert_eq!(summary.filename, "scan.jpeg");
    assert_eq!(summary.pages.len(), 1);
    assert_eq!((summary.pages[0].width, summary.pages[0].height), (12, 7));
}

#[tokio::test]
async fn unknown_format_runs_with_no_pages() {
    let recognizer = ScriptedRecognizer::new(vec![]);
    let doc = UploadedDocument::new_unchecked("notes.txt", b"hi".to_vec());

    let output = process_document_with(&recognizer, doc, &ProcessingConfig::default())
        .await
        .unwrap();
    assert!(output.pages.is_empty());
    assert_eq!(output.stats.total_pages, 0);
    assert_eq!(recognizer.calls(), 0);
}
