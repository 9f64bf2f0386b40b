//! End-to-end job tests: real PDFs through the chunked runner and the
//! service registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;

use pdflingo_core::{TranslationError, Translator};
use pdflingo_jobs::{
    run_job, CancelOutcome, JobHandle, JobResult, JobStatus, TranslationService,
};

/// Build a PDF with one content stream per entry in `contents`.
///
/// Entries are raw content-stream text, so a test can inject a malformed
/// stream for a specific page.
fn test_pdf(contents: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let catalog_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            content.as_bytes().to_vec(),
        )));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids
                .iter()
                .map(|id| Object::Reference(*id))
                .collect::<Vec<_>>(),
            "Count" => page_ids.len() as i64,
        }),
    );
    doc.objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        }),
    );
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn page_content(text: &str) -> String {
    format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text)
}

fn three_page_pdf() -> Vec<u8> {
    test_pdf(&[
        &page_content("Hello page 1"),
        &page_content("Hello page 2"),
        &page_content("Hello page 3"),
    ])
}

/// Replaces "Hello" with "Hola"; the result is narrower than the input so
/// the fitted plan stays on a single line and the output is searchable.
struct HolaTranslator {
    calls: AtomicUsize,
}

impl HolaTranslator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl Translator for HolaTranslator {
    fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.replace("Hello", "Hola"))
    }
}

fn wait_terminal(service: &TranslationService, id: &str) -> JobStatus {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let state = service.status(id).expect("job should be registered");
        if state.status.is_terminal() {
            return state.status;
        }
        assert!(Instant::now() < deadline, "job did not finish in time");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_three_pages_two_chunks_completes() {
    let handle = JobHandle::new(
        "job-1".into(),
        "report.pdf".into(),
        "en".into(),
        "es".into(),
    );
    let translator = HolaTranslator::new();

    run_job(&three_page_pdf(), 2, &handle, &translator);

    let state = handle.snapshot();
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.total_pages, 3);
    assert_eq!(state.total_chunks, 2);
    assert_eq!(state.current_page, 3);
    assert_eq!(state.current_chunk, 2);
    assert_eq!(state.progress_percent, 100);
    assert_eq!(state.output_location.as_deref(), Some("report_es.pdf"));
    assert!(state.warnings.is_empty());
    assert_eq!(translator.calls.load(Ordering::SeqCst), 3);

    let output = handle.output().expect("completed job should have output");
    let rendered = String::from_utf8_lossy(&output);
    assert!(rendered.contains("(Hola page 1)"));
    assert!(rendered.contains("(Hola page 3)"));
    // Original streams are left in place; the rewrite covers them visually.
    assert!(rendered.contains("(Hello page 1)"));
}

/// Uppercases the block text and appends a marker, so the translation is
/// roughly twice as wide as the source and forces a reflow.
struct TaggingTranslator;

impl Translator for TaggingTranslator {
    fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, TranslationError> {
        Ok(format!("{}-TRANSLATED", text.to_uppercase()))
    }
}

#[test]
fn test_tagged_translation_is_reflowed_into_the_output() {
    // A line wide enough that the tagged translation can shrink onto a
    // single line instead of being hard-split.
    let pdf = test_pdf(&[
        &page_content("hello hello hello hello hello"),
        &page_content("hello hello hello hello hello"),
        &page_content("hello hello hello hello hello"),
    ]);
    let handle = JobHandle::new("job-7".into(), "doc.pdf".into(), "en".into(), "es".into());

    run_job(&pdf, 2, &handle, &TaggingTranslator);

    let state = handle.snapshot();
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.progress_percent, 100);
    assert_eq!(state.total_chunks, 2);

    let output = handle.output().unwrap();
    let rendered = String::from_utf8_lossy(&output);
    assert!(rendered.contains("(HELLO HELLO HELLO HELLO HELLO-TRANSLATED)"));
}

/// Observes the job's own progress from inside translation calls.
struct ProbeTranslator {
    handle: Mutex<Option<Arc<JobHandle>>>,
    seen: Mutex<Vec<(String, u32, u32, u8)>>,
}

impl Translator for ProbeTranslator {
    fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, TranslationError> {
        if let Some(handle) = self.handle.lock().unwrap().as_ref() {
            let s = handle.snapshot();
            self.seen.lock().unwrap().push((
                text.to_string(),
                s.current_page,
                s.current_chunk,
                s.progress_percent,
            ));
        }
        Ok(text.to_string())
    }
}

#[test]
fn test_progress_advances_between_pages() {
    let handle = Arc::new(JobHandle::new(
        "job-2".into(),
        "doc.pdf".into(),
        "en".into(),
        "fr".into(),
    ));
    let translator = ProbeTranslator {
        handle: Mutex::new(Some(Arc::clone(&handle))),
        seen: Mutex::new(Vec::new()),
    };

    run_job(&three_page_pdf(), 2, &handle, &translator);

    let seen = translator.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);

    // While page 2 is being translated, page 1 is already reflected in the
    // visible snapshot and progress sits at one third.
    let during_page_2 = seen
        .iter()
        .find(|(text, ..)| text == "Hello page 2")
        .unwrap();
    assert_eq!(during_page_2.1, 1);
    assert_eq!(during_page_2.2, 1);
    assert_eq!(during_page_2.3, 33);

    // Page 3 opens the second chunk.
    let during_page_3 = seen
        .iter()
        .find(|(text, ..)| text == "Hello page 3")
        .unwrap();
    assert_eq!(during_page_3.2, 2);
    assert_eq!(during_page_3.3, 67);
}

/// Requests cancellation of its own job on the first translation call.
struct SelfCancellingTranslator {
    handle: Mutex<Option<Arc<JobHandle>>>,
    calls: AtomicUsize,
}

impl Translator for SelfCancellingTranslator {
    fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().unwrap().as_ref() {
            handle.request_cancel();
        }
        Ok(text.to_string())
    }
}

#[test]
fn test_cancel_observed_at_page_boundary() {
    let handle = Arc::new(JobHandle::new(
        "job-3".into(),
        "doc.pdf".into(),
        "en".into(),
        "es".into(),
    ));
    let translator = SelfCancellingTranslator {
        handle: Mutex::new(Some(Arc::clone(&handle))),
        calls: AtomicUsize::new(0),
    };

    run_job(&three_page_pdf(), 1, &handle, &translator);

    let state = handle.snapshot();
    assert_eq!(state.status, JobStatus::Cancelled);
    assert_eq!(state.status_message, "cancelled by user");
    // The in-flight page finished; later pages were never started.
    assert_eq!(state.current_page, 1);
    assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    assert!(handle.output().is_none());
}

#[test]
fn test_malformed_page_is_skipped_with_warning() {
    let pdf = test_pdf(&[
        &page_content("Hello page 1"),
        "BT (unterminated string",
        &page_content("Hello page 3"),
    ]);
    let handle = JobHandle::new("job-4".into(), "doc.pdf".into(), "en".into(), "es".into());
    let translator = HolaTranslator::new();

    run_job(&pdf, 20, &handle, &translator);

    let state = handle.snapshot();
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.progress_percent, 100);
    assert_eq!(state.warnings.len(), 1);
    assert!(state.warnings[0].contains("Page 2"));
    // The readable pages were still translated.
    assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
}

struct FailingTranslator;

impl Translator for FailingTranslator {
    fn translate(
        &self,
        _text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, TranslationError> {
        Err(TranslationError::Engine("engine unavailable".to_string()))
    }
}

#[test]
fn test_translation_failures_keep_original_text() {
    let handle = JobHandle::new("job-5".into(), "doc.pdf".into(), "en".into(), "es".into());

    run_job(&three_page_pdf(), 20, &handle, &FailingTranslator);

    let state = handle.snapshot();
    assert_eq!(state.status, JobStatus::Completed);
    // One warning for the repeated cause, not one per block.
    assert_eq!(state.warnings.len(), 1);
    assert!(state.warnings[0].contains("engine unavailable"));

    let output = handle.output().expect("job should still produce output");
    let rendered = String::from_utf8_lossy(&output);
    assert!(rendered.contains("(Hello page 2)"));
}

#[test]
fn test_zero_page_document_completes() {
    let pdf = test_pdf(&[]);
    let handle = JobHandle::new("job-6".into(), "empty.pdf".into(), "en".into(), "es".into());

    run_job(&pdf, 20, &handle, &HolaTranslator::new());

    let state = handle.snapshot();
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.total_pages, 0);
    assert_eq!(state.progress_percent, 100);
    assert!(handle.output().is_some());
}

#[test]
fn test_service_round_trip() {
    let service = TranslationService::new(Arc::new(HolaTranslator::new()));
    let id = service.submit(
        "report.pdf".to_string(),
        three_page_pdf(),
        "en".to_string(),
        "es".to_string(),
        Some(2),
    );

    assert_eq!(wait_terminal(&service, &id), JobStatus::Completed);

    let state = service.status(&id).unwrap();
    assert_eq!(state.progress_percent, 100);
    assert_eq!(state.output_location.as_deref(), Some("report_es.pdf"));

    match service.result(&id) {
        JobResult::Ready(bytes) => assert!(!bytes.is_empty()),
        other => panic!("expected output, got {:?}", other),
    }

    // Cancelling a finished job has no effect and says so.
    assert_eq!(
        service.cancel(&id),
        CancelOutcome::AlreadyFinished(JobStatus::Completed)
    );
    assert_eq!(service.status(&id).unwrap().status, JobStatus::Completed);
}

#[test]
fn test_service_rejects_unparseable_document() {
    let service = TranslationService::new(Arc::new(HolaTranslator::new()));
    let id = service.submit(
        "junk.pdf".to_string(),
        b"definitely not a pdf".to_vec(),
        "en".to_string(),
        "es".to_string(),
        None,
    );

    assert_eq!(wait_terminal(&service, &id), JobStatus::Error);

    let state = service.status(&id).unwrap();
    assert!(state.status_message.starts_with("failed:"));
    assert!(matches!(service.result(&id), JobResult::Failed(_)));
}

#[test]
fn test_service_cancel_unknown_job() {
    let service = TranslationService::new(Arc::new(HolaTranslator::new()));
    assert_eq!(service.cancel("no-such-job"), CancelOutcome::NotFound);
    assert!(service.status("no-such-job").is_none());
    assert!(matches!(
        service.result("no-such-job"),
        JobResult::NotFound
    ));
}
