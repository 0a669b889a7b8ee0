//! 端到端流程测试
//!
//! 渲染器、翻译器和抓取器都使用模拟实现，输出写入临时目录。

mod common;

use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use wikitrans::core::{
    parse_target, process_page, DocumentProcessor, WarningKind, WikiError, WikiOptions,
};
use wikitrans::parsers::html::anchor::AnchorSpec;
use wikitrans::parsers::html::boundary::BoundaryPolicy;

use common::{collaborators, phrasebook, wiki_page, MockFetcher, MockRenderer, PAGE_URL};

const LOGO: &[u8] = b"\x89PNG\r\n\x1a\nlogo";

fn article() -> String {
    wiki_page(
        "Test Page",
        "<p>Hello world</p><img src=\"img/logo.png\" alt=\"Logo\">\
         <div align=\"right\"><small>retrieved</small></div>\
         <div class=\"printfooter\">Retrieved from somewhere</div>",
    )
}

#[test]
fn translates_localizes_and_trims_article() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");

    let renderer = Arc::new(MockRenderer::new(article()));
    let fetcher = Arc::new(MockFetcher::new(&[(
        "https://wiki.example/img/logo.png",
        LOGO,
    )]));

    let report = process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions::default(),
        collaborators(renderer.clone(), fetcher.clone(), phrasebook()),
    )
    .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>\n<!-- Translated from https://wiki.example/Test_Page at "));
    assert!(html.contains("<meta charset=\"UTF-8\">"));
    assert!(html.contains("<title>测试页面</title>"));
    assert!(html.ends_with(
        "<body><p>你好，世界</p><img src=\"images/img/logo.png\" alt=\"标志\">\
         <small>retrieved</small></body></html>"
    ));

    assert_eq!(fs::read(dir.path().join("images/img/logo.png")).unwrap(), LOGO);
    assert_eq!(report.images_localized, 1);
    assert_eq!(report.title, "测试页面");
    assert_eq!(report.total_warnings(), 0);
    assert!(renderer.was_shut_down());
}

#[test]
fn missing_anchor_aborts_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");
    let markup = "<html><head><title>T</title></head><body><p>Hello world</p>\
                  <img src=\"img/logo.png\"></body></html>";

    let renderer = Arc::new(MockRenderer::new(markup));
    let fetcher = Arc::new(MockFetcher::new(&[]));

    let result = process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions::default(),
        collaborators(renderer.clone(), fetcher.clone(), phrasebook()),
    );

    assert!(matches!(result, Err(WikiError::MissingAnchor { .. })));
    assert!(!output.exists());
    assert!(!dir.path().join("images").exists());
    assert_eq!(fetcher.calls(), 0);
    assert!(renderer.was_shut_down());
}

#[test]
fn render_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");

    let renderer = Arc::new(MockRenderer::failing(502));
    let result = process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions::default(),
        collaborators(renderer.clone(), Arc::new(MockFetcher::new(&[])), phrasebook()),
    );

    assert!(matches!(result, Err(WikiError::Render(_))));
    assert!(!output.exists());
    assert!(renderer.was_shut_down());
}

#[test]
fn empty_region_produces_document_with_title() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empty.html");
    let markup = "<html><head><title>Test Page</title></head><body>\
                  <div><p>nav</p><!-- Title --></div></body></html>";

    let report = process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions {
            no_metadata: true,
            ..WikiOptions::default()
        },
        collaborators(
            Arc::new(MockRenderer::new(markup)),
            Arc::new(MockFetcher::new(&[])),
            phrasebook(),
        ),
    )
    .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.starts_with("<!DOCTYPE html><html lang=\"zh-CN\">"));
    assert!(html.contains("<title>测试页面</title>"));
    assert!(html.ends_with("<body></body></html>"));
    assert_eq!(report.region_nodes, 0);
}

#[test]
fn recoverable_failures_are_counted_and_content_kept() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");
    let markup = wiki_page(
        "Test Page",
        "<p>Hello world</p><p>This will FAIL</p><img src=\"/missing.png\">\
         <div align=\"right\"><small>retrieved</small></div>",
    );

    let report = process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions::default(),
        collaborators(
            Arc::new(MockRenderer::new(markup)),
            Arc::new(MockFetcher::new(&[])),
            phrasebook(),
        ),
    )
    .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("<p>你好，世界</p><p>This will FAIL</p>"));
    assert!(html.contains("<img src=\"https://wiki.example/missing.png\">"));
    assert_eq!(report.warnings(WarningKind::TranslationFailure), 1);
    assert_eq!(report.warnings(WarningKind::AssetFetchFailure), 1);
    assert!(report.summary().contains("TranslationFailure × 1"));
}

#[test]
fn textual_marker_policy_stops_before_parser_report() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");
    let markup = wiki_page(
        "Test Page",
        "<p>Hello world</p><p>B</p><!-- NewPP limit report --><p>D</p>",
    );

    process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions {
            boundary: BoundaryPolicy::textual_default(),
            ..WikiOptions::default()
        },
        collaborators(
            Arc::new(MockRenderer::new(markup)),
            Arc::new(MockFetcher::new(&[])),
            phrasebook(),
        ),
    )
    .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.ends_with("<body><p>你好，世界</p><p>B</p></body></html>"));
}

#[test]
fn unconditional_policy_warns_when_landmark_missing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");
    let markup = wiki_page("Test Page", "<p>Hello world</p><p>tail</p>");

    let report = process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions {
            boundary: BoundaryPolicy::unconditional_default(),
            ..WikiOptions::default()
        },
        collaborators(
            Arc::new(MockRenderer::new(markup)),
            Arc::new(MockFetcher::new(&[])),
            phrasebook(),
        ),
    )
    .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.ends_with("<body><p>你好，世界</p><p>tail</p></body></html>"));
    assert_eq!(report.warnings(WarningKind::AssemblyTruncationNotFound), 1);
}

#[test]
fn container_anchor_uses_container_children() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");
    let markup = "<html><head><title>Test Page</title></head><body>\
                  <div id=\"mw-content-text\"><div class=\"mw-parser-output\">\
                  <p>Hello world</p><div id=\"catlinks\">Categories</div>\
                  </div></div></body></html>";

    process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions {
            anchor: AnchorSpec::mediawiki_container(),
            no_metadata: true,
            ..WikiOptions::default()
        },
        collaborators(
            Arc::new(MockRenderer::new(markup)),
            Arc::new(MockFetcher::new(&[])),
            phrasebook(),
        ),
    )
    .unwrap();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.ends_with("<body><p>你好，世界</p></body></html>"));
}

#[test]
fn output_path_uses_page_title() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = dir.path().join("%title%.html");

    let report = process_page(
        PAGE_URL,
        pattern.to_str().unwrap(),
        WikiOptions::default(),
        collaborators(
            Arc::new(MockRenderer::new(article())),
            Arc::new(MockFetcher::new(&[])),
            phrasebook(),
        ),
    )
    .unwrap();

    assert_eq!(report.output, dir.path().join("Test Page.html"));
    assert!(report.output.exists());
}

#[test]
fn deadline_bounds_the_whole_run() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");
    // 超时后流程线程仍会继续运行；没有锚点，它不会写任何文件
    let renderer = Arc::new(MockRenderer::new("<p>late</p>").with_delay(Duration::from_secs(2)));

    let result = process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions {
            deadline: Some(Duration::from_millis(100)),
            ..WikiOptions::default()
        },
        collaborators(renderer, Arc::new(MockFetcher::new(&[])), phrasebook()),
    );

    assert!(matches!(result, Err(WikiError::Timeout(_))));
}

#[test]
fn deadline_not_reached_returns_report() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");

    let report = process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions {
            deadline: Some(Duration::from_secs(30)),
            ..WikiOptions::default()
        },
        collaborators(
            Arc::new(MockRenderer::new(article())),
            Arc::new(MockFetcher::new(&[])),
            phrasebook(),
        ),
    )
    .unwrap();

    assert_eq!(report.output, output);
}

#[test]
fn timed_out_run_never_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");
    let renderer =
        Arc::new(MockRenderer::new(article()).with_delay(Duration::from_millis(300)));
    let fetcher = Arc::new(MockFetcher::new(&[(
        "https://wiki.example/img/logo.png",
        LOGO,
    )]));

    let result = process_page(
        PAGE_URL,
        output.to_str().unwrap(),
        WikiOptions {
            deadline: Some(Duration::from_millis(50)),
            ..WikiOptions::default()
        },
        collaborators(renderer.clone(), fetcher.clone(), phrasebook()),
    );
    assert!(matches!(result, Err(WikiError::Timeout(_))));

    // 流程线程结束时会释放协作者
    let started = Instant::now();
    while !renderer.was_shut_down() && started.elapsed() < Duration::from_secs(10) {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(renderer.was_shut_down());

    assert!(!output.exists());
    assert!(!dir.path().join("images").exists());
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn cancelled_processor_stops_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page.html");
    let options = WikiOptions::default();
    let collaborators = collaborators(
        Arc::new(MockRenderer::new(article())),
        Arc::new(MockFetcher::new(&[])),
        phrasebook(),
    );

    let result = DocumentProcessor::new(&options, &collaborators)
        .with_cancellation(Arc::new(AtomicBool::new(true)))
        .process(&parse_target(PAGE_URL).unwrap(), output.to_str().unwrap());

    assert!(matches!(result, Err(WikiError::Timeout(_))));
    assert!(!output.exists());
}
