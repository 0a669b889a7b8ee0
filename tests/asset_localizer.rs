//! 图片本地化集成测试

mod common;

use std::fs;

use wikitrans::parsers::html::assets::{localize_images, AssetOptions, ImageReplacements};
use wikitrans::parsers::html::boundary::Region;
use wikitrans::utils::url::Url;
use wikitrans::utils::workers::WorkerPool;

use common::MockFetcher;

fn base() -> Url {
    Url::parse("https://site/wiki/Page").unwrap()
}

#[test]
fn url_path_maps_under_asset_dir() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new(&[("https://site/x/y.png", &b"png"[..])]);
    let region = Region::parse("<p><img src=\"https://site/x/y.png\"></p>");

    let report = localize_images(
        region.root(),
        &base(),
        &fetcher,
        &AssetOptions::new("images", dir.path()),
        &WorkerPool::sequential(),
    );

    assert_eq!(region.to_html(), "<p><img src=\"images/x/y.png\"></p>");
    assert_eq!(fs::read(dir.path().join("images/x/y.png")).unwrap(), b"png");
    assert_eq!(report.localized, 1);
    assert!(report.failures.is_empty());
}

#[test]
fn rerun_over_existing_files_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let options = AssetOptions::new("images", dir.path());

    for content in [&b"first"[..], &b"second"[..]] {
        let fetcher = MockFetcher::new(&[("https://site/x/y.png", content)]);
        let region = Region::parse("<img src=\"/x/y.png\">");
        let report = localize_images(
            region.root(),
            &base(),
            &fetcher,
            &options,
            &WorkerPool::new(2),
        );
        assert!(report.failures.is_empty());
        assert_eq!(region.to_html(), "<img src=\"images/x/y.png\">");
    }

    assert_eq!(fs::read(dir.path().join("images/x/y.png")).unwrap(), b"second");
}

#[test]
fn mixed_success_and_remote_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new(&[("https://site/ok.png", &b"ok"[..])]);
    let region = Region::parse(
        "<img src=\"/ok.png\"><img src=\"/gone.png\"><img src=\"/ok.png\" alt=\"again\">",
    );

    let report = localize_images(
        region.root(),
        &base(),
        &fetcher,
        &AssetOptions::new("assets", dir.path()),
        &WorkerPool::new(4),
    );

    assert_eq!(
        region.to_html(),
        "<img src=\"assets/ok.png\"><img src=\"https://site/gone.png\">\
         <img src=\"assets/ok.png\" alt=\"again\">"
    );
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(report.localized, 2);
    assert_eq!(report.files_written, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, "https://site/gone.png");
}

#[test]
fn replaced_image_is_fetched_instead_of_original() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new(&[("https://site/zh/logo.png", &b"zh"[..])]);
    let region = Region::parse("<img src=\"/en/logo.png\"><img src=\"/en/banner.png\">");
    let replacements = ImageReplacements::from_json(
        r#"{
            "https://site/en/logo.png": "/zh/logo.png",
            "https://site/en/banner.png": "https://cdn.example/zh/banner.png"
        }"#,
    )
    .unwrap();

    let report = localize_images(
        region.root(),
        &base(),
        &fetcher,
        &AssetOptions::new("images", dir.path()).with_replacements(replacements),
        &WorkerPool::sequential(),
    );

    // 替换图片抓取失败时保留替换后的远程地址
    assert_eq!(
        region.to_html(),
        "<img src=\"images/zh/logo.png\"><img src=\"https://cdn.example/zh/banner.png\">"
    );
    assert_eq!(report.replaced, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(fs::read(dir.path().join("images/zh/logo.png")).unwrap(), b"zh");
    assert!(!dir.path().join("images/en").exists());
}
