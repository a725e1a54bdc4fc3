use anicache::CacheKey;
use anipreview::template::placeholders_in;
use anipreview::{
    build_item_preview, CoverImage, MediaItem, MediaTitle, PreviewBuilder, PreviewConfig,
    PreviewMode, Templates,
};
use std::path::Path;
use std::time::{Duration, Instant};

const PREVIEW_PLACEHOLDERS: &[&str] = &[
    "SHELL",
    "PREVIEW_MODE",
    "IMAGE_RENDERER",
    "IMAGE_CACHE_PATH",
    "INFO_CACHE_PATH",
    "PATH_SEP",
    "C_TITLE",
    "C_KEY",
    "C_VALUE",
    "C_RULE",
    "RESET",
    "PREFIX",
];

fn bebop(cover: &str) -> MediaItem {
    MediaItem {
        title: MediaTitle {
            english: Some("Cowboy Bebop".to_string()),
            ..Default::default()
        },
        cover_image: Some(CoverImage {
            large: cover.to_string(),
            medium: None,
        }),
        ..Default::default()
    }
}

fn assert_fully_substituted(script: &str) {
    let left: Vec<String> = placeholders_in(script)
        .into_iter()
        .filter(|p| PREVIEW_PLACEHOLDERS.contains(&p.as_str()))
        .collect();
    assert!(left.is_empty(), "placeholders left: {left:?}");
}

async fn wait_for(path: &Path) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_item_preview_returns_script_then_fills_cache() {
    let mut server = mockito::Server::new_async().await;
    let _cover = server
        .mock("GET", "/cover.png")
        .with_status(200)
        .with_body("cover-bytes")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = PreviewConfig::new(dir.path());
    let builder = PreviewBuilder::new(config).unwrap();
    let items = vec![bebop(&format!("{}/cover.png", server.url()))];
    let titles = vec!["Cowboy Bebop".to_string()];

    let script = builder.build_item_preview(&items, &titles).unwrap();

    assert!(!script.is_empty());
    assert_fully_substituted(&script);
    assert!(script.starts_with("#!/usr/bin/env bash"));
    assert!(script.contains("PREVIEW_MODE=\"full\""));
    assert!(script.contains("\"$selection\""));
    assert!(script.contains(&format!(
        "IMAGE_CACHE_PATH=\"{}\"",
        builder.layout().images_dir().display()
    )));
    assert!(script.contains("C_TITLE=\"\x1b[1;38;2;215;0;95m\""));

    let key = CacheKey::derive("Cowboy Bebop");
    let image = builder.layout().image_path(&key);
    assert!(wait_for(&image).await, "image was never cached");
    assert_eq!(std::fs::read(&image).unwrap(), b"cover-bytes");
    assert!(wait_for(&builder.layout().info_path(&key)).await);
}

#[tokio::test]
async fn test_episode_preview_uses_title_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PreviewConfig::new(dir.path());
    config.mode = PreviewMode::Text;
    let builder = PreviewBuilder::new(config).unwrap();
    let item = bebop("");

    let script = builder
        .build_episode_preview(&["1".to_string(), "2".to_string()], &item)
        .unwrap();

    assert_fully_substituted(&script);
    assert!(script.contains("\"Cowboy Bebop_Episode_$selection\""));

    let key = CacheKey::derive("Cowboy Bebop_Episode_2");
    assert!(wait_for(&builder.layout().info_path(&key)).await);
    let info = std::fs::read_to_string(builder.layout().info_path(&key)).unwrap();
    assert!(info.contains(r#"print_title "Episode 2""#));
}

#[tokio::test]
async fn test_prefix_is_shell_escaped() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PreviewConfig::new(dir.path());
    config.mode = PreviewMode::None;
    let builder = PreviewBuilder::new(config).unwrap();
    let mut item = bebop("");
    item.title.english = Some("A \"quoted\" $title".to_string());

    let script = builder.build_episode_preview(&[], &item).unwrap();

    assert!(script.contains(r#""A \"quoted\" \$title_Episode_$selection""#));
}

#[tokio::test]
async fn test_control_characters_in_title_keep_script_and_cache_in_sync() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PreviewConfig::new(dir.path());
    config.mode = PreviewMode::Text;
    let builder = PreviewBuilder::new(config).unwrap();
    let mut item = bebop("");
    item.title.english = Some("Cowboy\tBebop".to_string());

    let script = builder.build_episode_preview(&["1".to_string()], &item).unwrap();

    // Le script hache "Cowboy Bebop_Episode_1" : la fiche doit porter cette clé
    assert!(script.contains("\"Cowboy Bebop_Episode_$selection\""));
    let key = CacheKey::derive("Cowboy Bebop_Episode_1");
    assert!(wait_for(&builder.layout().info_path(&key)).await);
}

#[tokio::test]
async fn test_none_mode_only_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PreviewConfig::new(dir.path());
    config.mode = PreviewMode::None;
    let builder = PreviewBuilder::new(config).unwrap();

    let script = builder
        .build_item_preview(&[bebop("")], &["Cowboy Bebop".to_string()])
        .unwrap();

    assert!(script.contains("PREVIEW_MODE=\"none\""));
    assert!(builder.layout().images_dir().is_dir());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(std::fs::read_dir(builder.layout().info_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_custom_templates() {
    let dir = tempfile::tempdir().unwrap();
    let templates = Templates {
        preview: "mode={PREVIEW_MODE} sep={PATH_SEP} keep={UNKNOWN} {}".to_string(),
        ..Templates::default()
    };
    let mut config = PreviewConfig::new(dir.path());
    config.mode = PreviewMode::None;
    config.path_separator = Some("/".to_string());
    let builder = PreviewBuilder::with_templates(config, templates);

    let script = builder.build_item_preview(&[], &[]).unwrap();

    assert_eq!(script, "mode=none sep=/ keep={UNKNOWN} {}");
}

#[test]
fn test_directory_creation_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let result = build_item_preview(&[], &[], &PreviewConfig::new(&blocker));

    assert!(result.is_err());
}

#[test]
fn test_preview_outside_runtime_populates_on_own_thread() {
    let mut server = mockito::Server::new();
    let _cover = server
        .mock("GET", "/cover.png")
        .with_status(200)
        .with_body("cover-bytes")
        .create();

    let dir = tempfile::tempdir().unwrap();
    let config = PreviewConfig::new(dir.path());
    let items = vec![bebop(&format!("{}/cover.png", server.url()))];

    let script = build_item_preview(&items, &["Cowboy Bebop".to_string()], &config).unwrap();
    assert_fully_substituted(&script);

    let image = anicache::CacheLayout::new(dir.path()).image_path(&CacheKey::derive("Cowboy Bebop"));
    let deadline = Instant::now() + Duration::from_secs(10);
    while !image.exists() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(std::fs::read(&image).unwrap(), b"cover-bytes");
}
