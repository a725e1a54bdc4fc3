use anipreview::format::shell_safe;
use anipreview::render::{EPISODE_INFO_PLACEHOLDERS, INFO_PLACEHOLDERS};
use anipreview::template::{placeholders_in, EPISODE_INFO_TEMPLATE, INFO_TEMPLATE};
use anipreview::{
    render_episode_info, render_item_info, AiringSchedule, FuzzyDate, MediaFormat, MediaItem,
    MediaStatus, MediaTag, MediaTitle, Studio, UserListStatus, UserStatus,
};
use chrono::{TimeZone, Utc};

fn full_item() -> MediaItem {
    MediaItem {
        id: 1,
        title: MediaTitle {
            english: Some("Cowboy Bebop".to_string()),
            romaji: Some("Cowboy Bebop".to_string()),
            native: None,
        },
        status: Some(MediaStatus::Releasing),
        format: Some(MediaFormat::Tv),
        episodes: Some(26),
        duration: Some(24),
        average_score: Some(86.0),
        favourites: Some(45_210),
        popularity: Some(1_000_000),
        genres: vec!["Action".to_string(), "Sci-Fi".to_string()],
        tags: vec![MediaTag { name: "Space".to_string() }],
        studios: vec![Studio { name: Some("Sunrise".to_string()) }],
        synonyms: vec!["CB".to_string()],
        description: Some("Bounty hunters <i>in space</i> &amp; jazz.".to_string()),
        start_date: Some(FuzzyDate { year: Some(1998), month: Some(4), day: Some(3) }),
        end_date: None,
        next_airing: Some(AiringSchedule {
            episode: 5,
            airing_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }),
        user_status: Some(UserStatus {
            status: Some(UserListStatus::Current),
            progress: Some(4),
        }),
        ..Default::default()
    }
}

fn hostile_item() -> MediaItem {
    MediaItem {
        title: MediaTitle {
            english: Some("Evil\" $(touch /tmp/pwned) `id` \\\nnext".to_string()),
            ..Default::default()
        },
        genres: vec!["$HOME".to_string()],
        description: Some("line one<br>\"; rm -rf ~; echo \"".to_string()),
        ..Default::default()
    }
}

/// Vérifie qu'aucun `"` non échappé n'apparaît dans une valeur rendue
fn assert_quoted_safely(rendered_value: &str) {
    let mut escaped = false;
    for c in rendered_value.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' | '`' | '$' => panic!("unescaped {c:?} in {rendered_value:?}"),
            '\n' | '\r' => panic!("line break in {rendered_value:?}"),
            _ => {}
        }
    }
    assert!(!escaped, "dangling backslash in {rendered_value:?}");
}

#[test]
fn test_item_info_fills_every_placeholder() {
    let out = render_item_info(&full_item(), INFO_TEMPLATE);

    let left: Vec<String> = placeholders_in(&out)
        .into_iter()
        .filter(|p| INFO_PLACEHOLDERS.contains(&p.as_str()))
        .collect();
    assert!(left.is_empty(), "placeholders left: {left:?}");

    assert!(out.contains(r#"print_title "Cowboy Bebop""#));
    assert!(out.contains(r#"print_kv "Status" "RELEASING""#));
    assert!(out.contains(r#"print_kv "Format" "TV""#));
    assert!(out.contains(r#"print_kv "Score" "★★★★☆ 8.6/10""#));
    assert!(out.contains(r#"print_kv "Popularity" "1,000,000""#));
    assert!(out.contains(r#"print_kv "Genres" "Action, Sci-Fi""#));
    assert!(out.contains(r#"print_kv "List Status" "CURRENT""#));
    assert!(out.contains(r#"print_kv "Progress" "Episode 4""#));
    assert!(out.contains(r#"print_kv "Start Date" "April 03, 1998""#));
    assert!(out.contains(r#"print_kv "End Date" "N/A""#));
    assert!(out.contains("Bounty hunters in space & jazz."));
    assert!(out.contains("\"Episode 5 on "));
}

#[test]
fn test_minimal_item_uses_defaults() {
    let out = render_item_info(&MediaItem::default(), INFO_TEMPLATE);

    assert!(out.contains(r#"print_title "N/A""#));
    assert!(out.contains(r#"print_kv "List Status" "NOT_ON_LIST""#));
    assert!(out.contains(r#"print_kv "Progress" "0""#));
    assert!(out.contains(r#"print_kv "Next Episode" "N/A""#));
    assert!(out.contains("No description available."));
}

#[test]
fn test_hostile_values_cannot_break_out() {
    let item = hostile_item();
    let template = "T=\"{TITLE}\"\nG=\"{GENRES}\"\nS=\"{SYNOPSIS}\"\n";
    let out = render_item_info(&item, template);

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3, "values must not add lines: {out}");
    for (line, prefix) in lines.iter().zip(["T=\"", "G=\"", "S=\""]) {
        let value = line
            .strip_prefix(prefix)
            .and_then(|l| l.strip_suffix('"'))
            .unwrap();
        assert_quoted_safely(value);
    }

    assert_eq!(
        lines[0],
        format!("T=\"{}\"", shell_safe("Evil\" $(touch /tmp/pwned) `id` \\\nnext"))
    );
}

#[test]
fn test_value_containing_placeholder_is_not_expanded() {
    let item = MediaItem {
        title: MediaTitle {
            english: Some("{SYNOPSIS}".to_string()),
            ..Default::default()
        },
        description: Some("should not leak".to_string()),
        ..Default::default()
    };

    let out = render_item_info(&item, "{TITLE}|{SYNOPSIS}");
    assert_eq!(out, "{SYNOPSIS}|should not leak");
}

#[test]
fn test_episode_info() {
    let item = full_item();
    let out = render_episode_info("Asteroid Blues", &item, EPISODE_INFO_TEMPLATE);

    let left: Vec<String> = placeholders_in(&out)
        .into_iter()
        .filter(|p| EPISODE_INFO_PLACEHOLDERS.contains(&p.as_str()))
        .collect();
    assert!(left.is_empty(), "placeholders left: {left:?}");

    assert!(out.contains(r#"print_title "Asteroid Blues""#));
    assert!(out.contains(r#"print_kv "Total Episodes" "26""#));
    assert!(out.contains(r#"print_kv "Duration" "24 minutes""#));
    assert!(!out.contains("Bounty hunters"));
}
