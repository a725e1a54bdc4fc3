//! Mise en forme des champs des fiches de prévisualisation
//!
//! Toutes les fonctions produisent du texte brut. Le passage par
//! [`shell_safe`] est fait par le moteur de rendu, juste avant l'insertion
//! dans un template.

use crate::models::{AiringSchedule, FuzzyDate};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Valeur affichée pour un champ absent
pub const NOT_AVAILABLE: &str = "N/A";

static HTML_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p>").expect("valid regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static HTML_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Rend `text` inoffensif dans une chaîne shell entre guillemets doubles
///
/// Échappe `\`, `"`, `` ` `` et `$` ; remplace les retours à la ligne et les
/// autres caractères de contrôle par des espaces. Le résultat ne peut ni
/// fermer la chaîne ni déclencher une substitution.
pub fn shell_safe(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '"' | '`' | '$' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Remplace les caractères de contrôle par des espaces
///
/// Même transformation que [`shell_safe`] hors échappement : une chaîne
/// ainsi nettoyée ressort du shell à l'identique.
pub fn strip_control(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Supprime le balisage HTML d'un synopsis et décode les entités
///
/// Les `<br>` et fins de paragraphe deviennent des retours à la ligne.
pub fn clean_html(raw: &str) -> String {
    let text = HTML_BREAK.replace_all(raw, "\n");
    let text = HTML_TAG.replace_all(&text, "");
    let text = HTML_ENTITY.replace_all(&text, |caps: &Captures| decode_entity(&caps[1], &caps[0]));
    let text = text.replace("\r\n", "\n");
    BLANK_LINES.replace_all(text.trim(), "\n\n").into_owned()
}

fn decode_entity(name: &str, original: &str) -> String {
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "hellip" => Some('\u{2026}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or(name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
        }
    };
    decoded.map_or_else(|| original.to_string(), String::from)
}

/// Date partielle : `"April 03, 1998"`, `"April 1998"`, `"1998"` ou `"N/A"`
pub fn format_date(date: Option<&FuzzyDate>) -> String {
    let Some(date) = date else {
        return NOT_AVAILABLE.to_string();
    };
    if let Some(full) = date.to_naive() {
        return full.format("%B %d, %Y").to_string();
    }
    match (date.year, date.month) {
        (Some(year), Some(month)) => NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| year.to_string()),
        (Some(year), None) => year.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Prochain épisode, daté dans le fuseau local
pub fn format_next_episode(next: Option<&AiringSchedule>) -> String {
    format_next_episode_in(next, &Local)
}

/// Prochain épisode, daté dans le fuseau `tz`
pub fn format_next_episode_in<Tz: TimeZone>(next: Option<&AiringSchedule>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match next {
        Some(next) => {
            let when: DateTime<Tz> = next.airing_at.with_timezone(tz);
            format!(
                "Episode {} on {}",
                next.episode,
                when.format("%A, %d %B %Y at %H:%M:%S")
            )
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Durée d'un épisode : `"24 minutes"`, `"1 hour, 30 minutes"`...
pub fn format_duration(minutes: Option<u32>) -> String {
    let Some(minutes) = minutes.filter(|m| *m > 0) else {
        return NOT_AVAILABLE.to_string();
    };
    let (hours, rest) = (minutes / 60, minutes % 60);
    let plural = |n: u32, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };
    match (hours, rest) {
        (0, m) => plural(m, "minute"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{}, {}", plural(h, "hour"), plural(m, "minute")),
    }
}

/// Score sur 100 affiché en étoiles : `"★★★★☆ 8.6/10"`
pub fn format_score(score: Option<f64>) -> String {
    let Some(score) = score.filter(|s| s.is_finite() && *s >= 0.0) else {
        return NOT_AVAILABLE.to_string();
    };
    let score = score.min(100.0);
    let full = (score / 20.0).round() as usize;
    format!(
        "{}{} {:.1}/10",
        "★".repeat(full),
        "☆".repeat(5 - full),
        score / 10.0
    )
}

/// Nombre avec séparateur de milliers : `"12,345"`
pub fn format_number(value: Option<u64>) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_string();
    };
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Liste séparée par des virgules, `"N/A"` si vide
pub fn format_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = values
        .into_iter()
        .filter(|v| !v.as_ref().trim().is_empty())
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        joined
    }
}
