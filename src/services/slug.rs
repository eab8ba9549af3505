//! Note slugs
//!
//! Derives URL-safe slugs from (mostly Cyrillic) titles by transliterating
//! to Latin and collapsing everything else, and validates user-supplied slugs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::MAX_SLUG_LENGTH;

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid")
});

/// Latin spelling of a lower-case Cyrillic letter.
///
/// Returns `None` for characters outside the Russian alphabet.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "yi",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

/// Build a slug from a title.
///
/// `Новый заголовок` becomes `novyij-zagolovok`. The result is at most
/// `MAX_SLUG_LENGTH` characters and may be empty when the title has no
/// usable characters.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase().replace('&', " and ");

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for c in lowered.chars() {
        if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
            continue;
        }

        let mut buf = [0u8; 4];
        let piece: &str = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            c.encode_utf8(&mut buf)
        } else if let Some(latin) = transliterate(c) {
            latin
        } else {
            continue;
        };
        push_separated(&mut slug, &mut pending_hyphen, piece);
    }

    truncate_slug(&slug)
}

fn push_separated(slug: &mut String, pending_hyphen: &mut bool, piece: &str) {
    if piece.is_empty() {
        return;
    }
    if *pending_hyphen && !slug.is_empty() {
        slug.push('-');
    }
    *pending_hyphen = false;
    slug.push_str(piece);
}

/// Cut a slug to the maximum stored length without leaving a trailing hyphen
fn truncate_slug(slug: &str) -> String {
    let cut: String = slug.chars().take(MAX_SLUG_LENGTH).collect();
    cut.trim_end_matches('-').to_string()
}

/// Whether a user-supplied slug may be stored as is
pub fn is_valid_slug(slug: &str) -> bool {
    slug.chars().count() <= MAX_SLUG_LENGTH && SLUG_PATTERN.is_match(slug)
}
