use super::*;

#[test]
fn text_rejects_empty_string() {
    Content::text("").unwrap_err();
}

#[test]
fn text_keeps_surrounding_whitespace() {
    let content = Content::text("  padded\n").unwrap();
    assert_eq!(content.as_text(), "  padded\n");
}

#[test]
fn preview_collapses_whitespace() {
    let content = Content::text("  first line\n\n\tsecond   line  ").unwrap();
    assert_eq!(content.preview(30), "first line second line");
}

#[test]
fn preview_truncates_with_ellipsis() {
    let content = Content::text("abcdefghijklmnopqrstuvwxyz").unwrap();
    let label = content.preview(10);
    assert_eq!(label, "abcdefg...");
    assert_eq!(label.chars().count(), 10);
}

#[test]
fn preview_exact_length_is_not_truncated() {
    let content = Content::text("0123456789").unwrap();
    assert_eq!(content.preview(10), "0123456789");
}

#[test]
fn preview_counts_characters_not_bytes() {
    let content = Content::text("ééééé").unwrap();
    assert_eq!(content.preview(5), "ééééé");
    assert_eq!(content.preview(4), "é...");
}

#[test]
fn preview_of_whitespace_heavy_text_scans_past_the_limit() {
    let text = format!("{}tail", " ".repeat(20));
    let content = Content::text(text).unwrap();
    assert_eq!(content.preview(10), "tail");
}

#[test]
fn digest_depends_only_on_text() {
    let a = Content::text("same").unwrap();
    let b = Content::text(String::from("same")).unwrap();
    let c = Content::text("other").unwrap();

    assert_eq!(a.digest(), b.digest());
    assert_ne!(a.digest(), c.digest());
}
