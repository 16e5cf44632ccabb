use quote_reflow::*;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

const NO_KEYWORDS: [&str; 0] = [];

#[test]
fn test_whitespace_only_is_blank() {
    let result = normalize("   \n\t  ", &NO_KEYWORDS);
    assert_eq!(result, Normalized::Blank);
    assert_eq!(result.text(), "");
}

#[test]
fn test_empty_input_is_blank() {
    assert_eq!(normalize_text("", &DEFAULT_KEYWORDS), "");
}

#[test]
fn test_unquoted_text_is_trimmed_only() {
    let raw = "  Hello world.\nSecond  line\n\n";
    let result = normalize(raw, &DEFAULT_KEYWORDS);
    assert_eq!(
        result,
        Normalized::Unquoted("Hello world.\nSecond  line".to_string())
    );
}

#[test]
fn test_unquoted_text_ignores_keywords() {
    let raw = "件名：そのまま";
    assert_eq!(normalize_text(raw, &["件名"]), "件名：そのまま");
}

#[test]
fn test_strips_markers_of_any_depth() {
    let raw = "> a\n>> b\n   >>> c\n\t>d";
    assert_eq!(normalize_text(raw, &NO_KEYWORDS), "a\nb\nc\nd");
}

#[test]
fn test_strips_extra_indentation_after_marker() {
    let raw = ">     indented text";
    assert_eq!(normalize_text(raw, &NO_KEYWORDS), "indented\ntext");
}

#[test]
fn test_unquoted_lines_are_dropped() {
    let raw = "Hi,\n> quoted part\nThanks";
    assert_eq!(normalize_text(raw, &NO_KEYWORDS), "quoted\npart");
}

#[test]
fn test_crlf_line_endings() {
    let raw = "> 一行目。\r\n> 二行目。\r\n";
    assert_eq!(normalize_text(raw, &NO_KEYWORDS), "一行目。\n二行目。");
}

#[test]
fn test_all_quote_lines_empty() {
    let raw = "> \n>>\n  >  \nnot quoted";
    let result = normalize(raw, &NO_KEYWORDS);
    assert_eq!(result, Normalized::StrippedEmpty);
    assert_eq!(result.into_text(), "");
}

#[test]
fn test_break_after_full_stop() {
    let raw = "> 一文目。二文目。三文目";
    assert_eq!(
        normalize_text(raw, &NO_KEYWORDS),
        "一文目。\n二文目。\n三文目"
    );
}

#[test]
fn test_full_stop_followed_by_ideographic_space() {
    let raw = "> 一文目。\u{3000}二文目。";
    assert_eq!(normalize_text(raw, &NO_KEYWORDS), "一文目。\n二文目。");
}

#[test]
fn test_no_break_before_closing_bracket() {
    let raw = "> 「はい。」と言った。次です。";
    assert_eq!(
        normalize_text(raw, &NO_KEYWORDS),
        "「はい。」と言った。\n次です。"
    );
}

#[test]
fn test_no_break_before_ascii_closing_marks() {
    for closing in [')', ']', '}', '>', '"', '\''] {
        let raw = format!("> 注意。{closing}です");
        let text = normalize_text(&raw, &NO_KEYWORDS);
        assert_eq!(text, format!("注意。{closing}です"), "closing mark {closing}");
    }
}

#[test]
fn test_no_break_before_fullwidth_closing_marks() {
    for closing in ['」', '』', '）', '】'] {
        let raw = format!("> 注意。{closing}です");
        let text = normalize_text(&raw, &NO_KEYWORDS);
        assert!(!text.contains('\n'), "closing mark {closing}: {text:?}");
    }
}

#[test]
fn test_whitespace_before_closing_bracket_becomes_line_break() {
    let raw = "> はい。 」";
    assert_eq!(normalize_text(raw, &NO_KEYWORDS), "はい。\n」");
}

#[test]
fn test_ascii_spaces_become_line_breaks() {
    let raw = "> Hello there.   How are you?";
    assert_eq!(
        normalize_text(raw, &NO_KEYWORDS),
        "Hello\nthere.\nHow\nare\nyou?"
    );
}

#[test]
fn test_keyword_at_start() {
    let raw = "> 記：テストです。\n> 本文はこちらです。";
    assert_eq!(
        normalize_text(raw, &["記"]),
        "記：テストです。\n本文はこちらです。"
    );
}

#[test]
fn test_keyword_gets_paragraph_break() {
    let raw = "> よろしくお願いします。\n> 差出人：山田";
    assert_eq!(
        normalize_text(raw, &DEFAULT_KEYWORDS),
        "よろしくお願いします。\n\n差出人：山田"
    );
}

#[test]
fn test_keyword_twice() {
    let raw = "> 前文 件名 中文 件名 後文";
    let text = normalize_text(raw, &["件名"]);
    assert_eq!(text, "前文\n\n件名\n中文\n\n件名\n後文");
    assert!(!text.contains("\n\n\n"));
}

#[test]
fn test_keyword_matches_inside_longer_word() {
    let raw = "> 登記簿を確認";
    assert_eq!(normalize_text(raw, &["記"]), "登\n\n記簿を確認");
}

#[test]
fn test_duplicate_keywords_collapse() {
    let raw = "> 前 記";
    assert_eq!(normalize_text(raw, &["記", "記"]), "前\n\n記");
}

#[test]
fn test_overlapping_keywords_apply_in_order() {
    let raw = "> 宛先：田中";
    assert_eq!(normalize_text(raw, &["宛先", "先"]), "宛\n\n先：田中");
    assert_eq!(normalize_text(raw, &["先", "宛先"]), "宛\n\n先：田中");
}

#[test]
fn test_keyword_not_present() {
    let raw = "> 本文のみ。";
    assert_eq!(
        normalize(raw, &DEFAULT_KEYWORDS),
        Normalized::Reflowed("本文のみ。".to_string())
    );
}

#[test]
fn test_empty_keyword_falls_back_to_original() {
    let raw = "> 記：本文。\n";
    let result = normalize(raw, &["記", ""]);

    assert!(result.is_fallback());
    assert_eq!(
        result,
        Normalized::Fallback {
            original: raw.to_string(),
            error: NormalizeError::EmptyKeyword { index: 1 },
        }
    );
    assert_eq!(result.text(), raw);
}

#[test]
fn test_output_shape_invariants() {
    let inputs = [
        "> 記\n> 記\n> 記",
        ">   件名：A。\n\n>\n> 宛先：B。 」\n> 差出人　C",
        "  >> 前文。。後文。\n>>> 　\n",
        "> 件名件名件名",
    ];

    for raw in inputs {
        let text = normalize_text(raw, &DEFAULT_KEYWORDS);
        assert!(!text.contains("\n\n\n"), "{raw:?} -> {text:?}");
        assert_eq!(text, text.trim(), "{raw:?} -> {text:?}");
    }
}

#[test]
fn test_paragraph_breaks_between_adjacent_keywords() {
    let raw = "> 件名件名";
    assert_eq!(normalize_text(raw, &["件名"]), "件名\n\n件名");
}

#[test]
fn test_control_separators_count_as_whitespace() {
    assert_eq!(normalize("\u{1f}", &NO_KEYWORDS), Normalized::Blank);
    assert_eq!(
        normalize(" \u{1c}plain\u{1f} ", &NO_KEYWORDS),
        Normalized::Unquoted("plain".to_string())
    );
    assert_eq!(normalize_text("> a\u{1f}b\u{1f}", &NO_KEYWORDS), "a\nb");
    assert_eq!(normalize_text("\u{1f}>> 本文。\u{1f}次。", &NO_KEYWORDS), "本文。\n次。");
}

// --- Log events ---

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(LevelFilter::DEBUG)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}

#[test]
fn test_unquoted_logs_one_warning() {
    let (result, logs) = with_captured_logs(|| normalize("plain text", &NO_KEYWORDS));

    assert_eq!(result.kind(), OutcomeKind::Unquoted);
    assert_eq!(logs.matches("WARN").count(), 1, "{logs}");
    assert!(logs.contains("No quoted lines"), "{logs}");
    assert!(!logs.contains("ERROR"), "{logs}");
}

#[test]
fn test_fallback_logs_error_with_message() {
    let (result, logs) = with_captured_logs(|| normalize("> 本文。", &["記", ""]));

    assert!(result.is_fallback());
    assert_eq!(logs.matches("ERROR").count(), 1, "{logs}");
    assert!(logs.contains("keyword #1 is empty"), "{logs}");
}

#[test]
fn test_stripped_empty_logs_no_warning_or_error() {
    let (result, logs) = with_captured_logs(|| normalize("> \n>>", &NO_KEYWORDS));

    assert_eq!(result, Normalized::StrippedEmpty);
    assert!(!logs.contains("WARN"), "{logs}");
    assert!(!logs.contains("ERROR"), "{logs}");
}

#[test]
fn test_reflowed_logs_no_warning_or_error() {
    let (result, logs) = with_captured_logs(|| normalize("> 記：本文。", &DEFAULT_KEYWORDS));

    assert_eq!(result.kind(), OutcomeKind::Reflowed);
    assert!(!logs.contains("WARN"), "{logs}");
    assert!(!logs.contains("ERROR"), "{logs}");
}
