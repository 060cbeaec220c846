//! Minimal inline markup for assistant replies: `**bold**`, `*italic*` and
//! `` `code` ``, rendered into an egui layout job. Unmatched delimiters are
//! kept as literal text; newlines pass through untouched.

use egui::text::LayoutJob;
use egui::{Color32, FontId, TextFormat};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSpan {
    pub text: String,
    pub style: SpanStyle,
}

/// Split `input` into styled spans. Bold may nest italics; code spans are
/// opaque (no markup inside backticks).
pub fn parse_inline_markup(input: &str) -> Vec<MarkupSpan> {
    let mut spans = Vec::new();
    parse_into(input, SpanStyle::default(), &mut spans);
    spans
}

fn parse_into(input: &str, style: SpanStyle, out: &mut Vec<MarkupSpan>) {
    let bytes = input.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if !style.code {
            if !style.strong && bytes[i..].starts_with(b"**") {
                if let Some(len) = delimited_len(&bytes[i + 2..], b"**") {
                    flush_literal(input, literal_start, i, style, out);
                    let inner = &input[i + 2..i + 2 + len];
                    parse_into(
                        inner,
                        SpanStyle {
                            strong: true,
                            ..style
                        },
                        out,
                    );
                    i += 2 + len + 2;
                    literal_start = i;
                    continue;
                }
            }
            if !style.emphasis && bytes[i] == b'*' && !bytes[i..].starts_with(b"**") {
                if let Some(len) = single_star_len(&bytes[i + 1..]) {
                    flush_literal(input, literal_start, i, style, out);
                    let inner = &input[i + 1..i + 1 + len];
                    parse_into(
                        inner,
                        SpanStyle {
                            emphasis: true,
                            ..style
                        },
                        out,
                    );
                    i += 1 + len + 1;
                    literal_start = i;
                    continue;
                }
            }
            if bytes[i] == b'`' {
                if let Some(len) = delimited_len(&bytes[i + 1..], b"`") {
                    flush_literal(input, literal_start, i, style, out);
                    out.push(MarkupSpan {
                        text: input[i + 1..i + 1 + len].to_string(),
                        style: SpanStyle { code: true, ..style },
                    });
                    i += 1 + len + 1;
                    literal_start = i;
                    continue;
                }
            }
        }
        i += 1;
    }
    flush_literal(input, literal_start, input.len(), style, out);
}

/// Distance to the next occurrence of `close`, or None if unmatched or the
/// span would be empty.
fn delimited_len(rest: &[u8], close: &[u8]) -> Option<usize> {
    (1..rest.len().saturating_sub(close.len() - 1))
        .find(|&len| rest[len..].starts_with(close))
}

/// Distance to the next `*`. Non-greedy, matching the first closer found.
fn single_star_len(rest: &[u8]) -> Option<usize> {
    (1..rest.len()).find(|&len| rest[len] == b'*')
}

fn flush_literal(input: &str, start: usize, end: usize, style: SpanStyle, out: &mut Vec<MarkupSpan>) {
    if start < end {
        out.push(MarkupSpan {
            text: input[start..end].to_string(),
            style,
        });
    }
}

/// Lay out a message body with the inline markup applied. The default fonts
/// carry no bold weight, so strong spans use the stronger text color.
pub fn message_layout_job(
    text: &str,
    base_color: Color32,
    strong_color: Color32,
    font_size: f32,
    code_background: Color32,
) -> LayoutJob {
    let mut job = LayoutJob::default();
    for span in parse_inline_markup(text) {
        let mut format = TextFormat {
            font_id: FontId::proportional(font_size),
            color: base_color,
            ..Default::default()
        };
        if span.style.code {
            format.font_id = FontId::monospace(font_size * 0.92);
            format.background = code_background;
        }
        if span.style.strong {
            format.color = strong_color;
        }
        if span.style.emphasis {
            format.italics = true;
        }
        job.append(&span.text, 0.0, format);
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> MarkupSpan {
        MarkupSpan {
            text: text.to_string(),
            style: SpanStyle::default(),
        }
    }

    fn styled(text: &str, style: SpanStyle) -> MarkupSpan {
        MarkupSpan {
            text: text.to_string(),
            style,
        }
    }

    #[test]
    fn plain_text_is_a_single_span() {
        assert_eq!(parse_inline_markup("hello world"), vec![plain("hello world")]);
    }

    #[test]
    fn bold_italic_and_code_spans() {
        let spans = parse_inline_markup("see **the policy** in *section 2* or `config.toml`");
        assert_eq!(
            spans,
            vec![
                plain("see "),
                styled(
                    "the policy",
                    SpanStyle {
                        strong: true,
                        ..Default::default()
                    }
                ),
                plain(" in "),
                styled(
                    "section 2",
                    SpanStyle {
                        emphasis: true,
                        ..Default::default()
                    }
                ),
                plain(" or "),
                styled(
                    "config.toml",
                    SpanStyle {
                        code: true,
                        ..Default::default()
                    }
                ),
            ]
        );
    }

    #[test]
    fn unmatched_delimiters_stay_literal() {
        assert_eq!(parse_inline_markup("2 * 3"), vec![plain("2 * 3")]);
        assert_eq!(parse_inline_markup("a ** b"), vec![plain("a ** b")]);
        assert_eq!(
            parse_inline_markup("tick ` mark"),
            vec![plain("tick ` mark")]
        );
    }

    #[test]
    fn italics_nest_inside_bold() {
        let spans = parse_inline_markup("**very *important* note**");
        assert_eq!(
            spans,
            vec![
                styled(
                    "very ",
                    SpanStyle {
                        strong: true,
                        ..Default::default()
                    }
                ),
                styled(
                    "important",
                    SpanStyle {
                        strong: true,
                        emphasis: true,
                        ..Default::default()
                    }
                ),
                styled(
                    " note",
                    SpanStyle {
                        strong: true,
                        ..Default::default()
                    }
                ),
            ]
        );
    }

    #[test]
    fn backticks_suppress_inner_markup() {
        let spans = parse_inline_markup("`**not bold**`");
        assert_eq!(
            spans,
            vec![styled(
                "**not bold**",
                SpanStyle {
                    code: true,
                    ..Default::default()
                }
            )]
        );
    }

    #[test]
    fn newlines_survive_inside_spans() {
        let spans = parse_inline_markup("line one\nline two");
        assert_eq!(spans, vec![plain("line one\nline two")]);
    }

    #[test]
    fn layout_job_covers_all_text() {
        let job = message_layout_job(
            "a **b** c",
            Color32::GRAY,
            Color32::WHITE,
            14.0,
            Color32::from_gray(40),
        );
        assert_eq!(job.text, "a b c");
        assert_eq!(job.sections.len(), 3);
        assert_eq!(job.sections[1].format.color, Color32::WHITE);
    }
}
