use pulldown_cmark::{Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};

/// Recognize an ATX heading line: up to three spaces of indentation, 1–6
/// `#`, whitespace, then text. Returns the level and the plain title.
///
/// When the rendered title is empty (`# <span></span>`) the raw text after
/// the `#` run is used instead. Lines with no title text at all (`##`,
/// `## #`) are not headings.
pub(crate) fn parse_heading(line: &str) -> Option<(u8, String)> {
    let unindented = line.trim_start_matches(' ');
    if line.len() - unindented.len() > 3 {
        return None;
    }

    let hashes = unindented.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let after = &unindented[hashes..];
    if !after.starts_with([' ', '\t']) || after.trim().is_empty() {
        return None;
    }

    let (level, title) = heading_title(unindented)?;
    if !title.is_empty() {
        return Some((level, title));
    }
    let raw = normalize_title(strip_closing_sequence(after.trim()));
    (!raw.is_empty()).then_some((level, raw))
}

/// Drop an ATX closing `#` run: the whole text, or a run after whitespace.
fn strip_closing_sequence(text: &str) -> &str {
    let stripped = text.trim_end_matches('#');
    if stripped.is_empty() || stripped.ends_with([' ', '\t']) {
        stripped.trim_end()
    } else {
        text
    }
}

/// Let pulldown-cmark strip emphasis, code spans, links and the closing
/// `#` sequence, keeping only the text.
fn heading_title(line: &str) -> Option<(u8, String)> {
    let mut level = None;
    let mut title = String::new();

    for event in CmarkParser::new_ext(line, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { level: l, .. }) => level = Some(heading_level_to_u8(l)),
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(s) | Event::Code(s) if level.is_some() => title.push_str(&s),
            _ => {}
        }
    }

    level.map(|level| (level, normalize_title(&title)))
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Strip leading/trailing whitespace, collapse interior whitespace.
fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}
