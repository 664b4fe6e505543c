use crate::blocks::{self, Fence};
use crate::types::ContentBlock;

/// Parse raw post text into an ordered, flat sequence of content blocks.
///
/// This function never fails and never panics. Syntax it does not recognise
/// degrades to `Paragraph` blocks holding the raw text.
pub fn parse(input: &str) -> Vec<ContentBlock> {
    // Normalise CRLF → LF.
    let normalised = input.replace("\r\n", "\n");
    let lines: Vec<&str> = normalised.split('\n').collect();

    let mut scanner = Scanner::default();
    let mut idx = 0;
    while idx < lines.len() {
        idx = scanner.step(&lines, idx);
    }
    scanner.finish()
}

// ------------------------------------------------------------------
// Line classification
// ------------------------------------------------------------------

/// What a single trimmed line looks like, before grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Fence(Fence, &'a str),
    Heading(u8, &'a str),
    Divider,
    Image(&'a str, Option<&'a str>),
    TableRow,
    Quote(&'a str),
    Bullet(&'a str),
    Ordered(&'a str),
    InlineCode(&'a str),
    Text,
}

fn classify(trimmed: &str) -> LineKind<'_> {
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if let Some((fence, info)) = blocks::fence_open(trimmed) {
        return LineKind::Fence(fence, info);
    }
    if let Some((level, text)) = blocks::heading(trimmed) {
        return LineKind::Heading(level, text);
    }
    // Dividers before bullets: `* * *` is a rule, not a list item.
    if blocks::is_divider(trimmed) {
        return LineKind::Divider;
    }
    if let Some((src, alt)) = blocks::image(trimmed) {
        return LineKind::Image(src, alt);
    }
    if blocks::is_table_row(trimmed) {
        return LineKind::TableRow;
    }
    if let Some(text) = blocks::quote_line(trimmed) {
        return LineKind::Quote(text);
    }
    if let Some(item) = blocks::bullet_item(trimmed) {
        return LineKind::Bullet(item);
    }
    if let Some(item) = blocks::ordered_item(trimmed) {
        return LineKind::Ordered(item);
    }
    if let Some(code) = blocks::inline_code(trimmed) {
        return LineKind::InlineCode(code);
    }
    LineKind::Text
}

// ------------------------------------------------------------------
// Scanner
// ------------------------------------------------------------------

/// A multi-line block still accepting lines.
#[derive(Debug)]
enum OpenGroup {
    Paragraph(Vec<String>),
    Quote(Vec<String>),
    List(Vec<String>),
    OrderedList(Vec<String>),
}

#[derive(Debug, Default)]
struct Scanner {
    blocks: Vec<ContentBlock>,
    open: Option<OpenGroup>,
}

impl Scanner {
    /// Consume the line at `idx` (and any lines it owns) and return the index
    /// of the next unconsumed line.
    fn step(&mut self, lines: &[&str], idx: usize) -> usize {
        let trimmed = lines[idx].trim();

        match classify(trimmed) {
            LineKind::Blank => {
                self.flush();
                idx + 1
            }
            LineKind::Fence(fence, info) => {
                self.flush();
                self.fenced_code(lines, idx, fence, info)
            }
            LineKind::Heading(level, text) => {
                self.flush();
                self.blocks.push(ContentBlock::Heading {
                    text: text.to_string(),
                    level,
                });
                idx + 1
            }
            LineKind::Divider => {
                self.flush();
                self.blocks.push(ContentBlock::Divider);
                idx + 1
            }
            LineKind::Image(src, alt) => {
                self.flush();
                self.image(lines, idx, src, alt)
            }
            LineKind::TableRow => match self.table(lines, idx) {
                Some(next) => next,
                None => {
                    self.push_text(trimmed);
                    idx + 1
                }
            },
            LineKind::Quote(text) => {
                match &mut self.open {
                    Some(OpenGroup::Quote(quoted)) => quoted.push(text.to_string()),
                    _ => self.open_group(OpenGroup::Quote(vec![text.to_string()])),
                }
                idx + 1
            }
            LineKind::Bullet(item) => {
                match &mut self.open {
                    Some(OpenGroup::List(items)) => items.push(item.to_string()),
                    _ => self.open_group(OpenGroup::List(vec![item.to_string()])),
                }
                idx + 1
            }
            LineKind::Ordered(item) => {
                match &mut self.open {
                    Some(OpenGroup::OrderedList(items)) => items.push(item.to_string()),
                    _ => self.open_group(OpenGroup::OrderedList(vec![item.to_string()])),
                }
                idx + 1
            }
            LineKind::InlineCode(code) => {
                self.flush();
                self.blocks.push(ContentBlock::InlineCode {
                    text: code.to_string(),
                });
                idx + 1
            }
            LineKind::Text => {
                self.push_text(trimmed);
                idx + 1
            }
        }
    }

    /// Capture everything up to the matching close fence, verbatim.
    ///
    /// An unterminated fence runs to the end of the input.
    fn fenced_code(&mut self, lines: &[&str], idx: usize, fence: Fence, info: &str) -> usize {
        let info = blocks::fence_info(info);

        let body_start = idx + 1;
        let close = lines[body_start.min(lines.len())..]
            .iter()
            .position(|line| blocks::is_fence_close(line.trim(), fence))
            .map(|offset| body_start + offset);
        let body_end = close.unwrap_or(lines.len());

        let mut body = &lines[body_start.min(body_end)..body_end];
        while let [first, rest @ ..] = body {
            if !first.trim().is_empty() {
                break;
            }
            body = rest;
        }
        while let [rest @ .., last] = body {
            if !last.trim().is_empty() {
                break;
            }
            body = rest;
        }

        self.blocks.push(ContentBlock::Code {
            text: body.join("\n"),
            language: info.language,
            filename: info.filename,
        });

        match close {
            Some(close_idx) => close_idx + 1,
            None => lines.len(),
        }
    }

    /// An image line, plus an immediately following plain line as its caption.
    ///
    /// A following line that yields no caption text is left for the paragraph.
    fn image(&mut self, lines: &[&str], idx: usize, src: &str, alt: Option<&str>) -> usize {
        let caption = lines
            .get(idx + 1)
            .map(|line| line.trim())
            .filter(|line| classify(line) == LineKind::Text)
            .and_then(blocks::caption);
        let consumed = if caption.is_some() { 2 } else { 1 };

        self.blocks.push(ContentBlock::Image {
            src: src.to_string(),
            alt: alt.map(str::to_string),
            caption,
        });

        idx + consumed
    }

    /// Header line, separator line, then one or more pipe rows.
    ///
    /// Returns `None` without consuming anything when the shape does not match.
    fn table(&mut self, lines: &[&str], idx: usize) -> Option<usize> {
        let separator = lines.get(idx + 1)?.trim();
        if !blocks::is_table_separator(separator) {
            return None;
        }

        let data_start = idx + 2;
        let data_len = lines
            .get(data_start..)?
            .iter()
            .take_while(|line| blocks::is_table_row(line.trim()))
            .count();
        if data_len == 0 {
            return None;
        }

        self.flush();

        let headers = blocks::split_pipe_row(lines[idx]);
        let width = headers.len();
        let rows = lines[data_start..data_start + data_len]
            .iter()
            .map(|line| blocks::fit_row(blocks::split_pipe_row(line), width))
            .collect();

        self.blocks.push(ContentBlock::Table { headers, rows });
        Some(data_start + data_len)
    }

    fn push_text(&mut self, trimmed: &str) {
        match &mut self.open {
            Some(OpenGroup::Paragraph(text)) => text.push(trimmed.to_string()),
            _ => self.open_group(OpenGroup::Paragraph(vec![trimmed.to_string()])),
        }
    }

    fn open_group(&mut self, group: OpenGroup) {
        self.flush();
        self.open = Some(group);
    }

    /// Close the open multi-line group, if any, into a block.
    fn flush(&mut self) {
        let Some(group) = self.open.take() else {
            return;
        };

        let block = match group {
            OpenGroup::Paragraph(lines) => ContentBlock::Paragraph {
                text: lines.join(" "),
            },
            OpenGroup::Quote(lines) => {
                let text = lines.join("\n").trim().to_string();
                // A quote made only of bare `>` markers carries nothing.
                if text.is_empty() {
                    return;
                }
                ContentBlock::Blockquote { text }
            }
            OpenGroup::List(items) => ContentBlock::List { items },
            OpenGroup::OrderedList(items) => ContentBlock::OrderedList { items },
        };
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<ContentBlock> {
        self.flush();
        self.blocks
    }
}
