//! Runtime-error capture and formatting.
//!
//! A raw Lua error string like `script.lua:10: bad argument` moves through
//! four stages: parsed into [`ErrorInfo`] fields, enriched with a capped
//! call-stack traceback, enriched with a source-context window around the
//! offending line, and rendered as a bordered plain-text report. Every
//! stage is best-effort: a piece that cannot be recovered becomes its
//! documented placeholder, and rendering never fails.
//!
//! The traceback source and the file reader are injected into
//! [`Reporter`], so the whole pipeline is testable without a live engine.

use std::path::Path;
use std::rc::Rc;

use crate::fsio::FileReader;

/// Most traceback frames a report will show.
pub const MAX_TRACE_FRAMES: usize = 5;

/// Upper bound on accumulated context text, in bytes.
pub const MAX_CONTEXT_BYTES: usize = 512;

/// Marker Lua prints above a traceback; also how an embedded traceback is
/// recognized inside raw error text.
const TRACEBACK_MARKER: &str = "stack traceback:";

pub const NO_TRACEBACK: &str = "(no traceback available)";
pub const NO_CONTEXT: &str = "(no source context available)";
pub const UNREADABLE_SOURCE: &str = "(unable to read source file for context)";
pub const OMISSION_MARKER: &str = "...(more stack frames omitted)";

// ── ErrorInfo ─────────────────────────────────────────────────────────────────

/// Structured decomposition of one runtime error. Built fresh per error
/// event and discarded after rendering.
#[derive(Debug)]
pub struct ErrorInfo {
    pub message: String,
    pub source: String,
    /// 0 means "unknown".
    pub line: u32,
    pub traceback: Vec<String>,
    pub context: Vec<String>,
}

/// Parse the structural fields out of raw error text.
///
/// `<source>:<line>: <message>` splits on the first two colons; a missing
/// line number parses as 0, and text with no markers at all keeps the full
/// raw string as the message with `source = "unknown"`.
pub fn parse_raw(raw: &str) -> ErrorInfo {
    let raw = raw.trim_end();
    let mut source = String::from("unknown");
    let mut line = 0u32;
    let mut message = raw.to_owned();

    if let Some((head, rest)) = raw.split_once(':') {
        source = head.to_owned();
        let digits: String = rest
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        line = digits.parse().unwrap_or(0);
        if let Some((_, msg)) = rest.split_once(':') {
            message = msg.trim_start().to_owned();
        }
    }

    ErrorInfo {
        message,
        source,
        line,
        traceback: Vec::new(),
        context: Vec::new(),
    }
}

impl ErrorInfo {
    /// Build a report skeleton from known parts, bypassing the parse stage.
    /// Used for load errors where the failing file is already known.
    pub fn from_parts(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: source.into(),
            line: 0,
            traceback: Vec::new(),
            context: Vec::new(),
        }
    }

    // ── Enrichment: traceback ─────────────────────────────────────────────

    /// Fill `traceback` from raw `debug.traceback`-style text.
    ///
    /// Marker lines and frames mentioning the trace facility itself are
    /// dropped; at most [`MAX_TRACE_FRAMES`] frames are kept, followed by
    /// exactly one omission marker when more existed. `None` or an empty
    /// trace yields the placeholder.
    pub fn enrich_traceback(&mut self, trace: Option<&str>) {
        self.traceback.clear();

        if let Some(trace) = trace {
            let mut omitted = false;
            for frame in trace.lines() {
                let frame = frame.trim();
                if frame.is_empty()
                    || frame.ends_with(TRACEBACK_MARKER)
                    || frame.contains("debug.traceback")
                {
                    continue;
                }
                if self.traceback.len() == MAX_TRACE_FRAMES {
                    omitted = true;
                    break;
                }
                self.traceback.push(frame.to_owned());
            }
            if omitted {
                self.traceback.push(OMISSION_MARKER.to_owned());
            }
        }

        if self.traceback.is_empty() {
            self.traceback.push(NO_TRACEBACK.to_owned());
        }
    }

    // ── Enrichment: source context ────────────────────────────────────────

    /// Fill `context` with lines `line-2 ..= line+2` of `source`, clamped
    /// to the file start, the offending line marked with `>`. Stops early
    /// once [`MAX_CONTEXT_BYTES`] of context has accumulated.
    pub fn enrich_context(&mut self, reader: &dyn FileReader) {
        self.context.clear();

        if self.source.is_empty() || self.source == "unknown" || self.line == 0 {
            self.context.push(NO_CONTEXT.to_owned());
            return;
        }
        let Some(text) = reader.read(Path::new(&self.source)) else {
            self.context.push(UNREADABLE_SOURCE.to_owned());
            return;
        };

        let first = self.line.saturating_sub(2).max(1);
        let last = self.line.saturating_add(2);
        let mut used = 0usize;

        for (idx, line) in text.lines().enumerate() {
            let lineno = idx as u32 + 1;
            if lineno < first {
                continue;
            }
            if lineno > last {
                break;
            }
            let marker = if lineno == self.line { '>' } else { ' ' };
            let rendered = format!("{marker} {lineno:3} | {line}");
            used += rendered.len();
            if used > MAX_CONTEXT_BYTES {
                break;
            }
            self.context.push(rendered);
        }

        if self.context.is_empty() {
            self.context.push(NO_CONTEXT.to_owned());
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    /// Render the bordered report. Missing pieces render as placeholders;
    /// this never fails.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("╭─ luma error ─────────────────────────────────────────────────╮\n");
        out.push_str(&format!("│ error: {}\n", self.message));
        if self.line > 0 {
            out.push_str(&format!("│ at: {}:{}\n", self.source, self.line));
        } else {
            out.push_str(&format!("│ at: {}\n", self.source));
        }

        // placeholder context (parenthesized) is omitted rather than boxed
        let has_context = self.context.first().is_some_and(|l| !l.starts_with('('));
        if has_context {
            out.push_str("│\n│ code context:\n│\n");
            for line in &self.context {
                out.push_str(&format!("│ {line}\n"));
            }
        }

        out.push_str("│\n│ stack traceback:\n");
        if self.traceback.is_empty() {
            out.push_str(&format!("│   {NO_TRACEBACK}\n"));
        } else {
            for frame in &self.traceback {
                out.push_str(&format!("│   {frame}\n"));
            }
        }
        out.push_str("╰───────────────────────────────────────────────────────────────╯\n");
        out
    }
}

// ── Reporter ──────────────────────────────────────────────────────────────────

/// Capture-and-format entry point with its collaborators injected:
/// a traceback source (the engine's `debug.traceback`, or a stub in tests)
/// and a [`FileReader`] for context extraction.
pub struct Reporter {
    traceback: Box<dyn Fn() -> Option<String>>,
    reader: Rc<dyn FileReader>,
}

impl Reporter {
    pub fn new<F>(traceback: F, reader: Rc<dyn FileReader>) -> Self
    where
        F: Fn() -> Option<String> + 'static,
    {
        Self {
            traceback: Box::new(traceback),
            reader,
        }
    }

    /// Run the full pipeline over one raw error string.
    ///
    /// A traceback embedded in the raw text (the engine appends one below
    /// the marker on protected-call failures) is preferred since it
    /// reflects the raise point; the injected capability is the fallback.
    pub fn capture_and_format(&self, raw: &str) -> String {
        let (head, embedded) = split_embedded_traceback(raw);
        let mut info = parse_raw(head);
        match embedded {
            Some(trace) => info.enrich_traceback(Some(trace)),
            None => info.enrich_traceback((self.traceback)().as_deref()),
        }
        info.enrich_context(self.reader.as_ref());
        info.render()
    }
}

fn split_embedded_traceback(raw: &str) -> (&str, Option<&str>) {
    match raw.find(TRACEBACK_MARKER) {
        Some(idx) => (raw[..idx].trim_end(), Some(&raw[idx..])),
        None => (raw, None),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
