//! Line templating.
//!
//! Rendering runs in two steps whose order matters: named placeholders are
//! expanded first, then positional specifiers are interpolated over the result.
//! Text coming from the logger name or a level token is therefore visible to the
//! second step, so a `%d` inside a name consumes an argument.

use chrono::{DateTime, FixedOffset};

use super::date_pattern::format_instant;
use super::error::FormatError;
use super::level::Level;
use super::printf::{interpolate, Arg, LINE_SEPARATOR};

/// Values the named placeholders resolve to.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub name: &'a str,
    pub instant: DateTime<FixedOffset>,
    /// `None` while resolving file names; `${loglevel}` is then left as is.
    pub level: Option<Level>,
}

enum Placeholder<'a> {
    Name,
    FullTime,
    LogLevel,
    DateFmt(&'a str),
}

impl<'a> Placeholder<'a> {
    /// Parses the text following `${`, returning the placeholder and the number
    /// of bytes it spans.
    fn parse(body: &'a str) -> Option<(Self, usize)> {
        if body.starts_with("name}") {
            Some((Placeholder::Name, "name}".len()))
        } else if body.starts_with("fulltime}") {
            Some((Placeholder::FullTime, "fulltime}".len()))
        } else if body.starts_with("loglevel}") {
            Some((Placeholder::LogLevel, "loglevel}".len()))
        } else if let Some(args) = body.strip_prefix("datefmt(") {
            let end = args.find(")}")?;
            let consumed = "datefmt(".len() + end + ")}".len();
            Some((Placeholder::DateFmt(&args[..end]), consumed))
        } else {
            None
        }
    }

    fn expand(&self, out: &mut String, ctx: &RenderContext<'_>) -> Result<(), FormatError> {
        match self {
            Placeholder::Name => out.push_str(ctx.name),
            Placeholder::FullTime => out.push_str(&ctx.instant.format("%H:%M:%S").to_string()),
            Placeholder::LogLevel => match ctx.level {
                Some(level) => out.push_str(level.token()),
                None => out.push_str("${loglevel}"),
            },
            Placeholder::DateFmt(pattern) => out.push_str(&format_instant(pattern, &ctx.instant)?),
        }
        Ok(())
    }
}

/// Expands `${name}`, `${fulltime}`, `${loglevel}` and `${datefmt(PATTERN)}` in a
/// single left-to-right pass. Expanded text is never scanned again, and any
/// other `${...}` is copied verbatim.
pub fn expand_placeholders(template: &str, ctx: &RenderContext<'_>) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + ctx.name.len() + 16);
    let mut rest = template;

    while let Some(pos) = rest.find("${") {
        out.push_str(&rest[..pos]);
        let body = &rest[pos + 2..];

        match Placeholder::parse(body) {
            Some((placeholder, consumed)) => {
                placeholder.expand(&mut out, ctx)?;
                rest = &body[consumed..];
            }
            None => {
                out.push('$');
                rest = &rest[pos + 1..];
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Renders one complete line, terminator included.
pub fn render(template: &str, ctx: &RenderContext<'_>, args: &[Arg]) -> Result<String, FormatError> {
    let expanded = expand_placeholders(template, ctx)?;
    let mut line = interpolate(&expanded, args)?;
    line.push_str(LINE_SEPARATOR);
    Ok(line)
}
