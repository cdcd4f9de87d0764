// Pretty error reporting with source highlighting using ariadne

use super::SyntaxError;
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::io;

/// Report syntax errors with source highlighting on stderr
pub fn report_syntax_errors(filename: &str, source: &str, errors: &[SyntaxError]) -> io::Result<()> {
    for error in errors {
        build_report(error, true).eprint(Source::from(source))?;
        eprintln!("  --> {}:{}", filename, get_line_col(source, error.span.start));
    }
    Ok(())
}

/// Render one syntax error without colors, as it would appear on a terminal
pub fn render_syntax_error(source: &str, error: &SyntaxError) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail
    let _ = build_report(error, false).write(Source::from(source), &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

fn get_line_col(source: &str, offset: usize) -> String {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    format!("{}:{}", line, col)
}

/// Build an ariadne Report from a SyntaxError
fn build_report(error: &SyntaxError, color: bool) -> Report<'static, std::ops::Range<usize>> {
    let span = error.span.start..error.span.end;

    let label = match &error.found {
        Some(found) => format!("unexpected `{}`", found),
        None => "unexpected end of input".to_string(),
    };

    let mut report = Report::build(ReportKind::Error, span.clone())
        .with_config(Config::default().with_color(color))
        .with_code("E001")
        .with_message(&error.message)
        .with_label(
            Label::new(span)
                .with_message(label)
                .with_color(Color::Red),
        );

    if !error.expected.is_empty() {
        report = report.with_help(format!("expected one of: {}", error.expected.join(", ")));
    }

    report.finish()
}
