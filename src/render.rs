//! Turns composed reports into downloadable documents.

use std::fmt::{self, Write};

use slog::{warn, Logger};
use thiserror::Error;

use crate::report::{compose, Content, EmissionTable, MinimalReport, Report, Section};
use crate::submission::StoredRecord;

/// Enumerates errors returned while rendering a document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Formatting failed")]
    Format(#[from] fmt::Error),

    #[error("Report has no {0} section")]
    MissingSection(&'static str),
}

/// A document format that reports can be rendered to.
pub trait Renderer: Send + Sync {
    /// The MIME type of the rendered document.
    fn content_type(&self) -> &'static str;

    /// The file extension of the rendered document, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, report: &Report) -> Result<Vec<u8>, RenderError>;

    fn render_minimal(&self, report: &MinimalReport) -> Result<Vec<u8>, RenderError>;
}

/// Renders the full report of `record`, falling back to the minimal
/// single-page variant when that fails.
pub fn render_with_fallback(
    renderer: &dyn Renderer,
    logger: &Logger,
    record: &StoredRecord,
) -> Result<Vec<u8>, RenderError> {
    let report = compose(record);

    match renderer.render(&report) {
        Ok(document) => Ok(document),
        Err(e) => {
            warn!(logger, "Falling back to minimal report"; "id" => record.id, "error" => %e);
            renderer.render_minimal(&MinimalReport::from_record(record))
        }
    }
}

/// Renders reports as self-contained HTML pages.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlRenderer;

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;max-width:48em;margin:2em auto;color:#2c3e50}\
h1{text-align:center;border-bottom:2px solid #3498db;padding-bottom:.5em}\
h2{color:#34495e;font-size:1.1em}\
table{border-collapse:collapse;width:100%}\
td,th{border:1px solid #bdc3c7;padding:6px}\
th{background:#3498db;color:#fff}\
tr.total td{background:#27ae60;color:#fff;font-weight:bold}\
.highlight{color:#27ae60;text-align:center;font-weight:bold}\
.note{font-size:.8em;color:gray}\
footer{text-align:center;color:#7f8c8d;border-top:1px solid #95a5a6;margin-top:2em;padding-top:1em}";

impl Renderer for HtmlRenderer {
    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        if report.emission_table().is_none() {
            return Err(RenderError::MissingSection("emissions"));
        }

        let mut html = String::new();
        open_document(&mut html, &report.title)?;

        for section in &report.sections {
            write_section(&mut html, section)?;
        }

        html.push_str("</body>\n</html>\n");

        Ok(html.into_bytes())
    }

    fn render_minimal(&self, report: &MinimalReport) -> Result<Vec<u8>, RenderError> {
        let mut html = String::new();
        open_document(&mut html, report.title)?;

        writeln!(html, "<h1>{}</h1>", escape(report.title))?;
        writeln!(html, "<p>Email: {}</p>", escape(&report.email))?;
        writeln!(html, "<p>Type: {}</p>", escape(&report.participant_type))?;
        writeln!(
            html,
            "<p class=\"highlight\">Total emission: {} gCO2</p>",
            report.total
        )?;
        html.push_str("</body>\n</html>\n");

        Ok(html.into_bytes())
    }
}

fn open_document(html: &mut String, title: &str) -> fmt::Result {
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html>\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(html, "<title>{}</title>", escape(title))?;
    writeln!(html, "<style>{}</style>", STYLE)?;
    writeln!(html, "</head>\n<body>")
}

fn write_section(html: &mut String, section: &Section) -> fmt::Result {
    use crate::report::SectionKind::*;

    if let Some(heading) = section.heading {
        writeln!(html, "<h2>{}</h2>", escape(heading))?;
    }

    match (&section.content, section.kind) {
        (Content::Text { lines }, Header) => {
            for line in lines {
                writeln!(html, "<h1>{}</h1>", escape(line))?;
            }
        }
        (Content::Text { lines }, Footer) => {
            let lines = lines.iter().map(|l| escape(l)).collect::<Vec<_>>();
            writeln!(html, "<footer>{}</footer>", lines.join("<br>"))?;
        }
        (Content::Text { lines }, _) => {
            writeln!(html, "<ul>")?;
            for line in lines {
                writeln!(html, "<li>{}</li>", escape(line))?;
            }
            writeln!(html, "</ul>")?;
        }
        (Content::KeyValue { pairs, note }, _) => {
            writeln!(html, "<table>")?;
            for (key, value) in pairs {
                writeln!(
                    html,
                    "<tr><th>{}</th><td>{}</td></tr>",
                    escape(key),
                    escape(value)
                )?;
            }
            writeln!(html, "</table>")?;

            if let Some(note) = note {
                writeln!(html, "<p class=\"note\">{}</p>", escape(note))?;
            }
        }
        (Content::Emissions(table), _) => write_emission_table(html, table)?,
    }

    Ok(())
}

fn write_emission_table(html: &mut String, table: &EmissionTable) -> fmt::Result {
    writeln!(
        html,
        "<p class=\"highlight\">TOTAL EMISSIONS: {} gCO2</p>",
        table.total
    )?;
    writeln!(html, "<table>\n<tr>")?;
    for column in EmissionTable::HEADER.iter() {
        writeln!(html, "<th>{}</th>", escape(column))?;
    }
    writeln!(html, "</tr>")?;

    for row in &table.rows {
        writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(row.leg),
            escape(&row.transport),
            escape(&row.distance),
            row.emission
        )?;
    }

    writeln!(
        html,
        "<tr class=\"total\"><td>TOTAL</td><td></td><td></td><td>{} gCO2</td></tr>\n</table>",
        table.total
    )
}

/// Escapes the characters HTML gives meaning to.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use slog::{o, Discard};
    use time::OffsetDateTime;

    use super::*;
    use crate::emission::Emission;
    use crate::report::{SectionKind, RECOMMENDATIONS};
    use crate::submission::SubmissionInput;
    use crate::survey::{Origin, ParticipantType};
    use crate::transport::TransportMode;

    fn record() -> StoredRecord {
        StoredRecord {
            id: 3,
            input: SubmissionInput {
                email: "<script>@example.com".to_owned(),
                origin: Origin::from("Goiás"),
                participant_type: ParticipantType::Coach,
                principal_mode: TransportMode::Car,
                principal_distance: 100.0,
                local_mode: TransportMode::BikeOrWalk,
                local_distance: 2.0,
                event_days: 3,
            },
            emission_total: Emission::from_grams(9_660.0),
            created_at: OffsetDateTime::unix_epoch(),
        }
    }

    fn logger() -> Logger {
        Logger::root(Discard, o!())
    }

    /// Fails every full render, to exercise the fallback.
    struct BrokenRenderer;

    impl Renderer for BrokenRenderer {
        fn content_type(&self) -> &'static str {
            HtmlRenderer.content_type()
        }

        fn extension(&self) -> &'static str {
            HtmlRenderer.extension()
        }

        fn render(&self, _report: &Report) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Format(fmt::Error))
        }

        fn render_minimal(&self, report: &MinimalReport) -> Result<Vec<u8>, RenderError> {
            HtmlRenderer.render_minimal(report)
        }
    }

    #[test]
    fn full_report_contains_every_section() {
        let html = String::from_utf8(HtmlRenderer.render(&compose(&record())).unwrap()).unwrap();

        assert!(html.contains("PARTICIPANT DETAILS"));
        assert!(html.contains("<td>9660.00 gCO2</td>"));
        assert!(html.contains("ENVIRONMENTAL IMPACT - EQUIVALENCES"));
        for recommendation in RECOMMENDATIONS.iter() {
            assert!(html.contains(&escape(recommendation)));
        }
        assert!(html.contains("<footer>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = String::from_utf8(HtmlRenderer.render(&compose(&record())).unwrap()).unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;@example.com"));
    }

    #[test]
    fn report_without_table_fails_to_render() {
        let mut report = compose(&record());
        report.sections.retain(|s| s.kind != SectionKind::Emissions);

        assert!(matches!(
            HtmlRenderer.render(&report),
            Err(RenderError::MissingSection("emissions"))
        ));
    }

    #[test]
    fn failed_render_falls_back_to_minimal_report() {
        let document = render_with_fallback(&BrokenRenderer, &logger(), &record()).unwrap();
        let html = String::from_utf8(document).unwrap();

        assert!(html.contains("Total emission: 9660.00 gCO2"));
        assert!(html.contains("Type: Coach"));
        assert!(!html.contains("PARTICIPANT DETAILS"));
    }

    #[test]
    fn successful_render_is_not_minimal() {
        let document = render_with_fallback(&HtmlRenderer, &logger(), &record()).unwrap();
        let html = String::from_utf8(document).unwrap();

        assert!(html.contains("EMISSION SUMMARY"));
    }
}
