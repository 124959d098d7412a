//! A small rectangular table model shared by the interpreter and exporter.
//!
//! Tables come from two places: GFM pipe tables in recognizer Markdown
//! (parsed with pulldown-cmark) and `<table>` elements in HTML (parsed with
//! scraper's tolerant html5ever parser). Either way the first table found
//! wins, the first row becomes the header, and short rows are padded with
//! empty cells so every row has the same width.

use crate::error::ParseError;
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use scraper::{ElementRef, Html, Selector};

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());

/// Header plus data rows, all of equal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn from_raw_rows(mut raw: Vec<Vec<String>>) -> Result<Self, ParseError> {
        if raw.is_empty() {
            return Err(ParseError::NoTable);
        }
        let width = raw.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(ParseError::EmptyTable);
        }
        for row in &mut raw {
            row.resize(width, String::new());
        }
        let headers = raw.remove(0);
        Ok(Self { headers, rows: raw })
    }

    /// Parse the first GFM pipe table in `markdown`.
    ///
    /// A header separator line (`|---|---|`) is required, as in GFM; pipe
    /// lines without one are not a table.
    pub fn from_markdown(markdown: &str) -> Result<Self, ParseError> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut row: Vec<String> = Vec::new();
        let mut cell = String::new();
        let mut in_table = false;
        let mut in_cell = false;

        for event in Parser::new_ext(markdown, Options::ENABLE_TABLES) {
            match event {
                Event::Start(Tag::Table(_)) => in_table = true,
                Event::End(TagEnd::Table) => break,
                Event::Start(Tag::TableCell) if in_table => {
                    in_cell = true;
                    cell.clear();
                }
                Event::End(TagEnd::TableCell) if in_table => {
                    in_cell = false;
                    row.push(cell.trim().to_string());
                }
                // The header's cells sit directly inside TableHead.
                Event::End(TagEnd::TableHead) | Event::End(TagEnd::TableRow)
                    if in_table && !row.is_empty() =>
                {
                    rows.push(std::mem::take(&mut row));
                }
                Event::Text(t) | Event::Code(t) if in_cell => cell.push_str(&t),
                Event::SoftBreak | Event::HardBreak if in_cell => cell.push(' '),
                _ => {}
            }
        }

        if !in_table {
            return Err(ParseError::NoTable);
        }
        Self::from_raw_rows(rows)
    }

    /// Parse the first `<table>` element in an HTML document or fragment.
    pub fn from_html(html: &str) -> Result<Self, ParseError> {
        let doc = Html::parse_fragment(html);
        let table = doc.select(&TABLE_SELECTOR).next().ok_or(ParseError::NoTable)?;

        let rows = owned(table, &ROW_SELECTOR, "table")
            .map(|tr| {
                owned(tr, &CELL_SELECTOR, "tr")
                    .map(|cell| normalise_whitespace(&cell.text().collect::<String>()))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        Self::from_raw_rows(rows)
    }

    /// Render as an HTML table: header in `<thead>`, no index column.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr>");
        for h in &self.headers {
            html.push_str("<th>");
            html.push_str(&html_escape::encode_text(h));
            html.push_str("</th>");
        }
        html.push_str("</tr>\n  </thead>\n  <tbody>\n");
        for row in &self.rows {
            html.push_str("    <tr>");
            for cell in row {
                html.push_str("<td>");
                html.push_str(&html_escape::encode_text(cell));
                html.push_str("</td>");
            }
            html.push_str("</tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }

    /// Serialise as UTF-8 CSV with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>, ParseError> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::<u8>::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        writer
            .into_inner()
            .map_err(|e| ParseError::Csv(e.into_error().into()))
    }
}

/// Descendants of `owner` matching `selector` whose nearest `owner_tag`
/// ancestor is `owner` itself, so rows and cells of nested tables are skipped.
fn owned<'a>(
    owner: ElementRef<'a>,
    selector: &'static Selector,
    owner_tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    owner.select(selector).filter(move |el| {
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == owner_tag)
            .is_some_and(|nearest| nearest.id() == owner.id())
    })
}

/// Row and column counts of the first HTML table: `<tr>` count and the
/// widest row's `<td>`/`<th>` count. `(0, 0)` when there is no table.
pub fn html_table_stats(html: &str) -> (usize, usize) {
    let doc = Html::parse_fragment(html);
    let Some(table) = doc.select(&TABLE_SELECTOR).next() else {
        return (0, 0);
    };
    let rows: Vec<_> = table.select(&ROW_SELECTOR).collect();
    let cols = rows
        .iter()
        .map(|tr| tr.select(&CELL_SELECTOR).count())
        .max()
        .unwrap_or(0);
    (rows.len(), cols)
}

fn normalise_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
