use crate::error::{PipelineError, Result};
use crate::structs::{Dataset, FieldValue, Record};
use csv::{QuoteStyle, WriterBuilder};
use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::{fs, fs::File, path::Path};

// US letter with the default margins of the report tooling this replaces.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 12.0;
const BLOCK_GAP: f32 = 10.0;

/// Reads one dataset from a JSON file.
///
/// # Arguments
/// * `input_path` - Path to a JSON array of flat key-value records
///
/// # Returns
/// The parsed records exactly as encoded, in file order. No type coercion
/// happens at this stage; that is the corrector's job.
///
/// # Errors
/// Returns `PipelineError::Read` when the file cannot be opened or read (not
/// found, permissions, I/O) and `PipelineError::Parse` on malformed JSON. Both
/// are non-fatal to a batch: the caller treats them as "no data" for this file.
pub fn read_dataset(input_path: &Path) -> Result<Dataset> {
    debug!("Reading input file: {}", input_path.display());
    let raw = fs::read_to_string(input_path).map_err(PipelineError::Read)?;
    let dataset: Dataset = serde_json::from_str(&raw)?;
    Ok(dataset)
}

/// Writes the corrected dataset to a pretty-printed JSON file.
///
/// Output uses 2-space indentation and preserves field order per record and
/// record order overall, so parsing it back yields the same dataset.
///
/// # Errors
/// Returns `PipelineError::Write` if the file cannot be created or written to.
pub fn write_json(records: &[Record], output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(PipelineError::Write)?;
    serde_json::to_writer_pretty(file, records)
        .map_err(|e| PipelineError::Write(e.into()))?;
    Ok(())
}

/// Writes the corrected dataset to a CSV file.
///
/// The header row is the key list of the *first* record in its insertion
/// order; every record is rendered in that column order by key lookup, with
/// missing keys rendered as the empty string. Values are joined with commas
/// and deliberately never quoted or escaped, reproducing the naive format the
/// downstream report tooling already consumes; embedded commas corrupt a row.
///
/// # Errors
/// Returns `PipelineError::EmptyDataset` when there are zero records (no
/// header can be derived) and `PipelineError::Write`/`Csv` on I/O failure.
pub fn write_csv(records: &[Record], output_path: &Path) -> Result<()> {
    let first = records.first().ok_or_else(|| {
        PipelineError::EmptyDataset(output_path.display().to_string())
    })?;
    let headers: Vec<&str> = first.fields.keys().map(String::as_str).collect();

    let file = File::create(output_path).map_err(PipelineError::Write)?;
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(file);

    writer.write_record(&headers)?;
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|key| {
                record
                    .fields
                    .get(*key)
                    .map(FieldValue::render)
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush().map_err(PipelineError::Write)?;
    Ok(())
}

/// Writes a paginated, human-readable PDF report of the corrected dataset.
///
/// The first page opens with `title` centered at 20pt; each record then gets a
/// block with a 1-based `Registro N:` label and one `key: value` line per
/// field at 12pt, blocks separated by vertical spacing. A new page starts
/// whenever the cursor reaches the bottom margin, so content flows in record
/// order across as many pages as needed.
///
/// # Errors
/// Returns `PipelineError::Pdf` if the document cannot be rendered or saved.
pub fn write_pdf(records: &[Record], output_path: &Path, title: &str) -> Result<()> {
    let mut report = ReportWriter::new();
    report.title_line(title);
    for (index, record) in records.iter().enumerate() {
        report.body_line(&format!("Registro {}:", index + 1));
        for (key, value) in &record.fields {
            report.body_line(&format!("{}: {}", key, value.render()));
        }
        report.block_gap();
    }
    report.save(output_path)
}

/// Builds a multi-page PDF as a vertical flow of text lines.
///
/// Operations are buffered per page and only turned into document objects in
/// `save`, which keeps all fallible lopdf work in one place.
struct ReportWriter {
    doc: Document,
    pages_id: ObjectId,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    cursor: f32,
}

impl ReportWriter {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            pages: Vec::new(),
            ops: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn title_line(&mut self, title: &str) {
        // Approximate centering: mean Helvetica advance is about half the size
        let width = 0.5 * TITLE_SIZE * title.chars().count() as f32;
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        self.text_line(title, TITLE_SIZE, x);
        self.cursor -= BLOCK_GAP;
    }

    fn body_line(&mut self, text: &str) {
        self.text_line(text, BODY_SIZE, MARGIN);
    }

    fn block_gap(&mut self) {
        self.cursor -= BLOCK_GAP;
    }

    fn text_line(&mut self, text: &str, size: f32, x: f32) {
        let advance = size * 1.25;
        if self.cursor - advance < MARGIN {
            self.start_new_page();
        }
        self.cursor -= advance;
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec!["F1".into(), Object::Integer(size as i64)]));
        self.ops.push(Operation::new(
            "Td",
            vec![Object::Integer(x as i64), Object::Integer(self.cursor as i64)],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(winansi_bytes(text))],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn start_new_page(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.pages.push(ops);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn save(mut self, output_path: &Path) -> Result<()> {
        self.start_new_page();

        let font_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in self.pages {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|e| PipelineError::Pdf(e.to_string()))?;
            let content_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, encoded));
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    (PAGE_WIDTH as i64).into(),
                    (PAGE_HEIGHT as i64).into(),
                ],
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();
        self.doc
            .save(output_path)
            .map_err(|e| PipelineError::Pdf(e.to_string()))?;
        Ok(())
    }
}

/// Maps text onto the report font's single-byte encoding.
///
/// Latin-1 code points coincide with WinAnsi for the accented letters that
/// show up in this data; anything outside that range becomes '?'.
fn winansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write as _;
    use tempfile::TempDir;

    fn dataset(raw: serde_json::Value) -> Dataset {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn read_missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let result = read_dataset(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(PipelineError::Read(_))));
    }

    #[test]
    fn read_malformed_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"[{\"nome\": ").unwrap();
        drop(file);

        let result = read_dataset(&path);
        assert!(matches!(result, Err(PipelineError::Parse(_))));
    }

    #[test]
    fn json_output_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let records = dataset(json!([
            {"nome": "Trakk", "vendas": 200},
            {"nome": "Fusca", "vendas": 150}
        ]));

        write_json(&records, &path).unwrap();
        let reparsed = read_dataset(&path).unwrap();
        assert_eq!(reparsed, records);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("  \"nome\": \"Trakk\""), "expected 2-space indent, got:\n{raw}");
    }

    #[test]
    fn csv_uses_first_record_for_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let records = dataset(json!([
            {"nome": "Trakk", "vendas": 200},
            {"vendas": 150, "nome": "Fusca"}
        ]));

        write_csv(&records, &path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "nome,vendas\nTrakk,200\nFusca,150\n");
    }

    #[test]
    fn csv_renders_missing_keys_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let records = dataset(json!([
            {"nome": "Trakk", "vendas": 200},
            {"nome": "Fusca"}
        ]));

        write_csv(&records, &path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "nome,vendas\nTrakk,200\nFusca,\n");
    }

    #[test]
    fn csv_never_quotes_embedded_delimiters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let records = dataset(json!([{"nome": "Trakk, o grande", "vendas": 1}]));

        write_csv(&records, &path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        // Known limitation carried over from the original format: no quoting.
        assert_eq!(raw, "nome,vendas\nTrakk, o grande,1\n");
    }

    #[test]
    fn csv_on_empty_dataset_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let result = write_csv(&[], &path);
        assert!(matches!(result, Err(PipelineError::EmptyDataset(_))));
        assert!(!path.exists(), "no header-less file may be left behind");
    }

    #[test]
    fn pdf_is_loadable_and_single_page_for_small_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.pdf");
        let records = dataset(json!([{"nome": "Trakk", "vendas": 200}]));

        write_pdf(&records, &path, "Relatório de Veículos").unwrap();
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn pdf_paginates_once_a_page_overflows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.pdf");
        let records: Dataset = (0..120)
            .map(|i| dataset(json!([{"nome": format!("Registro {i}"), "vendas": i}])).remove(0))
            .collect();

        write_pdf(&records, &path, "Relatório Longo").unwrap();
        let doc = Document::load(&path).unwrap();
        assert!(doc.get_pages().len() > 1);
    }
}
