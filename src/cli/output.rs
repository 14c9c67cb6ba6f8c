//! Input records, run output and summaries for CLI commands.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;
use crate::cli::args::QuarryArgs;
use crate::error::Result;
use crate::index::package::DocId;

/// A query identifier, kept in the form it was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryId {
    Number(u64),
    Text(String),
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryId::Number(n) => write!(f, "{n}"),
            QueryId::Text(s) => f.write_str(s),
        }
    }
}

/// One entry of a query file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub qid: QueryId,
    pub query: String,
}

/// One line of a document file.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRecord {
    pub id: DocId,
    #[serde(default)]
    pub tokens: Option<Vec<String>>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Ranked results for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    pub qid: QueryId,
    pub doc_ids: Vec<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f64>>,
}

/// Parsed documents ready for the index builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentBatch {
    pub tokens: Vec<Vec<String>>,
    pub ids: Vec<DocId>,
    /// Non-blank lines that were not indexed.
    pub skipped: usize,
}

/// Summary of an index build.
#[derive(Debug, Serialize)]
pub struct IndexSummary {
    pub path: String,
    pub documents: usize,
    pub skipped_lines: usize,
    pub keys: usize,
    pub char_grams: usize,
    pub avgdl: f64,
    pub duration_ms: u64,
}

/// Summary of a search run.
#[derive(Debug, Serialize)]
pub struct SearchSummary {
    pub output: String,
    pub queries: usize,
    pub failed_queries: usize,
    pub method: String,
    pub duration_ms: u64,
}

/// Read JSONL documents. Blank lines are ignored; unparsable lines, lines
/// with neither `tokens` nor `text`, and repeated ids are skipped with a
/// warning, keeping the first occurrence.
pub fn read_documents<R: BufRead>(reader: R, analyzer: &dyn Analyzer) -> Result<DocumentBatch> {
    let mut batch = DocumentBatch::default();
    let mut seen: HashSet<DocId> = HashSet::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<DocumentRecord>(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping document on line {}: {e}", line_num + 1);
                batch.skipped += 1;
                continue;
            }
        };

        let tokens = match (record.tokens, record.text) {
            (Some(tokens), _) => tokens,
            (None, Some(text)) => analyzer.analyze(&text),
            (None, None) => {
                warn!(
                    "skipping document {} on line {}: no tokens or text",
                    record.id,
                    line_num + 1
                );
                batch.skipped += 1;
                continue;
            }
        };

        if !seen.insert(record.id) {
            warn!(
                "skipping duplicate document id {} on line {}",
                record.id,
                line_num + 1
            );
            batch.skipped += 1;
            continue;
        }

        batch.tokens.push(tokens);
        batch.ids.push(record.id);
    }

    Ok(batch)
}

/// Read a JSONL document file.
pub fn read_documents_file<P: AsRef<Path>>(path: P, analyzer: &dyn Analyzer) -> Result<DocumentBatch> {
    let file = File::open(path)?;
    read_documents(BufReader::new(file), analyzer)
}

/// Read a JSON array of queries.
pub fn read_queries_file<P: AsRef<Path>>(path: P) -> Result<Vec<QueryRecord>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write run entries as pretty JSON, creating parent directories.
pub fn write_run_file<P: AsRef<Path>>(path: P, entries: &[RunEntry]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Print a summary unless running quietly.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &QuarryArgs) -> Result<()> {
    if args.verbosity() == 0 {
        return Ok(());
    }

    println!("{message}");
    let value = serde_json::to_value(result)?;
    if let Some(fields) = value.as_object() {
        for (name, field) in fields {
            match field {
                serde_json::Value::String(s) => println!("  {name}: {s}"),
                other => println!("  {name}: {other}"),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;
    use std::io::Cursor;

    #[test]
    fn test_read_documents_skips_bad_lines() {
        let input = r#"{"id": 1, "tokens": ["climate", "change"]}

{"id": 2, "text": "Machine Learning!"}
not json
{"id": 3}
{"id": 1, "tokens": ["duplicate"]}
{"tokens": ["no", "id"]}
"#;
        let batch = read_documents(Cursor::new(input), &StandardAnalyzer::new()).unwrap();
        assert_eq!(batch.ids, vec![1, 2]);
        assert_eq!(
            batch.tokens,
            vec![
                vec!["climate".to_string(), "change".to_string()],
                vec!["machine".to_string(), "learning".to_string()],
            ]
        );
        assert_eq!(batch.skipped, 4);
    }

    #[test]
    fn test_query_ids_keep_their_form() {
        let queries: Vec<QueryRecord> =
            serde_json::from_str(r#"[{"qid": "q1", "query": "a"}, {"qid": 7, "query": "b"}]"#)
                .unwrap();
        assert_eq!(queries[0].qid, QueryId::Text("q1".to_string()));
        assert_eq!(queries[1].qid, QueryId::Number(7));
        assert_eq!(queries[1].qid.to_string(), "7");
    }

    #[test]
    fn test_run_entry_omits_missing_scores() {
        let entry = RunEntry {
            qid: QueryId::Text("q1".to_string()),
            doc_ids: vec![3, 1],
            scores: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"qid":"q1","doc_ids":[3,1]}"#);
    }
}
