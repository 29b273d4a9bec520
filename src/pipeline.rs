use crate::load::{read_dataset, write_csv, write_json, write_pdf};
use crate::structs::{JobEntry, JobState};
use crate::transform::correct_dataset;
use log::{debug, error, info};
use std::path::{Path, PathBuf};

/// Output locations derived from one input path.
///
/// Names follow the fixed convention the downstream tooling expects:
/// `corrigido_<basename>.json`, `corrigido_<stem>.csv` and
/// `relatorio_<stem>.pdf`, written next to the input file.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub pdf: PathBuf,
}

impl OutputPaths {
    pub fn derive(input_path: &Path) -> Self {
        let dir = input_path.parent().unwrap_or(Path::new(""));
        let basename = input_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("dataset.json");
        let stem = input_path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("dataset");
        Self {
            json: dir.join(format!("corrigido_{}", basename)),
            csv: dir.join(format!("corrigido_{}.csv", stem)),
            pdf: dir.join(format!("relatorio_{}.pdf", stem)),
        }
    }
}

/// Runs one entry through load, correct and the three exporters.
///
/// Returns the terminal state for the entry. Loader failure (unreadable or
/// unparseable input) aborts the entry; exporter failures are logged and do
/// not stop the sibling exporters, so a partially exported entry still counts
/// as `Exported`.
pub fn process_entry(entry: &JobEntry) -> JobState {
    let mut state = JobState::Pending;
    debug!("{}: state {:?}", entry.input.display(), state);

    let mut dataset = match read_dataset(&entry.input) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Failed to read {}: {}", entry.input.display(), e);
            return JobState::Aborted;
        }
    };
    state = JobState::Loaded;
    debug!(
        "{}: state {:?}, {} records",
        entry.input.display(),
        state,
        dataset.len()
    );

    correct_dataset(&mut dataset, entry.kind);
    state = JobState::Corrected;
    debug!("{}: state {:?}", entry.input.display(), state);

    let outputs = OutputPaths::derive(&entry.input);
    match write_json(&dataset, &outputs.json) {
        Ok(()) => info!("Corrected JSON saved to {}", outputs.json.display()),
        Err(e) => error!("Failed to write {}: {}", outputs.json.display(), e),
    }
    match write_csv(&dataset, &outputs.csv) {
        Ok(()) => info!("Corrected CSV saved to {}", outputs.csv.display()),
        Err(e) => error!("Failed to write {}: {}", outputs.csv.display(), e),
    }
    match write_pdf(&dataset, &outputs.pdf, &entry.title) {
        Ok(()) => info!("Report saved to {}", outputs.pdf.display()),
        Err(e) => error!("Failed to write {}: {}", outputs.pdf.display(), e),
    }

    state = JobState::Exported;
    debug!("{}: state {:?}", entry.input.display(), state);
    state
}

/// Processes every entry in order, never letting one entry's failure keep the
/// next from starting. Returns the terminal state of each entry.
pub fn run_batch(entries: &[JobEntry]) -> Vec<JobState> {
    entries
        .iter()
        .map(|entry| {
            let state = process_entry(entry);
            if state == JobState::Aborted {
                info!("Skipping {}: no data", entry.input.display());
            }
            state
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_follow_the_fixed_convention() {
        let outputs = OutputPaths::derive(Path::new("/data/broken_database_1.json"));
        assert_eq!(
            outputs.json,
            Path::new("/data/corrigido_broken_database_1.json")
        );
        assert_eq!(
            outputs.csv,
            Path::new("/data/corrigido_broken_database_1.csv")
        );
        assert_eq!(
            outputs.pdf,
            Path::new("/data/relatorio_broken_database_1.pdf")
        );
    }

    #[test]
    fn relative_inputs_derive_relative_outputs() {
        let outputs = OutputPaths::derive(Path::new("broken_database_2.json"));
        assert_eq!(outputs.json, Path::new("corrigido_broken_database_2.json"));
        assert_eq!(outputs.pdf, Path::new("relatorio_broken_database_2.pdf"));
    }
}
