//! Container open/validation and run capability introspection.

use std::path::{Path, PathBuf};

use log::info;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::domain::{ConvertError, TimeProfilerSettings};
use crate::trace::rows::attr;
use crate::trace::{schema, xctrace, ContainerReader};

/// One run entry from the container's table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunToc {
    pub number: u32,
    /// Schema ids of the tables this run recorded.
    pub tables: Vec<String>,
}

/// An opened trace container, pinned to one run.
///
/// Holds no OS resources; every query is an independent `xctrace export`
/// invocation against the path.
#[derive(Debug, Clone)]
pub struct XctraceContainer {
    path: PathBuf,
    run: u32,
    settings: TimeProfilerSettings,
}

impl XctraceContainer {
    /// Open a container and validate that `run` exists in its manifest.
    ///
    /// # Errors
    /// `ContainerNotFound` if the path does not exist or the run number is
    /// absent from the TOC; `ContainerMalformed` if the TOC cannot be
    /// parsed.
    pub async fn open(path: &Path, run: u32) -> Result<Self, ConvertError> {
        if !path.exists() {
            return Err(ConvertError::ContainerNotFound { path: path.to_path_buf(), run });
        }

        let toc_xml = xctrace::run_export(path, &["--toc"]).await?;
        let runs = parse_toc(&toc_xml)?;

        let Some(run_toc) = runs.iter().find(|r| r.number == run) else {
            return Err(ConvertError::ContainerNotFound { path: path.to_path_buf(), run });
        };

        let settings = settings_from_tables(&run_toc.tables);
        info!(
            "opened {} run {run}: {} tables, settings {settings:?}",
            path.display(),
            run_toc.tables.len()
        );

        Ok(Self { path: path.to_path_buf(), run, settings })
    }
}

impl ContainerReader for XctraceContainer {
    fn settings(&self) -> TimeProfilerSettings {
        self.settings
    }

    async fn export_table(&self, schema: &str) -> Result<String, ConvertError> {
        let xpath = xctrace::table_xpath(self.run, schema);
        xctrace::run_export(&self.path, &["--xpath", &xpath]).await
    }
}

/// Parse the `--toc` export into per-run table listings.
pub fn parse_toc(xml: &str) -> Result<Vec<RunToc>, ConvertError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut runs = Vec::new();
    let mut current: Option<RunToc> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.local_name().as_ref() {
                b"run" => {
                    let number = attr(&e, b"number")
                        .and_then(|v| v.parse::<u32>().ok())
                        .ok_or_else(|| {
                            ConvertError::ContainerMalformed(
                                "run entry without a numeric number attribute".to_string(),
                            )
                        })?;
                    current = Some(RunToc { number, tables: Vec::new() });
                }
                b"table" => {
                    if let (Some(run), Some(schema)) = (current.as_mut(), attr(&e, b"schema")) {
                        run.tables.push(schema);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"run" {
                    if let Some(run) = current.take() {
                        runs.push(run);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ConvertError::ContainerMalformed(format!("invalid TOC XML: {e}")));
            }
        }
    }

    if runs.is_empty() {
        return Err(ConvertError::ContainerMalformed("TOC lists no runs".to_string()));
    }

    Ok(runs)
}

/// Derive the capability flags from a run's advertised tables.
#[must_use]
pub fn settings_from_tables(tables: &[String]) -> TimeProfilerSettings {
    let has = |schema: &str| tables.iter().any(|t| t == schema);
    TimeProfilerSettings {
        has_thread_states: has(schema::THREAD_STATE_SCHEMA),
        has_virtual_memory: has(schema::VIRTUAL_MEMORY_SCHEMA),
        has_syscalls: has(schema::SYSCALL_SCHEMA),
        thread_names: has(schema::THREAD_NAMES_SCHEMA),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOC: &str = r#"<?xml version="1.0"?>
<trace-toc>
  <run number="1">
    <info><target/></info>
    <data>
      <table schema="time-profile"/>
      <table schema="thread-state"/>
      <table schema="binary-load-info"/>
      <table schema="thread-names"/>
    </data>
  </run>
  <run number="2">
    <data>
      <table schema="time-profile"/>
      <table schema="syscall"/>
    </data>
  </run>
</trace-toc>"#;

    #[test]
    fn test_parse_toc_lists_runs_and_tables() {
        let runs = parse_toc(TOC).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].number, 1);
        assert_eq!(runs[0].tables.len(), 4);
        assert_eq!(runs[1].tables, vec!["time-profile", "syscall"]);
    }

    #[test]
    fn test_settings_from_tables() {
        let runs = parse_toc(TOC).unwrap();

        let first = settings_from_tables(&runs[0].tables);
        assert!(first.has_thread_states);
        assert!(!first.has_virtual_memory);
        assert!(!first.has_syscalls);
        assert!(first.thread_names);

        let second = settings_from_tables(&runs[1].tables);
        assert!(second.has_syscalls);
        assert!(!second.has_thread_states);
        assert!(!second.thread_names);
    }

    #[test]
    fn test_parse_toc_rejects_garbage() {
        assert!(matches!(
            parse_toc("<trace-toc></trace-toc>"),
            Err(ConvertError::ContainerMalformed(_))
        ));
        assert!(parse_toc("not xml <<<").is_err());
    }
}
