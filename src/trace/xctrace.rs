//! `xctrace export` subprocess boundary.
//!
//! Every container access is one `xctrace export` invocation. The calls are
//! I/O-bound and can take seconds on large traces, which is why extraction
//! fans them out concurrently.

use std::path::Path;

use log::debug;
use tokio::process::Command;

use crate::domain::ConvertError;

/// XPath selecting one table of one run inside the container TOC.
#[must_use]
pub fn table_xpath(run: u32, schema: &str) -> String {
    format!("/trace-toc/run[@number=\"{run}\"]/data/table[@schema=\"{schema}\"]")
}

/// Run `xctrace export --input <trace> <args...>` and capture stdout.
pub async fn run_export(trace: &Path, args: &[&str]) -> Result<String, ConvertError> {
    debug!("xctrace export --input {} {}", trace.display(), args.join(" "));

    let output = Command::new("xctrace")
        .arg("export")
        .arg("--input")
        .arg(trace)
        .args(args)
        .output()
        .await
        .map_err(|e| ConvertError::Exporter(format!("failed to spawn xctrace: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::Exporter(format!(
            "xctrace export exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_xpath_selects_run_and_schema() {
        assert_eq!(
            table_xpath(2, "time-profile"),
            "/trace-toc/run[@number=\"2\"]/data/table[@schema=\"time-profile\"]"
        );
    }
}
