use crate::error::{PlotError, Result};
use crate::model::FileSummary;
use std::path::Path;

/// Write per-file summaries as pretty-printed JSON.
pub fn export_json(path: &Path, summaries: &[FileSummary]) -> Result<()> {
    let to_err = |source: std::io::Error| PlotError::Export {
        path: path.to_path_buf(),
        source,
    };
    let data = serde_json::to_string_pretty(summaries).map_err(|e| to_err(e.into()))?;
    std::fs::write(path, data).map_err(to_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn writes_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.json");
        let summaries = vec![FileSummary {
            label: "a".into(),
            file: PathBuf::from("runs/a.hdr2"),
            rows: 3,
            min_ms: 1.0,
            median_ms: 2.0,
            max_ms: 3.0,
            jitter_us: Some(10),
        }];
        export_json(&out, &summaries).unwrap();

        let back: Vec<FileSummary> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].label, "a");
        assert_eq!(back[0].jitter_us, Some(10));
    }

    #[test]
    fn unwritable_path_is_an_export_error() {
        let err = export_json(Path::new("/definitely/not/here/out.json"), &[]).unwrap_err();
        assert!(matches!(err, PlotError::Export { .. }));
    }
}
