//! Integration tests for types

#[cfg(test)]
mod tests {
    use rvx_types::*;
    use std::path::PathBuf;

    #[test]
    fn test_version_policy_parse() {
        assert_eq!("strict".parse::<VersionPolicy>(), Ok(VersionPolicy::Strict));
        assert_eq!("legacy".parse::<VersionPolicy>(), Ok(VersionPolicy::Legacy));
        assert!("loose".parse::<VersionPolicy>().is_err());
        assert_eq!(VersionPolicy::default(), VersionPolicy::Strict);
    }

    #[test]
    fn test_patch_kind_serialization() {
        let json = serde_json::to_string(&PatchKind::Resource).unwrap();
        assert_eq!(json, r#""resource""#);

        let deserialized: PatchKind = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, PatchKind::Resource);
    }

    #[test]
    fn test_progress_update_markers() {
        assert!(ProgressUpdate::log_only("hello").is_log_only());
        assert!(ProgressUpdate::new(ProgressUpdate::ABORTED, "Aborting...", "").is_abort());
        assert!(!ProgressUpdate::new(0.5, "", "").is_log_only());
    }

    #[test]
    fn test_report_artifact_falls_back_to_unsigned() {
        let mut report = RunReport::new(
            Uuid::new_v4(),
            PathBuf::from("patched.apk"),
            PathBuf::from("out.apk"),
        );
        assert_eq!(report.artifact(), None);

        report.stages.push(PipelineStage::Done);
        report.signing = SigningOutcome::Failed {
            message: "bad password".into(),
        };
        assert_eq!(report.artifact(), Some(&PathBuf::from("patched.apk")));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_output_format_default() {
        let fmt = OutputFormat::default();
        assert_eq!(fmt, OutputFormat::Tty);
    }
}
