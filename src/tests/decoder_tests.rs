//! Unit tests for the decoder report

use crate::config::ProbeConfig;
use crate::decoder::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"MROF\x00\x00\x00\x00FCSS  SG");
        data.extend_from_slice(b"\x00Logic Remote v2\x00");
        data.extend_from_slice(b"\x00/softubeosd/ch_1/gain\x00Volume Knob\x00");
        data
    }

    #[test]
    fn test_file_info_and_markers() {
        let report = decode_bytes("sample.cs", &sample_file(), &ProbeConfig::default());
        assert_eq!(report.file_info.filepath, "sample.cs");
        assert_eq!(report.file_info.filesize, 68);
        assert_eq!(report.file_info.header, "4d524f46000000004643535320205347");
        assert!(report.markers.form);
        assert!(report.markers.fcss);
        assert_eq!(report.markers.rgsc_count, 0);
    }

    #[test]
    fn test_controller_detection() {
        let report = decode_bytes("sample.cs", &sample_file(), &ProbeConfig::default());
        assert_eq!(
            report.controllers,
            vec![ControllerMatch {
                offset: 17,
                name: "Logic Remote v2".to_string(),
                device_type: "Logic Remote".to_string(),
            }]
        );
    }

    #[test]
    fn test_configured_device_patterns() {
        let config = ProbeConfig {
            device_patterns: vec!["Volume".to_string()],
            ..ProbeConfig::default()
        };
        let report = decode_bytes("sample.cs", &sample_file(), &config);
        assert_eq!(report.controllers.len(), 1);
        assert_eq!(report.controllers[0].name, "Volume Knob");
        assert_eq!(report.controllers[0].device_type, "Volume");
    }

    #[test]
    fn test_mapping_context_excludes_path_segments() {
        let report = decode_bytes("sample.cs", &sample_file(), &ProbeConfig::default());
        assert_eq!(report.mappings.len(), 1);

        let mapping = &report.mappings[0];
        assert_eq!(mapping.offset, 34);
        assert_eq!(mapping.path, "/softubeosd/ch_1/gain");
        assert_eq!(
            mapping.nearby_context,
            vec!["MROF", "FCSS  SG", "Logic Remote v2"],
            "Path segments are skipped and the list is capped at three"
        );
    }

    #[test]
    fn test_nearby_strings_radius_is_strict() {
        let strings = vec![
            crate::strings::StringMatch { offset: 0, text: "edge".to_string() },
            crate::strings::StringMatch { offset: 1, text: "inside".to_string() },
        ];
        let nearby = nearby_strings(&strings, 100, "/a/b", 100, 3);
        assert_eq!(nearby, vec!["inside".to_string()]);
    }

    #[test]
    fn test_mapping_limit() {
        let mut data = Vec::new();
        for i in 0..10 {
            data.extend_from_slice(format!("/dev/p{}\x00", i).as_bytes());
        }
        let config = ProbeConfig {
            mapping_limit: 4,
            ..ProbeConfig::default()
        };
        let report = decode_bytes("paths.cs", &data, &config);
        assert_eq!(report.mappings.len(), 4);
        assert_eq!(report.mappings[3].path, "/dev/p3");
    }

    #[test]
    fn test_json_keys() {
        let report = decode_bytes("sample.cs", &sample_file(), &ProbeConfig::default());
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["markers"]["FORM"], true);
        assert_eq!(value["markers"]["RGSC_count"], 0);
        assert_eq!(value["controllers"][0]["type"], "Logic Remote");
        assert_eq!(value["mappings"][0]["nearby_context"][2], "Logic Remote v2");
        assert!(value["markers"].get("fcss_signature").is_none());
    }

    #[test]
    fn test_text_report() {
        let report = decode_bytes("sample.cs", &sample_file(), &ProbeConfig::default());
        let text = report.to_text(30);
        assert!(text.starts_with("File: sample.cs\nSize: 68 bytes\n"));
        assert!(text.contains("  FORM marker (little-endian): Yes"));
        assert!(text.contains("  FCSS marker: Yes"));
        assert!(text.contains("  RGSC block count: 0"));
        assert!(text.contains("  Logic Remote v2 (at offset 0x11)"));
        assert!(text.contains("  1. /softubeosd/ch_1/gain (at offset 0x22)"));
        assert!(text.contains("     Context: MROF, FCSS  SG, Logic Remote v2"));
    }

    #[test]
    fn test_text_report_sections() {
        let report = decode_bytes("sample.cs", &sample_file(), &ProbeConfig::default());
        let text = report.to_text(0);
        assert!(text.contains("Header: 4d524f46000000004643535320205347\n\nFile Structure:\n"));
        assert!(text.contains("RGSC block count: 0\n\nDetected Controllers:\n"));
        assert!(text.ends_with("(at offset 0x11)\n\nSample OSC Control Paths:"));
    }

    #[test]
    fn test_unrelated_binary_yields_empty_report() {
        let data: Vec<u8> = (0..=255u8).filter(|b| !b.is_ascii_graphic()).collect();
        let report = decode_bytes("noise.bin", &data, &ProbeConfig::default());
        assert!(!report.markers.form);
        assert!(report.controllers.is_empty());
        assert!(report.mappings.is_empty());
    }
}
