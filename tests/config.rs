use ar4ja::{CodeParameters, GeneratorConfig, LdpcError, Rate};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn defaults_cover_all_codes() {
    let cfg = GeneratorConfig::default();
    assert_eq!(cfg.codes.len(), 9);
    assert_eq!(cfg.output_dir, PathBuf::from("./ldpc"));
    assert!(!cfg.parallel);
    assert!(cfg.verify);
    assert_eq!(cfg.words_per_line, 6);
    assert!(cfg.validate().is_ok());
}

#[test]
fn generator_section_from_toml() {
    let cfg_str = r#"
        [generator]
        output_dir = "/tmp/matrices"
        parallel = true
        words_per_line = 4

        [[generator.codes]]
        k = 1024
        rate = "1/2"

        [[generator.codes]]
        k = 16384
        rate = "4/5"
    "#;
    let cfg = GeneratorConfig::from_toml(cfg_str).unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("/tmp/matrices"));
    assert!(cfg.parallel);
    assert!(cfg.verify);
    assert_eq!(cfg.words_per_line, 4);
    assert_eq!(
        cfg.codes,
        vec![
            CodeParameters::new(1024, Rate::R1_2).unwrap(),
            CodeParameters::new(16384, Rate::R4_5).unwrap(),
        ]
    );
}

#[test]
fn missing_section_falls_back_to_defaults() {
    let cfg = GeneratorConfig::from_toml("[other]\nx = 1\n").unwrap();
    assert_eq!(cfg, GeneratorConfig::default());
}

#[test]
fn unsupported_code_is_rejected() {
    let cfg_str = r#"
        [[generator.codes]]
        k = 2048
        rate = "1/2"
    "#;
    assert!(matches!(
        GeneratorConfig::from_toml(cfg_str),
        Err(LdpcError::UnsupportedCode { k: 2048, .. })
    ));
    assert!(matches!(
        GeneratorConfig::from_toml("[generator]\nparallel = \"yes\"\n"),
        Err(LdpcError::Config(_))
    ));
}

#[test]
fn validation() {
    let mut cfg = GeneratorConfig::default();
    cfg.codes.push(cfg.codes[0]);
    assert!(cfg.validate().is_err());
    cfg.codes.clear();
    assert!(cfg.validate().is_err());
}

#[test]
fn from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[generator]\noutput_dir = \"out\"").unwrap();
    let cfg = GeneratorConfig::from_file(file.path()).unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("out"));
    assert_eq!(cfg.codes.len(), 9);
}

#[test]
fn validation_failure_converts_to_invalid_parameter() {
    fn checked(cfg: &GeneratorConfig) -> ar4ja::Result<()> {
        cfg.validate()?;
        Ok(())
    }
    let mut cfg = GeneratorConfig::default();
    cfg.codes.clear();
    match checked(&cfg) {
        Err(LdpcError::InvalidParameter(msg)) => assert!(msg.contains("no codes")),
        other => panic!("unexpected {:?}", other),
    }
}
