use taskboard::{
    config::Config,
    engine::{ErrorClassifier, PlotOptions, PlotRenderer, ResourceSampler, SeriesByLog, python::PythonEngine},
};
use tempfile::TempDir;

fn engine_without_scripts(dir: &TempDir) -> PythonEngine {
    let mut cfg = Config::default();
    cfg.paths.scripts_dir = dir.path().join("no_scripts").display().to_string();
    PythonEngine::new(&cfg)
}

#[test]
fn missing_logs_never_need_the_helpers() {
    let dir = TempDir::new().unwrap();
    let engine = engine_without_scripts(&dir);
    let log = dir.path().join("gone.err").display().to_string();

    assert_eq!(engine.infer_error(&log).unwrap(), "");
    assert!(engine.sample(&log).unwrap().is_none());
}

#[test]
fn missing_script_is_reported_on_first_use() {
    let dir = TempDir::new().unwrap();
    let engine = engine_without_scripts(&dir);
    let log = dir.path().join("job.err");
    std::fs::write(&log, "Segmentation fault\n").unwrap();

    let err = engine.infer_error(&log.display().to_string()).unwrap_err();
    assert!(err.to_string().contains("missing script"), "{err:#}");

    let options = PlotOptions {
        xtitle: "x".into(),
        ytitle: "y".into(),
        title: "t".into(),
        bin_count: 10,
        normalize_x: true,
        colorbar: true,
        scale_y: None,
    };
    let err = engine
        .render(&SeriesByLog::new(), "ds", ("epoch", "usr"), &options)
        .unwrap_err();
    assert!(err.to_string().contains("plotter.py"), "{err:#}");
}
